use num_traits::Float;

use crate::constraint::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a floating-point value is finite.
///
/// # Examples
///
/// ```
/// use cabbeling_core::constraint::Finite;
///
/// let s = Finite::new(34.7).unwrap();
/// assert_eq!(s.into_inner(), 34.7);
///
/// assert!(Finite::new(f64::NAN).is_err());
/// assert!(Finite::new(f64::NEG_INFINITY).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Finite;

impl Finite {
    /// Constructs `Constrained<T, Finite>` if the value is neither NaN nor infinite.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::NotANumber`] if the value is NaN.
    /// - [`ConstraintError::Infinite`] if the value is positive or negative infinity.
    pub fn new<T: Float>(value: T) -> Result<Constrained<T, Finite>, ConstraintError> {
        Constrained::<T, Finite>::new(value)
    }
}

impl<T: Float> Constraint<T> for Finite {
    fn check(value: &T) -> Result<(), ConstraintError> {
        if value.is_nan() {
            Err(ConstraintError::NotANumber)
        } else if value.is_infinite() {
            Err(ConstraintError::Infinite)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass() {
        assert!(Finite::new(0.0_f64).is_ok());
        assert!(Finite::new(-1.5_f32).is_ok());
        assert!(Finite::new(f64::MAX).is_ok());
    }

    #[test]
    fn non_finite_values_fail() {
        assert_eq!(Finite::new(f64::NAN), Err(ConstraintError::NotANumber));
        assert_eq!(Finite::new(f64::INFINITY), Err(ConstraintError::Infinite));
        assert_eq!(Finite::new(f32::NEG_INFINITY), Err(ConstraintError::Infinite));
    }
}
