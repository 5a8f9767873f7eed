use num_traits::Zero;

use crate::constraint::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is not zero.
///
/// Used for quantities that end up in a denominator, such as the grid
/// refinement factor.
///
/// # Examples
///
/// ```
/// use cabbeling_core::constraint::NonZero;
///
/// assert!(NonZero::new(1.2).is_ok());
/// assert!(NonZero::new(-4.0).is_ok());
/// assert!(NonZero::new(0.0).is_err());
/// assert!(NonZero::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NonZero;

impl NonZero {
    /// Constructs `Constrained<T, NonZero>` if the value is not zero.
    ///
    /// # Errors
    ///
    /// - [`ConstraintError::Zero`] if equal to zero.
    /// - [`ConstraintError::NotANumber`] if the value is not comparable to itself (e.g., NaN).
    pub fn new<T: PartialOrd + Zero>(value: T) -> Result<Constrained<T, NonZero>, ConstraintError> {
        Constrained::<T, NonZero>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for NonZero {
    fn check(value: &T) -> Result<(), ConstraintError> {
        if value.partial_cmp(value).is_none() {
            Err(ConstraintError::NotANumber)
        } else if value.is_zero() {
            Err(ConstraintError::Zero)
        } else {
            Ok(())
        }
    }
}
