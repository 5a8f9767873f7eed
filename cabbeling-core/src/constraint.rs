//! Numeric invariants checked when a value is wrapped.
//!
//! Experiment parameters pass through these wrappers once, at configuration
//! time, so profile and grid code can use them at every sample point without
//! checking again.
//!
//! - [`Finite`]: neither NaN nor infinite.
//! - [`NonZero`]: a number other than zero.
//! - [`StrictlyPositive`]: greater than zero.
//!
//! Markers plug into [`Constrained<T, C>`]; each also has a `new()` shortcut.

mod finite;
mod non_zero;
mod strictly_positive;

use std::marker::PhantomData;

use thiserror::Error;

pub use finite::Finite;
pub use non_zero::NonZero;
pub use strictly_positive::StrictlyPositive;

/// A check applied by a zero-sized marker type.
pub trait Constraint<T> {
    /// Checks `value` against the invariant.
    ///
    /// # Errors
    ///
    /// Returns the [`ConstraintError`] describing the violation.
    fn check(value: &T) -> Result<(), ConstraintError>;
}

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConstraintError {
    #[error("value must not be negative")]
    Negative,
    #[error("value must not be zero")]
    Zero,
    #[error("value is not a number")]
    NotANumber,
    #[error("value must be finite")]
    Infinite,
}

/// A value known to satisfy the constraint `C`.
///
/// ```
/// use cabbeling_core::constraint::{Constrained, StrictlyPositive};
///
/// let width = Constrained::<_, StrictlyPositive>::new(0.05).unwrap();
/// assert_eq!(width.into_inner(), 0.05);
///
/// assert!(Constrained::<_, StrictlyPositive>::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constrained<T, C: Constraint<T>> {
    value: T,
    _marker: PhantomData<C>,
}

impl<T, C: Constraint<T>> Constrained<T, C> {
    /// Wraps `value` if it satisfies `C`.
    ///
    /// # Errors
    ///
    /// Returns the violation reported by `C`.
    pub fn new(value: T) -> Result<Self, ConstraintError> {
        C::check(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Unwraps the checked value.
    pub fn into_inner(self) -> T {
        self.value
    }
}
