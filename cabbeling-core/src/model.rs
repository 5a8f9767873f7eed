/// A pure function from a typed input to a typed output.
///
/// A model returns the same result for the same input. Simulation engines
/// sample field initializers and grid face functions pointwise, possibly out
/// of order or in parallel.
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Evaluates the model at `input`.
    ///
    /// # Errors
    ///
    /// Returns the model's own error when `input` is outside its domain.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}
