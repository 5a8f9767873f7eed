mod traits;

pub mod eos80;
pub mod linear;

pub use traits::EquationOfState;
