pub mod safety;

pub use safety::{SafetyError, SafetyErrorResponse};
