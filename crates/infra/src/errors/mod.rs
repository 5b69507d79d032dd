//! Infrastructure error types and conversions into the domain error.

mod conversions;

pub use conversions::{constraint_violation, ConstraintViolation, InfraError};
