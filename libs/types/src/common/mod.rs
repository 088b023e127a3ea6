//! Shared numeric and error types

pub mod errors;
pub mod fixed_point;
