pub mod candidate;
pub mod job;

use thiserror::Error;

/// Validation failures raised while constructing domain records.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("pay range bounds must be positive (got {min}..{max})")]
    NonPositivePay { min: f64, max: f64 },

    #[error("pay range minimum {min} exceeds maximum {max}")]
    InvertedPay { min: f64, max: f64 },

    #[error("invalid geolocation ({latitude}, {longitude})")]
    InvalidLocation { latitude: f64, longitude: f64 },
}
