pub mod config;
pub mod error;
pub mod time_value;
pub mod types;
pub mod valuation;

pub use config::ValuationDefaults;
pub use error::IntrinsicError;
pub use types::*;

/// Standard result type for the fallible edges of the crate (config, request parsing)
pub type IntrinsicResult<T> = Result<T, IntrinsicError>;
