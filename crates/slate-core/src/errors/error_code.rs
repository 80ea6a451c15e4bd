//! SlateErrorCode trait for transport-level error codes.

/// Trait for converting slate errors to stable error code strings.
/// Every error enum implements this so callers across a process
/// boundary can branch on the code instead of the message.
pub trait SlateErrorCode {
    /// Returns the error code string (e.g., "VALIDATION_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CACHE_UNAVAILABLE: &str = "CACHE_UNAVAILABLE";
pub const SIMULATION_TIMEOUT: &str = "SIMULATION_TIMEOUT";
pub const WORKER_POOL_ERROR: &str = "WORKER_POOL_ERROR";
pub const CANCELLED: &str = "CANCELLED";
