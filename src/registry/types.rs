//! Registry-specific types and error definitions.

use thiserror::Error;

// Re-export RegistryConfig from config module to avoid duplication
pub use crate::config::schema::RegistryConfig;

/// Errors that can occur while reading the operator registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// A configured contract address could not be parsed.
    #[error("Invalid contract address '{0}'")]
    InvalidAddress(String),

    /// The contract returned data we could not decode.
    #[error("ABI decode error: {0}")]
    Decode(String),

    /// The requested registry is not configured for this deployment.
    #[error("Registry not available: {0}")]
    NotAvailable(String),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
