//! On-chain operator registry subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (RPC URLs, contract addresses)
//!     → client.rs (providers with per-call timeout + failover)
//!     → contracts.rs (ABI call encoding/decoding)
//!     → OperatorRegistry trait consumed by the identity verifier
//! ```
//!
//! # Design Decisions
//! - Strictly read-only: the gateway never signs or sends transactions
//! - One shared client built at startup; no per-request construction
//! - Every call has a deadline; a timeout reads as a failed lookup upstream
//! - The trait seam lets tests substitute an in-memory registry

pub mod client;
pub mod contracts;
pub mod types;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

pub use client::RegistryClient;
pub use types::{RegistryError, RegistryResult};

/// Read-only view of the on-chain operator registry.
#[async_trait]
pub trait OperatorRegistry: Send + Sync {
    /// Registration index for an operator address. Zero means unregistered.
    async fn operator_id_by_address(&self, operator: Address) -> RegistryResult<U256>;

    /// BLS public key for a registered operator, as four 48-byte group-2
    /// coordinates.
    async fn operator_bls_pubkey(&self, operator_id: U256) -> RegistryResult<[Bytes; 4]>;
}
