//! Identity verification subsystem.
//!
//! # Data Flow
//! ```text
//! Admission path segment (percent-decoded)
//!     → payload.rs (JSON → typed proof, strict validation)
//!     → ecdsa.rs | bls.rs (selected at startup, never both)
//!     → registry reads through the OperatorRegistry trait
//!     → AdmissionResult { admitted, operator_index }
//! ```
//!
//! # Design Decisions
//! - Fails closed: every parse, RPC, or crypto failure reads as "rejected"
//! - `verify` never returns an error or panics past this boundary
//! - No per-call mutable state; the verifier is shared behind an Arc
//! - The verification message and its hash are computed once at startup

pub mod bls;
pub mod ecdsa;
pub mod payload;

use std::sync::Arc;

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;
use thiserror::Error;

use crate::config::ProofScheme;
use crate::registry::{OperatorRegistry, RegistryError};

pub use payload::{AdmissionPayload, BlsProof, EcdsaProof, PayloadError};

/// The fixed message operators sign, with its ABI-encoded keccak hash.
///
/// The hash is what the BLS scheme authenticates; the ECDSA scheme signs
/// the raw text under personal-message framing.
#[derive(Debug, Clone)]
pub struct VerificationMessage {
    raw: String,
    hash: B256,
}

impl VerificationMessage {
    /// Hash the configured message once: `keccak256(abi.encode(string))`.
    pub fn new(message: impl Into<String>) -> Self {
        let raw = message.into();
        let hash = keccak256(raw.abi_encode());
        Self { raw, hash }
    }

    /// The raw message text.
    pub fn text(&self) -> &str {
        &self.raw
    }

    /// The 32-byte message hash.
    pub fn hash(&self) -> B256 {
        self.hash
    }
}

/// Outcome of a single verification attempt. Ephemeral; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionResult {
    pub admitted: bool,
    pub operator_index: Option<U256>,
}

impl AdmissionResult {
    fn admitted(operator_index: U256) -> Self {
        Self {
            admitted: true,
            operator_index: Some(operator_index),
        }
    }

    fn rejected() -> Self {
        Self {
            admitted: false,
            operator_index: None,
        }
    }
}

/// Internal failure taxonomy; all variants collapse to a rejection.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("signer recovery failed")]
    Recovery,

    #[error("operator {0} is not registered")]
    Unregistered(Address),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("pairing check failed")]
    PairingMismatch,

    #[error("registry returned a malformed public key")]
    MalformedKey,

    #[error("payload does not match the configured proof scheme")]
    SchemeMismatch,
}

/// Verifies operator identity proofs against the on-chain registry.
///
/// One instance per process, built at startup with the deployment's proof
/// scheme, message, and shared registry client.
pub struct IdentityVerifier {
    scheme: ProofScheme,
    message: VerificationMessage,
    registry: Arc<dyn OperatorRegistry>,
}

impl IdentityVerifier {
    /// Create a verifier for the configured scheme.
    pub fn new(
        scheme: ProofScheme,
        message: VerificationMessage,
        registry: Arc<dyn OperatorRegistry>,
    ) -> Self {
        Self {
            scheme,
            message,
            registry,
        }
    }

    /// The active proof scheme.
    pub fn scheme(&self) -> ProofScheme {
        self.scheme
    }

    /// The fixed verification message.
    pub fn message(&self) -> &VerificationMessage {
        &self.message
    }

    /// Verify an admission payload. Fails closed: any registry or
    /// cryptographic failure yields `admitted = false`, never an error.
    pub async fn verify(&self, payload: &AdmissionPayload) -> AdmissionResult {
        let outcome = match (self.scheme, payload) {
            (ProofScheme::Ecdsa, AdmissionPayload::Ecdsa(proof)) => {
                ecdsa::verify(proof, &self.message, self.registry.as_ref()).await
            }
            (ProofScheme::Bls, AdmissionPayload::Bls(proof)) => {
                bls::verify(proof, &self.message, self.registry.as_ref()).await
            }
            _ => Err(VerifyError::SchemeMismatch),
        };

        match outcome {
            Ok(operator_index) => AdmissionResult::admitted(operator_index),
            Err(e) => {
                tracing::warn!(error = %e, "Identity verification failed");
                AdmissionResult::rejected()
            }
        }
    }
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("scheme", &self.scheme)
            .field("message", &self.message.raw)
            .finish()
    }
}
