//! Admission payload parsing and validation.
//!
//! # Responsibilities
//! - Parse the percent-decoded admission path segment as JSON
//! - Validate field presence, hex encoding, and point/signature lengths
//! - Produce a strongly-typed proof before any crypto or registry work runs
//!
//! # Design Decisions
//! - The active proof scheme decides the expected wire shape; there is no
//!   runtime negotiation between the two
//! - Unknown JSON fields are tolerated, missing ones are not
//! - A payload that fails here is a verification failure, never a crash

use alloy::hex;
use alloy::primitives::{Address, Signature};
use serde::Deserialize;
use thiserror::Error;

use crate::config::ProofScheme;

/// Why an admission segment was rejected before verification.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{0}' is not valid hex")]
    Hex(&'static str),

    #[error("signature must be 65 bytes, got {0}")]
    SignatureLength(usize),

    #[error("signature is malformed: {0}")]
    Signature(#[from] alloy::primitives::SignatureError),

    #[error("signature point must be 48 or 96 bytes, got {0}")]
    PointLength(usize),

    #[error("'signedLocaltunnelMessage' is not a valid G1 point")]
    Point,
}

/// A validated admission proof, one variant per deployment scheme.
#[derive(Debug)]
pub enum AdmissionPayload {
    Ecdsa(EcdsaProof),
    Bls(BlsProof),
}

/// A recoverable secp256k1 signature over the verification message.
#[derive(Debug)]
pub struct EcdsaProof {
    pub signature: Signature,
}

/// A short BLS signature plus the address whose registry key it claims.
///
/// The address is taken as claimed and used only to locate the registry
/// public key; the pairing check still binds the signature to that key.
#[derive(Debug)]
pub struct BlsProof {
    pub signature: blst::min_sig::Signature,
    pub operator_address: Address,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EcdsaWire {
    signed_message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlsWire {
    signed_localtunnel_message: String,
    operator_address: Address,
}

impl AdmissionPayload {
    /// Parse a percent-decoded admission segment for the configured scheme.
    pub fn parse(segment: &str, scheme: ProofScheme) -> Result<Self, PayloadError> {
        match scheme {
            ProofScheme::Ecdsa => {
                let wire: EcdsaWire = serde_json::from_str(segment)?;
                let bytes = hex::decode(&wire.signed_message)
                    .map_err(|_| PayloadError::Hex("signedMessage"))?;
                if bytes.len() != 65 {
                    return Err(PayloadError::SignatureLength(bytes.len()));
                }
                let signature = Signature::try_from(bytes.as_slice())?;
                Ok(AdmissionPayload::Ecdsa(EcdsaProof { signature }))
            }
            ProofScheme::Bls => {
                let wire: BlsWire = serde_json::from_str(segment)?;
                let bytes = hex::decode(&wire.signed_localtunnel_message)
                    .map_err(|_| PayloadError::Hex("signedLocaltunnelMessage"))?;
                if bytes.len() != 48 && bytes.len() != 96 {
                    return Err(PayloadError::PointLength(bytes.len()));
                }
                let signature = blst::min_sig::Signature::from_bytes(&bytes)
                    .map_err(|_| PayloadError::Point)?;
                Ok(AdmissionPayload::Bls(BlsProof {
                    signature,
                    operator_address: wire.operator_address,
                }))
            }
        }
    }
}
