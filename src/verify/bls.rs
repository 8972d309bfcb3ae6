//! BLS admission verification (BLS12-381, min-sig variant).
//!
//! Signatures are group-1 points, public keys group-2 points fetched from
//! the on-chain key registry as four 48-byte coordinates. The verification
//! message hash is mapped to the curve with a tag specific to this
//! protocol, so signatures cannot be replayed from other BLS contexts.

use alloy::primitives::{Bytes, U256};
use blst::min_sig::PublicKey;
use blst::BLST_ERROR;

use crate::registry::OperatorRegistry;
use crate::verify::payload::BlsProof;
use crate::verify::{VerificationMessage, VerifyError};

/// Domain separation tag for operator tunnel admission signatures.
pub const OPERATOR_TUNNEL_DST: &[u8] = b"TUNNEL_OPERATOR_BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_";

/// Coordinate width of an uncompressed group-2 point element.
const COORD_LEN: usize = 48;

/// Verify a BLS proof and return the operator's registry index.
///
/// The claimed operator address selects the registry key; the pairing
/// equation between (signature, generator) and (message point, public key)
/// decides admission.
pub(crate) async fn verify(
    proof: &BlsProof,
    message: &VerificationMessage,
    registry: &dyn OperatorRegistry,
) -> Result<U256, VerifyError> {
    let operator_id = registry
        .operator_id_by_address(proof.operator_address)
        .await?;
    if operator_id.is_zero() {
        return Err(VerifyError::Unregistered(proof.operator_address));
    }

    let coords = registry.operator_bls_pubkey(operator_id).await?;
    let public_key = decode_public_key(&coords)?;

    let result = proof.signature.verify(
        true,
        message.hash().as_slice(),
        OPERATOR_TUNNEL_DST,
        &[],
        &public_key,
        true,
    );
    if result != BLST_ERROR::BLST_SUCCESS {
        return Err(VerifyError::PairingMismatch);
    }

    tracing::debug!(operator = %proof.operator_address, operator_id = %operator_id, "Pairing check passed");
    Ok(operator_id)
}

/// Reassemble the four registry coordinates into an uncompressed group-2
/// point and parse it. Any wrong-sized element is a failure.
fn decode_public_key(coords: &[Bytes; 4]) -> Result<PublicKey, VerifyError> {
    let mut bytes = [0u8; 4 * COORD_LEN];
    for (i, coord) in coords.iter().enumerate() {
        if coord.len() != COORD_LEN {
            return Err(VerifyError::MalformedKey);
        }
        bytes[i * COORD_LEN..(i + 1) * COORD_LEN].copy_from_slice(coord);
    }
    PublicKey::from_bytes(&bytes).map_err(|_| VerifyError::MalformedKey)
}
