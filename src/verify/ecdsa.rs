//! ECDSA admission verification.
//!
//! The signer address is recovered from the signature over the fixed
//! verification message (EIP-191 personal-message framing), then checked
//! against the operator directory. No pairing or group arithmetic here.

use alloy::primitives::U256;

use crate::registry::OperatorRegistry;
use crate::verify::payload::EcdsaProof;
use crate::verify::{VerificationMessage, VerifyError};

/// Verify an ECDSA proof and return the operator's registry index.
pub(crate) async fn verify(
    proof: &EcdsaProof,
    message: &VerificationMessage,
    registry: &dyn OperatorRegistry,
) -> Result<U256, VerifyError> {
    let recovered = proof
        .signature
        .recover_address_from_msg(message.text().as_bytes())
        .map_err(|_| VerifyError::Recovery)?;

    let operator_id = registry.operator_id_by_address(recovered).await?;
    if operator_id.is_zero() {
        return Err(VerifyError::Unregistered(recovered));
    }

    tracing::debug!(operator = %recovered, operator_id = %operator_id, "Recovered registered signer");
    Ok(operator_id)
}
