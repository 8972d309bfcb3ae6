//! On-chain call interfaces for the operator registries.
//!
//! Two read-only entry points are consumed:
//! - the operator directory, mapping an address to its registration index
//!   (zero = not registered);
//! - the key registry, mapping an index to a BLS public key stored as four
//!   coordinates of an uncompressed group-2 point, 48 bytes each.

use alloy::sol;

sol! {
    /// Operator directory lookup. Index zero is the "not registered" sentinel.
    function operatorsIdsByAddress(address operator) external view returns (uint256 operatorId);

    /// BLS public key by operator index: x.c1, x.c0, y.c1, y.c0.
    function getOperatorBLSPubKey(uint256 operatorId) external view returns (bytes[4] pubKey);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn test_calldata_carries_selector_and_args() {
        let call = operatorsIdsByAddressCall {
            operator: Address::repeat_byte(0x11),
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[..4], operatorsIdsByAddressCall::SELECTOR);

        let decoded = operatorsIdsByAddressCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.operator, Address::repeat_byte(0x11));
    }

    #[test]
    fn test_pubkey_call_roundtrip() {
        let call = getOperatorBLSPubKeyCall {
            operatorId: U256::from(7),
        };
        let data = call.abi_encode();
        let decoded = getOperatorBLSPubKeyCall::abi_decode(&data).unwrap();
        assert_eq!(decoded.operatorId, U256::from(7));
    }
}
