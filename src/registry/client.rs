//! Registry RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint(s)
//! - Perform read-only registry calls (operator index, BLS public key)
//! - Handle timeouts and network errors gracefully
//! - Provide health check for registry connectivity
//!
//! The client is built once at startup and shared read-only; individual
//! verification calls carry no mutable state of their own.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::observability::metrics;
use crate::registry::contracts::{getOperatorBLSPubKeyCall, operatorsIdsByAddressCall};
use crate::registry::types::{RegistryConfig, RegistryError, RegistryResult};
use crate::registry::OperatorRegistry;

/// Registry RPC client wrapper with failover support.
#[derive(Clone)]
pub struct RegistryClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Contract exposing `operatorsIdsByAddress`.
    operators_contract: Address,
    /// Contract exposing `getOperatorBLSPubKey`, when configured.
    pubkeys_contract: Option<Address>,
    /// Request timeout duration.
    timeout_duration: Duration,
    /// Configured timeout in seconds, kept for error reporting.
    timeout_secs: u64,
}

impl RegistryClient {
    /// Create a new registry client from configuration.
    ///
    /// Fails on unparsable addresses or URLs; an unreachable endpoint is
    /// logged but does not fail construction (graceful degradation; every
    /// later read fails closed on its own).
    pub async fn new(config: &RegistryConfig) -> RegistryResult<Self> {
        let operators_contract: Address = config
            .operators_contract
            .parse()
            .map_err(|_| RegistryError::InvalidAddress(config.operators_contract.clone()))?;

        let pubkeys_contract = match &config.pubkeys_contract {
            Some(addr) => Some(
                addr.parse::<Address>()
                    .map_err(|_| RegistryError::InvalidAddress(addr.clone()))?,
            ),
            None => None,
        };

        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            RegistryError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url))
            as Arc<dyn Provider + Send + Sync>);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url))
                    as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let client = Self {
            providers,
            operators_contract,
            pubkeys_contract,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            timeout_secs: config.rpc_timeout_secs,
        };

        match client.get_block_number().await {
            Ok(block) => {
                tracing::info!(
                    rpc_url = %config.rpc_url,
                    block = block,
                    "Registry client initialized"
                );
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Registry client initialized but endpoint is unreachable"
                );
            }
        }

        Ok(client)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> RegistryResult<u64> {
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_block_number();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => tracing::warn!(provider_idx = i, error = %e, "RPC error"),
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(RegistryError::Rpc(
            "All providers failed to get block number".to_string(),
        ))
    }

    /// Execute a read-only contract call, trying each provider in turn.
    async fn eth_call(&self, to: Address, calldata: Vec<u8>) -> RegistryResult<Bytes> {
        let input = Bytes::from(calldata);
        let mut timed_out = false;

        for (i, provider) in self.providers.iter().enumerate() {
            let tx = TransactionRequest::default()
                .with_to(to)
                .with_input(input.clone());
            match timeout(self.timeout_duration, provider.call(tx)).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    timed_out = true;
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }

        if timed_out {
            Err(RegistryError::Timeout(self.timeout_secs))
        } else {
            Err(RegistryError::Rpc("All RPC providers failed".to_string()))
        }
    }

    /// Check if the registry endpoint is reachable and healthy.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_registry_health(healthy);
        healthy
    }
}

#[async_trait]
impl OperatorRegistry for RegistryClient {
    async fn operator_id_by_address(&self, operator: Address) -> RegistryResult<U256> {
        let call = operatorsIdsByAddressCall { operator };
        let out = self.eth_call(self.operators_contract, call.abi_encode()).await?;
        U256::abi_decode(&out).map_err(|e| RegistryError::Decode(e.to_string()))
    }

    async fn operator_bls_pubkey(&self, operator_id: U256) -> RegistryResult<[Bytes; 4]> {
        let to = self.pubkeys_contract.ok_or_else(|| {
            RegistryError::NotAvailable("pubkeys contract not configured".to_string())
        })?;
        let call = getOperatorBLSPubKeyCall {
            operatorId: operator_id,
        };
        let out = self.eth_call(to, call.abi_encode()).await?;
        <[Bytes; 4]>::abi_decode(&out).map_err(|e| RegistryError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("operators_contract", &self.operators_contract)
            .field("pubkeys_contract", &self.pubkeys_contract)
            .field("providers", &self.providers.len())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
