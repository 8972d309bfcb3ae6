//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admission gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Root-domain and URL-building settings.
    pub domains: DomainConfig,

    /// Admission settings (proof scheme, verification message).
    pub admission: AdmissionConfig,

    /// On-chain operator registry settings.
    pub registry: RegistryConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Root-domain settings used by the host resolver and response URL builder.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Root domains this gateway serves tunnels under.
    ///
    /// Empty means "any": every hostname with at least three labels is
    /// treated as a tunnel host.
    pub root_domains: Vec<String>,

    /// Scheme used when building tunnel URLs returned to clients.
    pub scheme: UrlScheme,

    /// Optional landing page; root-domain requests that are neither status
    /// nor admission requests redirect here when set, 404 otherwise.
    pub landing_url: Option<String>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            root_domains: Vec::new(),
            scheme: UrlScheme::Http,
            landing_url: None,
        }
    }
}

/// Scheme for tunnel URLs returned to admitted operators. Only affects the
/// URL string; TLS termination happens upstream of this gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UrlScheme {
    #[default]
    Http,
    Https,
}

impl std::fmt::Display for UrlScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlScheme::Http => write!(f, "http"),
            UrlScheme::Https => write!(f, "https"),
        }
    }
}

/// Identity-proof scheme accepted by this deployment. Exactly one is active;
/// the choice is made here, never negotiated per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProofScheme {
    /// Recoverable secp256k1 signatures over the verification message.
    #[default]
    Ecdsa,
    /// Short BLS12-381 signatures checked against a registry public key.
    Bls,
}

/// Admission settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdmissionConfig {
    /// Which proof scheme this deployment verifies.
    pub proof_scheme: ProofScheme,

    /// The fixed message operators sign to prove their identity.
    pub verification_message: String,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            proof_scheme: ProofScheme::Ecdsa,
            verification_message: String::new(),
        }
    }
}

/// Operator registry (on-chain) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Address of the contract exposing `operatorsIdsByAddress`.
    pub operators_contract: String,

    /// Address of the contract exposing `getOperatorBLSPubKey`.
    /// Required when `proof_scheme = "bls"`.
    pub pubkeys_contract: Option<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            operators_contract: String::new(),
            pubkeys_contract: None,
            rpc_timeout_secs: 10,
        }
    }
}

/// Timeout configuration for inbound request handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time budget for an admission/status request in seconds.
    /// Forwarded tunnel traffic is exempt (long-lived streams).
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.domains.root_domains.is_empty());
        assert_eq!(config.domains.scheme, UrlScheme::Http);
        assert_eq!(config.admission.proof_scheme, ProofScheme::Ecdsa);
        assert_eq!(config.registry.rpc_timeout_secs, 10);
    }

    #[test]
    fn test_scheme_parsing() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [domains]
            scheme = "https"

            [admission]
            proof_scheme = "bls"
            "#,
        )
        .unwrap();
        assert_eq!(config.domains.scheme, UrlScheme::Https);
        assert_eq!(config.admission.proof_scheme, ProofScheme::Bls);
        assert_eq!(config.domains.scheme.to_string(), "https");
    }
}
