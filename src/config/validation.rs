//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check contract addresses parse and required ones are present
//! - Validate value ranges (timeouts > 0, addresses bindable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system; failures are fatal

use std::net::SocketAddr;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, ProofScheme};

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("admission.verification_message must not be empty")]
    EmptyVerificationMessage,

    #[error("registry.rpc_url '{0}' is not a valid URL")]
    RpcUrl(String),

    #[error("registry.operators_contract '{0}' is not a valid address")]
    OperatorsContract(String),

    #[error("registry.pubkeys_contract is required when proof_scheme is 'bls'")]
    MissingPubkeysContract,

    #[error("registry.pubkeys_contract '{0}' is not a valid address")]
    PubkeysContract(String),

    #[error("registry.rpc_timeout_secs must be greater than zero")]
    ZeroRpcTimeout,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("domains.root_domains entry '{0}' is invalid")]
    RootDomain(String),

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.admission.verification_message.trim().is_empty() {
        errors.push(ValidationError::EmptyVerificationMessage);
    }

    if url::Url::parse(&config.registry.rpc_url).is_err() {
        errors.push(ValidationError::RpcUrl(config.registry.rpc_url.clone()));
    }

    if config
        .registry
        .operators_contract
        .parse::<Address>()
        .is_err()
    {
        errors.push(ValidationError::OperatorsContract(
            config.registry.operators_contract.clone(),
        ));
    }

    if config.admission.proof_scheme == ProofScheme::Bls {
        match &config.registry.pubkeys_contract {
            None => errors.push(ValidationError::MissingPubkeysContract),
            Some(addr) if addr.parse::<Address>().is_err() => {
                errors.push(ValidationError::PubkeysContract(addr.clone()));
            }
            Some(_) => {}
        }
    }

    if config.registry.rpc_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRpcTimeout);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    for domain in &config.domains.root_domains {
        let d = domain.trim();
        if d.is_empty() || d.starts_with('.') || d.ends_with('.') || !d.contains('.') {
            errors.push(ValidationError::RootDomain(domain.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
