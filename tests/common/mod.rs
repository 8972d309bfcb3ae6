//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tunnel_gateway::config::GatewayConfig;
use tunnel_gateway::gateway::GatewayServer;
use tunnel_gateway::lifecycle::Shutdown;
use tunnel_gateway::registry::contracts::{getOperatorBLSPubKeyCall, operatorsIdsByAddressCall};
use tunnel_gateway::registry::RegistryClient;
use tunnel_gateway::session::InMemorySessionManager;
use tunnel_gateway::verify::{IdentityVerifier, VerificationMessage};

pub const TEST_MESSAGE: &str = "Operator admission message";
pub const ROOT_DOMAIN: &str = "broker.test";

/// A mock operator registry speaking just enough JSON-RPC for the gateway:
/// `eth_blockNumber` plus `eth_call` for the two registry reads, matched by
/// ABI selector.
#[derive(Clone, Default)]
pub struct MockRegistry {
    ids: Arc<DashMap<Address, U256>>,
    keys: Arc<DashMap<U256, [Bytes; 4]>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn register_operator(&self, operator: Address, id: U256) {
        self.ids.insert(operator, id);
    }

    #[allow(dead_code)]
    pub fn register_pubkey(&self, id: U256, coords: [Bytes; 4]) {
        self.keys.insert(id, coords);
    }

    /// Serve the mock on an ephemeral port and return its address.
    pub async fn spawn(self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/", post(handle_rpc)).with_state(self);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        addr
    }
}

async fn handle_rpc(State(registry): State<MockRegistry>, Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default();

    let result = match method {
        "eth_blockNumber" => json!("0x1"),
        "eth_call" => {
            let params = &req["params"][0];
            let data_hex = params
                .get("input")
                .or_else(|| params.get("data"))
                .and_then(|v| v.as_str())
                .unwrap_or("0x");
            let data = alloy::hex::decode(data_hex).unwrap_or_default();
            json!(format!("0x{}", alloy::hex::encode(answer_call(&registry, &data))))
        }
        _ => json!("0x1"),
    };

    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

fn answer_call(registry: &MockRegistry, data: &[u8]) -> Vec<u8> {
    if data.len() < 4 {
        return Vec::new();
    }

    if data[..4] == operatorsIdsByAddressCall::SELECTOR {
        let call = operatorsIdsByAddressCall::abi_decode(data).unwrap();
        let operator_id = registry
            .ids
            .get(&call.operator)
            .map(|entry| *entry.value())
            .unwrap_or(U256::ZERO);
        return operator_id.abi_encode();
    }

    if data[..4] == getOperatorBLSPubKeyCall::SELECTOR {
        let call = getOperatorBLSPubKeyCall::abi_decode(data).unwrap();
        let key = registry
            .keys
            .get(&call.operatorId)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| std::array::from_fn(|_| Bytes::new()));
        return key.abi_encode();
    }

    Vec::new()
}

/// A running gateway wired to a (mock) registry endpoint.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub sessions: Arc<InMemorySessionManager>,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Baseline configuration for integration tests.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.domains.root_domains = vec![ROOT_DOMAIN.to_string()];
    config.admission.verification_message = TEST_MESSAGE.to_string();
    config.registry.operators_contract =
        "0x0000000000000000000000000000000000000001".to_string();
    config.registry.pubkeys_contract =
        Some("0x0000000000000000000000000000000000000002".to_string());
    config.registry.rpc_timeout_secs = 2;
    config
}

/// Spawn a gateway on an ephemeral port against the given RPC endpoint.
pub async fn start_gateway(mut config: GatewayConfig, rpc_addr: SocketAddr) -> TestGateway {
    config.registry.rpc_url = format!("http://{}", rpc_addr);

    let registry = RegistryClient::new(&config.registry).await.unwrap();
    let message = VerificationMessage::new(config.admission.verification_message.as_str());
    let verifier = Arc::new(IdentityVerifier::new(
        config.admission.proof_scheme,
        message,
        Arc::new(registry),
    ));
    let sessions = Arc::new(InMemorySessionManager::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = GatewayServer::new(config, verifier, sessions.clone());

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestGateway {
        addr,
        sessions,
        shutdown,
    }
}

/// Percent-encode a string for embedding as a single URL path segment.
pub fn urlencode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// A reqwest client that does not reuse connections between tests.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
