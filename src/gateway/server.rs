//! Gateway HTTP server setup.
//!
//! # Responsibilities
//! - Build the outer catch-all router (every request enters dispatch)
//! - Build the root-domain application (status, admission, landing)
//! - Wire up middleware (request ID, tracing, admission timeout)
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - The admission application carries a request timeout so a slow registry
//!   can never pin a connection; forwarded tunnel traffic carries none
//!   (long-lived streams and upgrades)
//! - All state is built once at startup; no ambient globals

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::gateway::admission::{self, RootState};
use crate::gateway::{dispatch, status};
use crate::host::HostResolver;
use crate::session::SessionManager;
use crate::verify::IdentityVerifier;

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<HostResolver>,
    pub sessions: Arc<dyn SessionManager>,
    /// Root-domain sub-application, called when no tunnel id resolves.
    pub root: Router,
}

/// HTTP server for the admission gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new gateway server from startup-built components.
    pub fn new(
        config: GatewayConfig,
        verifier: Arc<IdentityVerifier>,
        sessions: Arc<dyn SessionManager>,
    ) -> Self {
        let resolver = Arc::new(HostResolver::new(&config.domains.root_domains));

        let root_state = RootState {
            verifier,
            sessions: sessions.clone(),
            scheme: config.domains.scheme,
            landing_url: config.domains.landing_url.clone(),
        };
        let root = Self::build_root_app(&config, root_state);

        let state = AppState {
            resolver,
            sessions,
            root,
        };
        let router = Self::build_router(state);

        Self { router, config }
    }

    /// Root-domain application: status endpoints, the single-segment
    /// admission route, and the landing fallback for every other shape.
    fn build_root_app(config: &GatewayConfig, state: RootState) -> Router {
        Router::new()
            .route("/api/status", get(status::api_status))
            .route("/api/tunnels/{id}/status", get(status::tunnel_status))
            .route("/{proof}", any(admission::admit))
            .fallback(admission::landing)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
    }

    /// Outer router: one catch-all dispatch handler for all hosts.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch::dispatch))
            .route("/", any(dispatch::dispatch))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProofScheme;
    use crate::session::{
        InMemorySessionManager, SessionStats, TunnelHandler, TunnelHandlerFactory,
    };
    use crate::verify::testutil::FakeRegistry;
    use crate::verify::VerificationMessage;
    use alloy::primitives::U256;
    use alloy::signers::local::PrivateKeySigner;
    use alloy::signers::SignerSync;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::{header, StatusCode};
    use axum::response::{IntoResponse, Response};
    use tower::ServiceExt;

    const MESSAGE: &str = "Operator admission message";

    struct EchoHandler;

    #[async_trait]
    impl TunnelHandler for EchoHandler {
        async fn handle_request(&self, _request: Request) -> Response {
            (StatusCode::OK, "hello from tunnel").into_response()
        }

        fn stats(&self) -> SessionStats {
            SessionStats {
                connected_sockets: 2,
                remote_ip: "10.0.0.7".to_string(),
            }
        }
    }

    fn echo_factory() -> Box<dyn TunnelHandlerFactory> {
        Box::new(|_: &str| Arc::new(EchoHandler) as Arc<dyn TunnelHandler>)
    }

    fn gateway() -> (Router, Arc<InMemorySessionManager>, PrivateKeySigner) {
        let signer = PrivateKeySigner::random();
        let registry = FakeRegistry::with_operator(signer.address(), U256::from(7));
        let verifier = Arc::new(IdentityVerifier::new(
            ProofScheme::Ecdsa,
            VerificationMessage::new(MESSAGE),
            Arc::new(registry),
        ));

        let sessions = Arc::new(InMemorySessionManager::with_factory(echo_factory()));

        let mut config = GatewayConfig::default();
        config.domains.root_domains = vec!["broker.test".to_string()];

        let server = GatewayServer::new(config, verifier, sessions.clone());
        (server.router(), sessions, signer)
    }

    fn encode_segment(raw: &str) -> String {
        raw.bytes()
            .map(|b| match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                _ => format!("%{:02X}", b),
            })
            .collect()
    }

    fn valid_segment(signer: &PrivateKeySigner) -> String {
        let signature = signer.sign_message_sync(MESSAGE.as_bytes()).unwrap();
        let json = format!(
            r#"{{"signedMessage": "0x{}"}}"#,
            alloy::hex::encode(signature.as_bytes())
        );
        encode_segment(&json)
    }

    async fn send(router: &Router, uri: &str, host: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        let request = builder.body(Body::empty()).unwrap();
        router.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_host_is_400() {
        let (router, _, _) = gateway();
        let response = send(&router, "/", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_tunnel_host_is_404() {
        let (router, _, _) = gateway();
        let response = send(&router, "/", Some("tunnel.broker.test")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_live_session_is_forwarded() {
        let (router, sessions, _) = gateway();
        sessions.create_session("mytunnel").await.unwrap();

        let response = send(&router, "/anything", Some("mytunnel.broker.test")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello from tunnel");
    }

    #[tokio::test]
    async fn test_admission_success_returns_id_and_url() {
        let (router, sessions, signer) = gateway();
        let uri = format!("/{}", valid_segment(&signer));

        let response = send(&router, &uri, Some("broker.test")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let id = body["id"].as_str().unwrap();
        assert_eq!(
            body["url"].as_str().unwrap(),
            format!("http://{}.broker.test", id)
        );
        assert_eq!(sessions.session_count(), 1);
        assert!(sessions.lookup_session(id).await.is_some());
    }

    #[tokio::test]
    async fn test_two_admissions_mint_distinct_sessions() {
        let (router, sessions, signer) = gateway();
        let uri = format!("/{}", valid_segment(&signer));

        let first = body_json(send(&router, &uri, Some("broker.test")).await).await;
        let second = body_json(send(&router, &uri, Some("broker.test")).await).await;

        assert_ne!(first["id"], second["id"]);
        assert_eq!(sessions.session_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_proof_answers_201() {
        let (router, sessions, _) = gateway();
        let other = PrivateKeySigner::random(); // not registered
        let uri = format!("/{}", valid_segment(&other));

        let response = send(&router, &uri, Some("broker.test")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(
            body["message"].as_str().unwrap(),
            "Could not verify K3 Registration Message"
        );
        assert_eq!(sessions.session_count(), 0);
    }

    #[tokio::test]
    async fn test_garbage_segment_answers_201() {
        let (router, _, _) = gateway();
        let response = send(&router, "/not-a-proof", Some("broker.test")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_multi_segment_path_falls_through() {
        let (router, _, _) = gateway();
        let response = send(&router, "/foo/bar", Some("broker.test")).await;
        // Not an admission attempt: no landing configured, so 404, not 201
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_status_counts_tunnels() {
        let (router, sessions, _) = gateway();
        sessions.create_session("one").await.unwrap();
        sessions.create_session("two").await.unwrap();

        let response = send(&router, "/api/status", Some("broker.test")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["tunnels"], 2);
        assert!(body["mem"].is_object());
    }

    #[tokio::test]
    async fn test_tunnel_status_endpoint() {
        let (router, sessions, _) = gateway();
        sessions.create_session("mytunnel").await.unwrap();

        let response = send(&router, "/api/tunnels/mytunnel/status", Some("broker.test")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["connected_sockets"], 2);
        assert_eq!(body["remote_ip"], "10.0.0.7");

        let missing = send(&router, "/api/tunnels/ghost/status", Some("broker.test")).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_churn_is_visible_immediately() {
        let (router, sessions, _) = gateway();
        sessions.create_session("gone-soon").await.unwrap();

        let before = send(&router, "/", Some("gone-soon.broker.test")).await;
        assert_eq!(before.status(), StatusCode::OK);

        sessions.remove_session("gone-soon");
        let after = send(&router, "/", Some("gone-soon.broker.test")).await;
        assert_eq!(after.status(), StatusCode::NOT_FOUND);
    }
}
