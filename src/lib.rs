//! Admission & dispatch gateway for a reverse-tunnel broker.
//!
//! New tunnels are admitted by verifying a cryptographic identity proof
//! against an on-chain operator registry; all subsequent traffic for an
//! established tunnel is dispatched purely by its `Host` subdomain.

pub mod config;
pub mod gateway;
pub mod host;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod session;
pub mod verify;

pub use config::GatewayConfig;
pub use gateway::GatewayServer;
pub use lifecycle::Shutdown;
