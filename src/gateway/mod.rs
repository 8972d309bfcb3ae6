//! Gateway HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request or upgrade
//!     → server.rs (Axum setup, middleware)
//!     → dispatch.rs (Host → tunnel session | root application)
//!     → admission.rs (proof verification, session allocation)
//!     → status.rs (/api/status, /api/tunnels/{id}/status)
//! ```

pub mod admission;
pub mod dispatch;
pub mod server;
pub mod status;

pub use admission::REJECTION_MESSAGE;
pub use server::{AppState, GatewayServer};
