//! Host resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request Host header
//!     → resolver.rs (suffix match against root domains)
//!     → Some(identifier): dispatch to that tunnel session
//!     → None: hand off to the root application (admission/status)
//! ```
//!
//! # Design Decisions
//! - Resolution is deterministic and side-effect free
//! - A missing Host header is handled by the dispatcher (400), never here
//! - No per-request allocation of the root list; it is compiled at startup

pub mod resolver;

pub use resolver::HostResolver;
