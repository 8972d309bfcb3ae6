//! Tunnel-identifier extraction from hostnames.
//!
//! # Responsibilities
//! - Match hostnames against the configured root domains (case-insensitive)
//! - Extract the leftmost label as the tunnel identifier
//! - Report "no identifier" for root-domain and unrelated hosts
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no allocation beyond the returned id
//! - Port suffixes are stripped before matching (clients send `Host: h:port`)
//! - Empty allowlist means "any": a hostname resolves whenever at least two
//!   labels remain after the identifier

/// Resolves the target tunnel identifier from a request's hostname.
#[derive(Debug, Clone)]
pub struct HostResolver {
    /// Lowercased root domains. Empty = accept any registrable domain.
    roots: Vec<String>,
}

impl HostResolver {
    /// Create a resolver for the given root-domain allowlist.
    pub fn new(root_domains: &[String]) -> Self {
        Self {
            roots: root_domains.iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    /// Extract the tunnel identifier from `hostname`, if any.
    ///
    /// Returns `Some(id)` when `hostname` is `<id>.<root>` for a configured
    /// root domain (or, with no allowlist, for any two-label remainder).
    /// Returns `None` when the request targets a root domain itself or an
    /// unrelated domain; the caller decides between admission and rejection.
    pub fn resolve(&self, hostname: &str) -> Option<String> {
        let host = strip_port(hostname).to_lowercase();

        let (label, rest) = host.split_once('.')?;
        if label.is_empty() || rest.is_empty() {
            return None;
        }

        let matches_root = if self.roots.is_empty() {
            // "any" mode: the remainder must still look like a domain
            rest.contains('.')
        } else {
            self.roots.iter().any(|root| root == rest)
        };

        if matches_root {
            Some(label.to_string())
        } else {
            None
        }
    }
}

/// Drop a `:port` suffix from a Host header value.
fn strip_port(hostname: &str) -> &str {
    match hostname.rsplit_once(':') {
        // IPv6 literals contain colons but are bracketed; only treat the
        // suffix as a port when it is purely numeric.
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => hostname,
    }
}
