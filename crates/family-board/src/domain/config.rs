//! Service configuration types.
//!
//! [`ServiceConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or from
//! sensible defaults (useful for local development and tests).
//!
//! # Design rationale
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the domain) makes the service easy to embed in tests.
//! The binary entry point is responsible for populating the struct from CLI
//! args or environment variables, including resolving the platform storage
//! directory when `--storage-dir` is not given.

use std::net::SocketAddr;
use std::path::PathBuf;

/// All runtime configuration for the config service.
///
/// Build this struct once at startup (via CLI args or defaults) and pass it to
/// the server runner.
///
/// # Example
///
/// ```rust
/// use family_board::domain::ServiceConfig;
///
/// // Defaults are suitable for local development:
/// let cfg = ServiceConfig::default();
/// assert_eq!(cfg.ws_bind_addr.port(), 8790);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The address and port the WebSocket server binds to.
    ///
    /// `0.0.0.0` accepts connections from any network interface (LAN +
    /// localhost).  Set to `127.0.0.1` to accept only local connections for
    /// additional security in production deployments.
    pub ws_bind_addr: SocketAddr,

    /// Directory holding the persisted configuration record.
    ///
    /// The binary resolves this to the platform config directory (e.g.
    /// `~/.config/family-board` on Linux) when `--storage-dir` is absent.
    /// The default is a relative directory so tests and local development
    /// never touch the real platform location.
    pub storage_dir: PathBuf,
}

impl Default for ServiceConfig {
    /// Returns a `ServiceConfig` suitable for local development without any
    /// external configuration.
    ///
    /// | Field        | Default           |
    /// |--------------|-------------------|
    /// | ws_bind_addr | `0.0.0.0:8790`    |
    /// | storage_dir  | `.family-board`   |
    fn default() -> Self {
        Self {
            // The `.parse().unwrap()` call here is safe because this is a
            // compile-time-known valid socket address string.
            ws_bind_addr: "0.0.0.0:8790".parse().unwrap(),
            storage_dir: PathBuf::from(".family-board"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
