//! Family Board config service — entry point.
//!
//! This binary serves the Family Board dashboard's configuration over a
//! JSON-over-WebSocket command protocol.  Browsers running the board frontend
//! connect here to read the stored configuration at startup and to persist
//! edits made in the settings view.
//!
//! # Usage
//!
//! ```text
//! family-board [OPTIONS]
//!
//! Options:
//!   --ws-port     <PORT>   WebSocket listener port [default: 8790]
//!   --ws-bind     <ADDR>   WebSocket bind address [default: 0.0.0.0]
//!   --storage-dir <DIR>    Record storage directory [default: platform config dir]
//! ```
//!
//! # Environment variable overrides
//!
//! The CLI defaults can also be overridden with environment variables.
//! CLI args take precedence when both are present.
//!
//! | Variable                   | Default             | Description               |
//! |----------------------------|---------------------|---------------------------|
//! | `FAMILY_BOARD_WS_PORT`     | `8790`              | WebSocket listener port   |
//! | `FAMILY_BOARD_WS_BIND`     | `0.0.0.0`           | WebSocket bind address    |
//! | `FAMILY_BOARD_STORAGE_DIR` | platform config dir | Record storage directory  |
//!
//! # Architecture overview
//!
//! ```text
//! Board frontend  (JSON over WebSocket)
//!       ↕
//! family-board  ← this process
//!   domain/          command envelopes, ServiceConfig
//!   application/     command router, config gateway
//!   infrastructure/
//!     ws_server/     accept WebSocket connections
//!     record_store/  JSON record persistence
//!       ↕
//! <storage-dir>/family_board.config
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use family_board::application::config_gateway::{STORAGE_KEY, STORAGE_VERSION};
use family_board::application::{register_commands, CommandRouter};
use family_board::domain::ServiceConfig;
use family_board::infrastructure::{platform_storage_dir, run_server, RecordStore};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Family Board config service.
///
/// Serves the dashboard configuration record over WebSocket commands.
///
/// The `#[derive(Parser)]` macro from `clap` generates the argument parser
/// automatically from the struct fields and their `#[arg(...)]` attributes.
#[derive(Debug, Parser)]
#[command(
    name = "family-board",
    about = "WebSocket configuration service for the Family Board dashboard",
    version
)]
struct Cli {
    /// TCP port for the WebSocket server to listen on.
    ///
    /// The board frontend connects to this port via WebSocket (ws://host:PORT).
    #[arg(long, default_value_t = 8790, env = "FAMILY_BOARD_WS_PORT")]
    ws_port: u16,

    /// IP address to bind the WebSocket server to.
    ///
    /// Use `0.0.0.0` to accept connections from any network interface (LAN +
    /// localhost), or `127.0.0.1` to accept only local connections.
    #[arg(long, default_value = "0.0.0.0", env = "FAMILY_BOARD_WS_BIND")]
    ws_bind: String,

    /// Directory holding the persisted configuration record.
    ///
    /// Defaults to the platform config directory, e.g.
    /// `~/.config/family-board` on Linux.
    #[arg(long, env = "FAMILY_BOARD_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServiceConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--ws-bind` is not a valid IP address, or if no
    /// `--storage-dir` was given and the platform storage directory cannot
    /// be determined from the environment.
    fn into_service_config(self) -> anyhow::Result<ServiceConfig> {
        let ws_bind_addr: SocketAddr = format!("{}:{}", self.ws_bind, self.ws_port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid WebSocket bind address: '{}:{}'",
                    self.ws_bind, self.ws_port
                )
            })?;

        let storage_dir = match self.storage_dir {
            Some(dir) => dir,
            None => platform_storage_dir().context(
                "could not determine platform storage directory; pass --storage-dir",
            )?,
        };

        Ok(ServiceConfig {
            ws_bind_addr,
            storage_dir,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. `tracing_subscriber` is initialised to format log output.  The log
///    level is controlled by the `RUST_LOG` environment variable (e.g.,
///    `RUST_LOG=debug`).
/// 2. CLI arguments are parsed with `clap` into a [`Cli`] struct.
/// 3. A [`ServiceConfig`] is constructed from the CLI arguments.
/// 4. The record store is created and the config gateway's command handlers
///    are registered with the router.
/// 5. A Ctrl+C handler is spawned; it clears a shared `AtomicBool` when the
///    user interrupts the process.
/// 6. [`run_server`] binds the WebSocket port and accepts browser
///    connections until the shutdown flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `EnvFilter::try_from_default_env()` reads the `RUST_LOG` environment
    // variable.  If it is absent or invalid, we fall back to `info` level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.into_service_config()?;

    info!(
        "family-board config service starting — ws={}, storage={}",
        config.ws_bind_addr,
        config.storage_dir.display()
    );

    // One store instance for the process; it holds no record data in memory,
    // only the record's identity and location.
    let store = Arc::new(RecordStore::new(
        config.storage_dir.clone(),
        STORAGE_KEY,
        STORAGE_VERSION,
    ));

    let mut router = CommandRouter::new();
    register_commands(&mut router, store);
    info!("registered commands: {:?}", router.registered_types());
    let router = Arc::new(router);

    // `AtomicBool` with `Relaxed` ordering is enough here: the accept loop
    // only needs the cleared flag to eventually propagate.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    // Spawn a task that listens for Ctrl+C (SIGINT on Unix).  The accept loop
    // in `run_server` checks the flag every 200 ms and exits cleanly.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, router, running).await?;

    info!("family-board config service stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_produce_correct_ws_port() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["family-board"]);

        // Assert
        assert_eq!(cli.ws_port, 8790);
    }

    #[test]
    fn test_cli_defaults_produce_correct_ws_bind() {
        let cli = Cli::parse_from(["family-board"]);
        assert_eq!(cli.ws_bind, "0.0.0.0");
    }

    #[test]
    fn test_cli_default_storage_dir_is_unset() {
        let cli = Cli::parse_from(["family-board"]);
        assert_eq!(cli.storage_dir, None);
    }

    #[test]
    fn test_cli_ws_port_override() {
        let cli = Cli::parse_from(["family-board", "--ws-port", "9999"]);
        assert_eq!(cli.ws_port, 9999);
    }

    #[test]
    fn test_cli_storage_dir_override() {
        let cli = Cli::parse_from(["family-board", "--storage-dir", "/tmp/board"]);
        assert_eq!(cli.storage_dir, Some(PathBuf::from("/tmp/board")));
    }

    #[test]
    fn test_into_service_config_custom_ws_port() {
        let cli = Cli::parse_from([
            "family-board",
            "--ws-port",
            "8080",
            "--storage-dir",
            "/tmp/board",
        ]);
        let config = cli.into_service_config().unwrap();
        assert_eq!(config.ws_bind_addr.port(), 8080);
    }

    #[test]
    fn test_into_service_config_uses_given_storage_dir() {
        let cli = Cli::parse_from(["family-board", "--storage-dir", "/srv/board-data"]);
        let config = cli.into_service_config().unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/srv/board-data"));
    }

    #[test]
    fn test_into_service_config_invalid_ws_bind_returns_error() {
        // Arrange: provide an invalid IP address string
        let cli = Cli {
            ws_port: 8790,
            ws_bind: "not.an.ip".to_string(),
            storage_dir: Some(PathBuf::from("/tmp/board")),
        };

        // Act
        let result = cli.into_service_config();

        // Assert: must return an error, not panic
        assert!(result.is_err());
    }

    #[test]
    fn test_into_service_config_loopback_bind() {
        let cli = Cli::parse_from([
            "family-board",
            "--ws-bind",
            "127.0.0.1",
            "--storage-dir",
            "/tmp/board",
        ]);
        let config = cli.into_service_config().unwrap();
        assert_eq!(config.ws_bind_addr.ip().to_string(), "127.0.0.1");
    }
}
