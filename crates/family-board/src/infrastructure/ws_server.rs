//! WebSocket server: accept loop and per-session command handling.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections from browsers.
//! 3. Upgrading each connection to a WebSocket session.
//! 4. Reading JSON text frames, dispatching them through the command router,
//!    and writing the result envelope back on the same connection.
//! 5. Gracefully shutting down when the `running` flag is cleared.
//!
//! # Scalability
//!
//! Each browser session runs in its own Tokio task, so one slow client never
//! blocks the others.  Within a session, commands are handled in arrival
//! order, but a command that suspends on storage I/O yields the thread to
//! other sessions — concurrent get/set commands against the same record
//! interleave freely, with last-write-wins semantics at the store.
//!
//! # Portability
//!
//! Uses only `tokio::net` APIs which are portable across Windows, Linux, and
//! macOS.  Shutdown is triggered by a shared `AtomicBool` that is set by a
//! Ctrl+C signal handler (see `main.rs`), which is also cross-platform.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_async,
    tungstenite::{Error as WsError, Message as WsMessage},
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::CommandRouter;
use crate::domain::ServiceConfig;

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the main WebSocket accept loop until `running` is set to `false`.
///
/// Binds a TCP listener on `config.ws_bind_addr` and accepts incoming
/// connections in a loop.  Each accepted connection is handed off to a
/// dedicated Tokio task.
///
/// # Parameters
///
/// - `config`  – Service configuration (bind address).
/// - `router`  – Shared command router with all handlers registered.
/// - `running` – Shared flag; the loop exits when this is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use or the process lacks permission to bind).
pub async fn run_server(
    config: ServiceConfig,
    router: Arc<CommandRouter>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.ws_bind_addr)
        .await
        .with_context(|| {
            format!(
                "failed to bind WebSocket listener on {}",
                config.ws_bind_addr
            )
        })?;

    info!("config service listening on {}", config.ws_bind_addr);

    loop {
        // Check the shutdown flag before each accept attempt.
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Use a short timeout on `accept()` so the loop can periodically check
        // the `running` flag even when no browsers are connecting.
        let accept_result = timeout(Duration::from_millis(200), listener.accept()).await;

        match accept_result {
            Ok(Ok((stream, peer_addr))) => {
                info!("new browser connection from {peer_addr}");
                let router = Arc::clone(&router);

                // Spawn a dedicated Tokio task for this session so the accept
                // loop is never delayed by session I/O.
                tokio::spawn(async move {
                    handle_session(stream, peer_addr, router).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error (e.g., too many open file descriptors).
                // Log it and continue rather than crashing the whole service.
                error!("accept error: {e}");
            }
            Err(_) => {
                // Timeout — no new connection in the last 200 ms.
                // Loop back to check the `running` flag.
            }
        }
    }

    Ok(())
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// Top-level handler for a single browser WebSocket session.
///
/// Wraps [`run_session`] and logs the outcome.  Using a separate outer/inner
/// function pair lets us use `?` for clean error propagation inside
/// `run_session` while logging errors here.
async fn handle_session(raw_stream: TcpStream, peer_addr: SocketAddr, router: Arc<CommandRouter>) {
    // A UUID rather than the peer address, so two tabs on the same machine
    // are distinguishable in the logs.
    let session_id = Uuid::new_v4();

    match run_session(raw_stream, session_id, router).await {
        Ok(()) => info!("session {session_id} ({peer_addr}) closed normally"),
        Err(e) => warn!("session {session_id} ({peer_addr}) closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of a single browser WebSocket session.
///
/// Completes the WebSocket upgrade handshake, then loops: read a text frame,
/// dispatch it through the router, send the result envelope back.  Commands
/// that fail produce an error envelope, not a session teardown — one bad
/// frame never disconnects the browser.
///
/// # Errors
///
/// Returns an error if the WebSocket handshake fails.
async fn run_session(
    raw_stream: TcpStream,
    session_id: Uuid,
    router: Arc<CommandRouter>,
) -> anyhow::Result<()> {
    // `accept_async` reads the browser's HTTP Upgrade request and sends the
    // "101 Switching Protocols" response.  After this, `ws_stream` speaks
    // WebSocket frames instead of raw HTTP.
    let mut ws_stream = accept_async(raw_stream)
        .await
        .with_context(|| format!("WebSocket handshake failed for session {session_id}"))?;

    info!("WebSocket session established: {session_id}");

    loop {
        // Read the next WebSocket frame from the browser.
        // `next()` returns `None` when the stream is closed.
        let ws_msg = match ws_stream.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {session_id}: WebSocket closed normally");
                break;
            }
            Some(Err(e)) => {
                warn!("session {session_id}: WebSocket error: {e}");
                break;
            }
            None => {
                debug!("session {session_id}: stream ended");
                break;
            }
        };

        match ws_msg {
            WsMessage::Text(json_str) => {
                // The router owns decode/validate/handle; it always yields a
                // response envelope, even for malformed frames.
                let response = router.dispatch(&json_str).await;

                debug!(
                    "session {session_id}: command answered (id={}, success={})",
                    response.id, response.success
                );

                let json = serde_json::to_string(&response)
                    .context("failed to serialize response envelope")?;
                if ws_stream.send(WsMessage::Text(json)).await.is_err() {
                    debug!("session {session_id}: send failed (browser disconnected)");
                    break;
                }
            }

            WsMessage::Binary(_) => {
                // The command protocol is JSON-only.
                // Binary frames are unexpected; log and skip.
                warn!("session {session_id}: unexpected binary WebSocket frame (ignored)");
            }

            WsMessage::Ping(data) => {
                // Protocol-level ping; tokio-tungstenite queues the Pong reply
                // automatically when writing to the sink.  We just log it here.
                debug!("session {session_id}: WebSocket ping ({} bytes)", data.len());
            }

            WsMessage::Pong(_) => {
                debug!("session {session_id}: WebSocket pong received");
            }

            WsMessage::Close(_) => {
                debug!("session {session_id}: WebSocket Close frame received");
                break;
            }

            WsMessage::Frame(_) => {
                debug!("session {session_id}: raw frame (ignored)");
            }
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
