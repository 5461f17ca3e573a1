//! Command routing: type-string → handler dispatch.
//!
//! The router is the service's rendition of a command table.  Modules register
//! an async handler under a command type string at setup time; at runtime the
//! WebSocket server hands every inbound text frame to [`CommandRouter::dispatch`],
//! which decodes the envelope, validates the fields, runs the handler, and
//! produces the result envelope to send back.
//!
//! # Dispatch pipeline
//!
//! ```text
//! raw text frame
//!   → decode CommandRequest        (fail → invalid_format, id 0)
//!   → look up handler by "type"    (miss → unknown_command)
//!   → handler.validate()           (fail → invalid_format)
//!   → handler.handle().await       (fail → unknown_error)
//!   → success envelope with the handler's result
//! ```
//!
//! # Concurrency
//!
//! `dispatch` takes `&self`, so an `Arc<CommandRouter>` can serve any number
//! of sessions concurrently.  The router adds no locking or queuing of its
//! own: two concurrent writes to the same record race, and the last save to
//! complete wins — exactly the guarantee the record store provides.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::schema::SchemaError;
use crate::domain::{CommandRequest, CommandResponse, ErrorCode};

// ── Handler trait ─────────────────────────────────────────────────────────────

/// A registered command implementation.
///
/// Handlers are stored as `Arc<dyn CommandHandler>` so one instance serves
/// all sessions; implementations must therefore be `Send + Sync` and keep any
/// shared state behind their own synchronization (the config gateway's only
/// shared state is the record store handle).
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Schema validation, run by the router before [`CommandHandler::handle`].
    ///
    /// A failure here becomes an `invalid_format` response and the handler
    /// body is never invoked.  The default accepts everything, for commands
    /// with no fields beyond the envelope.
    fn validate(&self, _request: &CommandRequest) -> Result<(), SchemaError> {
        Ok(())
    }

    /// Executes the command and returns the `result` payload.
    ///
    /// # Errors
    ///
    /// Any error is mapped to an `unknown_error` response carrying the
    /// error's display chain; the router performs no retries.
    async fn handle(&self, request: &CommandRequest) -> anyhow::Result<Value>;
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Maps command type strings to their registered handlers.
///
/// Built once at startup: `register` all commands, then wrap the router in an
/// `Arc` and hand it to the WebSocket server.
#[derive(Default)]
pub struct CommandRouter {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `msg_type`.
    ///
    /// Registration cannot fail; registering the same type twice replaces the
    /// earlier handler.
    pub fn register(&mut self, msg_type: &str, handler: Arc<dyn CommandHandler>) {
        debug!("registering command handler for '{msg_type}'");
        self.handlers.insert(msg_type.to_string(), handler);
    }

    /// Returns the registered command type strings, sorted.
    ///
    /// Primarily useful for startup logging and tests.
    pub fn registered_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Runs one raw text frame through the full dispatch pipeline.
    ///
    /// Always produces a response envelope — a malformed frame yields an
    /// `invalid_format` failure (with `id` 0, since no id could be decoded)
    /// rather than an error, so one bad frame never tears down a session.
    pub async fn dispatch(&self, raw: &str) -> CommandResponse {
        // Decode the envelope.  `id` and `type` are required; all other
        // fields ride along untouched for the handler to inspect.
        let request: CommandRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!("rejecting undecodable command frame: {e}");
                return CommandResponse::err(
                    0,
                    ErrorCode::InvalidFormat,
                    format!("invalid command envelope: {e}"),
                );
            }
        };

        let Some(handler) = self.handlers.get(&request.msg_type) else {
            warn!("no handler registered for command '{}'", request.msg_type);
            return CommandResponse::err(
                request.id,
                ErrorCode::UnknownCommand,
                format!("unknown command type '{}'", request.msg_type),
            );
        };

        // Field validation runs before the handler body so handlers only see
        // well-shaped requests.
        if let Err(e) = handler.validate(&request) {
            debug!("command '{}' failed validation: {e}", request.msg_type);
            return CommandResponse::err(request.id, ErrorCode::InvalidFormat, e.to_string());
        }

        match handler.handle(&request).await {
            Ok(result) => CommandResponse::ok(request.id, result),
            Err(e) => {
                // `{e:#}` renders the whole anyhow context chain on one line.
                warn!("command '{}' failed: {e:#}", request.msg_type);
                CommandResponse::err(request.id, ErrorCode::UnknownError, format!("{e:#}"))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
