//! The config gateway: read/write access to the board configuration record.
//!
//! Two commands, registered with the router at setup:
//!
//! | Command type               | Fields            | Result              |
//! |----------------------------|-------------------|---------------------|
//! | `family_board/config/get`  | —                 | `{"config": <map>}` (or `null`) |
//! | `family_board/config/set`  | `config` (object) | `{"ok": true}`      |
//!
//! The configuration itself is opaque to the gateway: it is a JSON mapping
//! owned by the dashboard frontend (views, lists, calendar sources, theme).
//! The gateway never inspects the contents beyond the schema check that the
//! top-level value is a mapping.
//!
//! # The record
//!
//! There is exactly one record per installation, addressed by a fixed storage
//! key and format version.  Absence (never written) is a valid state distinct
//! from an empty mapping: a `get` before the first `set` answers
//! `{"config": null}`, and no default is ever substituted on the read path.
//! A `set` fully replaces the previous value — there are no partial or merge
//! updates.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::application::router::{CommandHandler, CommandRouter};
use crate::application::schema::{self, SchemaError};
use crate::domain::CommandRequest;
use crate::infrastructure::record_store::RecordStore;

// ── Record identity ───────────────────────────────────────────────────────────

/// Fixed storage key of the one configuration record.
pub const STORAGE_KEY: &str = "family_board.config";

/// On-disk format version of the configuration record.
pub const STORAGE_VERSION: u32 = 1;

/// Command type string for reading the configuration.
pub const GET_CONFIG_TYPE: &str = "family_board/config/get";

/// Command type string for replacing the configuration.
pub const SET_CONFIG_TYPE: &str = "family_board/config/set";

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Handler for `family_board/config/get`.
struct GetConfig {
    store: Arc<RecordStore>,
}

#[async_trait]
impl CommandHandler for GetConfig {
    async fn handle(&self, _request: &CommandRequest) -> anyhow::Result<Value> {
        // `load` suspends on file I/O; the runtime serves other sessions in
        // the meantime.  Absence maps to an explicit `null`, never to `{}`.
        let config = self.store.load().await?;
        Ok(json!({ "config": config.unwrap_or(Value::Null) }))
    }
}

/// Handler for `family_board/config/set`.
struct SetConfig {
    store: Arc<RecordStore>,
}

#[async_trait]
impl CommandHandler for SetConfig {
    fn validate(&self, request: &CommandRequest) -> Result<(), SchemaError> {
        // A string/number/array `config` is rejected here, before handle()
        // ever runs.  Absent and `null` pass and are coalesced below.
        schema::mapping_or_absent(request, "config")
    }

    async fn handle(&self, request: &CommandRequest) -> anyhow::Result<Value> {
        // Write-path coalescing only: an absent or `null` config stores the
        // empty mapping.  The read path never applies this default.
        let config = match request.field("config") {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            _ => json!({}),
        };

        debug!("replacing board configuration ({} top-level keys)", key_count(&config));
        self.store.save(&config).await?;
        Ok(json!({ "ok": true }))
    }
}

/// Number of top-level keys in a mapping, for log lines.
fn key_count(config: &Value) -> usize {
    config.as_object().map_or(0, |map| map.len())
}

// ── Registration ──────────────────────────────────────────────────────────────

/// Registers both config commands with `router`.
///
/// Setup is synchronous and cannot fail.  Both handlers share the same store
/// handle; the store itself keeps no in-memory copy of the record, so every
/// command sees whatever the last completed save left on disk.
pub fn register_commands(router: &mut CommandRouter, store: Arc<RecordStore>) {
    router.register(GET_CONFIG_TYPE, Arc::new(GetConfig { store: Arc::clone(&store) }));
    router.register(SET_CONFIG_TYPE, Arc::new(SetConfig { store }));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
