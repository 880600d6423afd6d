//! RPC method handler for the bookmark auditor's JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches the synchronous methods; `scan.start` and
//! `scan.cancel` need the server's runtime and live in the server.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::app::App;
use crate::managers::bookmark_store::BookmarkProvider;
use crate::managers::scan_history::ScanHistoryTrait;
use crate::services::duplicate_grouper::smart_select;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{CreateDetails, DuplicateGroup};

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn string_list(params: &Value, name: &str) -> Result<Vec<String>, String> {
    let arr = params
        .get(name)
        .and_then(|v| v.as_array())
        .ok_or_else(|| format!("missing {}", name))?;
    arr.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("{} must contain strings", name))
        })
        .collect()
}

/// Reads the `scope` array of top-level folder IDs.
pub fn scope_param(params: &Value) -> Result<BTreeSet<String>, String> {
    Ok(string_list(params, "scope")?.into_iter().collect())
}

/// Cancellation handle of the scan in flight, if any.
pub type ActiveScan = Arc<Mutex<Option<CancellationToken>>>;

/// Cancels the scan in flight. Reports whether there was one.
pub fn cancel_scan(active: &ActiveScan) -> Result<Value, String> {
    let slot = active.lock().map_err(|e| e.to_string())?;
    let cancelled = match slot.as_ref() {
        Some(token) => {
            token.cancel();
            true
        }
        None => false,
    };
    Ok(json!({"cancelled": cancelled}))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Tree ───
        "tree.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let tree = a.provider().get_tree().map_err(|e| e.to_string())?;
            serde_json::to_value(tree).map_err(|e| e.to_string())
        }
        "bookmark.create" => {
            let title = str_param(params, "title")?;
            let url = params.get("url").and_then(|v| v.as_str()).map(str::to_string);
            let parent_id = params
                .get("parent_id")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let index = params
                .get("index")
                .and_then(|v| v.as_u64())
                .map(|i| i.min(u32::MAX as u64) as u32);
            let a = app.lock().map_err(|e| e.to_string())?;
            let node = a
                .provider()
                .create(CreateDetails {
                    parent_id,
                    index,
                    title: title.to_string(),
                    url,
                })
                .map_err(|e| e.to_string())?;
            serde_json::to_value(node).map_err(|e| e.to_string())
        }
        "scope.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let folders = a.scope_folders().map_err(|e| e.to_string())?;
            let arr: Vec<Value> = folders
                .iter()
                .map(|f| json!({"id": f.id, "title": f.title}))
                .collect();
            Ok(json!(arr))
        }

        // ─── Duplicates ───
        "scan.duplicates" => {
            let scope = scope_param(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let scan = a.run_duplicate_scan(&scope).map_err(|e| e.to_string())?;
            Ok(json!({"run": scan.run, "groups": scan.groups}))
        }
        "scan.smart_select" => {
            let groups: Vec<DuplicateGroup> = serde_json::from_value(
                params.get("groups").cloned().ok_or("missing groups")?,
            )
            .map_err(|e| format!("invalid groups: {}", e))?;
            Ok(json!(smart_select(&groups)))
        }

        // ─── Recycle bin ───
        "recycle.delete" => {
            let ids = string_list(params, "ids")?;
            let run_id = params.get("run_id").and_then(|v| v.as_str());
            let a = app.lock().map_err(|e| e.to_string())?;
            let moved = a.soft_delete(&ids, run_id).map_err(|e| e.to_string())?;
            Ok(json!({"count": moved}))
        }
        "recycle.restore" => {
            let ids = string_list(params, "ids")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let restored = a.restore(&ids).map_err(|e| e.to_string())?;
            Ok(json!({"count": restored}))
        }
        "recycle.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let items = a.list_recycled().map_err(|e| e.to_string())?;
            serde_json::to_value(items).map_err(|e| e.to_string())
        }
        "recycle.empty" => {
            let confirmed = params
                .get("confirm")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            let a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.empty_recycle_bin(confirmed).map_err(|e| e.to_string())?;
            Ok(json!({"count": removed}))
        }

        // ─── Scan history ───
        "history.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let runs = a.scan_history().list().map_err(|e| e.to_string())?;
            serde_json::to_value(runs).map_err(|e| e.to_string())
        }
        "history.clear" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            a.scan_history().clear().map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let settings = a.settings().map_err(|e| e.to_string())?;
            serde_json::to_value(settings).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut engine = a.settings_engine().map_err(|e| e.to_string())?;
            engine.set_value(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut engine = a.settings_engine().map_err(|e| e.to_string())?;
            engine.reset().map_err(|e| e.to_string())?;
            serde_json::to_value(engine.get_settings()).map_err(|e| e.to_string())
        }

        // ─── Analytics ───
        "visits.record" => {
            let url = str_param(params, "url")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let info = a.visit_history().record_visit(url).map_err(|e| e.to_string())?;
            serde_json::to_value(info).map_err(|e| e.to_string())
        }
        "analytics.run" => {
            let now_ms = params
                .get("now")
                .and_then(|v| v.as_i64())
                .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
            let a = app.lock().map_err(|e| e.to_string())?;
            let outcome = a.run_analytics(now_ms).map_err(|e| e.to_string())?;
            Ok(json!({"report": outcome.report, "delta": outcome.delta}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
