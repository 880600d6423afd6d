//! Bookmark Audit RPC server: JSON-RPC over stdin/stdout.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"scan.start", "params":{"scope":["1"]}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Event:    {"event":"progress", "checked":3, "total":10, "fraction":0.3}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bookmark_audit::app::App;
use bookmark_audit::platform::{self, DATA_DIR_ENV};
use bookmark_audit::rpc_handler::{cancel_scan, handle_method, scope_param, ActiveScan};
use bookmark_audit::services::http_probe::HttpProbe;
use bookmark_audit::services::liveness_scanner::LivenessScanner;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Writes one protocol line to stdout.
fn write_line(value: &Value) {
    let mut out = io::stdout().lock();
    let _ = writeln!(out, "{}", value);
    let _ = out.flush();
}

fn ui_language() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| String::from("en-US"))
}

/// Prepares a liveness scan under the lock and runs it in a spawned task.
fn start_scan(app: &Arc<Mutex<App>>, active: &ActiveScan, params: &Value) -> Result<Value, String> {
    let scope = scope_param(params)?;
    let mut slot = active.lock().map_err(|e| e.to_string())?;
    if slot.is_some() {
        return Err("a scan is already running".to_string());
    }

    let (plan, events) = {
        let a = app.lock().map_err(|e| e.to_string())?;
        (
            a.prepare_invalid_scan(&scope).map_err(|e| e.to_string())?,
            a.event_sender(),
        )
    };
    let total = plan.links.len();
    let probe = HttpProbe::new().map_err(|e| e.to_string())?;
    let mut scanner = LivenessScanner::new(probe);
    if let Some(tx) = events {
        scanner = scanner.with_events(tx);
    }

    let cancel = CancellationToken::new();
    *slot = Some(cancel.clone());

    let app = Arc::clone(app);
    let active = Arc::clone(active);
    tokio::spawn(async move {
        let report = scanner.run(plan, cancel).await;
        match app.lock() {
            Ok(a) => {
                if let Err(e) = a.finish_invalid_scan(&report) {
                    error!(error = %e, "failed to record scan run");
                }
            }
            Err(e) => error!(error = %e, "app lock poisoned"),
        }
        if let Ok(mut slot) = active.lock() {
            *slot = None;
        };
    });

    Ok(json!({"started": true, "total": total}))
}

#[tokio::main]
async fn main() {
    init_tracing();

    let override_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    let db_path = platform::database_path(override_dir.as_deref());
    if let Some(parent) = db_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(dir = %parent.display(), error = %e, "could not create data directory");
        }
    }

    let mut app = match App::new(&db_path.to_string_lossy()) {
        Ok(app) => app,
        Err(e) => {
            error!(path = %db_path.display(), error = %e, "failed to open database");
            std::process::exit(1);
        }
    };
    app.set_ui_language(&ui_language());

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    app.set_event_sender(events_tx);
    let app = Arc::new(Mutex::new(app));
    let active: ActiveScan = Arc::new(Mutex::new(None));

    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            match serde_json::to_value(&event) {
                Ok(value) => write_line(&value),
                Err(e) => warn!(error = %e, "could not encode event"),
            }
        }
    });

    info!(path = %db_path.display(), "bookmark audit ready");
    write_line(&json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                write_line(&json!({"id":null,"error":format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let result = match method {
            "scan.start" => start_scan(&app, &active, &params),
            "scan.cancel" => cancel_scan(&active),
            _ => handle_method(&app, method, &params),
        };

        let response = match result {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        write_line(&response);
    }

    if let Err(e) = cancel_scan(&active) {
        warn!(error = %e, "could not cancel scan on shutdown");
    }
}
