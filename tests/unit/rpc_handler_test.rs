//! Unit tests for the JSON-RPC method dispatcher.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use bookmark_audit::app::App;
use bookmark_audit::database::migrations::{BOOKMARKS_BAR_ID, OTHER_BOOKMARKS_ID};
use bookmark_audit::rpc_handler::{cancel_scan, handle_method, ActiveScan};

fn setup() -> (TempDir, Mutex<App>) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.db");
    let app = App::new(&path.to_string_lossy()).unwrap();
    (dir, Mutex::new(app))
}

fn call(app: &Mutex<App>, method: &str, params: Value) -> Value {
    handle_method(app, method, &params).unwrap_or_else(|e| panic!("{} failed: {}", method, e))
}

fn create_link(app: &Mutex<App>, title: &str, url: &str) -> String {
    let node = call(
        app,
        "bookmark.create",
        json!({"title": title, "url": url, "parent_id": BOOKMARKS_BAR_ID}),
    );
    node["id"].as_str().unwrap().to_string()
}

#[test]
fn test_ping() {
    let (_dir, app) = setup();
    assert_eq!(call(&app, "ping", json!({})), json!({"pong": true}));
}

#[test]
fn test_unknown_method() {
    let (_dir, app) = setup();
    let err = handle_method(&app, "bookmarks.explode", &json!({})).unwrap_err();
    assert_eq!(err, "unknown method: bookmarks.explode");
}

#[test]
fn test_missing_params_are_reported() {
    let (_dir, app) = setup();
    assert_eq!(
        handle_method(&app, "bookmark.create", &json!({})).unwrap_err(),
        "missing title"
    );
    assert_eq!(
        handle_method(&app, "scan.duplicates", &json!({"scope": [1]})).unwrap_err(),
        "scope must contain strings"
    );
}

#[test]
fn test_scope_list_has_top_level_folders() {
    let (_dir, app) = setup();
    let folders = call(&app, "scope.list", json!({}));
    let ids: Vec<&str> = folders
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![BOOKMARKS_BAR_ID, OTHER_BOOKMARKS_ID]);
}

#[test]
fn test_create_shows_up_in_tree() {
    let (_dir, app) = setup();
    let id = create_link(&app, "Docs", "https://docs.example");
    let tree = call(&app, "tree.get", json!({}));
    let serialized = tree.to_string();
    assert!(serialized.contains(&id));
    assert!(serialized.contains("https://docs.example"));
}

#[test]
fn test_duplicate_scan_and_smart_select() {
    let (_dir, app) = setup();
    let first = create_link(&app, "One", "https://www.example.com/page");
    let second = create_link(&app, "Two", "http://example.com/page/");
    create_link(&app, "Other", "https://other.example");

    let scan = call(&app, "scan.duplicates", json!({"scope": [BOOKMARKS_BAR_ID]}));
    let groups = scan["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(scan["run"]["found_count"], json!(1));
    assert_eq!(scan["run"]["kind"], json!("duplicate"));

    let selected = call(&app, "scan.smart_select", json!({"groups": scan["groups"]}));
    let selected: Vec<&str> = selected
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(selected.len(), 1);
    assert!(selected[0] == first || selected[0] == second);

    let history = call(&app, "history.list", json!({}));
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[test]
fn test_empty_scope_is_rejected() {
    let (_dir, app) = setup();
    let err = handle_method(&app, "scan.duplicates", &json!({"scope": []})).unwrap_err();
    assert_eq!(err, "Select at least one folder to scan");
}

#[test]
fn test_recycle_round_trip() {
    let (_dir, app) = setup();
    let id = create_link(&app, "Gone", "https://gone.example");

    let deleted = call(&app, "recycle.delete", json!({"ids": [id]}));
    assert_eq!(deleted, json!({"count": 1}));

    let listed = call(&app, "recycle.list", json!({}));
    assert_eq!(listed[0]["node"]["id"], json!(id));
    assert_eq!(listed[0]["restorable"], json!(true));

    let restored = call(&app, "recycle.restore", json!({"ids": [id]}));
    assert_eq!(restored, json!({"count": 1}));
    assert!(call(&app, "recycle.list", json!({})).as_array().unwrap().is_empty());
}

#[test]
fn test_empty_bin_needs_confirmation() {
    let (_dir, app) = setup();
    let id = create_link(&app, "Gone", "https://gone.example");
    call(&app, "recycle.delete", json!({"ids": [id]}));

    let err = handle_method(&app, "recycle.empty", &json!({})).unwrap_err();
    assert_eq!(err, "Emptying the recycle bin requires confirmation");
    assert_eq!(call(&app, "recycle.list", json!({})).as_array().unwrap().len(), 1);

    assert_eq!(
        call(&app, "recycle.empty", json!({"confirm": true})),
        json!({"count": 1})
    );
    assert!(call(&app, "recycle.list", json!({})).as_array().unwrap().is_empty());
}

#[test]
fn test_history_clear() {
    let (_dir, app) = setup();
    call(&app, "scan.duplicates", json!({"scope": [BOOKMARKS_BAR_ID]}));
    assert_eq!(call(&app, "history.clear", json!({})), json!({"ok": true}));
    assert!(call(&app, "history.list", json!({})).as_array().unwrap().is_empty());
}

#[test]
fn test_settings_get_set_reset() {
    let (_dir, app) = setup();
    let settings = call(&app, "settings.get", json!({}));
    assert_eq!(settings["scan_timeout_ms"], json!(15_000));

    call(&app, "settings.set", json!({"key": "scanTimeoutMs", "value": 20_000}));
    let err = handle_method(
        &app,
        "settings.set",
        &json!({"key": "scanTimeoutMs", "value": 70_000}),
    )
    .unwrap_err();
    assert!(err.starts_with("Invalid settings value"));
    assert_eq!(
        call(&app, "settings.get", json!({}))["scan_timeout_ms"],
        json!(20_000)
    );

    let reset = call(&app, "settings.reset", json!({}));
    assert_eq!(reset["scan_timeout_ms"], json!(15_000));
}

#[test]
fn test_visits_feed_analytics() {
    let (_dir, app) = setup();
    create_link(&app, "Docs", "https://docs.example");
    create_link(&app, "Blog", "https://blog.example");

    let info = call(&app, "visits.record", json!({"url": "https://docs.example"}));
    assert_eq!(info["visit_count"], json!(1));

    let first = call(&app, "analytics.run", json!({"now": 1_700_000_000_000_i64}));
    assert_eq!(first["report"]["total"], json!(2));
    // The seeded, still empty "Other Bookmarks" folder costs two points.
    assert_eq!(first["report"]["empty_folders"], json!(1));
    assert_eq!(first["report"]["score"], json!(98));
    assert_eq!(first["report"]["most_visited"][0]["link"]["title"], json!("Docs"));
    assert!(first["delta"].is_null());

    create_link(&app, "More", "https://more.example");
    let second = call(&app, "analytics.run", json!({"now": 1_700_000_100_000_i64}));
    assert_eq!(second["delta"]["total"], json!(1));
}

#[test]
fn test_cancel_without_running_scan() {
    let active: ActiveScan = Arc::new(Mutex::new(None));
    assert_eq!(cancel_scan(&active).unwrap(), json!({"cancelled": false}));
}

#[test]
fn test_cancel_signals_running_scan() {
    let token = CancellationToken::new();
    let active: ActiveScan = Arc::new(Mutex::new(Some(token.clone())));
    assert_eq!(cancel_scan(&active).unwrap(), json!({"cancelled": true}));
    assert!(token.is_cancelled());
    // The slot stays occupied until the scan task clears it.
    assert!(active.lock().unwrap().is_some());
}
