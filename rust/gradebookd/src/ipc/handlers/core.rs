use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::HandlerErr;
use crate::ipc::types::{AppState, Request};
use crate::session::Session;
use crate::store;
use rusqlite::Connection;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Session as persisted: the login flag only counts once a secret exists.
pub fn restore_session(conn: &Connection) -> anyhow::Result<Session> {
    let has_password = store::load_password(conn)?.is_some();
    Ok(Session {
        logged_in: has_password && store::load_logged_in(conn)?,
        locked: store::load_locked(conn)?,
        ..Session::default()
    })
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let conn = match db::open_db(&path) {
        Ok(conn) => conn,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:#}"), None),
    };
    let session = match restore_session(&conn) {
        Ok(s) => s,
        Err(e) => return HandlerErr::from(e).response(&req.id),
    };

    info!(workspace = %path.to_string_lossy(), logged_in = session.logged_in, "workspace opened");
    state.workspace = Some(path.clone());
    state.db = Some(conn);
    state.session = session;
    ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
