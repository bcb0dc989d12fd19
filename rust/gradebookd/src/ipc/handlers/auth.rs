use crate::config;
use crate::ipc::helpers::{
    get_raw_str, get_required_str, require_db, respond, session_json, HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::session::{self, LoginOutcome, Page};
use crate::store;
use tracing::info;

fn login(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_db(state)?;
    let password = get_raw_str(&req.params, "password")?;
    let secret = store::load_password(conn)?;
    let lock_on_login = config::lock_on_login(conn)?;

    let (next, outcome) = session::login(state.session, secret.as_deref(), password, lock_on_login)?;
    if outcome == LoginOutcome::SecretCreated {
        store::save_password(conn, password)?;
        info!("shared password stored on first login");
    }
    store::save_logged_in(conn, true)?;
    if next.locked != state.session.locked {
        store::save_locked(conn, next.locked)?;
    }
    state.session = next;
    session_json(state)
}

fn logout(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = require_db(state)?;
    store::save_logged_in(conn, false)?;
    state.session = session::logout(state.session);
    session_json(state)
}

fn status(state: &mut AppState, _req: &Request) -> HandlerResult {
    require_db(state)?;
    session_json(state)
}

fn navigate(state: &mut AppState, req: &Request) -> HandlerResult {
    require_db(state)?;
    session::ensure_logged_in(&state.session)?;
    let raw = get_required_str(&req.params, "page")?;
    let page = Page::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("unknown page: {}", raw)))?;
    state.session = session::navigate(state.session, page);
    session_json(state)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "auth.login" => login(state, req),
        "auth.logout" => logout(state, req),
        "auth.status" | "session.get" => status(state, req),
        "session.navigate" => navigate(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
