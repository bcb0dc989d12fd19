use crate::config::{self, SetupSection};
use crate::ipc::helpers::{get_required_str, require_session, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Map, Value};

fn setup_get(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let mut out = Map::new();
    for section in SetupSection::ALL {
        out.insert(
            section.name().to_string(),
            config::load_section(conn, section)?,
        );
    }
    Ok(Value::Object(out))
}

fn setup_update(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let section_raw = get_required_str(&req.params, "section")?;
    let section = SetupSection::parse(&section_raw)
        .ok_or_else(|| HandlerErr::bad_params("unknown section"))?;
    let patch = req
        .params
        .get("patch")
        .and_then(|v| v.as_object())
        .ok_or_else(|| HandlerErr::bad_params("patch must be an object"))?;

    let mut current = config::load_section(conn, section)?;
    config::merge_section_patch(section, &mut current, patch).map_err(HandlerErr::bad_params)?;
    config::save_section(conn, section, &current)?;
    Ok(json!({ "section": section.name(), "settings": current }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "setup.get" => setup_get(state, req),
        "setup.update" => setup_update(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
