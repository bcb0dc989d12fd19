use crate::ipc::helpers::{
    get_opt_str, get_required_str, parse_category, parse_number, require_session, respond,
    HandlerErr, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::store;
use crate::structure::{self, GradeStructure};
use rusqlite::Connection;
use serde_json::{json, Value};
use tracing::info;

fn parse_structure(params: &Value) -> Result<GradeStructure, HandlerErr> {
    let raw = params
        .get("structure")
        .ok_or_else(|| HandlerErr::bad_params("missing structure"))?;
    serde_json::from_value(raw.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid structure: {}", e)))
}

/// Drafts come from the request when given, otherwise from the saved structure.
fn draft_structure(conn: &Connection, params: &Value) -> Result<GradeStructure, HandlerErr> {
    if params.get("structure").is_some() {
        return parse_structure(params);
    }
    Ok(store::load_structure(conn)?)
}

fn structure_get(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let structure = store::load_structure(conn)?;
    Ok(json!({ "structure": structure }))
}

fn structure_validate(state: &mut AppState, req: &Request) -> HandlerResult {
    require_session(state)?;
    let draft = parse_structure(&req.params)?;
    let verdict = structure::validate_structure(&draft);
    Ok(json!({
        "ok": verdict.is_ok(),
        "message": verdict.err().map(|e| e.to_string()),
        "classParticipationSum": draft.class_participation.component_sum(),
        "examSum": draft.exam.component_sum(),
    }))
}

fn structure_save(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let draft = parse_structure(&req.params)?;
    structure::validate_structure(&draft)?;
    store::save_structure(conn, &draft)?;
    info!(
        cp_components = draft.class_participation.components.len(),
        exam_components = draft.exam.components.len(),
        "grade structure saved"
    );
    Ok(json!({ "structure": draft }))
}

fn structure_add_component(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let category = parse_category(&req.params)?;
    let mut draft = draft_structure(conn, &req.params)?;
    let component = structure::add_component(&mut draft, category);
    Ok(json!({ "structure": draft, "component": component }))
}

fn structure_remove_component(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let category = parse_category(&req.params)?;
    let component_id = get_required_str(&req.params, "componentId")?;
    let mut draft = draft_structure(conn, &req.params)?;
    structure::remove_component(&mut draft, category, &component_id)?;
    Ok(json!({ "structure": draft }))
}

fn structure_update_component(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let category = parse_category(&req.params)?;
    let component_id = get_required_str(&req.params, "componentId")?;
    let name = get_opt_str(&req.params, "name");
    let percentage = match req.params.get("percentage") {
        None | Some(Value::Null) => None,
        Some(_) => Some(parse_number(&req.params, "percentage")?),
    };
    if name.is_none() && percentage.is_none() {
        return Err(HandlerErr::bad_params("nothing to update: pass name and/or percentage"));
    }
    let mut draft = draft_structure(conn, &req.params)?;
    structure::update_component(&mut draft, category, &component_id, name, percentage)?;
    Ok(json!({ "structure": draft }))
}

fn structure_update_total(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let category = parse_category(&req.params)?;
    let total = parse_number(&req.params, "total")?;
    let mut draft = draft_structure(conn, &req.params)?;
    structure::update_total(&mut draft, category, total);
    Ok(json!({ "structure": draft }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "structure.get" => structure_get(state, req),
        "structure.validate" => structure_validate(state, req),
        "structure.save" => structure_save(state, req),
        "structure.addComponent" => structure_add_component(state, req),
        "structure.removeComponent" => structure_remove_component(state, req),
        "structure.updateComponent" => structure_update_component(state, req),
        "structure.updateTotal" => structure_update_total(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
