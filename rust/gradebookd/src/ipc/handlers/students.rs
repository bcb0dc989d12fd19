use crate::ipc::helpers::{get_opt_str, get_required_str, require_session, respond, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::roster::{self, NewStudent};
use crate::store;
use serde_json::json;
use tracing::info;

fn students_list(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let students = store::load_students(conn)?;
    Ok(json!({ "students": students }))
}

fn students_create(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    // Missing fields read as empty so they surface as a validation error.
    let candidate = NewStudent {
        student_id: get_opt_str(&req.params, "studentId").unwrap_or("").to_string(),
        first_name: get_opt_str(&req.params, "firstName").unwrap_or("").to_string(),
        last_name: get_opt_str(&req.params, "lastName").unwrap_or("").to_string(),
    };

    let mut students = store::load_students(conn)?;
    let student = roster::add_student(&mut students, candidate)?;
    store::save_students(conn, &students)?;
    info!(student_id = %student.student_id, "student added");
    Ok(json!({ "student": student }))
}

fn students_delete(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let id = get_required_str(&req.params, "id")?;
    let mut students = store::load_students(conn)?;
    let removed = roster::remove_student(&mut students, &id)?;
    store::save_students(conn, &students)?;
    info!(student_id = %removed.student_id, "student removed");
    Ok(json!({ "ok": true, "id": removed.id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => students_list(state, req),
        "students.create" => students_create(state, req),
        "students.delete" => students_delete(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
