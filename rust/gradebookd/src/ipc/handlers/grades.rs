use crate::calc;
use crate::error::GradebookError;
use crate::ipc::helpers::{
    get_opt_str, get_raw_str, get_required_str, parse_category, parse_score_value,
    require_session, respond, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use crate::session;
use crate::store;
use crate::structure::Category;
use serde_json::json;
use tracing::{debug, info};

fn grades_get(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let grades = store::load_grades(conn)?;
    match get_opt_str(&req.params, "studentId") {
        Some(id) => Ok(json!({ "grade": grades.get(id) })),
        None => Ok(json!({ "grades": grades })),
    }
}

fn grades_update_score(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    session::ensure_can_edit_scores(&state.session)?;

    let student_id = get_required_str(&req.params, "studentId")?;
    let category = parse_category(&req.params)?;
    let component_id = get_required_str(&req.params, "componentId")?;
    let value = parse_score_value(req.params.get("value"))?;

    let students = store::load_students(conn)?;
    if !students.iter().any(|s| s.id == student_id) {
        return Err(GradebookError::NotFound {
            entity: "student",
            id: student_id,
        }
        .into());
    }

    let structure = store::load_structure(conn)?;
    let mut grades = store::load_grades(conn)?;
    let grade = roster::update_score(&mut grades, &student_id, category, &component_id, value).clone();
    store::save_grades(conn, &grades)?;
    debug!(student = %student_id, ?category, component = %component_id, value, "score updated");

    let cp = calc::category_subtotal(&structure, Category::ClassParticipation, Some(&grade));
    let exam = calc::category_subtotal(&structure, Category::Exam, Some(&grade));
    let fin = calc::final_grade(&structure, Some(&grade));
    Ok(json!({
        "grade": grade,
        "classParticipationTotal": calc::round_off_2_decimals(cp),
        "examTotal": calc::round_off_2_decimals(exam),
        "finalGrade": calc::round_off_2_decimals(fin),
    }))
}

fn grades_lock(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    store::save_locked(conn, true)?;
    state.session = session::lock(state.session);
    info!("grades locked");
    Ok(json!({ "locked": true }))
}

fn grades_unlock(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let password = get_raw_str(&req.params, "password")?;
    let secret = store::load_password(conn)?;
    let next = session::unlock(state.session, secret.as_deref(), password)?;
    store::save_locked(conn, false)?;
    state.session = next;
    info!("grades unlocked");
    Ok(json!({ "locked": false }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "grades.get" => grades_get(state, req),
        "grades.updateScore" => grades_update_score(state, req),
        "grades.lock" => grades_lock(state, req),
        "grades.unlock" => grades_unlock(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
