use crate::config;
use crate::ipc::helpers::{get_opt_str, require_session, respond, HandlerErr, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::report;
use crate::store;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn reports_model(state: &mut AppState, _req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let structure = store::load_structure(conn)?;
    let students = store::load_students(conn)?;
    let grades = store::load_grades(conn)?;

    let rows = report::build_report(&students, &structure, &grades);
    Ok(json!({
        "columns": report::report_columns(&structure),
        "summary": report::remark_summary(&rows),
        "rows": rows,
    }))
}

fn reports_export(state: &mut AppState, req: &Request) -> HandlerResult {
    let conn = require_session(state)?;
    let settings = config::export_settings(conn)?;

    let out_path = match get_opt_str(&req.params, "outPath").map(str::trim) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => {
            let dir = get_opt_str(&req.params, "outDir")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .or(settings.default_out_dir)
                .ok_or_else(|| HandlerErr::bad_params("missing outDir"))?;
            let today = chrono::Utc::now().date_naive();
            PathBuf::from(dir).join(report::default_export_file_name(
                &settings.file_name_prefix,
                today,
            ))
        }
    };

    let structure = store::load_structure(conn)?;
    let students = store::load_students(conn)?;
    let grades = store::load_grades(conn)?;
    let rows = report::build_report(&students, &structure, &grades);

    let rows_exported = report::export_csv(&out_path, &structure, &rows).map_err(|e| HandlerErr {
        code: "export_failed",
        message: format!("{e:#}"),
        details: Some(json!({ "path": out_path.to_string_lossy() })),
    })?;
    info!(path = %out_path.to_string_lossy(), rows = rows_exported, "report exported");
    Ok(json!({
        "path": out_path.to_string_lossy(),
        "rowsExported": rows_exported,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "reports.model" => reports_model(state, req),
        "reports.export" => reports_export(state, req),
        _ => return None,
    };
    Some(respond(req, result))
}
