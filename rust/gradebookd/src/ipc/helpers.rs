use crate::error::GradebookError;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session;
use crate::store;
use crate::structure::Category;
use rusqlite::Connection;
use serde_json::{json, Value};
use tracing::warn;

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<GradebookError> for HandlerErr {
    fn from(e: GradebookError) -> Self {
        let message = match &e {
            GradebookError::Storage(inner) => format!("{inner:#}"),
            other => other.to_string(),
        };
        Self {
            code: e.code(),
            message,
            details: None,
        }
    }
}

impl From<anyhow::Error> for HandlerErr {
    fn from(e: anyhow::Error) -> Self {
        GradebookError::Storage(e).into()
    }
}

pub type HandlerResult = Result<Value, HandlerErr>;

pub fn respond(req: &Request, result: HandlerResult) -> Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => {
            warn!(method = %req.method, code = e.code, message = %e.message, "request rejected");
            e.response(&req.id)
        }
    }
}

pub fn require_db(state: &AppState) -> Result<&Connection, HandlerErr> {
    state.db.as_ref().ok_or(HandlerErr {
        code: "no_workspace",
        message: "select a workspace first".to_string(),
        details: None,
    })
}

/// Workspace selected and session logged in.
pub fn require_session(state: &AppState) -> Result<&Connection, HandlerErr> {
    let conn = require_db(state)?;
    session::ensure_logged_in(&state.session)?;
    Ok(conn)
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Untrimmed; passwords are compared exactly as typed.
pub fn get_raw_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_opt_str<'a>(params: &'a Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub fn parse_category(params: &Value) -> Result<Category, HandlerErr> {
    let raw = get_required_str(params, "category")?;
    Category::parse(&raw)
        .ok_or_else(|| HandlerErr::bad_params(format!("unknown category: {}", raw)))
}

/// Accepts a JSON number or a numeric string; an empty string reads as 0.
pub fn parse_score_value(v: Option<&Value>) -> Result<f64, HandlerErr> {
    match v {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| HandlerErr::bad_params("value must be a finite number")),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| HandlerErr::bad_params(format!("value is not a number: {}", s))),
        _ => Err(HandlerErr::bad_params("missing value")),
    }
}

pub fn parse_number(params: &Value, key: &str) -> Result<f64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a number", key)))
}

pub fn session_json(state: &AppState) -> HandlerResult {
    let has_password = match state.db.as_ref() {
        Some(conn) => store::load_password(conn)?.is_some(),
        None => false,
    };
    Ok(json!({
        "loggedIn": state.session.logged_in,
        "locked": state.session.locked,
        "page": state.session.page,
        "hasPassword": has_password,
    }))
}
