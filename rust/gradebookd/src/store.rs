use crate::db::KvStore;
use crate::roster::{GradeBook, Student};
use crate::structure::GradeStructure;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

pub const KEY_GRADE_STRUCTURE: &str = "gradeStructure";
pub const KEY_STUDENTS: &str = "students";
pub const KEY_GRADES: &str = "grades";
pub const KEY_GRADES_LOCKED: &str = "gradesLocked";
pub const KEY_PASSWORD: &str = "professorPassword";
pub const KEY_LOGGED_IN: &str = "isLoggedIn";

/// Absent or malformed blobs read as `None`; callers substitute defaults.
fn load_opt<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> anyhow::Result<Option<T>> {
    let Some(raw) = store.get_json(key)? else {
        return Ok(None);
    };
    match serde_json::from_value::<T>(raw) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!(key = %key, error = %e, "ignoring malformed persisted value");
            Ok(None)
        }
    }
}

fn save<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> anyhow::Result<()> {
    store.set_json(key, &serde_json::to_value(value)?)
}

/// Reads a flag stored either as a JSON bool or as the strings
/// `"true"`/`"false"`.
fn load_flag(store: &dyn KvStore, key: &str) -> anyhow::Result<Option<bool>> {
    let v = match store.get_json(key)? {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::String(s)) if s == "true" => Some(true),
        Some(serde_json::Value::String(s)) if s == "false" => Some(false),
        Some(other) => {
            warn!(key = %key, value = %other, "ignoring malformed persisted flag");
            None
        }
        None => None,
    };
    Ok(v)
}

pub fn load_structure(store: &dyn KvStore) -> anyhow::Result<GradeStructure> {
    Ok(load_opt(store, KEY_GRADE_STRUCTURE)?.unwrap_or_default())
}

pub fn save_structure(store: &dyn KvStore, structure: &GradeStructure) -> anyhow::Result<()> {
    save(store, KEY_GRADE_STRUCTURE, structure)
}

pub fn load_students(store: &dyn KvStore) -> anyhow::Result<Vec<Student>> {
    Ok(load_opt(store, KEY_STUDENTS)?.unwrap_or_default())
}

pub fn save_students(store: &dyn KvStore, students: &[Student]) -> anyhow::Result<()> {
    save(store, KEY_STUDENTS, &students)
}

pub fn load_grades(store: &dyn KvStore) -> anyhow::Result<GradeBook> {
    Ok(load_opt(store, KEY_GRADES)?.unwrap_or_default())
}

pub fn save_grades(store: &dyn KvStore, grades: &GradeBook) -> anyhow::Result<()> {
    save(store, KEY_GRADES, grades)
}

pub fn load_locked(store: &dyn KvStore) -> anyhow::Result<bool> {
    Ok(load_flag(store, KEY_GRADES_LOCKED)?.unwrap_or(true))
}

pub fn save_locked(store: &dyn KvStore, locked: bool) -> anyhow::Result<()> {
    save(store, KEY_GRADES_LOCKED, &locked)
}

pub fn load_password(store: &dyn KvStore) -> anyhow::Result<Option<String>> {
    Ok(load_opt::<String>(store, KEY_PASSWORD)?.filter(|s| !s.is_empty()))
}

pub fn save_password(store: &dyn KvStore, password: &str) -> anyhow::Result<()> {
    save(store, KEY_PASSWORD, &password)
}

pub fn load_logged_in(store: &dyn KvStore) -> anyhow::Result<bool> {
    Ok(load_flag(store, KEY_LOGGED_IN)?.unwrap_or(false))
}

pub fn save_logged_in(store: &dyn KvStore, logged_in: bool) -> anyhow::Result<()> {
    if logged_in {
        save(store, KEY_LOGGED_IN, &true)
    } else {
        store.remove(KEY_LOGGED_IN)
    }
}
