use crate::db::KvStore;
use serde_json::{json, Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupSection {
    Export,
    Session,
}

impl SetupSection {
    pub const ALL: [SetupSection; 2] = [SetupSection::Export, SetupSection::Session];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "export" => Some(Self::Export),
            "session" => Some(Self::Session),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Session => "session",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Export => "setup.export",
            Self::Session => "setup.session",
        }
    }
}

pub fn default_section(section: SetupSection) -> Value {
    match section {
        SetupSection::Export => json!({
            "fileNamePrefix": "Grades_Report",
            "defaultOutDir": null
        }),
        SetupSection::Session => json!({
            "lockOnLogin": false
        }),
    }
}

fn parse_bool(v: &Value, field: &str) -> Result<bool, String> {
    v.as_bool()
        .ok_or_else(|| format!("{} must be a boolean", field))
}

fn parse_string_max(v: &Value, field: &str, max: usize) -> Result<String, String> {
    let Some(s) = v.as_str() else {
        return Err(format!("{} must be a string", field));
    };
    let s = s.trim();
    if s.chars().count() > max {
        return Err(format!("{} must be at most {} characters", field, max));
    }
    Ok(s.to_string())
}

/// Applies `patch` over `current`, validating each field. Unknown fields are
/// rejected so typos do not silently persist.
pub fn merge_section_patch(
    section: SetupSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = current
        .as_object_mut()
        .ok_or_else(|| "internal setup object must be a JSON object".to_string())?;
    for (k, v) in patch {
        match section {
            SetupSection::Export => match k.as_str() {
                "fileNamePrefix" => {
                    let s = parse_string_max(v, k, 80)?;
                    if s.is_empty() {
                        return Err("fileNamePrefix must not be empty".to_string());
                    }
                    if s.contains('/') || s.contains('\\') {
                        return Err("fileNamePrefix must not contain path separators".to_string());
                    }
                    obj.insert(k.clone(), Value::String(s));
                }
                "defaultOutDir" => {
                    if v.is_null() {
                        obj.insert(k.clone(), Value::Null);
                    } else {
                        let s = parse_string_max(v, k, 1024)?;
                        obj.insert(
                            k.clone(),
                            if s.is_empty() { Value::Null } else { Value::String(s) },
                        );
                    }
                }
                _ => return Err(format!("unknown export field: {}", k)),
            },
            SetupSection::Session => match k.as_str() {
                "lockOnLogin" => {
                    obj.insert(k.clone(), Value::Bool(parse_bool(v, k)?));
                }
                _ => return Err(format!("unknown session field: {}", k)),
            },
        }
    }
    Ok(())
}

pub fn load_section(store: &dyn KvStore, section: SetupSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = store.get_json(section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Best-effort apply: malformed historical values fall back to defaults.
            let mut merged = current.clone();
            if merge_section_patch(section, &mut merged, saved_obj).is_ok() {
                current = merged;
            } else {
                tracing::warn!(section = section.name(), "ignoring malformed saved settings");
            }
        }
    }
    Ok(current)
}

pub fn save_section(store: &dyn KvStore, section: SetupSection, value: &Value) -> anyhow::Result<()> {
    store.set_json(section.key(), value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSettings {
    pub file_name_prefix: String,
    pub default_out_dir: Option<String>,
}

pub fn export_settings(store: &dyn KvStore) -> anyhow::Result<ExportSettings> {
    let v = load_section(store, SetupSection::Export)?;
    Ok(ExportSettings {
        file_name_prefix: v
            .get("fileNamePrefix")
            .and_then(|v| v.as_str())
            .unwrap_or("Grades_Report")
            .to_string(),
        default_out_dir: v
            .get("defaultOutDir")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    })
}

pub fn lock_on_login(store: &dyn KvStore) -> anyhow::Result<bool> {
    let v = load_section(store, SetupSection::Session)?;
    Ok(v.get("lockOnLogin").and_then(|v| v.as_bool()).unwrap_or(false))
}
