use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown error")
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

#[test]
fn roster_rejects_duplicates_and_blank_fields() {
    let workspace = temp_dir("gradebook-roster");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "2", "auth.login", json!({ "password": "pw" }));

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "studentId": " 2024001 ", "firstName": "Ana", "lastName": "Reyes" }),
    );
    assert_eq!(first["student"]["studentId"], "2024001");
    let first_id = first["student"]["id"].as_str().expect("id").to_string();

    let dup = request(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "studentId": "2024001", "firstName": "Ben", "lastName": "Cruz" }),
    );
    assert_eq!(error_code(&dup), "duplicate_id");
    assert_eq!(dup["error"]["message"], "Student ID already exists: 2024001");

    let blank = request(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "studentId": "2024002", "firstName": "   ", "lastName": "Cruz" }),
    );
    assert_eq!(error_code(&blank), "validation_failed");
    assert_eq!(blank["error"]["message"], "Please fill in all fields");

    let missing = request(
        &mut stdin,
        &mut reader,
        "6",
        "students.create",
        json!({ "studentId": "2024002" }),
    );
    assert_eq!(error_code(&missing), "validation_failed");

    let second = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.create",
        json!({ "studentId": "2024002", "firstName": "Ben", "lastName": "Cruz" }),
    );
    let second_id = second["student"]["id"].as_str().expect("id").to_string();
    assert_ne!(first_id, second_id);

    let listed = request_ok(&mut stdin, &mut reader, "8", "students.list", json!({}));
    let ids: Vec<&str> = listed["students"]
        .as_array()
        .expect("students")
        .iter()
        .filter_map(|s| s["studentId"].as_str())
        .collect();
    assert_eq!(ids, vec!["2024001", "2024002"]);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn deleting_a_student_keeps_their_grade_record() {
    let workspace = temp_dir("gradebook-roster-delete");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(&mut stdin, &mut reader, "2", "auth.login", json!({ "password": "pw" }));
    let created = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "students.create",
        json!({ "studentId": "2024001", "firstName": "Ana", "lastName": "Reyes" }),
    );
    let id = created["student"]["id"].as_str().expect("id").to_string();
    let _ = request_ok(&mut stdin, &mut reader, "4", "grades.unlock", json!({ "password": "pw" }));
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "grades.updateScore",
        json!({ "studentId": id, "category": "exam", "componentId": "1", "value": 90 }),
    );

    let deleted = request_ok(&mut stdin, &mut reader, "6", "students.delete", json!({ "id": id }));
    assert_eq!(deleted["id"], id.as_str());

    let listed = request_ok(&mut stdin, &mut reader, "7", "students.list", json!({}));
    assert_eq!(listed["students"].as_array().map(|s| s.len()), Some(0));

    let grade = request_ok(&mut stdin, &mut reader, "8", "grades.get", json!({ "studentId": id }));
    assert_eq!(grade["grade"]["examGrades"]["1"].as_f64(), Some(90.0));

    // Orphaned records stay out of the report.
    let model = request_ok(&mut stdin, &mut reader, "9", "reports.model", json!({}));
    assert_eq!(model["rows"].as_array().map(|r| r.len()), Some(0));

    let again = request(&mut stdin, &mut reader, "10", "students.delete", json!({ "id": id }));
    assert_eq!(error_code(&again), "not_found");

    // The student ID is free to reuse once removed.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "students.create",
        json!({ "studentId": "2024001", "firstName": "Ana", "lastName": "Reyes" }),
    );

    let _ = std::fs::remove_dir_all(workspace);
}
