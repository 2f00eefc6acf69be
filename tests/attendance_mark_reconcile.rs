use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
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
    let exe = env!("CARGO_BIN_EXE_erpd");
    let mut child = Command::new(exe)
        .env("ERPD_LOGIN_DELAY_MS", "0")
        .env("ERPD_NOTICE_TTL_MS", "60000")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn erpd");
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
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn open_and_login(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &Path,
) {
    let _ = request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        stdin,
        reader,
        "login",
        "auth.login",
        json!({
            "username": "staff",
            "password": "staffpassword",
            "schoolId": "SHRI_HARI"
        }),
    );
}

fn records_for_date(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    date: &str,
) -> Vec<serde_json::Value> {
    let result = request_ok(
        stdin,
        reader,
        id,
        "attendance.list",
        json!({ "date": date }),
    );
    result
        .get("attendance")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("attendance array")
}

#[test]
fn remarking_a_day_replaces_records_without_duplicates() {
    let workspace = temp_dir("erpd-attendance-remark");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({
            "date": "2024-03-01",
            "entries": [ { "studentId": "st1", "status": "Present" } ]
        }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.mark",
        json!({
            "date": "2024-03-01",
            "entries": [
                { "studentId": "st1", "status": "Absent" },
                { "studentId": "st2", "status": "Present" }
            ]
        }),
    );

    let records = records_for_date(&mut stdin, &mut reader, "3", "2024-03-01");
    assert_eq!(records.len(), 2, "exactly one record per student: {:?}", records);
    let st1: Vec<_> = records
        .iter()
        .filter(|r| r.get("studentId").and_then(|v| v.as_str()) == Some("st1"))
        .collect();
    assert_eq!(st1.len(), 1);
    assert_eq!(st1[0].get("status").and_then(|v| v.as_str()), Some("Absent"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn marking_another_date_preserves_history() {
    let workspace = temp_dir("erpd-attendance-dates");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({
            "date": "2024-03-01",
            "entries": [ { "studentId": "st1", "status": "Present" } ]
        }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.mark",
        json!({
            "date": "2024-03-02",
            "entries": [ { "studentId": "st1", "status": "Late" } ]
        }),
    );

    let all = request_ok(&mut stdin, &mut reader, "3", "attendance.list", json!({}));
    let records = all
        .get("attendance")
        .and_then(|v| v.as_array())
        .expect("attendance array");
    assert_eq!(records.len(), 2);

    let day_one = records_for_date(&mut stdin, &mut reader, "4", "2024-03-01");
    assert_eq!(day_one.len(), 1);
    assert_eq!(
        day_one[0].get("status").and_then(|v| v.as_str()),
        Some("Present")
    );

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn wider_roster_clears_students_without_entries() {
    let workspace = temp_dir("erpd-attendance-roster");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "attendance.mark",
        json!({
            "date": "2024-03-01",
            "entries": [
                { "studentId": "st1", "status": "Present" },
                { "studentId": "st2", "status": "Present" }
            ]
        }),
    );
    // st2 is in the roster but has no entry this time: their record for the
    // day goes away, st1's is replaced.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "attendance.mark",
        json!({
            "date": "2024-03-01",
            "studentIds": ["st1", "st2"],
            "entries": [ { "studentId": "st1", "status": "Excused" } ]
        }),
    );

    let records = records_for_date(&mut stdin, &mut reader, "3", "2024-03-01");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("studentId").and_then(|v| v.as_str()),
        Some("st1")
    );
    assert_eq!(
        records[0].get("status").and_then(|v| v.as_str()),
        Some("Excused")
    );

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn attendance_survives_a_daemon_restart() {
    let workspace = temp_dir("erpd-attendance-restart");
    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        open_and_login(&mut stdin, &mut reader, &workspace);
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "attendance.mark",
            json!({
                "date": "2024-03-01",
                "entries": [ { "studentId": "st3", "status": "Late" } ]
            }),
        );
        drop(stdin);
        let _ = child.wait();
    }

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);
    let records = records_for_date(&mut stdin, &mut reader, "2", "2024-03-01");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("studentId").and_then(|v| v.as_str()),
        Some("st3")
    );
    assert_eq!(
        records[0].get("markedBy").and_then(|v| v.as_str()),
        Some("u2")
    );

    let _ = std::fs::remove_dir_all(workspace);
}
