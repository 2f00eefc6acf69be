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

fn error_code(resp: &serde_json::Value) -> &str {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn open_and_login(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, workspace: &Path) {
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
            "username": "admin",
            "password": "adminpassword",
            "schoolId": "SHRI_HARI"
        }),
    );
}

fn transactions(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
) -> Vec<serde_json::Value> {
    let result = request_ok(stdin, reader, id, "finance.list", json!({}));
    result
        .get("transactions")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("transactions array")
}

#[test]
fn recording_a_transaction_prepends_with_defaults() {
    let workspace = temp_dir("erpd-finance-record");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);

    let before = transactions(&mut stdin, &mut reader, "1").len();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "finance.record",
        json!({
            "type": "expense",
            "category": "Lab Equipment",
            "description": "microscopes",
            "amount": 1250.5
        }),
    );

    let txs = transactions(&mut stdin, &mut reader, "3");
    assert_eq!(txs.len(), before + 1);
    let newest = &txs[0];
    assert_eq!(newest.get("type").and_then(|v| v.as_str()), Some("expense"));
    assert_eq!(newest.get("amount").and_then(|v| v.as_f64()), Some(1250.5));
    // Status and date are filled in when omitted.
    assert_eq!(
        newest.get("status").and_then(|v| v.as_str()),
        Some("Completed")
    );
    assert!(newest.get("date").and_then(|v| v.as_str()).is_some());

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn negative_and_non_finite_amounts_are_rejected() {
    let workspace = temp_dir("erpd-finance-invalid");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);

    let before = transactions(&mut stdin, &mut reader, "1").len();
    let resp = request(
        &mut stdin,
        &mut reader,
        "2",
        "finance.record",
        json!({ "type": "income", "category": "Fees", "amount": -50.0 }),
    );
    assert_eq!(error_code(&resp), "validation_failed");

    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "finance.record",
        json!({ "type": "income", "category": "Fees" }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    assert_eq!(transactions(&mut stdin, &mut reader, "4").len(), before);

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn bulk_department_change_touches_only_the_named_staff() {
    let workspace = temp_dir("erpd-staff-bulk-dept");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "staff.bulkSetDepartment",
        json!({ "staffIds": ["s1", "s2"], "department": "Arts" }),
    );
    assert_eq!(result.get("updated").and_then(|v| v.as_u64()), Some(2));

    let result = request_ok(&mut stdin, &mut reader, "2", "staff.list", json!({}));
    let staff = result.get("staff").and_then(|v| v.as_array()).expect("staff");
    let dept_of = |id: &str| {
        staff
            .iter()
            .find(|u| u.get("id").and_then(|v| v.as_str()) == Some(id))
            .and_then(|u| u.get("department"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };
    assert_eq!(dept_of("s1").as_deref(), Some("Arts"));
    assert_eq!(dept_of("s2").as_deref(), Some("Arts"));
    assert_eq!(dept_of("s3").as_deref(), Some("Sports"));

    // Missing department is a parameter error, not a silent no-op.
    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "staff.bulkSetDepartment",
        json!({ "staffIds": ["s1"] }),
    );
    assert_eq!(error_code(&resp), "bad_params");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn bulk_status_and_bulk_delete_cover_only_the_named_staff() {
    let workspace = temp_dir("erpd-staff-bulk");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    open_and_login(&mut stdin, &mut reader, &workspace);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "staff.bulkSetStatus",
        json!({ "staffIds": ["s1", "s3"], "status": "On Leave" }),
    );
    assert_eq!(result.get("updated").and_then(|v| v.as_u64()), Some(2));

    let result = request_ok(&mut stdin, &mut reader, "2", "staff.list", json!({}));
    let staff = result.get("staff").and_then(|v| v.as_array()).expect("staff");
    let status_of = |id: &str| {
        staff
            .iter()
            .find(|u| u.get("id").and_then(|v| v.as_str()) == Some(id))
            .and_then(|u| u.get("status"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };
    assert_eq!(status_of("s1").as_deref(), Some("On Leave"));
    assert_eq!(status_of("s3").as_deref(), Some("On Leave"));
    assert_eq!(status_of("s4").as_deref(), Some("Inactive"));

    // Unknown ids are skipped, not an error.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "staff.bulkDelete",
        json!({ "staffIds": ["s1", "s3", "missing"] }),
    );
    assert_eq!(result.get("deleted").and_then(|v| v.as_u64()), Some(2));

    let result = request_ok(&mut stdin, &mut reader, "4", "staff.list", json!({}));
    let ids: Vec<&str> = result
        .get("staff")
        .and_then(|v| v.as_array())
        .expect("staff")
        .iter()
        .filter_map(|u| u.get("id").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(ids, vec!["s2", "s4"]);

    let _ = std::fs::remove_dir_all(workspace);
}
