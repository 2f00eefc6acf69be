use std::collections::HashSet;

use serde::Deserialize;
use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{erp_mut, require_session, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{AttendanceRecord, AttendanceStatus};
use crate::reconcile::reconcile;
use crate::store::Collection;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkEntry {
    student_id: String,
    status: AttendanceStatus,
}

fn attendance_list(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let date_filter = params
        .get("date")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let erp = erp_mut(state)?;
    let records: Vec<&AttendanceRecord> = erp
        .data
        .attendance
        .iter()
        .filter(|r| date_filter.as_deref().map_or(true, |d| r.date == d))
        .collect();
    Ok(json!({ "attendance": records }))
}

/// Marks one class roster for one date. Existing records for the affected
/// students on that date are replaced through the reconciler; everything
/// else is preserved, so re-saving the same roster never duplicates.
fn attendance_mark(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session = require_session(state)?;
    let date = required_str(params, "date")?;
    let entries: Vec<MarkEntry> = serde_json::from_value(
        params
            .get("entries")
            .cloned()
            .ok_or_else(|| HandlerErr::new("bad_params", "missing entries"))?,
    )
    .map_err(|_| HandlerErr::new("bad_params", "invalid entries"))?;

    // The affected roster defaults to the entries themselves; passing a wider
    // set clears records for students who got no entry this time.
    let affected: HashSet<String> = match params.get("studentIds").and_then(|v| v.as_array()) {
        Some(arr) => arr
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        None => entries.iter().map(|e| e.student_id.clone()).collect(),
    };

    let batch: Vec<AttendanceRecord> = entries
        .into_iter()
        .map(|e| AttendanceRecord {
            id: format!("{}_{}", date, e.student_id),
            date: date.clone(),
            student_id: e.student_id,
            status: e.status,
            marked_by: session.id.clone(),
            school_id: session.school_id.clone(),
        })
        .collect();

    let erp = erp_mut(state)?;
    let next = reconcile(&erp.data.attendance, &batch, &affected, &date);
    erp.data.attendance = next;
    erp.store.save(Collection::Attendance, &erp.data.attendance);
    Ok(json!({
        "saved": batch.len(),
        "total": erp.data.attendance.len()
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.list" => attendance_list(state, &req.params),
        "attendance.mark" => attendance_mark(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
