use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::ok;
use crate::ipc::helpers::{erp_mut, optional_str, require_session, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{LeaveRequest, LeaveStatus, LeaveType};
use crate::store::Collection;

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, HandlerErr> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| HandlerErr::new("bad_params", format!("{} must be YYYY-MM-DD", field)))
}

fn leaves_list(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let user_filter = optional_str(params, "userId");
    let erp = erp_mut(state)?;
    let leaves: Vec<&LeaveRequest> = erp
        .data
        .leaves
        .iter()
        .filter(|l| user_filter.as_deref().map_or(true, |uid| l.user_id == uid))
        .collect();
    Ok(json!({ "leaves": leaves }))
}

fn leaves_apply(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session = require_session(state)?;
    let kind_raw = required_str(params, "type")?;
    let kind: LeaveType = serde_json::from_value(json!(kind_raw))
        .map_err(|_| HandlerErr::new("bad_params", "unknown leave type"))?;
    let start_raw = required_str(params, "startDate")?;
    let end_raw = required_str(params, "endDate")?;
    let reason = required_str(params, "reason")?;

    // Validated before any record is created; the store stays untouched on
    // failure.
    let start = parse_date(&start_raw, "startDate")?;
    let end = parse_date(&end_raw, "endDate")?;
    if end < start {
        return Err(HandlerErr::new(
            "validation_failed",
            "End date cannot be before start date.",
        ));
    }

    let id = format!("l_{}", Uuid::new_v4());
    let request = LeaveRequest {
        id: id.clone(),
        user_id: session.id,
        kind,
        start_date: start_raw,
        end_date: end_raw,
        reason,
        status: LeaveStatus::Pending,
        applied_on: chrono::Utc::now().date_naive().to_string(),
    };

    let erp = erp_mut(state)?;
    erp.data.leaves.insert(0, request);
    erp.store.save(Collection::Leaves, &erp.data.leaves);
    Ok(json!({ "leaveId": id }))
}

fn leaves_set_status(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let leave_id = required_str(params, "leaveId")?;
    let status_raw = required_str(params, "status")?;
    let status: LeaveStatus = serde_json::from_value(json!(status_raw))
        .map_err(|_| HandlerErr::new("bad_params", "unknown status"))?;
    if status == LeaveStatus::Pending {
        return Err(HandlerErr::new(
            "bad_params",
            "status must be Approved or Rejected",
        ));
    }

    let erp = erp_mut(state)?;
    let leave = erp
        .data
        .leaves
        .iter_mut()
        .find(|l| l.id == leave_id)
        .ok_or_else(|| HandlerErr::new("not_found", "leave request not found"))?;
    if leave.status != LeaveStatus::Pending {
        return Err(HandlerErr::new(
            "invalid_transition",
            "only pending requests can be decided",
        ));
    }
    leave.status = status;

    erp.store.save(Collection::Leaves, &erp.data.leaves);
    Ok(json!({ "updated": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "leaves.list" => leaves_list(state, &req.params),
        "leaves.apply" => leaves_apply(state, &req.params),
        "leaves.setStatus" => leaves_set_status(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
