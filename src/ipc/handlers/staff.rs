use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::ok;
use crate::ipc::helpers::{erp_mut, optional_str, require_session, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Role, User, UserStatus};
use crate::store::Collection;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StaffPatch {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    department: Option<String>,
    join_date: Option<String>,
    status: Option<UserStatus>,
    password: Option<String>,
}

fn parse_status(params: &serde_json::Value) -> Result<Option<UserStatus>, HandlerErr> {
    match params.get("status") {
        None => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|_| HandlerErr::new("bad_params", "invalid status")),
    }
}

fn staff_list(state: &mut AppState, _params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let erp = erp_mut(state)?;
    Ok(json!({ "staff": erp.data.staff }))
}

fn staff_create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let session = require_session(state)?;
    let name = required_str(params, "name")?;
    let status = parse_status(params)?.unwrap_or(UserStatus::Active);
    let email = optional_str(params, "email");

    let id = Uuid::new_v4().to_string();
    let username = email
        .as_deref()
        .and_then(|e| e.split('@').next())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .unwrap_or_else(|| format!("user_{}", &id[..8]));

    let mut member = User::new(&id, &username, &name, Role::Staff, &session.school_id);
    member.email = email;
    member.phone = optional_str(params, "phone");
    member.department = optional_str(params, "department");
    member.join_date = optional_str(params, "joinDate");
    member.status = Some(status);

    let erp = erp_mut(state)?;
    erp.data.staff.insert(0, member);
    erp.store.save(Collection::Staff, &erp.data.staff);
    Ok(json!({ "staffId": id }))
}

fn staff_update(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let staff_id = required_str(params, "staffId")?;
    let patch: StaffPatch =
        serde_json::from_value(params.get("patch").cloned().unwrap_or_else(|| json!({})))
            .map_err(|_| HandlerErr::new("bad_params", "invalid patch"))?;

    let erp = erp_mut(state)?;
    let member = erp
        .data
        .staff
        .iter_mut()
        .find(|u| u.id == staff_id)
        .ok_or_else(|| HandlerErr::new("not_found", "staff member not found"))?;

    if let Some(v) = patch.name {
        member.name = v;
    }
    if let Some(v) = patch.email {
        member.email = Some(v);
    }
    if let Some(v) = patch.phone {
        member.phone = Some(v);
    }
    if let Some(v) = patch.department {
        member.department = Some(v);
    }
    if let Some(v) = patch.join_date {
        member.join_date = Some(v);
    }
    if let Some(v) = patch.status {
        member.status = Some(v);
    }
    if let Some(v) = patch.password {
        member.password = Some(v);
    }

    erp.store.save(Collection::Staff, &erp.data.staff);
    Ok(json!({ "updated": true }))
}

fn staff_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let staff_id = required_str(params, "staffId")?;
    let erp = erp_mut(state)?;
    let before = erp.data.staff.len();
    erp.data.staff.retain(|u| u.id != staff_id);
    if erp.data.staff.len() == before {
        return Err(HandlerErr::new("not_found", "staff member not found"));
    }
    erp.store.save(Collection::Staff, &erp.data.staff);
    Ok(json!({ "deleted": true }))
}

fn ids_param(params: &serde_json::Value, key: &str) -> Result<Vec<String>, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        })
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

fn staff_bulk_set_status(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let ids = ids_param(params, "staffIds")?;
    let status = parse_status(params)?
        .ok_or_else(|| HandlerErr::new("bad_params", "missing status"))?;
    let erp = erp_mut(state)?;
    let mut updated = 0;
    for member in erp.data.staff.iter_mut() {
        if ids.contains(&member.id) {
            member.status = Some(status);
            updated += 1;
        }
    }
    erp.store.save(Collection::Staff, &erp.data.staff);
    Ok(json!({ "updated": updated }))
}

fn staff_bulk_set_department(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let ids = ids_param(params, "staffIds")?;
    let department = required_str(params, "department")?;
    let erp = erp_mut(state)?;
    let mut updated = 0;
    for member in erp.data.staff.iter_mut() {
        if ids.contains(&member.id) {
            member.department = Some(department.clone());
            updated += 1;
        }
    }
    erp.store.save(Collection::Staff, &erp.data.staff);
    Ok(json!({ "updated": updated }))
}

fn staff_bulk_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let ids = ids_param(params, "staffIds")?;
    let erp = erp_mut(state)?;
    let before = erp.data.staff.len();
    erp.data.staff.retain(|u| !ids.contains(&u.id));
    let removed = before - erp.data.staff.len();
    erp.store.save(Collection::Staff, &erp.data.staff);
    Ok(json!({ "deleted": removed }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "staff.list" => staff_list(state, &req.params),
        "staff.create" => staff_create(state, &req.params),
        "staff.update" => staff_update(state, &req.params),
        "staff.delete" => staff_delete(state, &req.params),
        "staff.bulkSetStatus" => staff_bulk_set_status(state, &req.params),
        "staff.bulkSetDepartment" => staff_bulk_set_department(state, &req.params),
        "staff.bulkDelete" => staff_bulk_delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
