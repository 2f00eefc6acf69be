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
struct StudentPatch {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    grade: Option<String>,
    section: Option<String>,
    roll_number: Option<String>,
    guardian_name: Option<String>,
    guardian_phone: Option<String>,
    address: Option<String>,
    dob: Option<String>,
    blood_group: Option<String>,
    status: Option<UserStatus>,
    password: Option<String>,
}

fn students_list(
    state: &mut AppState,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let erp = erp_mut(state)?;
    Ok(json!({ "students": erp.data.students }))
}

fn students_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let session = require_session(state)?;
    let name = required_str(params, "name")?;
    let email = optional_str(params, "email");

    let id = Uuid::new_v4().to_string();
    let username = email
        .as_deref()
        .and_then(|e| e.split('@').next())
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .unwrap_or_else(|| format!("st_{}", &id[..8]));

    let mut student = User::new(&id, &username, &name, Role::Student, &session.school_id);
    student.email = email;
    student.phone = optional_str(params, "phone");
    student.grade = optional_str(params, "grade");
    student.section = optional_str(params, "section");
    student.roll_number = optional_str(params, "rollNumber");
    student.guardian_name = optional_str(params, "guardianName");
    student.guardian_phone = optional_str(params, "guardianPhone");
    student.address = optional_str(params, "address");
    student.dob = optional_str(params, "dob");
    student.blood_group = optional_str(params, "bloodGroup");

    let erp = erp_mut(state)?;
    erp.data.students.insert(0, student);
    erp.store.save(Collection::Students, &erp.data.students);
    Ok(json!({ "studentId": id }))
}

fn students_update(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let student_id = required_str(params, "studentId")?;
    let patch: StudentPatch =
        serde_json::from_value(params.get("patch").cloned().unwrap_or_else(|| json!({})))
            .map_err(|_| HandlerErr::new("bad_params", "invalid patch"))?;

    let erp = erp_mut(state)?;
    let student = erp
        .data
        .students
        .iter_mut()
        .find(|u| u.id == student_id)
        .ok_or_else(|| HandlerErr::new("not_found", "student not found"))?;

    if let Some(v) = patch.name {
        student.name = v;
    }
    if let Some(v) = patch.email {
        student.email = Some(v);
    }
    if let Some(v) = patch.phone {
        student.phone = Some(v);
    }
    if let Some(v) = patch.grade {
        student.grade = Some(v);
    }
    if let Some(v) = patch.section {
        student.section = Some(v);
    }
    if let Some(v) = patch.roll_number {
        student.roll_number = Some(v);
    }
    if let Some(v) = patch.guardian_name {
        student.guardian_name = Some(v);
    }
    if let Some(v) = patch.guardian_phone {
        student.guardian_phone = Some(v);
    }
    if let Some(v) = patch.address {
        student.address = Some(v);
    }
    if let Some(v) = patch.dob {
        student.dob = Some(v);
    }
    if let Some(v) = patch.blood_group {
        student.blood_group = Some(v);
    }
    if let Some(v) = patch.status {
        student.status = Some(v);
    }
    if let Some(v) = patch.password {
        student.password = Some(v);
    }

    erp.store.save(Collection::Students, &erp.data.students);
    Ok(json!({ "updated": true }))
}

fn students_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let student_id = required_str(params, "studentId")?;
    let erp = erp_mut(state)?;
    let before = erp.data.students.len();
    erp.data.students.retain(|u| u.id != student_id);
    if erp.data.students.len() == before {
        return Err(HandlerErr::new("not_found", "student not found"));
    }
    erp.store.save(Collection::Students, &erp.data.students);
    Ok(json!({ "deleted": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => students_list(state, &req.params),
        "students.create" => students_create(state, &req.params),
        "students.update" => students_update(state, &req.params),
        "students.delete" => students_delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
