use serde_json::json;

use crate::auth;
use crate::ipc::error::ok;
use crate::ipc::helpers::{optional_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::sync;

fn auth_login(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let erp = state
        .erp
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))?;

    let username = optional_str(params, "username").unwrap_or_default();
    let password = optional_str(params, "password").unwrap_or_default();
    let school_id = optional_str(params, "schoolId").unwrap_or_default();

    let user = auth::login(&erp.data, &username, &password, &school_id, state.login_delay)
        .map_err(|f| HandlerErr::new(f.code(), f.message()))?;

    // The mock password never leaves the daemon.
    let mut session_user = user;
    session_user.password = None;

    let name = session_user.name.clone();
    state.session = Some(session_user.clone());
    sync::push_notice(
        state,
        "Welcome back",
        &format!("Logged in as {}", name),
        "success",
    );
    Ok(json!({ "user": session_user }))
}

fn auth_logout(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    state.session = None;
    Ok(json!({ "loggedOut": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "auth.login" => auth_login(state, &req.params),
        "auth.logout" => auth_logout(state),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
