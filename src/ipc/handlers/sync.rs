use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};

/// The router already ran the sync pump for this request; this just reports
/// what it applied plus the currently visible notices.
fn sync_poll(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({
        "applied": state.last_sync,
        "notices": state.notices,
    }))
}

fn notices_dismiss(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let notice_id = required_str(params, "noticeId")?;
    let before = state.notices.len();
    state.notices.retain(|n| n.id != notice_id);
    Ok(json!({ "dismissed": state.notices.len() != before }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "sync.poll" => sync_poll(state),
        "notices.dismiss" => notices_dismiss(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
