use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::ok;
use crate::ipc::helpers::{erp_mut, optional_str, require_session, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{CalendarEvent, EventType};
use crate::store::Collection;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventPatch {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    #[serde(rename = "type")]
    kind: Option<EventType>,
    start_time: Option<String>,
    end_time: Option<String>,
}

fn events_list(
    state: &mut AppState,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let erp = erp_mut(state)?;
    Ok(json!({ "events": erp.data.events }))
}

fn events_create(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let title = required_str(params, "title")?;
    let date = required_str(params, "date")?;
    let kind_raw = required_str(params, "type")?;
    let kind: EventType = serde_json::from_value(json!(kind_raw))
        .map_err(|_| HandlerErr::new("bad_params", "unknown event type"))?;

    let id = format!("evt_{}", Uuid::new_v4());
    let event = CalendarEvent {
        id: id.clone(),
        title,
        description: optional_str(params, "description").unwrap_or_default(),
        date,
        kind,
        start_time: optional_str(params, "startTime"),
        end_time: optional_str(params, "endTime"),
    };

    let erp = erp_mut(state)?;
    erp.data.events.push(event);
    erp.store.save(Collection::Events, &erp.data.events);
    Ok(json!({ "eventId": id }))
}

fn events_update(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let event_id = required_str(params, "eventId")?;
    let patch: EventPatch =
        serde_json::from_value(params.get("patch").cloned().unwrap_or_else(|| json!({})))
            .map_err(|_| HandlerErr::new("bad_params", "invalid patch"))?;

    let erp = erp_mut(state)?;
    let event = erp
        .data
        .events
        .iter_mut()
        .find(|e| e.id == event_id)
        .ok_or_else(|| HandlerErr::new("not_found", "event not found"))?;

    if let Some(v) = patch.title {
        event.title = v;
    }
    if let Some(v) = patch.description {
        event.description = v;
    }
    if let Some(v) = patch.date {
        event.date = v;
    }
    if let Some(v) = patch.kind {
        event.kind = v;
    }
    if let Some(v) = patch.start_time {
        event.start_time = Some(v);
    }
    if let Some(v) = patch.end_time {
        event.end_time = Some(v);
    }

    erp.store.save(Collection::Events, &erp.data.events);
    Ok(json!({ "updated": true }))
}

fn events_delete(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let event_id = required_str(params, "eventId")?;
    let erp = erp_mut(state)?;
    let before = erp.data.events.len();
    erp.data.events.retain(|e| e.id != event_id);
    if erp.data.events.len() == before {
        return Err(HandlerErr::new("not_found", "event not found"));
    }
    erp.store.save(Collection::Events, &erp.data.events);
    Ok(json!({ "deleted": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "events.list" => events_list(state, &req.params),
        "events.create" => events_create(state, &req.params),
        "events.update" => events_update(state, &req.params),
        "events.delete" => events_delete(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
