//! Cross-process change propagation: applies writes made by other open
//! instances of the same workspace to this process's in-memory collections,
//! and keeps the transient notice list for the UI.

use std::time::Instant;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::ipc::types::AppState;
use crate::store::Collection;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    pub read: bool,
    #[serde(skip)]
    pub created: Instant,
}

pub fn push_notice(state: &mut AppState, title: &str, message: &str, kind: &str) {
    state.notices.insert(
        0,
        Notice {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            message: message.to_string(),
            kind: kind.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            read: false,
            created: Instant::now(),
        },
    );
}

pub fn expire_notices(state: &mut AppState) {
    let ttl = state.notice_ttl;
    state.notices.retain(|n| n.created.elapsed() < ttl);
}

/// One cooperative pump step: drop expired notices, then apply any external
/// writes to the in-memory collections. Returns the keys that were applied.
///
/// Corrupt payloads are logged and skipped; the previous in-memory value is
/// retained. Keys outside the watched `ERP_*` set are ignored. A notice is
/// raised only while a user session is active.
pub fn pump(state: &mut AppState) -> Vec<String> {
    expire_notices(state);

    let Some(erp) = state.erp.as_mut() else {
        return Vec::new();
    };

    let mut applied = Vec::new();
    for change in erp.store.poll_external() {
        let Some(collection) = Collection::from_key(&change.key) else {
            continue;
        };
        // Deletions of a whole collection key are not a sync source; keep
        // the in-memory value until a real replacement arrives.
        let Some(raw) = change.new_value.as_deref() else {
            continue;
        };
        let result = match collection {
            Collection::Staff => apply(raw, &mut erp.data.staff),
            Collection::Students => apply(raw, &mut erp.data.students),
            Collection::Transactions => apply(raw, &mut erp.data.transactions),
            Collection::Leaves => apply(raw, &mut erp.data.leaves),
            Collection::Events => apply(raw, &mut erp.data.events),
            Collection::Attendance => apply(raw, &mut erp.data.attendance),
        };
        match result {
            Ok(()) => applied.push(change.key),
            Err(e) => warn!(
                key = %change.key,
                had_prior = change.old_value.is_some(),
                error = %e,
                "ignoring malformed external payload"
            ),
        }
    }

    if !applied.is_empty() && state.session.is_some() {
        push_notice(
            state,
            "System Update",
            "Data was updated from another session.",
            "info",
        );
    }
    applied
}

fn apply<T: serde::de::DeserializeOwned>(
    raw: &str,
    slot: &mut Vec<T>,
) -> Result<(), serde_json::Error> {
    *slot = serde_json::from_str(raw)?;
    Ok(())
}
