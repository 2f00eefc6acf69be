use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::ok;
use crate::ipc::helpers::{erp_mut, optional_str, require_session, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Transaction, TransactionStatus, TransactionType};
use crate::store::Collection;

fn finance_list(
    state: &mut AppState,
    _params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let erp = erp_mut(state)?;
    Ok(json!({ "transactions": erp.data.transactions }))
}

/// Transactions are append-only: there is no update or delete path.
fn finance_record(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    require_session(state)?;
    let kind_raw = required_str(params, "type")?;
    let kind: TransactionType = serde_json::from_value(json!(kind_raw))
        .map_err(|_| HandlerErr::new("bad_params", "type must be income or expense"))?;
    let category = required_str(params, "category")?;
    let amount = params
        .get("amount")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::new("bad_params", "missing amount"))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(HandlerErr::new(
            "validation_failed",
            "Amount must be non-negative.",
        ));
    }
    let status = match params.get("status") {
        None => TransactionStatus::Completed,
        Some(v) => serde_json::from_value(v.clone())
            .map_err(|_| HandlerErr::new("bad_params", "invalid status"))?,
    };
    let date = optional_str(params, "date")
        .unwrap_or_else(|| chrono::Utc::now().date_naive().to_string());

    let id = format!("tx_{}", Uuid::new_v4());
    let transaction = Transaction {
        id: id.clone(),
        kind,
        category,
        amount,
        date,
        description: optional_str(params, "description").unwrap_or_default(),
        status,
        payment_method: optional_str(params, "paymentMethod"),
    };

    let erp = erp_mut(state)?;
    erp.data.transactions.insert(0, transaction);
    erp.store.save(Collection::Transactions, &erp.data.transactions);
    Ok(json!({ "transactionId": id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "finance.list" => finance_list(state, &req.params),
        "finance.record" => finance_record(state, &req.params),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
