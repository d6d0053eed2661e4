//! Request handlers, one module per resource.

pub mod feed;
pub mod flock;
pub mod medicine;

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::response::Json;
use farm_ledger::LedgerResult;
use farm_types::RecordId;
use serde_json::{json, Value};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Liveness probe.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn record_id(path: Result<Path<String>, PathRejection>) -> ServerResult<RecordId> {
    let Path(raw) = path?;
    Ok(RecordId::parse(&raw)?)
}

fn record_id_pair(
    path: Result<Path<(String, String)>, PathRejection>,
) -> ServerResult<(RecordId, RecordId)> {
    let Path((first, second)) = path?;
    Ok((RecordId::parse(&first)?, RecordId::parse(&second)?))
}

/// Run a ledger operation on the blocking pool.
///
/// Ledger writes wait on per-key locks and the JSON backend syncs its file
/// before returning, so they stay off the async workers.
async fn run_ledger<T, F>(state: AppState, op: F) -> ServerResult<T>
where
    F: FnOnce(&AppState) -> LedgerResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || op(&state))
        .await
        .map_err(|e| ServerError::Internal(format!("ledger task failed: {e}")))?;
    Ok(result?)
}
