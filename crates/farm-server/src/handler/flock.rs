use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use farm_ledger::{Flock, RegisterFlock};
use serde_json::{json, Value};

use super::run_ledger;
use crate::error::ServerResult;
use crate::state::AppState;

pub async fn add_flock(
    State(state): State<AppState>,
    body: Result<Json<RegisterFlock>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let Json(request) = body?;
    let flock = run_ledger(state, move |s| s.flocks.register(request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Flock added successfully",
            "data": flock,
        })),
    ))
}

pub async fn get_all_flocks(State(state): State<AppState>) -> ServerResult<Json<Vec<Flock>>> {
    Ok(Json(run_ledger(state, |s| s.flocks.list()).await?))
}
