use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use farm_ledger::{AddPurchase, FeedStock, UpdatePurchase};
use serde_json::{json, Value};

use super::{record_id, record_id_pair, run_ledger};
use crate::error::ServerResult;
use crate::state::AppState;

pub async fn add_feed_stock(
    State(state): State<AppState>,
    body: Result<Json<AddPurchase>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let Json(request) = body?;
    let stock = run_ledger(state, move |s| s.feed.add_purchase(request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Feed stock added successfully.",
            "feedStock": stock,
        })),
    ))
}

pub async fn get_all_feed_stocks(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<FeedStock>>> {
    Ok(Json(run_ledger(state, |s| s.feed.list()).await?))
}

pub async fn get_feed_stock_by_id(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<FeedStock>> {
    let id = record_id(path)?;
    Ok(Json(run_ledger(state, move |s| s.feed.get(&id)).await?))
}

/// Responds with the edited entry, the full record and its `currentStock`.
pub async fn update_feed_stock_history(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    body: Result<Json<UpdatePurchase>, JsonRejection>,
) -> ServerResult<Json<Value>> {
    let (stock_id, history_id) = record_id_pair(path)?;
    let Json(request) = body?;
    let update = run_ledger(state, move |s| {
        s.feed.update_history(&stock_id, &history_id, request)
    })
    .await?;
    Ok(Json(json!({
        "message": "Feed stock history updated successfully.",
        "data": update.entry,
        "currentStock": update.stock.current_stock,
        "updatedStock": update.stock,
    })))
}

pub async fn delete_feed_stock_history(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ServerResult<Json<Value>> {
    let (stock_id, history_id) = record_id_pair(path)?;
    let removal = run_ledger(state, move |s| {
        s.feed.delete_history(&stock_id, &history_id)
    })
    .await?;
    Ok(Json(json!({
        "message": "Feed stock history deleted successfully.",
        "currentStock": removal.stock.current_stock,
        "updatedStock": removal.stock,
    })))
}

pub async fn delete_feed_stock(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<Value>> {
    let id = record_id(path)?;
    run_ledger(state, move |s| s.feed.delete(&id)).await?;
    Ok(Json(json!({ "message": "Feed stock deleted successfully." })))
}
