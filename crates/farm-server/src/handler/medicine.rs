use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use farm_ledger::{AddVaccination, MedicineView, UpdateVaccination};
use serde_json::{json, Value};

use super::{record_id, record_id_pair, run_ledger};
use crate::error::ServerResult;
use crate::state::AppState;

pub async fn add_medicine_to_flock(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<AddVaccination>, JsonRejection>,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let flock_id = record_id(path)?;
    let Json(request) = body?;
    let medicine = run_ledger(state, move |s| {
        s.medicine.add_vaccination(&flock_id, request)
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Vaccination added to flock successfully",
            "data": medicine,
        })),
    ))
}

pub async fn get_all_medicine(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<MedicineView>>> {
    Ok(Json(run_ledger(state, |s| s.medicine.list()).await?))
}

pub async fn get_medicine_by_flock_id(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<MedicineView>> {
    let flock_id = record_id(path)?;
    let view = run_ledger(state, move |s| s.medicine.get_by_flock(&flock_id)).await?;
    Ok(Json(view))
}

pub async fn update_vaccination(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateVaccination>, JsonRejection>,
) -> ServerResult<Json<Value>> {
    let flock_id = record_id(path)?;
    let Json(request) = body?;
    let medicine = run_ledger(state, move |s| {
        s.medicine.update_vaccination(&flock_id, request)
    })
    .await?;
    Ok(Json(json!({
        "message": "Vaccination updated successfully",
        "data": medicine,
    })))
}

pub async fn delete_vaccination(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ServerResult<Json<Value>> {
    let (flock_id, vaccination_id) = record_id_pair(path)?;
    let medicine = run_ledger(state, move |s| {
        s.medicine.delete_vaccination(&flock_id, &vaccination_id)
    })
    .await?;
    Ok(Json(json!({
        "message": "Vaccination deleted successfully",
        "updatedMedicine": medicine,
    })))
}

pub async fn delete_medicine(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<Json<Value>> {
    let medicine_id = record_id(path)?;
    run_ledger(state, move |s| s.medicine.delete(&medicine_id)).await?;
    Ok(Json(json!({ "message": "Medicine deleted successfully" })))
}
