//! HTTP server for the farm ledger.
//!
//! Exposes the feed stock, medicine and flock endpoints under `/api` with
//! JSON bodies. Feed stock routes sit behind the authentication middleware.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use auth::{AllowAllAuth, AuthProvider, Credentials, Identity, StaticTokenAuth};
pub use config::{AuthConfig, MedicineConfig, ServerConfig, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use server::FarmServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use farm_types::RecordId;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> Router {
        router::build_router(AppState::in_memory(), &[])
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn purchase(feed_type: &str, weight: f64, date: &str) -> Value {
        json!({
            "feedType": feed_type,
            "purchaseWeight": weight,
            "purchasePrice": 25,
            "purchaseDate": date,
        })
    }

    fn vaccination(name: &str, cost: f64) -> Value {
        json!({
            "vaccineName": name,
            "vaccinationDate": "2024-02-01",
            "dosage": "1ml",
            "cost": cost,
        })
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn feed_stock_purchases_accumulate() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(purchase("Starter", 100.0, "2024-01-01")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Feed stock added successfully.");
        assert_eq!(body["feedStock"]["currentStock"], 100.0);
        let stock_id = body["feedStock"]["_id"].as_str().unwrap().to_string();

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(json!({
                "feedType": "Starter",
                "purchaseWeight": "50",
                "purchasePrice": "30",
                "purchaseDate": "2024-01-05T00:00:00.000Z",
            })),
        )
        .await;
        let stock = &body["feedStock"];
        assert_eq!(stock["_id"], stock_id.as_str());
        assert_eq!(stock["currentStock"], 150.0);
        assert_eq!(stock["purchaseHistory"].as_array().unwrap().len(), 2);
        assert_eq!(stock["purchaseHistory"][1]["purchaseDate"], "2024-01-05");
        assert_eq!(stock["purchaseHistory"][1]["pricePerUnit"], 30.0);

        let (status, list) = send(&app, Method::GET, "/api/feedStock/getAllFeedStocks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/feedStock/getFeedStockById/{stock_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feedType"], "Starter");
    }

    #[tokio::test]
    async fn feed_stock_history_update_and_delete() {
        let app = app();
        send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(purchase("Grower", 100.0, "2024-01-01")),
        )
        .await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(purchase("Grower", 40.0, "2024-01-02")),
        )
        .await;
        let stock = &body["feedStock"];
        let stock_id = stock["_id"].as_str().unwrap().to_string();
        let first = stock["purchaseHistory"][0]["_id"].as_str().unwrap().to_string();
        let second = stock["purchaseHistory"][1]["_id"].as_str().unwrap().to_string();
        let history_uri = |h: &str| format!("/api/feedStock/{stock_id}/history/{h}");

        let (status, body) = send(
            &app,
            Method::PUT,
            &history_uri(&first),
            Some(json!({ "purchaseWeight": 60 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Feed stock history updated successfully.");
        assert_eq!(body["data"]["purchaseWeight"], 60.0);
        assert_eq!(body["data"]["purchaseDate"], "2024-01-01");
        assert_eq!(body["updatedStock"]["currentStock"], 100.0);
        assert_eq!(body["currentStock"], 100.0);

        let (status, body) = send(&app, Method::DELETE, &history_uri(&second), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Feed stock history deleted successfully.");
        assert_eq!(body["updatedStock"]["currentStock"], 60.0);
        assert_eq!(body["currentStock"], 60.0);

        // Unknown entry leaves the stock as it is.
        let unknown = RecordId::new().to_string();
        let (status, body) = send(&app, Method::DELETE, &history_uri(&unknown), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updatedStock"]["currentStock"], 60.0);

        let (status, body) = send(
            &app,
            Method::PUT,
            &history_uri(&unknown),
            Some(json!({ "purchaseWeight": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Feed stock history item not found.");

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/feedStock/deleteFeedStockById/{stock_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/api/feedStock/getFeedStockById/{stock_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn feed_stock_validation_errors() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(json!({ "feedType": "Starter", "purchaseWeight": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "All Fields are required.");
        assert_eq!(body["error"], body["message"]);

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/feedStock/getFeedStockById/not-an-id",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/feedStock/getFeedStockById/{}", RecordId::new()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Feed stock not found.");
    }

    #[tokio::test]
    async fn medicine_costs_accumulate_and_shrink() {
        let app = app();
        let flock_id = RecordId::new().to_string();
        let add_uri = format!("/api/medicine/addMedicineToFlock/{flock_id}");

        let (status, body) =
            send(&app, Method::POST, &add_uri, Some(vaccination("ND", 10.0))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Vaccination added to flock successfully");
        assert_eq!(body["data"]["totalCost"], 10.0);

        let (_, body) = send(&app, Method::POST, &add_uri, Some(vaccination("IB", 5.0))).await;
        assert_eq!(body["data"]["totalCost"], 15.0);
        let medicine_id = body["data"]["_id"].as_str().unwrap().to_string();
        let first = body["data"]["vaccination"][0]["_id"].as_str().unwrap().to_string();
        let second = body["data"]["vaccination"][1]["_id"].as_str().unwrap().to_string();

        let mut update = vaccination("ND booster", 12.0);
        update["_id"] = json!(first);
        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/medicine/updateVaccinationById/{flock_id}"),
            Some(update),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Vaccination updated successfully");
        assert_eq!(body["data"]["totalCost"], 17.0);
        assert_eq!(body["data"]["vaccination"][0]["_id"], first.as_str());

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/medicine/deleteVaccinationById/{flock_id}/{second}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Vaccination deleted successfully");
        assert_eq!(body["updatedMedicine"]["totalCost"], 12.0);

        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/medicine/deleteVaccinationById/{flock_id}/{second}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Vaccination not found");

        let (status, _) = send(
            &app,
            Method::DELETE,
            &format!("/api/medicine/deleteMedicineById/{medicine_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::GET, "/api/medicine/getAllMedicine", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No medicine records found");
    }

    #[tokio::test]
    async fn medicine_view_populates_registered_flock() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/flock/addFlock",
            Some(json!({ "flockName": "Layers A", "startDate": "2024-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let flock_id = body["data"]["_id"].as_str().unwrap().to_string();

        send(
            &app,
            Method::POST,
            &format!("/api/medicine/addMedicineToFlock/{flock_id}"),
            Some(vaccination("ND", 0.0)),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/medicine/getMedicineByFlockId/{flock_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["flockId"]["flockName"], "Layers A");
        assert_eq!(body["totalCost"], 0.0);

        let orphan = RecordId::new().to_string();
        send(
            &app,
            Method::POST,
            &format!("/api/medicine/addMedicineToFlock/{orphan}"),
            Some(vaccination("IB", 3.0)),
        )
        .await;
        let (status, list) = send(&app, Method::GET, "/api/medicine/getAllMedicine", None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().any(|m| m["flockId"] == orphan.as_str()));

        let (_, flocks) = send(&app, Method::GET, "/api/flock/getAllFlocks", None).await;
        assert_eq!(flocks.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn medicine_validation_errors() {
        let app = app();
        let flock_id = RecordId::new();
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/medicine/addMedicineToFlock/{flock_id}"),
            Some(json!({ "vaccineName": "ND" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "All fields are required");

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/medicine/getMedicineByFlockId/{flock_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Medicine not found for the given flockId");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/medicine/addMedicineToFlock/xyz",
            Some(vaccination("ND", 1.0)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn overflowing_stock_is_bad_request() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(purchase("Starter", 1e308, "2024-01-01")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(purchase("Starter", 1e308, "2024-01-02")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], body["message"]);

        let (_, list) = send(&app, Method::GET, "/api/feedStock/getAllFeedStocks", None).await;
        assert_eq!(list[0]["currentStock"], 1e308);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_requests_keep_every_purchase() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            storage: StorageConfig::Json {
                dir: dir.path().to_path_buf(),
            },
            ..Default::default()
        };
        let app = FarmServer::new(config).unwrap().router();

        let tasks: Vec<_> = (1..=16u32)
            .map(|weight| {
                let app = app.clone();
                tokio::spawn(async move {
                    send(
                        &app,
                        Method::POST,
                        "/api/feedStock/addFeedStock",
                        Some(purchase("Layer mash", f64::from(weight), "2024-04-01")),
                    )
                    .await
                })
            })
            .collect();
        for task in tasks {
            let (status, _) = task.await.unwrap();
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, list) = send(&app, Method::GET, "/api/feedStock/getAllFeedStocks", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["currentStock"], 136.0);
        assert_eq!(list[0]["purchaseHistory"].as_array().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/feedStock/addFeedStock")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn feed_routes_require_token() {
        let state = AppState::in_memory()
            .with_auth(Arc::new(StaticTokenAuth::new(["s3cret".to_string()])));
        let app = router::build_router(state, &[]);

        let (status, body) =
            send(&app, Method::GET, "/api/feedStock/getAllFeedStocks", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authorized, please login");

        let request = Request::builder()
            .uri("/api/feedStock/getAllFeedStocks")
            .header(header::AUTHORIZATION, "Bearer s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = Request::builder()
            .uri("/api/feedStock/getAllFeedStocks")
            .header(header::COOKIE, "token=s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Medicine routes stay open.
        let flock_id = RecordId::new();
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/medicine/addMedicineToFlock/{flock_id}"),
            Some(vaccination("ND", 2.0)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn json_storage_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            storage: StorageConfig::Json {
                dir: dir.path().to_path_buf(),
            },
            ..Default::default()
        };

        let app = FarmServer::new(config.clone()).unwrap().router();
        send(
            &app,
            Method::POST,
            "/api/feedStock/addFeedStock",
            Some(purchase("Finisher", 75.0, "2024-03-01")),
        )
        .await;
        drop(app);

        let app = FarmServer::new(config).unwrap().router();
        let (_, list) = send(&app, Method::GET, "/api/feedStock/getAllFeedStocks", None).await;
        assert_eq!(list[0]["feedType"], "Finisher");
        assert_eq!(list[0]["currentStock"], 75.0);
    }
}
