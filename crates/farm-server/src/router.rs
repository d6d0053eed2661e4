use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_identity;
use crate::handler::{self, feed, flock, medicine};
use crate::state::AppState;

/// Build the `/api` router. Feed stock routes require an authenticated caller.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let feed_routes = Router::new()
        .route("/addFeedStock", post(feed::add_feed_stock))
        .route("/getAllFeedStocks", get(feed::get_all_feed_stocks))
        .route("/getFeedStockById/:id", get(feed::get_feed_stock_by_id))
        .route(
            "/:feedStockId/history/:historyId",
            put(feed::update_feed_stock_history).delete(feed::delete_feed_stock_history),
        )
        .route("/deleteFeedStockById/:id", delete(feed::delete_feed_stock))
        .route_layer(from_fn_with_state(state.clone(), require_identity));

    let medicine_routes = Router::new()
        .route(
            "/addMedicineToFlock/:flockId",
            post(medicine::add_medicine_to_flock),
        )
        .route("/getAllMedicine", get(medicine::get_all_medicine))
        .route(
            "/getMedicineByFlockId/:flockId",
            get(medicine::get_medicine_by_flock_id),
        )
        .route(
            "/updateVaccinationById/:flockId",
            put(medicine::update_vaccination),
        )
        .route(
            "/deleteVaccinationById/:flockId/:vaccinationId",
            delete(medicine::delete_vaccination),
        )
        .route(
            "/deleteMedicineById/:medicineId",
            delete(medicine::delete_medicine),
        );

    let flock_routes = Router::new()
        .route("/addFlock", post(flock::add_flock))
        .route("/getAllFlocks", get(flock::get_all_flocks));

    let api = Router::new()
        .route("/health", get(handler::health_handler))
        .nest("/feedStock", feed_routes)
        .nest("/medicine", medicine_routes)
        .nest("/flock", flock_routes);

    Router::new()
        .nest("/api", api)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow credentialed requests from the configured origins. Unparseable
/// origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    if origins.is_empty() {
        layer
    } else {
        layer.allow_origin(origins).allow_credentials(true)
    }
}
