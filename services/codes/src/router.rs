use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use codedrop_core::health::{healthz, readyz};
use codedrop_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    code::{clear_codes, distribute_code, get_remaining, reset_codes, upload_codes},
    usage::{get_my_usage, get_usage},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<AppState>))
        // Codes
        .route("/codes", post(upload_codes).delete(clear_codes))
        .route("/codes/distribute", post(distribute_code))
        .route("/codes/remaining", get(get_remaining))
        .route("/codes/reset", post(reset_codes))
        // Usage
        .route("/codes/usage", get(get_usage))
        .route("/codes/usage/@me", get(get_my_usage))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
