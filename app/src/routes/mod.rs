pub mod lodging;
pub mod place;
pub mod remote_lodging;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use infra::{AppState, LocationsState, http::handler::health_check};

use crate::routes::{
    lodging::create_lodging_routes, place::create_place_routes,
    remote_lodging::create_remote_lodging_routes,
};

/// 場所サービスのルーターを作成する。
///
/// 宿泊施設の照会は、サーキットブレーカーを介して宿泊施設サービスに転送する。
pub fn create_locations_router(state: LocationsState) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .nest("/places", create_place_routes())
        .nest("/lodgings", create_remote_lodging_routes())
        .route(
            "/circuit-breakers",
            get(infra::http::handler::remote_lodging::circuit_breakers),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 宿泊施設サービスのルーターを作成する。
pub fn create_accommodations_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health-check", get(health_check))
        .nest("/lodgings", create_lodging_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
