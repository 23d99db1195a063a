use axum::{Router, routing::get};

use infra::{
    LocationsState,
    http::handler::remote_lodging::{by_city, by_country, by_filters, by_id, by_state},
};

pub fn create_remote_lodging_routes() -> Router<LocationsState> {
    Router::new()
        .route("/by-id/{id}", get(by_id))
        .route("/by-city/{city}", get(by_city))
        .route("/by-state/{region}", get(by_state))
        .route("/by-country/{country}", get(by_country))
        .route("/by-filters", get(by_filters))
}
