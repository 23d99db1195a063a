use axum::{
    Router,
    routing::{get, put},
};

use infra::{
    LocationsState,
    http::handler::place::{
        by_country, by_id, by_name, by_region, create, delete, list, lodgings, search, update,
    },
};

pub fn create_place_routes() -> Router<LocationsState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(delete))
        .route("/id/{id}", get(by_id))
        .route("/id/{id}/lodgings", get(lodgings))
        .route("/name/{name}", get(by_name))
        .route("/region/{region}", get(by_region))
        .route("/country/{country}", get(by_country))
        .route("/search", get(search))
}
