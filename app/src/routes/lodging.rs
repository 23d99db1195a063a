use axum::{
    Router,
    routing::{get, put},
};

use infra::{
    AppState,
    http::handler::lodging::{
        by_address, by_city, by_country, by_filters, by_id, by_name, by_rating, by_region,
        create, delete, list, update,
    },
};

pub fn create_lodging_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(delete))
        .route("/id/{id}", get(by_id))
        .route("/name/{name}", get(by_name))
        .route("/address/{address}", get(by_address))
        .route("/city/{city}", get(by_city))
        .route("/region/{region}", get(by_region))
        .route("/country/{country}", get(by_country))
        .route("/rating/{rating}", get(by_rating))
        .route("/filters", get(by_filters))
}
