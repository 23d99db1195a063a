use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::helpers::{ResponseParts, split_response};
use crate::test_case::{InsertTestData, TestCase};

#[tokio::test]
#[ignore]
async fn lodgings_of_a_place_come_from_the_accommodations_service() {
    let accommodations = TestCase::accommodations(InsertTestData::Yes).await;
    let locations = TestCase::locations(&accommodations.origin(), InsertTestData::Yes).await;
    let response = accommodations
        .post(
            "/lodgings",
            &json!({
                "name": "Bayside Inn",
                "address": "9 Bay St",
                "rating": 3,
                "placeName": "Miami Beach",
                "region": "Florida",
                "country": "USA"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The first seeded place is Miami, and Miami Beach is a different place
    let ResponseParts { status_code, body } =
        split_response(locations.get("/places/id/1/lodgings").await).await;
    assert_eq!(status_code, StatusCode::OK);
    let mut names = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, ["Biscayne Bay Inn", "Ocean Drive Resort"]);

    let response = locations.get("/places/id/9999/lodgings").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    locations.end().await;
    accommodations.end().await;
}

#[tokio::test]
#[ignore]
async fn lodging_views_are_relayed_verbatim() {
    let accommodations = TestCase::accommodations(InsertTestData::Yes).await;
    let locations = TestCase::locations(&accommodations.origin(), InsertTestData::No).await;

    let ResponseParts { body: expected, .. } =
        split_response(accommodations.get("/lodgings/id/1").await).await;
    let ResponseParts { status_code, body } =
        split_response(locations.get("/lodgings/by-id/1").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body, expected);

    let ResponseParts { body, .. } =
        split_response(locations.get("/lodgings/by-state/Ontario").await).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Queen Street Hostel");

    let ResponseParts { body, .. } = split_response(
        locations
            .get("/lodgings/by-filters?country=USA&rating=5")
            .await,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    // A downstream "not found" is an empty answer, not a failure
    let ResponseParts { status_code, body } =
        split_response(locations.get("/lodgings/by-id/9999").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body, Value::Null);
    let ResponseParts { body, .. } =
        split_response(locations.get("/lodgings/by-city/Atlantis").await).await;
    assert_eq!(body, json!([]));

    let ResponseParts { body, .. } = split_response(locations.get("/circuit-breakers").await).await;
    assert!(
        body.as_array()
            .unwrap()
            .iter()
            .all(|s| s["state"] == "closed" && s["failedCalls"] == 0)
    );

    locations.end().await;
    accommodations.end().await;
}

#[tokio::test]
#[ignore]
async fn unavailable_accommodations_service_degrades_to_fallbacks() {
    let locations = TestCase::locations("http://127.0.0.1:9", InsertTestData::Yes).await;

    // The default minimum number of calls is 5
    for _ in 0..6 {
        let ResponseParts { status_code, body } =
            split_response(locations.get("/lodgings/by-city/Miami").await).await;
        assert_eq!(status_code, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
    // Lodgings of a place share the by-city circuit
    let ResponseParts { status_code, body } =
        split_response(locations.get("/places/id/1/lodgings").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body, json!([]));

    let ResponseParts { body, .. } = split_response(locations.get("/circuit-breakers").await).await;
    let snapshots = body.as_array().unwrap();
    let by_city = snapshots.iter().find(|s| s["name"] == "by-city").unwrap();
    assert_eq!(by_city["state"], "open");
    assert_eq!(by_city["notPermittedCalls"], 2);
    let by_id = snapshots.iter().find(|s| s["name"] == "by-id").unwrap();
    assert_eq!(by_id["state"], "closed");

    // Invalid filters are still rejected before the guard
    let response = locations.get("/lodgings/by-filters?rating=7").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    locations.end().await;
}
