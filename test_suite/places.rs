use reqwest::StatusCode;
use serde_json::json;

use use_case::SeedOutcome;

use crate::helpers::{ResponseParts, split_response};
use crate::test_case::{InsertTestData, TestCase};

/// The locations service under these tests never reaches the accommodations service.
const UNREACHABLE: &str = "http://127.0.0.1:9";

#[tokio::test]
#[ignore]
async fn seeded_places_can_be_listed() {
    let test_case = TestCase::locations(UNREACHABLE, InsertTestData::Yes).await;

    let ResponseParts { status_code, body } = split_response(test_case.get("/places").await).await;
    assert_eq!(status_code, StatusCode::OK);
    let places = body.as_array().unwrap();
    assert_eq!(places.len(), 12, "Expected 12 places, found {}", places.len());
    assert!(places.iter().any(|p| p["name"] == "Washington, D.C."));

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn seed_import_is_skipped_when_places_exist() {
    let test_case = TestCase::locations(UNREACHABLE, InsertTestData::Yes).await;

    let path = crate::helpers::workspace_path("data/places.csv");
    let outcome = app::seed_places(&test_case.app_state.pg_pool, &path)
        .await
        .unwrap();
    assert_eq!(outcome, SeedOutcome::AlreadySeeded);
    let ResponseParts { body, .. } = split_response(test_case.get("/places").await).await;
    assert_eq!(body.as_array().unwrap().len(), 12);

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn places_can_be_looked_up() {
    let test_case = TestCase::locations(UNREACHABLE, InsertTestData::Yes).await;

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/places/name/MIAMI").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body["region"], "Florida");

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/places/region/california").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/places/country/Canada").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let ResponseParts { status_code, body } = split_response(
        test_case
            .get("/places/search?region=Florida&country=USA")
            .await,
    )
    .await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn place_lookup_errors_use_the_uniform_body() {
    let test_case = TestCase::locations(UNREACHABLE, InsertTestData::Yes).await;

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/places/country/Atlantis").await).await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "No place was found in the country Atlantis");

    for path in ["/places/search?region=Florida", "/places/search?region=Florida&country="] {
        let ResponseParts { status_code, body } = split_response(test_case.get(path).await).await;
        assert_eq!(status_code, StatusCode::BAD_REQUEST, "{} was not rejected", path);
        assert_eq!(body["message"], "Both region and country must be provided");
    }

    let response = test_case.get("/places/id/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn place_can_be_created_updated_and_deleted() {
    let test_case = TestCase::locations(UNREACHABLE, InsertTestData::No).await;

    let ResponseParts { status_code, body } = split_response(
        test_case
            .post(
                "/places",
                &json!({"name": "Key West", "region": "Florida", "country": "USA"}),
            )
            .await,
    )
    .await;
    assert_eq!(status_code, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let ResponseParts { status_code, body } = split_response(
        test_case
            .put(&format!("/places/{}", id), &json!({"name": "  Key Largo  "}))
            .await,
    )
    .await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body["name"], "Key Largo");
    assert_eq!(body["region"], "Florida");

    let response = test_case
        .put("/places/9999", &json!({"name": "Nowhere"}))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_case
        .put(&format!("/places/{}", id), &json!({"country": ""}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let ResponseParts { status_code, body } =
        split_response(test_case.delete(&format!("/places/{}", id)).await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body, "The place was deleted successfully");
    let response = test_case.get(&format!("/places/id/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_case.end().await;
}
