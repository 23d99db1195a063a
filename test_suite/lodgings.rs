use reqwest::StatusCode;
use serde_json::json;

use crate::helpers::{ResponseParts, split_response};
use crate::test_case::{InsertTestData, TestCase};

#[tokio::test]
#[ignore]
async fn seeded_lodgings_can_be_listed() {
    let test_case = TestCase::accommodations(InsertTestData::Yes).await;

    let ResponseParts { status_code, body } = split_response(test_case.get("/lodgings").await).await;
    assert_eq!(status_code, StatusCode::OK);
    let lodgings = body.as_array().unwrap();
    assert_eq!(lodgings.len(), 13, "Expected 13 lodgings, found {}", lodgings.len());
    assert_eq!(lodgings[0]["name"], "Ocean Drive Resort");
    assert_eq!(lodgings[0]["placeName"], "Miami");

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn lodging_can_be_found_by_name_ignoring_case() {
    let test_case = TestCase::accommodations(InsertTestData::Yes).await;

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/lodgings/name/ocean%20drive%20resort").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body["address"], "123 Ocean Dr");
    assert_eq!(body["rating"], 5);

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn missing_lodging_is_not_found() {
    let test_case = TestCase::accommodations(InsertTestData::Yes).await;

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/lodgings/id/9999").await).await;
    assert_eq!(status_code, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "Lodging not found with id 9999");

    let response = test_case.get("/lodgings/city/Atlantis").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn invalid_lookups_are_bad_requests() {
    let test_case = TestCase::accommodations(InsertTestData::Yes).await;

    for path in [
        "/lodgings/rating/6",
        "/lodgings/rating/five",
        "/lodgings/id/abc",
        "/lodgings/filters",
        "/lodgings/filters?city=&region=",
        "/lodgings/filters?rating=0",
    ] {
        let ResponseParts { status_code, body } = split_response(test_case.get(path).await).await;
        assert_eq!(status_code, StatusCode::BAD_REQUEST, "{} was not rejected", path);
        assert_eq!(body["error"], "Bad Request");
    }

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn lodgings_can_be_filtered() {
    let test_case = TestCase::accommodations(InsertTestData::Yes).await;

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/lodgings/filters?city=miami").await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let ResponseParts { status_code, body } =
        split_response(test_case.get("/lodgings/filters?city=miami&rating=5").await).await;
    assert_eq!(status_code, StatusCode::OK);
    let lodgings = body.as_array().unwrap();
    assert_eq!(lodgings.len(), 1);
    assert_eq!(lodgings[0]["name"], "Ocean Drive Resort");

    let response = test_case.get("/lodgings/filters?country=USA&rating=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn lodging_can_be_created_updated_and_deleted() {
    let test_case = TestCase::accommodations(InsertTestData::No).await;

    // create
    let body = json!({
        "id": 42,
        "name": "Bayside Inn",
        "address": "9 Bay St",
        "rating": 3,
        "placeName": "Miami Beach",
        "region": "Florida",
        "country": "USA"
    });
    let ResponseParts { status_code, body } =
        split_response(test_case.post("/lodgings", &body).await).await;
    assert_eq!(status_code, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert_ne!(id, 42, "The id in the request body must be ignored");

    // update a recognized field and an unrecognized one
    let ResponseParts { status_code, body } = split_response(
        test_case
            .put(&format!("/lodgings/{}", id), &json!({"rating": 4, "nickname": "BI"}))
            .await,
    )
    .await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body["rating"], 4);
    assert!(body.get("nickname").is_none());

    // an invalid rating leaves the lodging untouched
    let response = test_case
        .put(
            &format!("/lodgings/{}", id),
            &json!({"name": "Bayside Hotel", "rating": 9}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let ResponseParts { body, .. } =
        split_response(test_case.get(&format!("/lodgings/id/{}", id)).await).await;
    assert_eq!(body["name"], "Bayside Inn");
    assert_eq!(body["rating"], 4);

    // delete
    let ResponseParts { status_code, body } =
        split_response(test_case.delete(&format!("/lodgings/{}", id)).await).await;
    assert_eq!(status_code, StatusCode::OK);
    assert_eq!(body, "The lodging was deleted successfully");
    let response = test_case.get(&format!("/lodgings/id/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    test_case.end().await;
}

#[tokio::test]
#[ignore]
async fn invalid_lodging_is_not_created() {
    let test_case = TestCase::accommodations(InsertTestData::No).await;

    let body = json!({
        "name": "Bayside Inn",
        "address": "9 Bay St",
        "rating": 0,
        "placeName": "Miami Beach",
        "region": "Florida",
        "country": "USA"
    });
    let response = test_case.post("/lodgings", &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let ResponseParts { status_code, body } =
        split_response(test_case.post_raw("/lodgings", "{\"name\": ").await).await;
    assert_eq!(status_code, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let ResponseParts { body, .. } = split_response(test_case.get("/lodgings").await).await;
    assert_eq!(body, json!([]));

    test_case.end().await;
}
