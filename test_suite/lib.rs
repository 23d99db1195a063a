mod helpers;
mod lodgings;
mod places;
mod remote;
mod test_case;

use crate::test_case::{InsertTestData, TestCase};

#[tokio::test]
#[ignore]
async fn health_check() {
    let test_case = TestCase::accommodations(InsertTestData::No).await;

    let response = test_case.get("/health-check").await;
    assert!(
        response.status().is_success(),
        "Health check failed: {}",
        response.status()
    );
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Ok, the server is running!"),
        "Health check response did not contain 'Ok, the server is running!'"
    );

    test_case.end().await;
}
