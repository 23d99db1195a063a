use std::{sync::Arc, thread::JoinHandle, time::Duration};

use serde::Serialize;
use tokio::sync::oneshot;

use app::{
    ACCOMMODATIONS_MIGRATOR, LOCATIONS_MIGRATOR, build_lodging_accessor,
    routes::{create_accommodations_router, create_locations_router},
    seed_lodgings, seed_places,
};
use infra::{AppState, LocationsState};

use crate::helpers::{
    TestApp, configure_test_app, load_app_settings_for_testing, spawn_app, workspace_path,
};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTestData {
    Yes,
    No,
}

/// Test case for integration tests
///
/// ```
/// #[tokio::test]
/// async fn integration_test_case_skeleton() {
///     // Initialize the test case
///     let test_case = TestCase::accommodations(InsertTestData::Yes).await;
///
///     /************************************************************
///
///             Implement integration test logic here
///
///     *************************************************************/
///
///     // Terminate the test case gracefully
///     test_case.end().await;
/// }
/// ```
pub struct TestCase {
    pub app_state: AppState,
    app_handle: JoinHandle<()>,
    shutdown_signal: oneshot::Sender<()>,
    pub http_client: reqwest::Client,
}

impl TestCase {
    /// Starts the accommodations service
    pub async fn accommodations(insert: InsertTestData) -> Self {
        let app_settings = load_app_settings_for_testing("accommodations_settings.toml");
        let TestApp {
            app_settings,
            listener,
            pg_pool,
        } = configure_test_app(app_settings, &ACCOMMODATIONS_MIGRATOR).await;
        if insert == InsertTestData::Yes {
            seed_lodgings(&pg_pool, &workspace_path(&app_settings.seed.path))
                .await
                .unwrap();
        }
        let app_state = AppState {
            app_settings: Arc::new(app_settings),
            pg_pool,
        };
        let router = create_accommodations_router(app_state.clone());
        Self::spawn(app_state, router, listener)
    }

    /// Starts the locations service that calls the accommodations service at `base_url`
    pub async fn locations(base_url: &str, insert: InsertTestData) -> Self {
        let mut app_settings = load_app_settings_for_testing("locations_settings.toml");
        let remote = app_settings.accommodations.as_mut().unwrap();
        remote.base_url = base_url.to_string();
        remote.timeout_millis = 1_000;
        let lodgings = build_lodging_accessor(remote).unwrap();
        let TestApp {
            app_settings,
            listener,
            pg_pool,
        } = configure_test_app(app_settings, &LOCATIONS_MIGRATOR).await;
        if insert == InsertTestData::Yes {
            seed_places(&pg_pool, &workspace_path(&app_settings.seed.path))
                .await
                .unwrap();
        }
        let app_state = AppState {
            app_settings: Arc::new(app_settings),
            pg_pool,
        };
        let router = create_locations_router(LocationsState {
            app: app_state.clone(),
            lodgings,
        });
        Self::spawn(app_state, router, listener)
    }

    fn spawn(app_state: AppState, router: axum::Router, listener: tokio::net::TcpListener) -> Self {
        let (app_handle, shutdown_signal) = spawn_app(router, listener);
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap();
        Self {
            app_state,
            app_handle,
            shutdown_signal,
            http_client,
        }
    }

    pub async fn end(self) {
        self.shutdown_signal.send(()).unwrap();
        self.app_handle.join().unwrap();
    }

    pub fn origin(&self) -> String {
        format!(
            "http://{}:{}",
            self.app_state.app_settings.http.host, self.app_state.app_settings.http.port,
        )
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        let uri = format!("{}{}", self.origin(), path);
        self.http_client.get(&uri).send().await.unwrap()
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> reqwest::Response {
        let uri = format!("{}{}", self.origin(), path);
        self.http_client.post(&uri).json(body).send().await.unwrap()
    }

    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> reqwest::Response {
        let uri = format!("{}{}", self.origin(), path);
        self.http_client.put(&uri).json(body).send().await.unwrap()
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        let uri = format!("{}{}", self.origin(), path);
        self.http_client
            .post(&uri)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        let uri = format!("{}{}", self.origin(), path);
        self.http_client.delete(&uri).send().await.unwrap()
    }
}
