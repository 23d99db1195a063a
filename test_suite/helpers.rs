//! This module sets up and runs integration tests
//!
//! The integration test uses the same PostgreSQL container as the development environment.
//! But, it creates a separate test database for each service started by a test.
//! The test database is named in the format `test_tourism_db_<uuid>`,
//! where `<uuid>` is the UUID with hyphens replaced by underscores.
//!
//! [NOTICE]
//!
//! A test database is created for each test run, so you must drop the test databases
//! whose names start with `test_tourism_db_` by yourself.
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use axum::Router;
use sqlx::{Connection as _, Executor as _, PgConnection, PgPool, migrate::Migrator};
use tokio::{net::TcpListener, sync::oneshot};

use app::{bind_address, load_app_settings};
use settings::{AppSettings, DatabaseSettings};

pub const TEST_DATABASE_PREFIX: &str = "test_tourism_db_";

/// Returns the path of a file placed at the workspace root
pub fn workspace_path(name: &str) -> PathBuf {
    let dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    Path::new(&dir).join("..").join(name)
}

pub fn load_app_settings_for_testing(file_name: &str) -> AppSettings {
    let path = workspace_path(file_name);
    load_app_settings(path.to_str().unwrap()).unwrap()
}

pub struct TestApp {
    pub app_settings: AppSettings,
    pub listener: TcpListener,
    pub pg_pool: PgPool,
}

pub async fn configure_test_app(mut app_settings: AppSettings, migrator: &Migrator) -> TestApp {
    // Set up the test database
    let database_name =
        format!("{}{}", TEST_DATABASE_PREFIX, uuid::Uuid::new_v4()).replace('-', "_");
    app_settings.database.name = database_name;
    let pg_pool = setup_database(&app_settings.database, migrator).await;

    // Specify a random port for the HTTP server to bind
    app_settings.http.host = String::from("127.0.0.1");
    app_settings.http.port = 0;
    let (listener, port) = bind_address(&app_settings.http).await.unwrap();
    app_settings.http.port = port;

    TestApp {
        app_settings,
        listener,
        pg_pool,
    }
}

/// Sets up the PostgreSQL database for testing
async fn setup_database(settings: &DatabaseSettings, migrator: &Migrator) -> PgPool {
    // Connect to the **postgres** database
    let postgres_settings = DatabaseSettings {
        name: String::from("postgres"),
        ..settings.clone()
    };
    let mut conn = PgConnection::connect_with(&postgres_settings.connect_options())
        .await
        .unwrap();

    // Create the test database
    conn.execute(format!("CREATE DATABASE {};", settings.name).as_str())
        .await
        .unwrap();

    // Migrate the database
    let pool = PgPool::connect_with(settings.connect_options())
        .await
        .unwrap();
    migrator.run(&pool).await.unwrap();

    pool
}

/// Spawns the application server in a separate thread
///
/// Returns a tuple containing the thread handle and a sender to signal for graceful shutdown.
pub fn spawn_app(router: Router, listener: TcpListener) -> (JoinHandle<()>, oneshot::Sender<()>) {
    let (close_tx, close_rx) = oneshot::channel();

    let handle = std::thread::spawn(|| run_server(router, listener, close_rx));
    (handle, close_tx)
}

/// Runs the application server with graceful shutdown support
fn run_server(router: Router, listener: TcpListener, close_rx: oneshot::Receiver<()>) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async move {
        let listener = TcpListener::from_std(listener.into_std().unwrap()).unwrap();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                _ = close_rx.await;
            })
            .await
            .unwrap();
    });
}

pub struct ResponseParts {
    /// ステータスコード
    pub status_code: reqwest::StatusCode,
    /// ボディ
    pub body: serde_json::Value,
}

/// Splits the response into the status code and the JSON body
///
/// A body that is not JSON is returned as a JSON string.
pub async fn split_response(response: reqwest::Response) -> ResponseParts {
    let status_code = response.status();
    let text = response.text().await.unwrap();
    let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
    ResponseParts { status_code, body }
}
