pub mod routes;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use config::Config;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{Subscriber, subscriber::set_global_default};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, fmt::MakeWriter, layer::SubscriberExt as _};

use infra::{
    GuardedLodgingAccessor,
    postgres::repositories::{PgLodgingRepository, PgPlaceRepository},
    remote::HttpLodgingAccessor,
    seed::{read_lodgings, read_places},
};
use resilience::CircuitBreakerConfig;
use settings::{
    AppSettings, CircuitBreakerSettings, DatabaseSettings, HttpSettings, RemoteSettings,
};
use use_case::{ResilientLodgingAccessor, SeedOutcome, import_if_empty};

/// 設定ファイルのパスを上書きする環境変数
pub const APP_SETTINGS_ENV: &str = "APP_SETTINGS";

/// 場所サービスのマイグレーション
pub static LOCATIONS_MIGRATOR: Migrator = sqlx::migrate!("../migrations/locations");

/// 宿泊施設サービスのマイグレーション
pub static ACCOMMODATIONS_MIGRATOR: Migrator = sqlx::migrate!("../migrations/accommodations");

/// アプリケーション設定を読み込む。
///
/// 環境変数`APP_SETTINGS`が設定されている場合は、`default_path`の代わりにその値を
/// 設定ファイルのパスとする。`APP__DATABASE__HOST`のように`APP__`で始まる環境変数は、
/// 設定ファイルの値を上書きする。
pub fn load_app_settings(default_path: &str) -> anyhow::Result<AppSettings> {
    let path = std::env::var(APP_SETTINGS_ENV).unwrap_or_else(|_| default_path.to_string());
    let config = Config::builder()
        .add_source(config::File::with_name(&path))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .with_context(|| format!("Failed to read the settings file: {}", path))?;
    config
        .try_deserialize()
        .with_context(|| format!("The contents of the settings file is incorrect: {}", path))
}

pub async fn bind_address(settings: &HttpSettings) -> anyhow::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind(settings.bind_address())
        .await
        .context("Failed to bind to the address for the HTTP server")?;
    let port = listener
        .local_addr()
        .context("Failed to get the port of listener")?
        .port();

    Ok((listener, port))
}

pub async fn create_pg_pool(settings: &DatabaseSettings) -> anyhow::Result<sqlx::PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.connection_timeout))
        .connect_with(settings.connect_options())
        .await
        .context("Failed to connect to the database")
}

/// マイグレーションを実行する。
pub async fn migrate(migrator: &Migrator, pool: &sqlx::PgPool) -> anyhow::Result<()> {
    migrator
        .run(pool)
        .await
        .context("Failed to migrate the database")
}

/// 設定からサーキットブレーカーの設定を作成する。
pub fn circuit_config(settings: &CircuitBreakerSettings) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_rate_threshold: settings.failure_rate_threshold,
        sliding_window_size: settings.sliding_window_size,
        minimum_number_of_calls: settings.minimum_number_of_calls,
        wait_duration_in_open_state: Duration::from_millis(
            settings.wait_duration_in_open_state_millis,
        ),
        permitted_calls_in_half_open_state: settings.permitted_calls_in_half_open_state,
    }
}

/// サーキットブレーカーで保護された宿泊施設サービスのリモートアクセサを作成する。
///
/// 呼び出しの種類ごとに、`[accommodations.circuit_breakers.<種類>]`の設定で既定値を上書きする。
pub fn build_lodging_accessor(
    settings: &RemoteSettings,
) -> anyhow::Result<Arc<GuardedLodgingAccessor>> {
    let accessor = HttpLodgingAccessor::new(&settings.base_url, settings.timeout())?;
    let guarded = ResilientLodgingAccessor::new(accessor, |kind| {
        circuit_config(&settings.circuit_breaker_for(kind.name()))
    })
    .context("The circuit breaker settings are invalid")?;
    Ok(Arc::new(guarded))
}

/// 場所のレコードストアが空の場合に、初期データを投入する。
pub async fn seed_places(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<SeedOutcome> {
    let repo = PgPlaceRepository::new(pool.clone());
    let outcome = import_if_empty(&repo, || read_places(path))
        .await
        .with_context(|| format!("Failed to import places from {}", path.display()))?;
    log_seed_outcome("places", outcome);
    Ok(outcome)
}

/// 宿泊施設のレコードストアが空の場合に、初期データを投入する。
pub async fn seed_lodgings(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<SeedOutcome> {
    let repo = PgLodgingRepository::new(pool.clone());
    let outcome = import_if_empty(&repo, || read_lodgings(path))
        .await
        .with_context(|| format!("Failed to import lodgings from {}", path.display()))?;
    log_seed_outcome("lodgings", outcome);
    Ok(outcome)
}

fn log_seed_outcome(records: &str, outcome: SeedOutcome) {
    match outcome {
        SeedOutcome::AlreadySeeded => {
            tracing::info!(records, "the store already has data, skipped the seed import")
        }
        SeedOutcome::SourceMissing => {
            tracing::warn!(records, "the seed file is missing, skipped the seed import")
        }
        SeedOutcome::Imported(count) => tracing::info!(records, count, "imported the seed data"),
    }
}

pub fn get_subscriber<Sink>(
    name: String,
    log_level: log::Level,
    sink: Sink,
) -> impl Subscriber + Sync + Send
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

pub fn init_subscriber(subscriber: impl Subscriber + Sync + Send) -> anyhow::Result<()> {
    LogTracer::init().context("Failed to set logger")?;
    set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use resilience::CircuitConfigError;

    use super::*;

    fn remote_settings(circuit_breaker: CircuitBreakerSettings) -> RemoteSettings {
        RemoteSettings {
            base_url: String::from("http://127.0.0.1:8002"),
            timeout_millis: 1_000,
            circuit_breaker,
            circuit_breakers: Default::default(),
        }
    }

    #[test]
    fn circuit_config_converts_the_cool_down() {
        let config = circuit_config(&CircuitBreakerSettings {
            wait_duration_in_open_state_millis: 1_500,
            ..CircuitBreakerSettings::default()
        });
        assert_eq!(config.wait_duration_in_open_state, Duration::from_millis(1_500));
        assert_eq!(config.validate(), Ok(()));
    }

    #[tokio::test]
    async fn lodging_accessor_is_built_with_a_breaker_per_call_kind() {
        let guarded = build_lodging_accessor(&remote_settings(CircuitBreakerSettings::default()))
            .unwrap();
        let names = guarded
            .snapshots()
            .into_iter()
            .map(|s| s.name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            ["by-id", "by-city", "by-state", "by-country", "by-filters"]
        );
    }

    #[rstest::rstest]
    #[case(CircuitBreakerSettings { sliding_window_size: 0, ..Default::default() })]
    #[case(CircuitBreakerSettings { failure_rate_threshold: 120.0, ..Default::default() })]
    fn invalid_circuit_settings_are_rejected(#[case] settings: CircuitBreakerSettings) {
        let Err(err) = build_lodging_accessor(&remote_settings(settings)) else {
            panic!("invalid circuit breaker settings were accepted");
        };
        assert!(err.downcast_ref::<CircuitConfigError>().is_some());
    }

    #[rstest::rstest]
    #[case(concat!(env!("CARGO_MANIFEST_DIR"), "/../locations_settings.toml"), true)]
    #[case(concat!(env!("CARGO_MANIFEST_DIR"), "/../accommodations_settings.toml"), false)]
    fn shipped_settings_files_can_be_loaded(#[case] path: &str, #[case] remote: bool) {
        let settings = load_app_settings(path).unwrap();
        assert_eq!(settings.log.level, log::Level::Info);
        assert_eq!(settings.accommodations.is_some(), remote);
    }
}
