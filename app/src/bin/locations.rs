use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use app::{
    LOCATIONS_MIGRATOR, bind_address, build_lodging_accessor, create_pg_pool, get_subscriber,
    init_subscriber, load_app_settings, migrate, routes::create_locations_router, seed_places,
};
use infra::{AppState, LocationsState};

/// 場所サービスのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // アプリケーション設定を読み込み
    let app_settings = load_app_settings("locations_settings.toml")?;

    let subscriber = get_subscriber("locations".into(), app_settings.log.level, std::io::stdout);
    init_subscriber(subscriber)?;

    let remote = app_settings
        .accommodations
        .as_ref()
        .context("The [accommodations] section is required for the locations service")?;
    let lodgings = build_lodging_accessor(remote)?;

    // データベースを準備して、初期データを投入
    let pg_pool = create_pg_pool(&app_settings.database).await?;
    migrate(&LOCATIONS_MIGRATOR, &pg_pool).await?;
    seed_places(&pg_pool, Path::new(&app_settings.seed.path)).await?;

    let (listener, port) = bind_address(&app_settings.http).await?;
    tracing::info!(port, accommodations = %remote.base_url, "the locations service is running");

    let state = LocationsState {
        app: AppState {
            app_settings: Arc::new(app_settings),
            pg_pool,
        },
        lodgings,
    };
    axum::serve(listener, create_locations_router(state))
        .await
        .context("Failed to start the HTTP server")?;

    Ok(())
}
