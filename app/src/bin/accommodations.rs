use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use app::{
    ACCOMMODATIONS_MIGRATOR, bind_address, create_pg_pool, get_subscriber, init_subscriber,
    load_app_settings, migrate, routes::create_accommodations_router, seed_lodgings,
};
use infra::AppState;

/// 宿泊施設サービスのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // アプリケーション設定を読み込み
    let app_settings = load_app_settings("accommodations_settings.toml")?;

    let subscriber = get_subscriber(
        "accommodations".into(),
        app_settings.log.level,
        std::io::stdout,
    );
    init_subscriber(subscriber)?;

    // データベースを準備して、初期データを投入
    let pg_pool = create_pg_pool(&app_settings.database).await?;
    migrate(&ACCOMMODATIONS_MIGRATOR, &pg_pool).await?;
    seed_lodgings(&pg_pool, Path::new(&app_settings.seed.path)).await?;

    let (listener, port) = bind_address(&app_settings.http).await?;
    tracing::info!(port, "the accommodations service is running");

    let app_state = AppState {
        app_settings: Arc::new(app_settings),
        pg_pool,
    };
    axum::serve(listener, create_accommodations_router(app_state))
        .await
        .context("Failed to start the HTTP server")?;

    Ok(())
}
