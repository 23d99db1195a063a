pub mod http;
pub mod postgres;
pub mod remote;
pub mod seed;

use std::sync::Arc;

use axum::extract::FromRef;

use settings::AppSettings;
use use_case::ResilientLodgingAccessor;

use crate::remote::HttpLodgingAccessor;

/// サーキットブレーカーで保護された宿泊施設サービスのリモートアクセサ
pub type GuardedLodgingAccessor = ResilientLodgingAccessor<HttpLodgingAccessor>;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub app_settings: Arc<AppSettings>,
    pub pg_pool: sqlx::PgPool,
}

/// 場所サービスのアプリケーション状態
#[derive(Clone, FromRef)]
pub struct LocationsState {
    pub app: AppState,
    pub lodgings: Arc<GuardedLodgingAccessor>,
}
