//! 宿泊施設サービスを経由した宿泊施設の照会
//!
//! 宿泊施設サービスが利用できない場合も、サーキットブレーカーの代替値を返すため、
//! これらのハンドラーは検索条件が不正な場合を除いて常に`200 OK`を返す。
use std::sync::Arc;

use axum::{Json, extract::State};

use domain::{remote::LodgingView, repositories::LodgingFilter};
use resilience::CircuitSnapshot;

use crate::{
    GuardedLodgingAccessor,
    http::{ApiError, ApiPath, ApiQuery, ApiResult, handler::lodging::LodgingFilterQueryParams},
};

#[tracing::instrument(skip(lodgings))]
pub async fn by_id(
    State(lodgings): State<Arc<GuardedLodgingAccessor>>,
    ApiPath(id): ApiPath<i64>,
) -> Json<Option<LodgingView>> {
    Json(lodgings.by_id(id).await)
}

#[tracing::instrument(skip(lodgings))]
pub async fn by_city(
    State(lodgings): State<Arc<GuardedLodgingAccessor>>,
    ApiPath(city): ApiPath<String>,
) -> Json<Vec<LodgingView>> {
    Json(lodgings.by_city(&city).await)
}

#[tracing::instrument(skip(lodgings))]
pub async fn by_state(
    State(lodgings): State<Arc<GuardedLodgingAccessor>>,
    ApiPath(region): ApiPath<String>,
) -> Json<Vec<LodgingView>> {
    Json(lodgings.by_state(&region).await)
}

#[tracing::instrument(skip(lodgings))]
pub async fn by_country(
    State(lodgings): State<Arc<GuardedLodgingAccessor>>,
    ApiPath(country): ApiPath<String>,
) -> Json<Vec<LodgingView>> {
    Json(lodgings.by_country(&country).await)
}

#[tracing::instrument(skip(lodgings))]
pub async fn by_filters(
    State(lodgings): State<Arc<GuardedLodgingAccessor>>,
    ApiQuery(params): ApiQuery<LodgingFilterQueryParams>,
) -> ApiResult<Json<Vec<LodgingView>>> {
    let filter = LodgingFilter::try_from(params).map_err(ApiError::from)?;
    Ok(Json(lodgings.by_filter(&filter).await))
}

/// 呼び出しの種類ごとのサーキットブレーカーの状態を返す。
pub async fn circuit_breakers(
    State(lodgings): State<Arc<GuardedLodgingAccessor>>,
) -> Json<Vec<CircuitSnapshot>> {
    Json(lodgings.snapshots())
}
