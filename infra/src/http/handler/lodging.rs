use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use domain::{
    DomainResult,
    models::{
        Address, CountryName, FieldMap, Lodging, LodgingId, LodgingName, PlaceName, Rating,
        RegionName,
    },
    repositories::{LodgingFilter, LodgingInput},
};
use use_case::{CatalogUseCase, LodgingUseCase};
use utils::serde::deserialize_option_non_blank;

use crate::{
    AppState,
    http::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult},
    postgres::repositories::PgLodgingRepository,
};

type LodgingUseCaseImpl = LodgingUseCase<PgLodgingRepository>;

fn lodging_use_case(app_state: &AppState) -> LodgingUseCaseImpl {
    LodgingUseCase::new(PgLodgingRepository::new(app_state.pg_pool.clone()))
}

#[tracing::instrument(skip(app_state))]
pub async fn list(State(app_state): State<AppState>) -> ApiResult<Json<Vec<Lodging>>> {
    let use_case = lodging_use_case(&app_state);
    Ok(Json(use_case.list_all().await.map_err(ApiError::from)?))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_id(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Lodging>> {
    let use_case = lodging_use_case(&app_state);
    let lodging = use_case
        .find_by_id(LodgingId::from(id))
        .await
        .map_err(ApiError::from)?;
    Ok(Json(lodging))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_name(
    State(app_state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Lodging>> {
    let use_case = lodging_use_case(&app_state);
    Ok(Json(use_case.find_by_name(&name).await.map_err(ApiError::from)?))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_address(
    State(app_state): State<AppState>,
    ApiPath(address): ApiPath<String>,
) -> ApiResult<Json<Lodging>> {
    let use_case = lodging_use_case(&app_state);
    let lodging = use_case
        .find_by_address(&address)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(lodging))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_city(
    State(app_state): State<AppState>,
    ApiPath(city): ApiPath<String>,
) -> ApiResult<Json<Vec<Lodging>>> {
    let use_case = lodging_use_case(&app_state);
    Ok(Json(use_case.list_by_city(&city).await.map_err(ApiError::from)?))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_region(
    State(app_state): State<AppState>,
    ApiPath(region): ApiPath<String>,
) -> ApiResult<Json<Vec<Lodging>>> {
    let use_case = lodging_use_case(&app_state);
    Ok(Json(
        use_case
            .list_by_region(&region)
            .await
            .map_err(ApiError::from)?,
    ))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_country(
    State(app_state): State<AppState>,
    ApiPath(country): ApiPath<String>,
) -> ApiResult<Json<Vec<Lodging>>> {
    let use_case = lodging_use_case(&app_state);
    Ok(Json(
        use_case
            .list_by_country(&country)
            .await
            .map_err(ApiError::from)?,
    ))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_rating(
    State(app_state): State<AppState>,
    ApiPath(rating): ApiPath<i16>,
) -> ApiResult<Json<Vec<Lodging>>> {
    let use_case = lodging_use_case(&app_state);
    Ok(Json(
        use_case
            .list_by_rating(rating)
            .await
            .map_err(ApiError::from)?,
    ))
}

/// 宿泊施設の複合検索条件のクエリパラメーター
///
/// 空の値は指定されていないものとして扱う。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LodgingFilterQueryParams {
    /// 場所名
    #[serde(default, deserialize_with = "deserialize_option_non_blank")]
    pub city: Option<String>,
    /// 地域名
    #[serde(default, deserialize_with = "deserialize_option_non_blank")]
    pub region: Option<String>,
    /// 国名
    #[serde(default, deserialize_with = "deserialize_option_non_blank")]
    pub country: Option<String>,
    /// 評価
    #[serde(default, deserialize_with = "deserialize_option_non_blank")]
    pub rating: Option<i16>,
}

impl TryFrom<LodgingFilterQueryParams> for LodgingFilter {
    type Error = domain::DomainError;

    fn try_from(params: LodgingFilterQueryParams) -> DomainResult<Self> {
        LodgingFilter::new(params.city, params.region, params.country, params.rating)
    }
}

#[tracing::instrument(skip(app_state))]
pub async fn by_filters(
    State(app_state): State<AppState>,
    ApiQuery(params): ApiQuery<LodgingFilterQueryParams>,
) -> ApiResult<Json<Vec<Lodging>>> {
    let filter = LodgingFilter::try_from(params).map_err(ApiError::from)?;
    let use_case = lodging_use_case(&app_state);
    let lodgings = use_case
        .list_by_filter(&filter)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(lodgings))
}

/// 宿泊施設を新規作成するときのリクエストボディ
///
/// `id`が含まれていても無視する。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LodgingRequestBody {
    pub name: String,
    pub address: String,
    pub rating: i16,
    pub place_name: String,
    pub region: String,
    pub country: String,
}

impl TryFrom<LodgingRequestBody> for LodgingInput {
    type Error = domain::DomainError;

    fn try_from(body: LodgingRequestBody) -> DomainResult<Self> {
        Ok(LodgingInput {
            name: LodgingName::new(body.name)?,
            address: Address::new(body.address)?,
            rating: Rating::new(body.rating)?,
            place_name: PlaceName::new(body.place_name)?,
            region: RegionName::new(body.region)?,
            country: CountryName::new(body.country)?,
        })
    }
}

#[tracing::instrument(skip(app_state))]
pub async fn create(
    State(app_state): State<AppState>,
    ApiJson(body): ApiJson<LodgingRequestBody>,
) -> ApiResult<(StatusCode, Json<Lodging>)> {
    let input = LodgingInput::try_from(body).map_err(ApiError::from)?;
    let use_case = lodging_use_case(&app_state);
    let lodging = use_case.create(input).await.map_err(ApiError::from)?;
    tracing::info!(id = %lodging.id, "created a lodging");
    Ok((StatusCode::CREATED, Json(lodging)))
}

#[tracing::instrument(skip(app_state))]
pub async fn update(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(fields): ApiJson<FieldMap>,
) -> ApiResult<Json<Lodging>> {
    let use_case = lodging_use_case(&app_state);
    let lodging = use_case
        .update(LodgingId::from(id), fields)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(lodging))
}

#[tracing::instrument(skip(app_state))]
pub async fn delete(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<&'static str> {
    let use_case = lodging_use_case(&app_state);
    use_case
        .delete(LodgingId::from(id))
        .await
        .map_err(ApiError::from)?;
    Ok("The lodging was deleted successfully")
}

#[cfg(test)]
mod tests {
    use domain::{DomainErrorKind, FILTER_MISSING, RATING_OUT_OF_RANGE};

    use super::*;

    fn params(query: &str) -> LodgingFilterQueryParams {
        serde_json::from_str(query).unwrap()
    }

    #[test]
    fn empty_query_values_count_as_absent() {
        let err =
            LodgingFilter::try_from(params(r#"{"city": "", "region": " "}"#)).unwrap_err();
        assert_eq!(err.kind, DomainErrorKind::Validation);
        assert_eq!(err.message, FILTER_MISSING);
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let err = LodgingFilter::try_from(params(r#"{"rating": "0"}"#)).unwrap_err();
        assert_eq!(err.message, RATING_OUT_OF_RANGE);
    }

    #[test]
    fn request_body_ignores_id() {
        let body: LodgingRequestBody = serde_json::from_str(
            r#"{"id": 9, "name": "Bayside Inn", "address": "9 Bay St", "rating": 3,
                "placeName": "Miami Beach", "region": "Florida", "country": "USA"}"#,
        )
        .unwrap();
        let input = LodgingInput::try_from(body).unwrap();
        assert_eq!(input.place_name.as_str(), "Miami Beach");
    }

    #[test]
    fn request_body_with_bad_rating_is_rejected() {
        let body = LodgingRequestBody {
            name: String::from("Bayside Inn"),
            address: String::from("9 Bay St"),
            rating: 6,
            place_name: String::from("Miami Beach"),
            region: String::from("Florida"),
            country: String::from("USA"),
        };
        let err = LodgingInput::try_from(body).unwrap_err();
        assert_eq!(err.message, RATING_OUT_OF_RANGE);
    }
}
