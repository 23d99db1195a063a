use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use domain::{
    DomainResult,
    models::{CountryName, FieldMap, Place, PlaceId, PlaceName, RegionName},
    remote::LodgingView,
    repositories::PlaceInput,
};
use use_case::{CatalogUseCase, PlaceUseCase};
use utils::serde::deserialize_option_non_blank;

use crate::{
    AppState, LocationsState,
    http::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult, bad_request},
    postgres::repositories::PgPlaceRepository,
};

type PlaceUseCaseImpl = PlaceUseCase<PgPlaceRepository>;

fn place_use_case(app_state: &AppState) -> PlaceUseCaseImpl {
    PlaceUseCase::new(PgPlaceRepository::new(app_state.pg_pool.clone()))
}

#[tracing::instrument(skip(app_state))]
pub async fn list(State(app_state): State<AppState>) -> ApiResult<Json<Vec<Place>>> {
    let use_case = place_use_case(&app_state);
    Ok(Json(use_case.list_all().await.map_err(ApiError::from)?))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_id(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Place>> {
    let use_case = place_use_case(&app_state);
    let place = use_case
        .find_by_id(PlaceId::from(id))
        .await
        .map_err(ApiError::from)?;
    Ok(Json(place))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_name(
    State(app_state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> ApiResult<Json<Place>> {
    let use_case = place_use_case(&app_state);
    Ok(Json(use_case.find_by_name(&name).await.map_err(ApiError::from)?))
}

#[tracing::instrument(skip(app_state))]
pub async fn by_region(
    State(app_state): State<AppState>,
    ApiPath(region): ApiPath<String>,
) -> ApiResult<Json<Vec<Place>>> {
    let use_case = place_use_case(&app_state);
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
) -> ApiResult<Json<Vec<Place>>> {
    let use_case = place_use_case(&app_state);
    Ok(Json(
        use_case
            .list_by_country(&country)
            .await
            .map_err(ApiError::from)?,
    ))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceSearchQueryParams {
    /// 地域名
    #[serde(default, deserialize_with = "deserialize_option_non_blank")]
    pub region: Option<String>,
    /// 国名
    #[serde(default, deserialize_with = "deserialize_option_non_blank")]
    pub country: Option<String>,
}

#[tracing::instrument(skip(app_state))]
pub async fn search(
    State(app_state): State<AppState>,
    ApiQuery(params): ApiQuery<PlaceSearchQueryParams>,
) -> ApiResult<Json<Vec<Place>>> {
    let (Some(region), Some(country)) = (params.region, params.country) else {
        return Err(bad_request("Both region and country must be provided"));
    };
    let use_case = place_use_case(&app_state);
    let places = use_case
        .list_by_region_and_country(&region, &country)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(places))
}

/// 場所を新規作成するときのリクエストボディ
///
/// `id`が含まれていても無視する。
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceRequestBody {
    pub name: String,
    pub region: String,
    pub country: String,
}

impl TryFrom<PlaceRequestBody> for PlaceInput {
    type Error = domain::DomainError;

    fn try_from(body: PlaceRequestBody) -> DomainResult<Self> {
        Ok(PlaceInput {
            name: PlaceName::new(body.name)?,
            region: RegionName::new(body.region)?,
            country: CountryName::new(body.country)?,
        })
    }
}

#[tracing::instrument(skip(app_state))]
pub async fn create(
    State(app_state): State<AppState>,
    ApiJson(body): ApiJson<PlaceRequestBody>,
) -> ApiResult<(StatusCode, Json<Place>)> {
    let input = PlaceInput::try_from(body).map_err(ApiError::from)?;
    let use_case = place_use_case(&app_state);
    let place = use_case.create(input).await.map_err(ApiError::from)?;
    tracing::info!(id = %place.id, "created a place");
    Ok((StatusCode::CREATED, Json(place)))
}

#[tracing::instrument(skip(app_state))]
pub async fn update(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(fields): ApiJson<FieldMap>,
) -> ApiResult<Json<Place>> {
    let use_case = place_use_case(&app_state);
    let place = use_case
        .update(PlaceId::from(id), fields)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(place))
}

#[tracing::instrument(skip(app_state))]
pub async fn delete(
    State(app_state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<&'static str> {
    let use_case = place_use_case(&app_state);
    use_case
        .delete(PlaceId::from(id))
        .await
        .map_err(ApiError::from)?;
    Ok("The place was deleted successfully")
}

/// 場所に所在する宿泊施設を宿泊施設サービスから取得する。
#[tracing::instrument(skip(state))]
pub async fn lodgings(
    State(state): State<LocationsState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Vec<LodgingView>>> {
    let use_case = place_use_case(&state.app);
    let lodgings = use_case
        .lodgings(PlaceId::from(id), state.lodgings.as_ref())
        .await
        .map_err(ApiError::from)?;
    Ok(Json(lodgings))
}
