use domain::{
    DomainResult,
    models::{Place, PlaceId},
    remote::{LodgingAccessor, LodgingView},
    repositories::PlaceRepository,
};

use crate::catalog::{CatalogUseCase, non_empty};
use crate::remote_lodging::ResilientLodgingAccessor;

/// 場所ユースケース
pub struct PlaceUseCase<R>
where
    R: PlaceRepository,
{
    pub repo: R,
}

impl<R> CatalogUseCase<R> for PlaceUseCase<R>
where
    R: PlaceRepository,
{
    const LABEL: &'static str = "Place";

    fn repo(&self) -> &R {
        &self.repo
    }
}

impl<R> PlaceUseCase<R>
where
    R: PlaceRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// 地域名と国名の両方が一致する場所をリストする。
    pub async fn list_by_region_and_country(
        &self,
        region: &str,
        country: &str,
    ) -> DomainResult<Vec<Place>> {
        let places = self.repo.list_by_region_and_country(region, country).await?;
        non_empty(
            places,
            format!("No place was found in {}, {}", region, country),
        )
    }

    /// 場所に所在する宿泊施設を宿泊施設サービスから取得する。
    ///
    /// 場所名で問い合わせた結果のうち、地域名と国名も大文字小文字を区別せずに一致する
    /// 宿泊施設だけを返す。場所が存在しない場合は`NotFound`を返す。
    /// 宿泊施設サービスが劣化している場合は、空のベクタを返す。
    pub async fn lodgings<A>(
        &self,
        id: PlaceId,
        lodgings: &ResilientLodgingAccessor<A>,
    ) -> DomainResult<Vec<LodgingView>>
    where
        A: LodgingAccessor,
    {
        let place = self.find_by_id(id).await?;
        let region = place.region.as_str().to_lowercase();
        let country = place.country.as_str().to_lowercase();
        Ok(lodgings
            .by_city(place.name.as_str())
            .await
            .into_iter()
            .filter(|l| l.region.to_lowercase() == region && l.country.to_lowercase() == country)
            .collect())
    }
}
