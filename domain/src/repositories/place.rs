use crate::{
    DomainResult,
    models::{CountryName, Place, PlaceName, RegionName},
    repositories::CatalogRepository,
};

/// 場所を新規作成するときの入力
#[derive(Debug, Clone)]
pub struct PlaceInput {
    /// 名前
    pub name: PlaceName,
    /// 地域名
    pub region: RegionName,
    /// 国名
    pub country: CountryName,
}

/// 場所リポジトリ
#[async_trait::async_trait]
pub trait PlaceRepository: CatalogRepository<Entity = Place, Input = PlaceInput> {
    /// 地域名と国名の両方が一致する場所をリストする。
    async fn list_by_region_and_country(
        &self,
        region: &str,
        country: &str,
    ) -> DomainResult<Vec<Place>>;
}
