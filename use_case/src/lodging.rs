use domain::{
    DomainErrorKind, DomainResult, domain_error,
    models::{Lodging, Rating},
    repositories::{LodgingFilter, LodgingRepository},
};

use crate::catalog::{CatalogUseCase, non_empty};

/// 宿泊施設ユースケース
pub struct LodgingUseCase<R>
where
    R: LodgingRepository,
{
    pub repo: R,
}

impl<R> CatalogUseCase<R> for LodgingUseCase<R>
where
    R: LodgingRepository,
{
    const LABEL: &'static str = "Lodging";

    fn repo(&self) -> &R {
        &self.repo
    }
}

impl<R> LodgingUseCase<R>
where
    R: LodgingRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// 宿泊施設を住所で取得する。
    pub async fn find_by_address(&self, address: &str) -> DomainResult<Lodging> {
        self.repo.by_address(address).await?.ok_or_else(|| {
            domain_error(
                DomainErrorKind::NotFound,
                format!("Lodging not found with address {}", address),
            )
        })
    }

    /// 場所名が一致する宿泊施設をリストする。
    pub async fn list_by_city(&self, city: &str) -> DomainResult<Vec<Lodging>> {
        let lodgings = self.repo.list_by_city(city).await?;
        non_empty(lodgings, format!("No lodging was found in the city {}", city))
    }

    /// 評価が一致する宿泊施設をリストする。
    ///
    /// 評価が範囲外の場合は、レコードストアに問い合わせずに検証エラーを返す。
    pub async fn list_by_rating(&self, rating: i16) -> DomainResult<Vec<Lodging>> {
        let rating = Rating::new(rating)?;
        let lodgings = self.repo.list_by_rating(rating).await?;
        non_empty(lodgings, format!("No lodging was found with rating {}", rating))
    }

    /// 複合検索条件に一致する宿泊施設をリストする。
    pub async fn list_by_filter(&self, filter: &LodgingFilter) -> DomainResult<Vec<Lodging>> {
        if filter.is_empty() {
            return Err(domain_error(
                DomainErrorKind::Validation,
                domain::FILTER_MISSING,
            ));
        }
        let lodgings = self.repo.list_by_filter(filter).await?;
        non_empty(lodgings, "No lodging matched the filters")
    }
}
