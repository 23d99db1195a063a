use crate::{
    DomainErrorKind, DomainResult, FILTER_MISSING, domain_error,
    models::{Address, CountryName, Lodging, LodgingName, PlaceName, Rating, RegionName},
    repositories::CatalogRepository,
};

/// 宿泊施設を新規作成するときの入力
#[derive(Debug, Clone)]
pub struct LodgingInput {
    /// 名前
    pub name: LodgingName,
    /// 住所
    pub address: Address,
    /// 評価
    pub rating: Rating,
    /// 所在地の場所名
    pub place_name: PlaceName,
    /// 地域名
    pub region: RegionName,
    /// 国名
    pub country: CountryName,
}

/// 宿泊施設の複合検索条件
///
/// 文字列の条件は大文字と小文字を区別しない部分一致、評価は完全一致で検索する。
/// 指定されていない条件は検索を制約しない。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LodgingFilter {
    /// 場所名
    pub city: Option<String>,
    /// 地域名
    pub region: Option<String>,
    /// 国名
    pub country: Option<String>,
    /// 評価
    pub rating: Option<Rating>,
}

impl LodgingFilter {
    /// 複合検索条件を作成する。
    ///
    /// 評価が範囲外の場合、またはすべての条件が指定されていない場合はエラーを返す。
    /// 空白のみの文字列は指定されていないものとして扱う。
    pub fn new(
        city: Option<String>,
        region: Option<String>,
        country: Option<String>,
        rating: Option<i16>,
    ) -> DomainResult<Self> {
        let rating = rating.map(Rating::new).transpose()?;
        let filter = Self {
            city: non_blank(city),
            region: non_blank(region),
            country: non_blank(country),
            rating,
        };
        if filter.is_empty() {
            return Err(domain_error(DomainErrorKind::Validation, FILTER_MISSING));
        }
        Ok(filter)
    }

    /// すべての条件が指定されていない場合は`true`を返す。
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.region.is_none() && self.country.is_none() && self.rating.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// 宿泊施設リポジトリ
#[async_trait::async_trait]
pub trait LodgingRepository: CatalogRepository<Entity = Lodging, Input = LodgingInput> {
    /// 宿泊施設を住所で取得する。
    async fn by_address(&self, address: &str) -> DomainResult<Option<Lodging>>;

    /// 場所名が一致する宿泊施設をリストする。
    async fn list_by_city(&self, city: &str) -> DomainResult<Vec<Lodging>>;

    /// 評価が一致する宿泊施設をリストする。
    async fn list_by_rating(&self, rating: Rating) -> DomainResult<Vec<Lodging>>;

    /// 複合検索条件に一致する宿泊施設をリストする。
    async fn list_by_filter(&self, filter: &LodgingFilter) -> DomainResult<Vec<Lodging>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RATING_OUT_OF_RANGE;

    #[test]
    fn filter_requires_at_least_one_condition() {
        let err = LodgingFilter::new(None, None, None, None).unwrap_err();
        assert_eq!(err.kind, DomainErrorKind::Validation);
        assert_eq!(err.message, FILTER_MISSING);
    }

    #[test]
    fn blank_conditions_count_as_missing() {
        let err = LodgingFilter::new(Some(String::from("  ")), Some(String::new()), None, None)
            .unwrap_err();
        assert_eq!(err.message, FILTER_MISSING);
    }

    #[rstest::rstest]
    #[case(0)]
    #[case(6)]
    fn filter_rejects_out_of_range_rating(#[case] rating: i16) {
        let err = LodgingFilter::new(Some(String::from("Miami")), None, None, Some(rating))
            .unwrap_err();
        assert_eq!(err.message, RATING_OUT_OF_RANGE);
    }

    #[test]
    fn filter_keeps_trimmed_conditions() {
        let filter = LodgingFilter::new(None, Some(String::from(" Florida ")), None, Some(4)).unwrap();
        assert_eq!(filter.region.as_deref(), Some("Florida"));
        assert_eq!(filter.rating.map(|r| r.value()), Some(4));
        assert!(filter.city.is_none());
    }
}
