use std::fmt;
use std::sync::Arc;

use domain::{
    remote::{LodgingAccessor, LodgingView},
    repositories::LodgingFilter,
};
use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitConfigError, CircuitEventSink, CircuitSnapshot,
    TracingEventSink,
};

/// 宿泊施設サービスの呼び出しの種類
///
/// 呼び出しの種類ごとに独立したサーキットブレーカーを持つ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LodgingCallKind {
    ById,
    ByCity,
    ByState,
    ByCountry,
    ByFilters,
}

impl LodgingCallKind {
    pub const ALL: [LodgingCallKind; 5] = [
        Self::ById,
        Self::ByCity,
        Self::ByState,
        Self::ByCountry,
        Self::ByFilters,
    ];

    /// サーキットブレーカーと設定で使用する名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::ById => "by-id",
            Self::ByCity => "by-city",
            Self::ByState => "by-state",
            Self::ByCountry => "by-country",
            Self::ByFilters => "by-filters",
        }
    }
}

impl fmt::Display for LodgingCallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// サーキットブレーカーで保護された宿泊施設サービスのリモートアクセサ
///
/// 下流サービスが劣化している場合でもエラーを返さず、単一の宿泊施設は`None`、
/// 宿泊施設のリストは空のベクタをフォールバック値として返す。
pub struct ResilientLodgingAccessor<A>
where
    A: LodgingAccessor,
{
    accessor: A,
    by_id: CircuitBreaker,
    by_city: CircuitBreaker,
    by_state: CircuitBreaker,
    by_country: CircuitBreaker,
    by_filters: CircuitBreaker,
}

impl<A> ResilientLodgingAccessor<A>
where
    A: LodgingAccessor,
{
    /// 呼び出しの種類ごとの設定で、`tracing`にイベントを記録するサーキットブレーカーを作成する。
    pub fn new<F>(accessor: A, config: F) -> Result<Self, CircuitConfigError>
    where
        F: Fn(LodgingCallKind) -> CircuitBreakerConfig,
    {
        Self::with_sink(accessor, config, Arc::new(TracingEventSink))
    }

    pub fn with_sink<F>(
        accessor: A,
        config: F,
        sink: Arc<dyn CircuitEventSink>,
    ) -> Result<Self, CircuitConfigError>
    where
        F: Fn(LodgingCallKind) -> CircuitBreakerConfig,
    {
        let breaker = |kind: LodgingCallKind| {
            CircuitBreaker::with_sink(kind.name(), config(kind), sink.clone())
        };
        Ok(Self {
            accessor,
            by_id: breaker(LodgingCallKind::ById)?,
            by_city: breaker(LodgingCallKind::ByCity)?,
            by_state: breaker(LodgingCallKind::ByState)?,
            by_country: breaker(LodgingCallKind::ByCountry)?,
            by_filters: breaker(LodgingCallKind::ByFilters)?,
        })
    }

    pub fn breaker(&self, kind: LodgingCallKind) -> &CircuitBreaker {
        match kind {
            LodgingCallKind::ById => &self.by_id,
            LodgingCallKind::ByCity => &self.by_city,
            LodgingCallKind::ByState => &self.by_state,
            LodgingCallKind::ByCountry => &self.by_country,
            LodgingCallKind::ByFilters => &self.by_filters,
        }
    }

    /// すべてのサーキットブレーカーのスナップショットを返す。
    pub fn snapshots(&self) -> Vec<CircuitSnapshot> {
        LodgingCallKind::ALL
            .iter()
            .map(|kind| self.breaker(*kind).snapshot())
            .collect()
    }

    /// 宿泊施設をIDで取得する。
    pub async fn by_id(&self, id: i64) -> Option<LodgingView> {
        self.by_id
            .execute(|| self.accessor.by_id(id), || None)
            .await
    }

    /// 場所名で宿泊施設を検索する。
    pub async fn by_city(&self, city: &str) -> Vec<LodgingView> {
        self.by_city
            .execute(|| self.accessor.by_city(city), Vec::new)
            .await
    }

    /// 地域名で宿泊施設を検索する。
    pub async fn by_state(&self, region: &str) -> Vec<LodgingView> {
        self.by_state
            .execute(|| self.accessor.by_state(region), Vec::new)
            .await
    }

    /// 国名で宿泊施設を検索する。
    pub async fn by_country(&self, country: &str) -> Vec<LodgingView> {
        self.by_country
            .execute(|| self.accessor.by_country(country), Vec::new)
            .await
    }

    /// 複合検索条件で宿泊施設を検索する。
    pub async fn by_filter(&self, filter: &LodgingFilter) -> Vec<LodgingView> {
        self.by_filters
            .execute(|| self.accessor.by_filter(filter), Vec::new)
            .await
    }
}
