use std::time::Duration;

use anyhow::Context as _;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use domain::{
    remote::{DownstreamError, LodgingAccessor, LodgingView},
    repositories::LodgingFilter,
};

/// 宿泊施設サービスのHTTP APIを呼び出すリモートアクセサ
#[derive(Debug, Clone)]
pub struct HttpLodgingAccessor {
    client: Client,
    base_url: Url,
}

impl HttpLodgingAccessor {
    /// リモートアクセサを作成する。
    ///
    /// `timeout`は接続からレスポンスボディの受信までを含む、1回のリクエストのタイムアウトである。
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("The accommodations base URL is invalid: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("The accommodations base URL cannot be a base: {}", base_url);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self { client, base_url })
    }

    /// ベースURLにパスセグメントを追加したURLを返す。
    ///
    /// パスセグメントはパーセントエンコードされる。
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GETリクエストを送信して、レスポンスボディをデシリアライズする。
    ///
    /// `404 Not Found`は該当するデータが存在しないことを表すため、`None`を返す。
    async fn get<T>(&self, url: Url) -> Result<Option<T>, DownstreamError>
    where
        T: DeserializeOwned,
    {
        tracing::debug!(%url, "calling the accommodations service");
        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DownstreamError::Status(status.as_u16()));
        }
        response.json::<T>().await.map(Some).map_err(|e| {
            if e.is_timeout() {
                DownstreamError::Timeout(e.to_string())
            } else {
                DownstreamError::Decode(e.to_string())
            }
        })
    }

    async fn list(&self, url: Url) -> Result<Vec<LodgingView>, DownstreamError> {
        Ok(self.get::<Vec<LodgingView>>(url).await?.unwrap_or_default())
    }
}

fn request_error(e: reqwest::Error) -> DownstreamError {
    if e.is_timeout() {
        DownstreamError::Timeout(e.to_string())
    } else {
        DownstreamError::Connection(e.to_string())
    }
}

#[async_trait::async_trait]
impl LodgingAccessor for HttpLodgingAccessor {
    async fn by_id(&self, id: i64) -> Result<Option<LodgingView>, DownstreamError> {
        let url = self.url(&["lodgings", "id", &id.to_string()]);
        self.get(url).await
    }

    async fn by_city(&self, city: &str) -> Result<Vec<LodgingView>, DownstreamError> {
        self.list(self.url(&["lodgings", "city", city])).await
    }

    async fn by_state(&self, region: &str) -> Result<Vec<LodgingView>, DownstreamError> {
        self.list(self.url(&["lodgings", "region", region])).await
    }

    async fn by_country(&self, country: &str) -> Result<Vec<LodgingView>, DownstreamError> {
        self.list(self.url(&["lodgings", "country", country])).await
    }

    async fn by_filter(
        &self,
        filter: &LodgingFilter,
    ) -> Result<Vec<LodgingView>, DownstreamError> {
        let mut url = self.url(&["lodgings", "filters"]);
        {
            let mut query = url.query_pairs_mut();
            if let Some(city) = &filter.city {
                query.append_pair("city", city);
            }
            if let Some(region) = &filter.region {
                query.append_pair("region", region);
            }
            if let Some(country) = &filter.country {
                query.append_pair("country", country);
            }
            if let Some(rating) = filter.rating {
                query.append_pair("rating", &rating.to_string());
            }
        }
        self.list(url).await
    }
}
