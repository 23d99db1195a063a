//! 宿泊施設サービスを呼び出すリモートアクセサ
//!
//! 場所サービスは、宿泊施設サービスのHTTP APIを通じて宿泊施設を検索する。
//! リモートアクセサのエラーは呼び出し元のリクエストに伝播させず、必ずサーキットブレーカーが
//! フォールバック値に変換する。
use serde::{Deserialize, Serialize};

use crate::repositories::LodgingFilter;

/// 宿泊施設サービスから受け取った宿泊施設
///
/// 宿泊施設サービスが保存している値をそのまま保持し、場所サービスでは検証しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LodgingView {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub rating: i16,
    pub place_name: String,
    pub region: String,
    pub country: String,
}

/// 下流サービスの劣化
///
/// 呼び出し元には公開されず、サーキットブレーカーの失敗として記録される。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DownstreamError {
    /// タイムアウト
    #[error("the downstream request timed out: {0}")]
    Timeout(String),

    /// 接続エラー
    #[error("failed to connect to the downstream: {0}")]
    Connection(String),

    /// 成功以外のステータスコード
    #[error("the downstream responded with status {0}")]
    Status(u16),

    /// レスポンスボディの解析エラー
    #[error("failed to decode the downstream response: {0}")]
    Decode(String),
}

/// 宿泊施設サービスのリモートアクセサ
///
/// 宿泊施設サービスが`404 Not Found`を返した場合は、該当する宿泊施設が存在しないものとして
/// `Ok(None)`または空のベクタを返す。
#[async_trait::async_trait]
pub trait LodgingAccessor: Send + Sync {
    /// 宿泊施設をIDで取得する。
    async fn by_id(&self, id: i64) -> Result<Option<LodgingView>, DownstreamError>;

    /// 場所名で宿泊施設を検索する。
    async fn by_city(&self, city: &str) -> Result<Vec<LodgingView>, DownstreamError>;

    /// 地域名で宿泊施設を検索する。
    async fn by_state(&self, region: &str) -> Result<Vec<LodgingView>, DownstreamError>;

    /// 国名で宿泊施設を検索する。
    async fn by_country(&self, country: &str) -> Result<Vec<LodgingView>, DownstreamError>;

    /// 複合検索条件で宿泊施設を検索する。
    async fn by_filter(&self, filter: &LodgingFilter)
    -> Result<Vec<LodgingView>, DownstreamError>;
}
