use std::borrow::Cow;

use enum_display::EnumDisplay;

pub mod models;
pub mod remote;
pub mod repositories;

/// ドメインエラーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay)]
pub enum DomainErrorKind {
    /// 検証エラー
    Validation,
    /// エンティティが存在しない
    NotFound,
    /// リポジトリエラー
    Repository,
    /// 予期しないエラー
    Unexpected,
}

/// ドメインエラー
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct DomainError {
    /// エラーの種類
    pub kind: DomainErrorKind,
    /// エラーメッセージ
    pub message: Cow<'static, str>,
}

/// ドメイン結果
pub type DomainResult<T> = Result<T, DomainError>;

/// ドメインエラーを作成する。
pub fn domain_error<M>(kind: DomainErrorKind, message: M) -> DomainError
where
    M: Into<Cow<'static, str>>,
{
    DomainError {
        kind,
        message: message.into(),
    }
}

/// 評価が範囲外のときのエラーメッセージ
pub const RATING_OUT_OF_RANGE: &str = "Rating cannot be lower than 1 or greater than 5";

/// フィルタが1つも指定されていないときのエラーメッセージ
pub const FILTER_MISSING: &str = "At least one filter must be provided";
