pub mod handler;

use std::borrow::Cow;

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};

use domain::{DomainError, DomainErrorKind};

/// API結果
pub type ApiResult<T> = Result<T, ApiError>;

/// APIエラー
///
/// レスポンスボディは`{"error": <ステータスの名前>, "message": <詳細>}`である。
#[derive(Debug)]
pub struct ApiError {
    /// HTTPステータスコード
    pub status_code: StatusCode,
    /// エラーメッセージ
    pub message: Cow<'static, str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.status_code.canonical_reason().unwrap_or("Unknown Error"),
            "message": self.message,
        });
        (self.status_code, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        let status_code = match error.kind {
            DomainErrorKind::Validation => StatusCode::BAD_REQUEST,
            DomainErrorKind::NotFound => StatusCode::NOT_FOUND,
            DomainErrorKind::Repository => StatusCode::INTERNAL_SERVER_ERROR,
            DomainErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status_code,
            message: error.message,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

pub fn bad_request<M>(message: M) -> ApiError
where
    M: Into<Cow<'static, str>>,
{
    ApiError {
        status_code: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

/// JSONボディエクストラクタ
///
/// 抽出できない場合は`400 Bad Request`を返す。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// パスパラメーターエクストラクタ
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// クエリパラメーターエクストラクタ
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use domain::domain_error;

    use super::*;

    async fn body(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest::rstest]
    #[case(DomainErrorKind::Validation, StatusCode::BAD_REQUEST, "Bad Request")]
    #[case(DomainErrorKind::NotFound, StatusCode::NOT_FOUND, "Not Found")]
    #[case(
        DomainErrorKind::Repository,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error"
    )]
    #[tokio::test]
    async fn domain_error_is_rendered_uniformly(
        #[case] kind: DomainErrorKind,
        #[case] status: StatusCode,
        #[case] category: &str,
    ) {
        let error = ApiError::from(domain_error(kind, "something happened"));

        let (actual, body) = body(error).await;

        assert_eq!(actual, status);
        assert_eq!(body["error"], category);
        assert_eq!(body["message"], "something happened");
    }
}
