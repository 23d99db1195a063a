pub mod lodging;
pub mod place;
pub mod remote_lodging;

/// ヘルスチェックハンドラ
#[tracing::instrument()]
pub async fn health_check() -> &'static str {
    "Ok, the server is running!"
}
