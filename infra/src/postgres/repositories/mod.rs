mod lodging;
mod place;

pub use lodging::*;
pub use place::*;

use std::marker::PhantomData;

use sqlx::{PgPool, PgTransaction};

use domain::{DomainError, DomainErrorKind, DomainResult, domain_error};

/// PostgreSQLリポジトリ
pub struct PgRepository<T> {
    pub pool: PgPool,
    _marker: PhantomData<T>,
}

impl<T> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// トランザクションを開始する。
    pub async fn begin(&self) -> DomainResult<PgTransaction<'static>> {
        self.pool.begin().await.map_err(repository_error)
    }
}

/// トランザクションをコミットする。
pub async fn commit(tx: PgTransaction<'_>) -> DomainResult<()> {
    tx.commit().await.map_err(repository_error)
}

/// データベースエラーをリポジトリエラーに変換する。
///
/// データベースエラーの詳細はログに記録して、呼び出し元には返さない。
pub fn repository_error(e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, "failed to access the database");
    domain_error(DomainErrorKind::Repository, "Failed to access the database")
}

fn not_found<T>(label: &str, id: i64) -> DomainResult<T> {
    Err(domain_error(
        DomainErrorKind::NotFound,
        format!("{} not found with id {}", label, id),
    ))
}
