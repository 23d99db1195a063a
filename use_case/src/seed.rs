use domain::{DomainResult, repositories::CatalogRepository};

/// 初期データの投入結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// レコードストアが空ではないため投入しなかった。
    AlreadySeeded,
    /// 初期データのファイルが存在しないため投入しなかった。
    SourceMissing,
    /// 投入したレコードの数
    Imported(u64),
}

/// レコードストアが空の場合に限り、初期データを投入する。
///
/// `load`はレコードストアが空の場合にのみ呼び出され、初期データのファイルが存在しない場合は
/// `None`を返す。読み込んだすべての行は1つのトランザクションで投入される。
pub async fn import_if_empty<R, L>(repo: &R, load: L) -> DomainResult<SeedOutcome>
where
    R: CatalogRepository,
    L: FnOnce() -> DomainResult<Option<Vec<R::Input>>>,
{
    if repo.count().await? > 0 {
        return Ok(SeedOutcome::AlreadySeeded);
    }
    match load()? {
        Some(inputs) => Ok(SeedOutcome::Imported(repo.create_many(inputs).await?)),
        None => Ok(SeedOutcome::SourceMissing),
    }
}
