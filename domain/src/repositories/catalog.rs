use crate::{DomainResult, models::primitives::Id};

/// カタログリポジトリ
///
/// 場所と宿泊施設のレコードストアに共通する操作を定義する。
/// 名前の検索は大文字と小文字を区別しない完全一致で、地域名と国名による検索も同様である。
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync {
    /// エンティティ
    type Entity: Send + Sync;
    /// エンティティを新規作成するときの入力
    type Input: Send + Sync;

    /// 登録されているエンティティの数を返す。
    async fn count(&self) -> DomainResult<i64>;

    /// すべてのエンティティをID順にリストする。
    async fn list(&self) -> DomainResult<Vec<Self::Entity>>;

    /// エンティティをIDで取得する。
    async fn by_id(&self, id: Id<Self::Entity>) -> DomainResult<Option<Self::Entity>>;

    /// エンティティを名前で取得する。
    ///
    /// 名前の一意性は保証されないため、複数存在する場合はIDが最も小さいエンティティを返す。
    async fn by_name(&self, name: &str) -> DomainResult<Option<Self::Entity>>;

    /// 地域名が一致するエンティティをリストする。
    async fn list_by_region(&self, region: &str) -> DomainResult<Vec<Self::Entity>>;

    /// 国名が一致するエンティティをリストする。
    async fn list_by_country(&self, country: &str) -> DomainResult<Vec<Self::Entity>>;

    /// エンティティを新規作成する。
    ///
    /// IDはレコードストアが採番する。
    async fn create(&self, input: Self::Input) -> DomainResult<Self::Entity>;

    /// 複数のエンティティを1つのトランザクションで新規作成して、作成した数を返す。
    async fn create_many(&self, inputs: Vec<Self::Input>) -> DomainResult<u64>;

    /// エンティティをIDで上書きする。
    ///
    /// エンティティが存在しない場合はエラーを返す。
    async fn update(&self, entity: Self::Entity) -> DomainResult<Self::Entity>;

    /// エンティティを削除する。
    ///
    /// エンティティが存在しない場合でもエラーを返さない。
    async fn delete(&self, id: Id<Self::Entity>) -> DomainResult<()>;
}
