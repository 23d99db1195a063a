use std::borrow::Cow;

use domain::{
    DomainErrorKind, DomainResult, domain_error,
    models::{ApplyField, FieldMap, FieldUpdate, Id},
    repositories::CatalogRepository,
};

/// カタログユースケース
///
/// 場所と宿泊施設に共通する問い合わせと更新の方針を、デフォルトメソッドとして実装する。
/// 地域名と国名による検索は、該当するエンティティが存在しない場合に`NotFound`を返す。
#[async_trait::async_trait]
pub trait CatalogUseCase<R>
where
    R: CatalogRepository,
    R::Entity: ApplyField + 'static,
    R::Input: 'static,
{
    /// エラーメッセージに使用するエンティティの名前
    const LABEL: &'static str;

    fn repo(&self) -> &R;

    /// すべてのエンティティをリストする。
    async fn list_all(&self) -> DomainResult<Vec<R::Entity>> {
        self.repo().list().await
    }

    /// エンティティをIDで取得する。
    async fn find_by_id(&self, id: Id<R::Entity>) -> DomainResult<R::Entity> {
        self.repo().by_id(id).await?.ok_or_else(|| {
            domain_error(
                DomainErrorKind::NotFound,
                format!("{} not found with id {}", Self::LABEL, id),
            )
        })
    }

    /// エンティティを名前で取得する。
    async fn find_by_name(&self, name: &str) -> DomainResult<R::Entity> {
        self.repo().by_name(name).await?.ok_or_else(|| {
            domain_error(
                DomainErrorKind::NotFound,
                format!("{} not found with name {}", Self::LABEL, name),
            )
        })
    }

    /// 地域名が一致するエンティティをリストする。
    async fn list_by_region(&self, region: &str) -> DomainResult<Vec<R::Entity>> {
        let entities = self.repo().list_by_region(region).await?;
        non_empty(
            entities,
            format!("No {} was found in the region {}", Self::LABEL.to_lowercase(), region),
        )
    }

    /// 国名が一致するエンティティをリストする。
    async fn list_by_country(&self, country: &str) -> DomainResult<Vec<R::Entity>> {
        let entities = self.repo().list_by_country(country).await?;
        non_empty(
            entities,
            format!("No {} was found in the country {}", Self::LABEL.to_lowercase(), country),
        )
    }

    /// エンティティを新規作成する。
    async fn create(&self, input: R::Input) -> DomainResult<R::Entity> {
        self.repo().create(input).await
    }

    /// エンティティのフィールドを部分的に更新する。
    ///
    /// 認識できないフィールドは無視してログに記録する。
    /// 検証エラーが発生した場合は、どのフィールドも保存しない。
    /// 更新するフィールドがない場合は、保存せずに現在のエンティティを返す。
    async fn update(&self, id: Id<R::Entity>, fields: FieldMap) -> DomainResult<R::Entity> {
        let mut entity = self.find_by_id(id).await?;
        let mut applied = 0;
        for (name, value) in fields {
            match entity.apply_field(&name, value)? {
                FieldUpdate::Applied => applied += 1,
                FieldUpdate::Ignored => tracing::warn!(
                    entity = Self::LABEL,
                    %id,
                    field = %name,
                    "ignored an unrecognized field"
                ),
            }
        }
        if applied == 0 {
            return Ok(entity);
        }
        self.repo().update(entity).await
    }

    /// エンティティを削除する。
    ///
    /// エンティティが存在しなくてもエラーを返さない。
    async fn delete(&self, id: Id<R::Entity>) -> DomainResult<()> {
        self.repo().delete(id).await
    }
}

/// 空のリストを`NotFound`エラーに変換する。
pub(crate) fn non_empty<T, M>(entities: Vec<T>, message: M) -> DomainResult<Vec<T>>
where
    M: Into<Cow<'static, str>>,
{
    if entities.is_empty() {
        return Err(domain_error(DomainErrorKind::NotFound, message));
    }
    Ok(entities)
}
