use domain::{
    DomainError, DomainResult,
    models::{Address, CountryName, Lodging, LodgingId, LodgingName, PlaceName, Rating, RegionName},
    repositories::{CatalogRepository, LodgingFilter, LodgingInput, LodgingRepository},
};
use utils::text::contains_pattern;

use super::{PgRepository, commit, not_found, repository_error};

pub type PgLodgingRepository = PgRepository<Lodging>;

macro_rules! select_lodgings {
    ($($clause:literal)?) => {
        concat!(
            "SELECT id, name, address, rating, place_name, region, country FROM lodgings ",
            $($clause)?
        )
    };
}

#[async_trait::async_trait]
impl CatalogRepository for PgLodgingRepository {
    type Entity = Lodging;
    type Input = LodgingInput;

    async fn count(&self) -> DomainResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lodgings")
            .fetch_one(&self.pool)
            .await
            .map_err(repository_error)
    }

    async fn list(&self) -> DomainResult<Vec<Lodging>> {
        let rows = sqlx::query_as::<_, LodgingRow>(select_lodgings!("ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(repository_error)?;
        rows.into_iter().map(Lodging::try_from).collect()
    }

    async fn by_id(&self, id: LodgingId) -> DomainResult<Option<Lodging>> {
        let row = sqlx::query_as::<_, LodgingRow>(select_lodgings!("WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(repository_error)?;
        row.map(Lodging::try_from).transpose()
    }

    async fn by_name(&self, name: &str) -> DomainResult<Option<Lodging>> {
        let row = sqlx::query_as::<_, LodgingRow>(select_lodgings!(
            "WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error)?;
        row.map(Lodging::try_from).transpose()
    }

    async fn list_by_region(&self, region: &str) -> DomainResult<Vec<Lodging>> {
        let rows = sqlx::query_as::<_, LodgingRow>(select_lodgings!(
            "WHERE LOWER(region) = LOWER($1) ORDER BY id"
        ))
        .bind(region)
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        rows.into_iter().map(Lodging::try_from).collect()
    }

    async fn list_by_country(&self, country: &str) -> DomainResult<Vec<Lodging>> {
        let rows = sqlx::query_as::<_, LodgingRow>(select_lodgings!(
            "WHERE LOWER(country) = LOWER($1) ORDER BY id"
        ))
        .bind(country)
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        rows.into_iter().map(Lodging::try_from).collect()
    }

    async fn create(&self, input: LodgingInput) -> DomainResult<Lodging> {
        let mut tx = self.begin().await?;
        let row = sqlx::query_as::<_, LodgingRow>(
            r#"
            INSERT INTO lodgings (name, address, rating, place_name, region, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, address, rating, place_name, region, country
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.address.as_str())
        .bind(input.rating.value())
        .bind(input.place_name.as_str())
        .bind(input.region.as_str())
        .bind(input.country.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(repository_error)?;
        commit(tx).await?;
        Lodging::try_from(row)
    }

    async fn create_many(&self, inputs: Vec<LodgingInput>) -> DomainResult<u64> {
        let mut tx = self.begin().await?;
        let mut inserted = 0;
        for input in inputs {
            inserted += sqlx::query(
                r#"
                INSERT INTO lodgings (name, address, rating, place_name, region, country)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(input.name.as_str())
            .bind(input.address.as_str())
            .bind(input.rating.value())
            .bind(input.place_name.as_str())
            .bind(input.region.as_str())
            .bind(input.country.as_str())
            .execute(&mut *tx)
            .await
            .map_err(repository_error)?
            .rows_affected();
        }
        commit(tx).await?;
        Ok(inserted)
    }

    async fn update(&self, lodging: Lodging) -> DomainResult<Lodging> {
        let mut tx = self.begin().await?;
        let row = sqlx::query_as::<_, LodgingRow>(
            r#"
            UPDATE lodgings
            SET name = $1, address = $2, rating = $3, place_name = $4, region = $5, country = $6
            WHERE id = $7
            RETURNING id, name, address, rating, place_name, region, country
            "#,
        )
        .bind(lodging.name.as_str())
        .bind(lodging.address.as_str())
        .bind(lodging.rating.value())
        .bind(lodging.place_name.as_str())
        .bind(lodging.region.as_str())
        .bind(lodging.country.as_str())
        .bind(lodging.id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(repository_error)?;
        match row {
            Some(row) => {
                commit(tx).await?;
                Lodging::try_from(row)
            }
            None => not_found("Lodging", lodging.id.0),
        }
    }

    async fn delete(&self, id: LodgingId) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM lodgings WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .map_err(repository_error)?;
        commit(tx).await
    }
}

#[async_trait::async_trait]
impl LodgingRepository for PgLodgingRepository {
    async fn by_address(&self, address: &str) -> DomainResult<Option<Lodging>> {
        let row = sqlx::query_as::<_, LodgingRow>(select_lodgings!(
            "WHERE LOWER(address) = LOWER($1) ORDER BY id LIMIT 1"
        ))
        .bind(address)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error)?;
        row.map(Lodging::try_from).transpose()
    }

    async fn list_by_city(&self, city: &str) -> DomainResult<Vec<Lodging>> {
        let rows = sqlx::query_as::<_, LodgingRow>(select_lodgings!(
            "WHERE LOWER(place_name) = LOWER($1) ORDER BY id"
        ))
        .bind(city)
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        rows.into_iter().map(Lodging::try_from).collect()
    }

    async fn list_by_rating(&self, rating: Rating) -> DomainResult<Vec<Lodging>> {
        let rows =
            sqlx::query_as::<_, LodgingRow>(select_lodgings!("WHERE rating = $1 ORDER BY id"))
                .bind(rating.value())
                .fetch_all(&self.pool)
                .await
                .map_err(repository_error)?;
        rows.into_iter().map(Lodging::try_from).collect()
    }

    async fn list_by_filter(&self, filter: &LodgingFilter) -> DomainResult<Vec<Lodging>> {
        // 指定されていない条件はNULLをバインドして、検索を制約しない
        let rows = sqlx::query_as::<_, LodgingRow>(select_lodgings!(
            r#"
            WHERE ($1::TEXT IS NULL OR place_name ILIKE $1 ESCAPE '\')
                AND ($2::TEXT IS NULL OR region ILIKE $2 ESCAPE '\')
                AND ($3::TEXT IS NULL OR country ILIKE $3 ESCAPE '\')
                AND ($4::SMALLINT IS NULL OR rating = $4)
            ORDER BY id
            "#
        ))
        .bind(filter.city.as_deref().map(contains_pattern))
        .bind(filter.region.as_deref().map(contains_pattern))
        .bind(filter.country.as_deref().map(contains_pattern))
        .bind(filter.rating.map(|r| r.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        rows.into_iter().map(Lodging::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LodgingRow {
    id: i64,
    name: String,
    address: String,
    rating: i16,
    place_name: String,
    region: String,
    country: String,
}

impl TryFrom<LodgingRow> for Lodging {
    type Error = DomainError;

    fn try_from(row: LodgingRow) -> Result<Self, Self::Error> {
        Ok(Lodging {
            id: LodgingId::from(row.id),
            name: LodgingName::new(row.name)?,
            address: Address::new(row.address)?,
            rating: Rating::new(row.rating)?,
            place_name: PlaceName::new(row.place_name)?,
            region: RegionName::new(row.region)?,
            country: CountryName::new(row.country)?,
        })
    }
}
