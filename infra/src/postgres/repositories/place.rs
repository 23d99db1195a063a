use domain::{
    DomainError, DomainResult,
    models::{CountryName, Place, PlaceId, PlaceName, RegionName},
    repositories::{CatalogRepository, PlaceInput, PlaceRepository},
};

use super::{PgRepository, commit, not_found, repository_error};

pub type PgPlaceRepository = PgRepository<Place>;

macro_rules! select_places {
    ($($clause:literal)?) => {
        concat!("SELECT id, name, region, country FROM places ", $($clause)?)
    };
}

#[async_trait::async_trait]
impl CatalogRepository for PgPlaceRepository {
    type Entity = Place;
    type Input = PlaceInput;

    async fn count(&self) -> DomainResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM places")
            .fetch_one(&self.pool)
            .await
            .map_err(repository_error)
    }

    async fn list(&self) -> DomainResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(select_places!("ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(repository_error)?;
        rows.into_iter().map(Place::try_from).collect()
    }

    async fn by_id(&self, id: PlaceId) -> DomainResult<Option<Place>> {
        let row = sqlx::query_as::<_, PlaceRow>(select_places!("WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(repository_error)?;
        row.map(Place::try_from).transpose()
    }

    async fn by_name(&self, name: &str) -> DomainResult<Option<Place>> {
        let row = sqlx::query_as::<_, PlaceRow>(select_places!(
            "WHERE LOWER(name) = LOWER($1) ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error)?;
        row.map(Place::try_from).transpose()
    }

    async fn list_by_region(&self, region: &str) -> DomainResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(select_places!(
            "WHERE LOWER(region) = LOWER($1) ORDER BY id"
        ))
        .bind(region)
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        rows.into_iter().map(Place::try_from).collect()
    }

    async fn list_by_country(&self, country: &str) -> DomainResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(select_places!(
            "WHERE LOWER(country) = LOWER($1) ORDER BY id"
        ))
        .bind(country)
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        rows.into_iter().map(Place::try_from).collect()
    }

    async fn create(&self, input: PlaceInput) -> DomainResult<Place> {
        let mut tx = self.begin().await?;
        let row = sqlx::query_as::<_, PlaceRow>(
            r#"
            INSERT INTO places (name, region, country)
            VALUES ($1, $2, $3)
            RETURNING id, name, region, country
            "#,
        )
        .bind(input.name.as_str())
        .bind(input.region.as_str())
        .bind(input.country.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(repository_error)?;
        commit(tx).await?;
        Place::try_from(row)
    }

    async fn create_many(&self, inputs: Vec<PlaceInput>) -> DomainResult<u64> {
        let mut tx = self.begin().await?;
        let mut inserted = 0;
        for input in inputs {
            inserted += sqlx::query(
                r#"
                INSERT INTO places (name, region, country)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(input.name.as_str())
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

    async fn update(&self, place: Place) -> DomainResult<Place> {
        let mut tx = self.begin().await?;
        let row = sqlx::query_as::<_, PlaceRow>(
            r#"
            UPDATE places
            SET name = $1, region = $2, country = $3
            WHERE id = $4
            RETURNING id, name, region, country
            "#,
        )
        .bind(place.name.as_str())
        .bind(place.region.as_str())
        .bind(place.country.as_str())
        .bind(place.id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(repository_error)?;
        match row {
            Some(row) => {
                commit(tx).await?;
                Place::try_from(row)
            }
            None => not_found("Place", place.id.0),
        }
    }

    async fn delete(&self, id: PlaceId) -> DomainResult<()> {
        let mut tx = self.begin().await?;
        sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await
            .map_err(repository_error)?;
        commit(tx).await
    }
}

#[async_trait::async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn list_by_region_and_country(
        &self,
        region: &str,
        country: &str,
    ) -> DomainResult<Vec<Place>> {
        let rows = sqlx::query_as::<_, PlaceRow>(select_places!(
            "WHERE LOWER(region) = LOWER($1) AND LOWER(country) = LOWER($2) ORDER BY id"
        ))
        .bind(region)
        .bind(country)
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;
        rows.into_iter().map(Place::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlaceRow {
    id: i64,
    name: String,
    region: String,
    country: String,
}

impl TryFrom<PlaceRow> for Place {
    type Error = DomainError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        Ok(Place {
            id: PlaceId::from(row.id),
            name: PlaceName::new(row.name)?,
            region: RegionName::new(row.region)?,
            country: CountryName::new(row.country)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_places_appends_clause() {
        assert_eq!(
            select_places!("WHERE id = $1"),
            "SELECT id, name, region, country FROM places WHERE id = $1"
        );
    }

    #[test]
    fn row_is_converted_to_place() {
        let row = PlaceRow {
            id: 1,
            name: String::from("Miami"),
            region: String::from("Florida"),
            country: String::from("USA"),
        };
        let place = Place::try_from(row).unwrap();
        assert_eq!(place.id, PlaceId::from(1));
        assert_eq!(place.name.as_str(), "Miami");
    }

    #[test]
    fn blank_row_is_rejected() {
        let row = PlaceRow {
            id: 1,
            name: String::from(" "),
            region: String::from("Florida"),
            country: String::from("USA"),
        };
        assert!(Place::try_from(row).is_err());
    }
}
