use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use domain::{
    DomainErrorKind, DomainResult, domain_error,
    models::{
        Address, CountryName, Id, Lodging, LodgingName, Place, PlaceName, Rating, RegionName,
    },
    remote::{DownstreamError, LodgingAccessor, LodgingView},
    repositories::{
        CatalogRepository, LodgingFilter, LodgingInput, LodgingRepository, PlaceInput,
        PlaceRepository,
    },
};

pub(crate) trait Record: Clone + Send + Sync + 'static {
    type Input: Send + Sync;

    fn from_input(id: i64, input: Self::Input) -> Self;
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn region(&self) -> &str;
    fn country(&self) -> &str;
}

impl Record for Place {
    type Input = PlaceInput;

    fn from_input(id: i64, input: PlaceInput) -> Self {
        Place {
            id: Id::from(id),
            name: input.name,
            region: input.region,
            country: input.country,
        }
    }

    fn id(&self) -> i64 {
        self.id.0
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn region(&self) -> &str {
        self.region.as_str()
    }

    fn country(&self) -> &str {
        self.country.as_str()
    }
}

impl Record for Lodging {
    type Input = LodgingInput;

    fn from_input(id: i64, input: LodgingInput) -> Self {
        Lodging {
            id: Id::from(id),
            name: input.name,
            address: input.address,
            rating: input.rating,
            place_name: input.place_name,
            region: input.region,
            country: input.country,
        }
    }

    fn id(&self) -> i64 {
        self.id.0
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }

    fn region(&self) -> &str {
        self.region.as_str()
    }

    fn country(&self) -> &str {
        self.country.as_str()
    }
}

/// 書き込みと問い合わせの回数を数えるメモリ上のレコードストア
pub(crate) struct InMemory<E> {
    rows: Mutex<Vec<E>>,
    next_id: AtomicI64,
    writes: AtomicUsize,
    queries: AtomicUsize,
}

impl<E> Default for InMemory<E> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            writes: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
        }
    }
}

pub(crate) type InMemoryPlaces = InMemory<Place>;
pub(crate) type InMemoryLodgings = InMemory<Lodging>;

impl<E: Record> InMemory<E> {
    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn select<F>(&self, predicate: F) -> Vec<E>
    where
        F: Fn(&E) -> bool,
    {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    fn insert(&self, input: E::Input) -> E {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = E::from_input(id, input);
        self.rows.lock().unwrap().push(row.clone());
        row
    }
}

fn contains(value: &str, pattern: &str) -> bool {
    value.to_lowercase().contains(&pattern.to_lowercase())
}

#[async_trait::async_trait]
impl<E: Record> CatalogRepository for InMemory<E> {
    type Entity = E;
    type Input = E::Input;

    async fn count(&self) -> DomainResult<i64> {
        Ok(self.select(|_| true).len() as i64)
    }

    async fn list(&self) -> DomainResult<Vec<E>> {
        Ok(self.select(|_| true))
    }

    async fn by_id(&self, id: Id<E>) -> DomainResult<Option<E>> {
        Ok(self.select(|row| row.id() == id.0).into_iter().next())
    }

    async fn by_name(&self, name: &str) -> DomainResult<Option<E>> {
        Ok(self
            .select(|row| row.name().eq_ignore_ascii_case(name))
            .into_iter()
            .next())
    }

    async fn list_by_region(&self, region: &str) -> DomainResult<Vec<E>> {
        Ok(self.select(|row| row.region().eq_ignore_ascii_case(region)))
    }

    async fn list_by_country(&self, country: &str) -> DomainResult<Vec<E>> {
        Ok(self.select(|row| row.country().eq_ignore_ascii_case(country)))
    }

    async fn create(&self, input: E::Input) -> DomainResult<E> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.insert(input))
    }

    async fn create_many(&self, inputs: Vec<E::Input>) -> DomainResult<u64> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let count = inputs.len() as u64;
        for input in inputs {
            self.insert(input);
        }
        Ok(count)
    }

    async fn update(&self, entity: E) -> DomainResult<E> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or_else(|| domain_error(DomainErrorKind::NotFound, "row not found"))?;
        *row = entity.clone();
        Ok(entity)
    }

    async fn delete(&self, id: Id<E>) -> DomainResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().retain(|row| row.id() != id.0);
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlaceRepository for InMemory<Place> {
    async fn list_by_region_and_country(
        &self,
        region: &str,
        country: &str,
    ) -> DomainResult<Vec<Place>> {
        Ok(self.select(|row| {
            row.region.as_str().eq_ignore_ascii_case(region)
                && row.country.as_str().eq_ignore_ascii_case(country)
        }))
    }
}

#[async_trait::async_trait]
impl LodgingRepository for InMemory<Lodging> {
    async fn by_address(&self, address: &str) -> DomainResult<Option<Lodging>> {
        Ok(self
            .select(|row| row.address.as_str().eq_ignore_ascii_case(address))
            .into_iter()
            .next())
    }

    async fn list_by_city(&self, city: &str) -> DomainResult<Vec<Lodging>> {
        Ok(self.select(|row| row.place_name.as_str().eq_ignore_ascii_case(city)))
    }

    async fn list_by_rating(&self, rating: Rating) -> DomainResult<Vec<Lodging>> {
        Ok(self.select(|row| row.rating == rating))
    }

    async fn list_by_filter(&self, filter: &LodgingFilter) -> DomainResult<Vec<Lodging>> {
        Ok(self.select(|row| {
            filter
                .city
                .as_deref()
                .is_none_or(|city| contains(row.place_name.as_str(), city))
                && filter
                    .region
                    .as_deref()
                    .is_none_or(|region| contains(row.region.as_str(), region))
                && filter
                    .country
                    .as_deref()
                    .is_none_or(|country| contains(row.country.as_str(), country))
                && filter.rating.is_none_or(|rating| row.rating == rating)
        }))
    }
}

/// 呼び出し回数と検索条件を記録する宿泊施設サービスの偽物
pub(crate) struct FakeLodgingAccessor {
    pub(crate) calls: Arc<AtomicUsize>,
    pub(crate) filters: Arc<Mutex<Vec<LodgingFilter>>>,
    pub(crate) healthy: Arc<AtomicBool>,
    lodgings: Vec<LodgingView>,
    error: DownstreamError,
}

impl FakeLodgingAccessor {
    pub(crate) fn healthy(lodgings: Vec<LodgingView>) -> Self {
        Self {
            calls: Arc::default(),
            filters: Arc::default(),
            healthy: Arc::new(AtomicBool::new(true)),
            lodgings,
            error: DownstreamError::Status(500),
        }
    }

    /// 健全に戻ったときは`ocean_drive_view`を返す。
    pub(crate) fn failing(error: DownstreamError) -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(false)),
            error,
            ..Self::healthy(vec![ocean_drive_view()])
        }
    }

    fn respond(&self) -> Result<Vec<LodgingView>, DownstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy.load(Ordering::SeqCst) {
            Ok(self.lodgings.clone())
        } else {
            Err(self.error.clone())
        }
    }
}

#[async_trait::async_trait]
impl LodgingAccessor for FakeLodgingAccessor {
    async fn by_id(&self, id: i64) -> Result<Option<LodgingView>, DownstreamError> {
        Ok(self.respond()?.into_iter().find(|l| l.id == id))
    }

    async fn by_city(&self, city: &str) -> Result<Vec<LodgingView>, DownstreamError> {
        Ok(self
            .respond()?
            .into_iter()
            .filter(|l| l.place_name.eq_ignore_ascii_case(city))
            .collect())
    }

    async fn by_state(&self, _region: &str) -> Result<Vec<LodgingView>, DownstreamError> {
        self.respond()
    }

    async fn by_country(&self, _country: &str) -> Result<Vec<LodgingView>, DownstreamError> {
        self.respond()
    }

    async fn by_filter(
        &self,
        filter: &LodgingFilter,
    ) -> Result<Vec<LodgingView>, DownstreamError> {
        self.filters.lock().unwrap().push(filter.clone());
        self.respond()
    }
}

pub(crate) fn place_input(name: &str, region: &str, country: &str) -> PlaceInput {
    PlaceInput {
        name: PlaceName::new(name.to_string()).unwrap(),
        region: RegionName::new(region.to_string()).unwrap(),
        country: CountryName::new(country.to_string()).unwrap(),
    }
}

pub(crate) fn lodging_input(
    name: &str,
    address: &str,
    rating: i16,
    city: &str,
    region: &str,
    country: &str,
) -> LodgingInput {
    LodgingInput {
        name: LodgingName::new(name.to_string()).unwrap(),
        address: Address::new(address.to_string()).unwrap(),
        rating: Rating::new(rating).unwrap(),
        place_name: PlaceName::new(city.to_string()).unwrap(),
        region: RegionName::new(region.to_string()).unwrap(),
        country: CountryName::new(country.to_string()).unwrap(),
    }
}

pub(crate) fn lodging_view(id: i64, name: &str, city: &str, region: &str) -> LodgingView {
    LodgingView {
        id,
        name: name.to_string(),
        address: format!("{} Main St", id),
        rating: 3,
        place_name: city.to_string(),
        region: region.to_string(),
        country: String::from("USA"),
    }
}

pub(crate) fn ocean_drive_view() -> LodgingView {
    LodgingView {
        id: 3,
        name: String::from("Ocean Drive Resort"),
        address: String::from("123 Ocean Dr"),
        rating: 5,
        place_name: String::from("Miami"),
        region: String::from("Florida"),
        country: String::from("USA"),
    }
}
