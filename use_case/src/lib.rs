pub mod catalog;
pub mod lodging;
pub mod place;
pub mod remote_lodging;
pub mod seed;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::CatalogUseCase;
pub use lodging::LodgingUseCase;
pub use place::PlaceUseCase;
pub use remote_lodging::{LodgingCallKind, ResilientLodgingAccessor};
pub use seed::{SeedOutcome, import_if_empty};
