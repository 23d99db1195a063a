pub mod field;
mod lodging;
mod place;
pub mod primitives;

pub use field::{ApplyField, FieldMap, FieldUpdate, FieldValue};
pub use lodging::*;
pub use place::*;
pub use primitives::{CountryName, Id, Rating, RegionName};
