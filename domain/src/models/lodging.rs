use serde::Serialize;

use crate::DomainResult;
use crate::models::PlaceName;
use crate::models::field::{ApplyField, FieldUpdate, FieldValue};
use crate::models::primitives::{CountryName, Id, Rating, RegionName, text_primitive};

/// 宿泊施設ID
pub type LodgingId = Id<Lodging>;

text_primitive!(
    /// 宿泊施設名
    LodgingName,
    "name"
);

text_primitive!(
    /// 住所
    Address,
    "address"
);

/// 宿泊施設
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lodging {
    /// ID
    pub id: LodgingId,
    /// 名前
    pub name: LodgingName,
    /// 住所
    pub address: Address,
    /// 評価
    pub rating: Rating,
    /// 所在地の場所名
    pub place_name: PlaceName,
    /// 地域名
    pub region: RegionName,
    /// 国名
    pub country: CountryName,
}

impl ApplyField for Lodging {
    fn apply_field(&mut self, name: &str, value: FieldValue) -> DomainResult<FieldUpdate> {
        match name {
            "name" => self.name = LodgingName::new(value.into_text(name)?)?,
            "address" => self.address = Address::new(value.into_text(name)?)?,
            "rating" => self.rating = Rating::try_from(value.into_integer(name)?)?,
            "placeName" | "place_name" => {
                self.place_name = PlaceName::new(value.into_text(name)?)?
            }
            "region" => self.region = RegionName::new(value.into_text(name)?)?,
            "country" => self.country = CountryName::new(value.into_text(name)?)?,
            _ => return Ok(FieldUpdate::Ignored),
        }
        Ok(FieldUpdate::Applied)
    }
}
