use serde::Serialize;

use crate::DomainResult;
use crate::models::field::{ApplyField, FieldUpdate, FieldValue};
use crate::models::primitives::{CountryName, Id, RegionName, text_primitive};

/// 場所ID
pub type PlaceId = Id<Place>;

text_primitive!(
    /// 場所名（都市名）
    PlaceName,
    "name"
);

/// 場所
///
/// 宿泊施設とは名前、地域名及び国名の文字列でのみ関連付けられ、外部キーを持たない。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    /// ID
    pub id: PlaceId,
    /// 名前
    pub name: PlaceName,
    /// 地域名
    pub region: RegionName,
    /// 国名
    pub country: CountryName,
}

impl ApplyField for Place {
    fn apply_field(&mut self, name: &str, value: FieldValue) -> DomainResult<FieldUpdate> {
        match name {
            "name" => self.name = PlaceName::new(value.into_text(name)?)?,
            "region" => self.region = RegionName::new(value.into_text(name)?)?,
            "country" => self.country = CountryName::new(value.into_text(name)?)?,
            _ => return Ok(FieldUpdate::Ignored),
        }
        Ok(FieldUpdate::Applied)
    }
}
