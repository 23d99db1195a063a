//! 初期データのCSVファイルの読み込み
//!
//! 1行目はヘッダーで読み飛ばす。列は名前ではなく位置で対応付け、先頭の`id`列は無視する。
//! すべての行を検証してから返すため、不正な行が1つでもあればどの行も投入されない。
use std::fs::File;
use std::io;
use std::path::Path;

use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use domain::{
    DomainErrorKind, DomainResult, domain_error,
    models::{Address, CountryName, LodgingName, PlaceName, Rating, RegionName},
    repositories::{LodgingInput, PlaceInput},
};

#[derive(Debug, Deserialize)]
struct PlaceRecord {
    _id: IgnoredAny,
    name: String,
    region: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct LodgingRecord {
    _id: IgnoredAny,
    name: String,
    address: String,
    rating: i16,
    city: String,
    region: String,
    country: String,
}

/// 場所の初期データを読み込む。
///
/// ファイルが存在しない場合は`None`を返す。
pub fn read_places(path: &Path) -> DomainResult<Option<Vec<PlaceInput>>> {
    open(path)?.map(parse_places).transpose()
}

/// 宿泊施設の初期データを読み込む。
///
/// ファイルが存在しない場合は`None`を返す。
pub fn read_lodgings(path: &Path) -> DomainResult<Option<Vec<LodgingInput>>> {
    open(path)?.map(parse_lodgings).transpose()
}

pub fn parse_places<R: io::Read>(reader: R) -> DomainResult<Vec<PlaceInput>> {
    records::<_, PlaceRecord>(reader)?
        .into_iter()
        .map(|(line, record)| {
            Ok(PlaceInput {
                name: PlaceName::new(record.name).map_err(|e| at_line(line, e))?,
                region: RegionName::new(record.region).map_err(|e| at_line(line, e))?,
                country: CountryName::new(record.country).map_err(|e| at_line(line, e))?,
            })
        })
        .collect()
}

pub fn parse_lodgings<R: io::Read>(reader: R) -> DomainResult<Vec<LodgingInput>> {
    records::<_, LodgingRecord>(reader)?
        .into_iter()
        .map(|(line, record)| {
            Ok(LodgingInput {
                name: LodgingName::new(record.name).map_err(|e| at_line(line, e))?,
                address: Address::new(record.address).map_err(|e| at_line(line, e))?,
                rating: Rating::new(record.rating).map_err(|e| at_line(line, e))?,
                place_name: PlaceName::new(record.city).map_err(|e| at_line(line, e))?,
                region: RegionName::new(record.region).map_err(|e| at_line(line, e))?,
                country: CountryName::new(record.country).map_err(|e| at_line(line, e))?,
            })
        })
        .collect()
}

fn open(path: &Path) -> DomainResult<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "the seed file was not found");
            Ok(None)
        }
        Err(e) => Err(domain_error(
            DomainErrorKind::Unexpected,
            format!("Failed to open the seed file {}: {}", path.display(), e),
        )),
    }
}

/// CSVの各行を行番号とともにデシリアライズする。
fn records<R, T>(reader: R) -> DomainResult<Vec<(u64, T)>>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let value = record.deserialize::<T>(None).map_err(csv_error)?;
        records.push((line, value));
    }
    Ok(records)
}

fn csv_error(e: csv::Error) -> domain::DomainError {
    domain_error(
        DomainErrorKind::Validation,
        format!("The seed file is malformed: {}", e),
    )
}

fn at_line(line: u64, e: domain::DomainError) -> domain::DomainError {
    domain_error(e.kind, format!("line {}: {}", line, e.message))
}
