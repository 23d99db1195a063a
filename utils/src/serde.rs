use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serializer};
use time::{OffsetDateTime, serde::rfc3339};

pub fn serialize_option_offset_datetime<S>(
    dt: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => rfc3339::serialize(dt, serializer),
        None => serializer.serialize_none(),
    }
}

/// クエリ文字列の値をデシリアライズする。
///
/// 値が存在しない場合、または空白のみで構成されている場合は`None`を返す。
/// それ以外の場合は、前後の空白を取り除いた文字列を`T`に変換する。
pub fn deserialize_option_non_blank<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// 文字列を`FromStr`で`T`に変換してデシリアライズする。
pub fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = String::deserialize(deserializer)?;
    value.trim().parse::<T>().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Params {
        #[serde(default, deserialize_with = "deserialize_option_non_blank")]
        city: Option<String>,
        #[serde(default, deserialize_with = "deserialize_option_non_blank")]
        rating: Option<i16>,
    }

    #[rstest::rstest]
    #[case(r#"{}"#, None, None)]
    #[case(r#"{"city": "", "rating": " "}"#, None, None)]
    #[case(r#"{"city": " Miami ", "rating": "5"}"#, Some("Miami"), Some(5))]
    fn deserialize_non_blank_params(
        #[case] json: &str,
        #[case] city: Option<&str>,
        #[case] rating: Option<i16>,
    ) {
        let params = serde_json::from_str::<Params>(json).unwrap();
        assert_eq!(params.city.as_deref(), city);
        assert_eq!(params.rating, rating);
    }

    #[test]
    fn deserialize_non_blank_rejects_unparsable_value() {
        let result = serde_json::from_str::<Params>(r#"{"rating": "five"}"#);
        assert!(result.is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Port {
        #[serde(deserialize_with = "deserialize_from_str")]
        number: u16,
    }

    #[test]
    fn deserialize_from_str_parses_the_trimmed_value() {
        let port = serde_json::from_str::<Port>(r#"{"number": " 8080 "}"#).unwrap();
        assert_eq!(port.number, 8080);
        assert!(serde_json::from_str::<Port>(r#"{"number": "http"}"#).is_err());
    }

    #[test]
    fn serialize_none_offset_datetime() {
        #[derive(serde::Serialize)]
        struct Wrapper {
            #[serde(serialize_with = "serialize_option_offset_datetime")]
            at: Option<OffsetDateTime>,
        }
        let json = serde_json::to_string(&Wrapper { at: None }).unwrap();
        assert_eq!(json, r#"{"at":null}"#);
    }
}
