use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{DomainErrorKind, DomainResult, domain_error};

/// 部分更新で指定されたフィールドの値
///
/// JSONの数値は`Integer`、文字列は`Text`として受け付ける。
/// それ以外の値は`Other`として保持し、既知のフィールドに指定された場合は検証エラーになる。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Other(serde_json::Value),
}

/// フィールド名と値のマップ
pub type FieldMap = BTreeMap<String, FieldValue>;

/// フィールドの適用結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    /// フィールドを更新した。
    Applied,
    /// 認識できないフィールドのため無視した。
    Ignored,
}

/// フィールド名で指定された値をエンティティに適用する。
pub trait ApplyField {
    /// フィールドを1つ適用する。
    ///
    /// 認識できないフィールド名の場合は、エンティティを変更せずに`FieldUpdate::Ignored`を返す。
    /// 認識できるフィールドに不正な値が指定された場合は、エンティティを変更せずに検証エラーを返す。
    fn apply_field(&mut self, name: &str, value: FieldValue) -> DomainResult<FieldUpdate>;
}

impl FieldValue {
    pub fn into_text(self, field: &str) -> DomainResult<String> {
        match self {
            FieldValue::Text(value) => Ok(value),
            _ => Err(domain_error(
                DomainErrorKind::Validation,
                format!("{} must be a string", field),
            )),
        }
    }

    pub fn into_integer(self, field: &str) -> DomainResult<i64> {
        match self {
            FieldValue::Integer(value) => Ok(value),
            _ => Err(domain_error(
                DomainErrorKind::Validation,
                format!("{} must be an integer", field),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_map_deserializes_tagged_values() {
        let map = serde_json::from_str::<FieldMap>(
            r#"{"name": "Ocean Drive", "rating": 4, "pool": true, "score": 4.5}"#,
        )
        .unwrap();
        assert_eq!(map["name"], FieldValue::Text(String::from("Ocean Drive")));
        assert_eq!(map["rating"], FieldValue::Integer(4));
        assert_eq!(map["pool"], FieldValue::Other(serde_json::Value::Bool(true)));
        assert!(matches!(map["score"], FieldValue::Other(_)));
    }

    #[test]
    fn into_text_rejects_integer() {
        let err = FieldValue::Integer(1).into_text("name").unwrap_err();
        assert_eq!(err.kind, DomainErrorKind::Validation);
    }

    #[test]
    fn into_integer_rejects_text() {
        let err = FieldValue::Text(String::from("5"))
            .into_integer("rating")
            .unwrap_err();
        assert_eq!(err.kind, DomainErrorKind::Validation);
    }
}
