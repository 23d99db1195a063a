use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::{DomainErrorKind, DomainResult, RATING_OUT_OF_RANGE, domain_error};

/// ID
///
/// レコードストアが採番するサロゲートキーで、作成後に変更されることはない。
pub struct Id<T>(pub i64, PhantomData<T>);

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Id").field(&self.0).finish()
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T> From<i64> for Id<T> {
    fn from(value: i64) -> Self {
        Id(value, PhantomData)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(Id::from)
    }
}

/// 文字列プリミティブを定義する。
///
/// 前後の空白を取り除いた後、1文字以上255文字以下でなければならない。
macro_rules! text_primitive {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, garde::Validate, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(#[garde(length(chars, min = 1, max = 255))] String);

        impl $name {
            pub fn new(value: String) -> $crate::DomainResult<Self> {
                let value = if $crate::models::primitives::starts_or_ends_with_whitespace(&value) {
                    value.trim().to_string()
                } else {
                    value
                };
                let value = Self(value);
                match garde::Validate::validate(&value) {
                    Ok(_) => Ok(value),
                    Err(_) => Err($crate::domain_error(
                        $crate::DomainErrorKind::Validation,
                        concat!($label, " must be between 1 and 255 characters"),
                    )),
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::convert::TryFrom<String> for $name {
            type Error = $crate::DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }
    };
}

pub(crate) use text_primitive;

pub(crate) fn starts_or_ends_with_whitespace(s: &str) -> bool {
    s.chars().next().is_some_and(|ch| ch.is_whitespace())
        || s.chars().last().is_some_and(|ch| ch.is_whitespace())
}

text_primitive!(
    /// 地域名（州、県など）
    RegionName,
    "region"
);

text_primitive!(
    /// 国名
    CountryName,
    "country"
);

/// 評価
///
/// 1以上5以下の整数で、範囲外の値を持つ評価は作成できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, garde::Validate, Serialize)]
#[serde(transparent)]
pub struct Rating(#[garde(range(min = 1, max = 5))] i16);

impl Rating {
    pub fn new(value: i16) -> DomainResult<Self> {
        let value = Self(value);
        match garde::Validate::validate(&value) {
            Ok(_) => Ok(value),
            Err(_) => Err(domain_error(DomainErrorKind::Validation, RATING_OUT_OF_RANGE)),
        }
    }

    pub fn value(&self) -> i16 {
        self.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i16> for Rating {
    type Error = crate::DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Rating {
    type Error = crate::DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        let value = i16::try_from(value)
            .map_err(|_| domain_error(DomainErrorKind::Validation, RATING_OUT_OF_RANGE))?;
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_i64() {
        let id = Id::<String>::from(42);
        assert_eq!(id.0, 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn id_serializes_as_number() {
        let id = Id::<String>::from(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[rstest::rstest]
    #[case(String::from("Florida"), true)]
    #[case(String::new(), false)]
    #[case(String::from("   "), false)]
    #[case(String::from("a"), true)]
    #[case("a".repeat(255), true)]
    #[case("a".repeat(256), false)]
    #[case("🙂".repeat(255), true)]
    #[case("🙂".repeat(255) + "a", false)]
    fn region_name_new(#[case] s: String, #[case] expected: bool) {
        let region = RegionName::new(s);
        assert_eq!(region.is_ok(), expected);
    }

    #[test]
    fn text_primitive_is_trimmed() {
        let country = CountryName::new(String::from("  USA ")).unwrap();
        assert_eq!(country.as_str(), "USA");
    }

    #[rstest::rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(3, true)]
    #[case(5, true)]
    #[case(6, false)]
    #[case(-1, false)]
    #[case(i16::MAX, false)]
    fn rating_new(#[case] value: i16, #[case] expected: bool) {
        let rating = Rating::new(value);
        assert_eq!(rating.is_ok(), expected);
        if let Err(e) = rating {
            assert_eq!(e.kind, DomainErrorKind::Validation);
            assert_eq!(e.message, RATING_OUT_OF_RANGE);
        }
    }

    #[test]
    fn rating_from_out_of_range_i64() {
        assert!(Rating::try_from(70_000_i64).is_err());
        assert_eq!(Rating::try_from(4_i64).unwrap().value(), 4);
    }
}
