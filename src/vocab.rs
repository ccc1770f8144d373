//! Closed keyword sets used by policy files.
//!
//! Every enumerated policy field (resource, date attribute, note type, ...)
//! is a [`Vocabulary`]: the `ALL` table is the single place membership is
//! decided. Policy files are decoded into [`Keyword`] so an unknown value
//! survives parsing and is reported by validation alongside every other
//! problem in the file, instead of aborting the whole load on the first typo.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// A closed set of keywords with a canonical spelling per member.
pub trait Vocabulary: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every member, in the order they are listed in error messages.
    const ALL: &'static [Self];

    /// Policy field name used in error messages, e.g. `date:attribute`.
    const FIELD: &'static str;

    /// Canonical spelling.
    fn as_str(self) -> &'static str;

    /// Additional accepted spellings. Matching is exact.
    fn aliases(self) -> &'static [&'static str] {
        &[]
    }

    /// Looks a value up by canonical spelling or alias.
    #[must_use]
    fn lookup(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == value || k.aliases().contains(&value))
    }

    /// Back-quoted, comma separated list of canonical spellings.
    #[must_use]
    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|k| format!("`{}`", k.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A decoded keyword: either a member of `T` or the raw unknown value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword<T: Vocabulary> {
    /// A member of the vocabulary.
    Known(T),
    /// A spelling outside the vocabulary, kept for reporting.
    Unknown(String),
}

impl<T: Vocabulary> Keyword<T> {
    /// Parses a value, keeping it verbatim when it is not a member.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        T::lookup(value).map_or_else(|| Self::Unknown(value.to_string()), Self::Known)
    }

    /// The member, if known.
    #[must_use]
    pub fn known(&self) -> Option<T> {
        match self {
            Self::Known(k) => Some(*k),
            Self::Unknown(_) => None,
        }
    }

    /// The spelling as written (canonical for known members).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(k) => k.as_str(),
            Self::Unknown(raw) => raw,
        }
    }

    /// Membership check.
    pub fn check(&self) -> Result<T, ValidationError> {
        match self {
            Self::Known(k) => Ok(*k),
            Self::Unknown(raw) => Err(ValidationError::UnknownKeyword {
                field: T::FIELD,
                allowed: T::allowed(),
                value: raw.clone(),
            }),
        }
    }
}

impl<T: Vocabulary> From<T> for Keyword<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T: Vocabulary> fmt::Display for Keyword<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: Vocabulary> Serialize for Keyword<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T: Vocabulary> Deserialize<'de> for Keyword<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Error returned by `FromStr` for vocabulary types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{field}` has no member `{value}`")]
pub struct UnknownKeyword {
    /// Which field the value was read from.
    pub field: &'static str,
    /// The rejected spelling.
    pub value: String,
}

/// Implements `FromStr`, `Display` and string serde for a [`Vocabulary`].
macro_rules! vocabulary_impls {
    ($ty:ty) => {
        impl ::std::str::FromStr for $ty {
            type Err = $crate::vocab::UnknownKeyword;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as $crate::vocab::Vocabulary>::lookup(s).ok_or_else(|| {
                    $crate::vocab::UnknownKeyword {
                        field: <$ty as $crate::vocab::Vocabulary>::FIELD,
                        value: s.to_string(),
                    }
                })
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::vocab::Vocabulary::as_str(*self))
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::vocab::Vocabulary::as_str(*self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use vocabulary_impls;
