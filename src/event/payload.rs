//! Payload fragments shared by several hook shapes.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The `project` object present on most hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Project id.
    pub id: u64,
    /// `group/project` path.
    #[serde(default)]
    pub path_with_namespace: Option<String>,
}

/// A label as embedded in merge request and issue hooks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRef {
    /// Label title.
    #[serde(alias = "name")]
    pub title: String,
}

impl LabelRef {
    /// A label titled `title`.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

/// Parses the timestamp formats GitLab uses in hook bodies.
///
/// Newer instances send RFC 3339; older ones send `2013-12-03 17:23:34 UTC`.
pub(crate) fn parse_gitlab_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(t.with_timezone(&Utc));
    }
    let naive = raw.strip_suffix(" UTC").unwrap_or(raw);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|t| t.and_utc())
}

/// Serde adapter for optional GitLab timestamps. Unparseable values decode
/// as absent rather than failing the whole payload.
pub(crate) fn gitlab_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_gitlab_time))
}

/// Serde adapter for ids GitLab sends as `null` when unset.
pub(crate) fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}
