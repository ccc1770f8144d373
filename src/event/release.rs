//! Release hooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::{gitlab_time, ProjectRef};
use super::{EventAdapter, EventKind};

/// A `Release Hook` payload.
///
/// The release lifecycle is reported through `action`
/// (`create`, `update`, `delete`), which serves as its state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    /// Payload discriminator.
    pub object_kind: EventKind,
    /// Owning project.
    pub project: ProjectRef,
    /// Tag the release points at.
    #[serde(default)]
    pub tag: String,
    /// Release name.
    #[serde(default)]
    pub name: String,
    /// What happened: `create`, `update` or `delete`.
    #[serde(default)]
    pub action: String,
    /// Creation time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub created_at: Option<DateTime<Utc>>,
    /// Publication time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub released_at: Option<DateTime<Utc>>,
}

impl ReleaseEvent {
    /// A release of `tag` in `project`.
    #[must_use]
    pub fn new(project: u64, tag: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            object_kind: EventKind::Release,
            project: ProjectRef {
                id: project,
                path_with_namespace: None,
            },
            tag: tag.into(),
            name: String::new(),
            action: action.into(),
            created_at: None,
            released_at: None,
        }
    }
}

impl EventAdapter for ReleaseEvent {
    fn resource_type(&self) -> EventKind {
        self.object_kind
    }

    fn state(&self) -> Option<&str> {
        Some(&self.action)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
