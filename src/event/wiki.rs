//! Wiki page hooks.

use serde::{Deserialize, Serialize};

use super::payload::ProjectRef;
use super::{EventAdapter, EventKind};

/// Wiki page fields under `object_attributes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPageAttributes {
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// What happened: `create`, `update` or `delete`.
    #[serde(default)]
    pub action: String,
}

/// A `Wiki Page Hook` payload.
///
/// Wiki pages have no state, labels, milestone or comment, and nothing the
/// remote client can update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPageEvent {
    /// Payload discriminator.
    pub object_kind: EventKind,
    /// Owning project.
    pub project: ProjectRef,
    /// Page fields.
    #[serde(default)]
    pub object_attributes: WikiPageAttributes,
}

impl WikiPageEvent {
    /// A created page titled `title` in `project`.
    #[must_use]
    pub fn new(project: u64, title: impl Into<String>) -> Self {
        Self {
            object_kind: EventKind::WikiPage,
            project: ProjectRef {
                id: project,
                path_with_namespace: None,
            },
            object_attributes: WikiPageAttributes {
                title: title.into(),
                ..WikiPageAttributes::default()
            },
        }
    }
}

impl EventAdapter for WikiPageEvent {
    fn resource_type(&self) -> EventKind {
        self.object_kind
    }
}
