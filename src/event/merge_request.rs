//! Merge request hooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vocab::Keyword;

use super::payload::{gitlab_time, null_as_zero, LabelRef, ProjectRef};
use super::{EventAdapter, EventKind, ItemRef, Target};

/// `object_attributes` of a merge request hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestAttributes {
    /// Project-scoped merge request number.
    pub iid: u64,
    /// Merge request title.
    #[serde(default)]
    pub title: String,
    /// Lifecycle state, e.g. `opened`.
    #[serde(default)]
    pub state: String,
    /// Milestone id, 0 when unset.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub milestone_id: u64,
    /// What happened, e.g. `open` or `merge`.
    #[serde(default)]
    pub action: Option<String>,
    /// Creation time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A `Merge Request Hook` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestEvent {
    /// Payload discriminator.
    pub object_kind: EventKind,
    /// Hook category from the payload, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Keyword<EventKind>>,
    /// Owning project.
    pub project: ProjectRef,
    /// Merge request fields.
    pub object_attributes: MergeRequestAttributes,
    /// Labels on the merge request.
    #[serde(default)]
    pub labels: Vec<LabelRef>,
}

impl MergeRequestEvent {
    /// A minimal merge request event, mostly useful for tests and replays.
    #[must_use]
    pub fn new(project: u64, iid: u64) -> Self {
        Self {
            object_kind: EventKind::MergeRequest,
            event_type: None,
            project: ProjectRef {
                id: project,
                path_with_namespace: None,
            },
            object_attributes: MergeRequestAttributes {
                iid,
                ..MergeRequestAttributes::default()
            },
            labels: Vec::new(),
        }
    }

    /// Sets the state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.object_attributes.state = state.into();
        self
    }

    /// Sets the labels.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(LabelRef::new).collect();
        self
    }

    /// Sets the milestone id.
    #[must_use]
    pub fn with_milestone(mut self, milestone_id: u64) -> Self {
        self.object_attributes.milestone_id = milestone_id;
        self
    }
}

impl EventAdapter for MergeRequestEvent {
    fn resource_type(&self) -> EventKind {
        self.event_type
            .as_ref()
            .and_then(Keyword::known)
            .unwrap_or(self.object_kind)
    }

    fn state(&self) -> Option<&str> {
        Some(&self.object_attributes.state)
    }

    fn labels(&self) -> Option<Vec<&str>> {
        Some(self.labels.iter().map(|l| l.title.as_str()).collect())
    }

    fn milestone(&self) -> Option<u64> {
        Some(self.object_attributes.milestone_id)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.object_attributes.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.object_attributes.updated_at
    }

    fn target(&self) -> Option<Target> {
        Some(Target::new(
            self.project.id,
            ItemRef::MergeRequest(self.object_attributes.iid),
        ))
    }
}
