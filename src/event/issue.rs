//! Issue hooks, including confidential issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vocab::Keyword;

use super::payload::{gitlab_time, null_as_zero, LabelRef, ProjectRef};
use super::{EventAdapter, EventKind, ItemRef, Target};

/// Issue fields under `object_attributes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAttributes {
    /// Project-scoped issue number.
    pub iid: u64,
    /// Issue title.
    #[serde(default)]
    pub title: String,
    /// Lifecycle state, e.g. `opened`.
    #[serde(default)]
    pub state: String,
    /// Milestone id, 0 when unset.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub milestone_id: u64,
    /// Whether the issue is confidential.
    #[serde(default)]
    pub confidential: bool,
    /// Creation time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An `Issue Hook` or `Confidential Issue Hook` payload.
///
/// GitLab reports `object_kind: issue` for both; confidential deliveries are
/// told apart by `event_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEvent {
    /// Payload discriminator.
    pub object_kind: EventKind,
    /// Hook category, distinguishing confidential issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Keyword<EventKind>>,
    /// Owning project.
    pub project: ProjectRef,
    /// Issue fields.
    pub object_attributes: IssueAttributes,
    /// Labels on the issue.
    #[serde(default)]
    pub labels: Vec<LabelRef>,
}

impl IssueEvent {
    /// An opened issue `iid` in `project`.
    #[must_use]
    pub fn new(project: u64, iid: u64) -> Self {
        Self {
            object_kind: EventKind::Issue,
            event_type: None,
            project: ProjectRef {
                id: project,
                path_with_namespace: None,
            },
            object_attributes: IssueAttributes {
                iid,
                ..IssueAttributes::default()
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
}

impl EventAdapter for IssueEvent {
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
        Some(Target::new(self.project.id, ItemRef::Issue(self.object_attributes.iid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidential_issue_reports_event_type() {
        let ev: IssueEvent = serde_json::from_str(
            r#"{
                "object_kind": "issue",
                "event_type": "confidential_issue",
                "project": {"id": 5},
                "object_attributes": {"iid": 9, "state": "opened", "milestone_id": 3, "confidential": true},
                "labels": [{"title": "security"}]
            }"#,
        )
        .unwrap();
        assert_eq!(ev.resource_type(), EventKind::ConfidentialIssue);
        assert_eq!(ev.milestone(), Some(3));
        assert_eq!(ev.target(), Some(Target::new(5, ItemRef::Issue(9))));
    }

    #[test]
    fn unknown_event_type_falls_back_to_object_kind() {
        let ev: IssueEvent = serde_json::from_str(
            r#"{
                "object_kind": "issue",
                "event_type": "work_item",
                "project": {"id": 5},
                "object_attributes": {"iid": 9}
            }"#,
        )
        .unwrap();
        assert_eq!(ev.resource_type(), EventKind::Issue);
        assert_eq!(ev.labels().unwrap(), Vec::<&str>::new());
    }
}
