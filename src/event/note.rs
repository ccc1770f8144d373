//! Comment hooks.
//!
//! GitLab delivers comments on commits, merge requests, issues and snippets
//! through one `Note Hook`; `noteable_type` says which item was commented on
//! and the matching sub-object carries its id.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::vocab::Keyword;

use super::payload::{gitlab_time, ProjectRef};
use super::{EventAdapter, EventKind, ItemRef, Target};

const MENTION_PATTERN: &str = r"@[a-zA-Z.\-0-9]+";

static MENTION: OnceLock<Option<Regex>> = OnceLock::new();

/// Handles mentioned in `text`, in order of appearance, without the `@`.
#[must_use]
pub fn extract_mentions(text: &str) -> Vec<String> {
    let Some(re) = MENTION.get_or_init(|| Regex::new(MENTION_PATTERN).ok()) else {
        return Vec::new();
    };
    re.find_iter(text)
        .map(|m| m.as_str().trim_start_matches('@').to_string())
        .collect()
}

/// Comment fields under `object_attributes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAttributes {
    /// Comment id.
    #[serde(default)]
    pub id: u64,
    /// Comment text.
    #[serde(default)]
    pub note: String,
    /// Kind of item commented on.
    #[serde(default)]
    pub noteable_type: String,
    /// Commented commit, for commit notes.
    #[serde(default)]
    pub commit_id: Option<String>,
    /// Creation time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default, deserialize_with = "gitlab_time")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The noted item as embedded in the hook (`issue`, `merge_request`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotedItem {
    /// Global id.
    #[serde(default)]
    pub id: u64,
    /// Project-scoped number.
    #[serde(default)]
    pub iid: u64,
}

/// The commit a comment was left on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotedCommit {
    /// Commit SHA.
    pub id: String,
}

/// A `Note Hook` or `Confidential Note Hook` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Payload discriminator.
    pub object_kind: EventKind,
    /// Hook category, distinguishing confidential notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Keyword<EventKind>>,
    /// Owning project.
    pub project: ProjectRef,
    /// Comment fields.
    pub object_attributes: NoteAttributes,
    /// Commented merge request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_request: Option<NotedItem>,
    /// Commented issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<NotedItem>,
    /// Commented snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<NotedItem>,
    /// Commented commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<NotedCommit>,
}

impl NoteEvent {
    /// A comment with the given text on an item of `noteable_type`.
    #[must_use]
    pub fn new(project: u64, noteable_type: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            object_kind: EventKind::Note,
            event_type: None,
            project: ProjectRef {
                id: project,
                path_with_namespace: None,
            },
            object_attributes: NoteAttributes {
                note: note.into(),
                noteable_type: noteable_type.into(),
                ..NoteAttributes::default()
            },
            merge_request: None,
            issue: None,
            snippet: None,
            commit: None,
        }
    }

    /// Moves the comment onto issue `iid`.
    #[must_use]
    pub fn on_issue(mut self, iid: u64) -> Self {
        self.issue = Some(NotedItem { id: 0, iid });
        self
    }

    /// Moves the comment onto merge request `iid`.
    #[must_use]
    pub fn on_merge_request(mut self, iid: u64) -> Self {
        self.merge_request = Some(NotedItem { id: 0, iid });
        self
    }

    /// Moves the comment onto commit `sha`.
    #[must_use]
    pub fn on_commit(mut self, sha: impl Into<String>) -> Self {
        self.commit = Some(NotedCommit { id: sha.into() });
        self
    }
}

impl EventAdapter for NoteEvent {
    fn resource_type(&self) -> EventKind {
        self.event_type
            .as_ref()
            .and_then(Keyword::known)
            .unwrap_or(self.object_kind)
    }

    fn note(&self) -> Option<&str> {
        Some(&self.object_attributes.note)
    }

    fn mentions(&self) -> Vec<String> {
        extract_mentions(&self.object_attributes.note)
    }

    fn note_type(&self) -> Option<&str> {
        Some(&self.object_attributes.noteable_type)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.object_attributes.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.object_attributes.updated_at
    }

    fn target(&self) -> Option<Target> {
        let item = match self.object_attributes.noteable_type.as_str() {
            "MergeRequest" => ItemRef::MergeRequest(self.merge_request.as_ref()?.iid),
            "Issue" => ItemRef::Issue(self.issue.as_ref()?.iid),
            "Snippet" => ItemRef::Snippet(self.snippet.as_ref()?.id),
            "Commit" => {
                let sha = self
                    .commit
                    .as_ref()
                    .map(|c| c.id.clone())
                    .or_else(|| self.object_attributes.commit_id.clone())?;
                ItemRef::Commit(sha)
            }
            _ => return None,
        };
        Some(Target::new(self.project.id, item))
    }
}
