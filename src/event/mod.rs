//! Incoming event normalisation.
//!
//! GitLab sends a differently shaped payload for every hook category. Each
//! supported shape gets its own payload type implementing [`EventAdapter`],
//! a fixed capability surface the matcher and executor work against.
//!
//! Capabilities that do not exist for a payload shape return `None`
//! ("not applicable"). This is distinct from a present-but-empty value: a
//! wiki page event has no state at all, whereas a merge request can carry an
//! empty state string.

mod generic;
mod issue;
mod kinds;
mod merge_request;
mod note;
mod payload;
mod release;
mod wiki;

use chrono::{DateTime, Utc};

pub use generic::GenericEvent;
pub use issue::IssueEvent;
pub use kinds::EventKind;
pub use merge_request::MergeRequestEvent;
pub use note::{extract_mentions, NoteEvent};
pub use payload::{LabelRef, ProjectRef};
pub use release::ReleaseEvent;
pub use wiki::WikiPageEvent;

/// The remote item an event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// Merge request by project-scoped number.
    MergeRequest(u64),
    /// Issue by project-scoped number.
    Issue(u64),
    /// Commit by SHA.
    Commit(String),
    /// Snippet by id.
    Snippet(u64),
}

/// Where remote updates for an event are sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Project id.
    pub project: u64,
    /// Item within the project.
    pub item: ItemRef,
}

impl Target {
    /// A target for `item` in `project`.
    #[must_use]
    pub const fn new(project: u64, item: ItemRef) -> Self {
        Self { project, item }
    }
}

/// Uniform capability surface over one incoming event.
///
/// Every method except [`EventAdapter::resource_type`] may answer `None`,
/// meaning the capability does not exist for this kind of event. Predicates
/// treat that as "condition not met", never as an empty value.
pub trait EventAdapter: Send + Sync {
    /// The kind carried by the payload's own discriminator.
    fn resource_type(&self) -> EventKind;

    /// Lifecycle state.
    fn state(&self) -> Option<&str> {
        None
    }

    /// Label titles attached to the item.
    fn labels(&self) -> Option<Vec<&str>> {
        None
    }

    /// Milestone id. Zero means the item has no milestone.
    fn milestone(&self) -> Option<u64> {
        None
    }

    /// Comment text.
    fn note(&self) -> Option<&str> {
        None
    }

    /// Handles mentioned in the comment, without the leading `@`.
    fn mentions(&self) -> Vec<String> {
        Vec::new()
    }

    /// The kind of item a comment was left on (`Commit`, `Issue`, ...).
    fn note_type(&self) -> Option<&str> {
        None
    }

    /// Creation time of the item or comment.
    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Last update time of the item or comment.
    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// The item remote updates apply to.
    fn target(&self) -> Option<Target> {
        None
    }
}
