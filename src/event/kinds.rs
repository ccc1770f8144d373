//! Webhook categories.

use crate::vocab::{vocabulary_impls, Vocabulary};

/// Supported webhook categories.
///
/// Policy files name resources by their `X-Gitlab-Event` header value
/// (`Merge Request Hook`); payloads carry a snake case discriminator
/// (`merge_request`). Both spellings parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Build (job) hook, legacy name.
    Build,
    /// Deployment hook.
    Deployment,
    /// Issue hook.
    Issue,
    /// Issue hook for a confidential issue.
    ConfidentialIssue,
    /// Job hook.
    Job,
    /// Merge request hook.
    MergeRequest,
    /// Note (comment) hook.
    Note,
    /// Note hook on a confidential item.
    ConfidentialNote,
    /// Pipeline hook.
    Pipeline,
    /// Push hook.
    Push,
    /// Release hook.
    Release,
    /// Instance-level system hook.
    SystemHook,
    /// Tag push hook.
    TagPush,
    /// Wiki page hook.
    WikiPage,
}

impl Vocabulary for EventKind {
    const ALL: &'static [Self] = &[
        Self::Build,
        Self::Deployment,
        Self::Issue,
        Self::ConfidentialIssue,
        Self::Job,
        Self::MergeRequest,
        Self::Note,
        Self::ConfidentialNote,
        Self::Pipeline,
        Self::Push,
        Self::Release,
        Self::SystemHook,
        Self::TagPush,
        Self::WikiPage,
    ];

    const FIELD: &'static str = "policy:resource";

    fn as_str(self) -> &'static str {
        self.header()
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Build => &[],
            Self::Deployment => &["deployment"],
            Self::Issue => &["issue"],
            Self::ConfidentialIssue => &["confidential_issue"],
            Self::Job => &["build"],
            Self::MergeRequest => &["merge_request"],
            Self::Note => &["note"],
            Self::ConfidentialNote => &["confidential_note"],
            Self::Pipeline => &["pipeline"],
            Self::Push => &["push"],
            Self::Release => &["release"],
            Self::SystemHook => &["system_hook"],
            Self::TagPush => &["tag_push"],
            Self::WikiPage => &["wiki_page"],
        }
    }
}

vocabulary_impls!(EventKind);

impl EventKind {
    /// The `X-Gitlab-Event` header value.
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::Build => "Build Hook",
            Self::Deployment => "Deployment Hook",
            Self::Issue => "Issue Hook",
            Self::ConfidentialIssue => "Confidential Issue Hook",
            Self::Job => "Job Hook",
            Self::MergeRequest => "Merge Request Hook",
            Self::Note => "Note Hook",
            Self::ConfidentialNote => "Confidential Note Hook",
            Self::Pipeline => "Pipeline Hook",
            Self::Push => "Push Hook",
            Self::Release => "Release Hook",
            Self::SystemHook => "System Hook",
            Self::TagPush => "Tag Push Hook",
            Self::WikiPage => "Wiki Page Hook",
        }
    }

    /// Human readable name used in validation messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Build => "Builds",
            Self::Deployment => "Deployments",
            Self::Issue => "Issues",
            Self::ConfidentialIssue => "Confidential Issues",
            Self::Job => "Jobs",
            Self::MergeRequest => "Merge Requests",
            Self::Note => "Notes",
            Self::ConfidentialNote => "Confidential Notes",
            Self::Pipeline => "Pipelines",
            Self::Push => "Pushes",
            Self::Release => "Releases",
            Self::SystemHook => "System Hooks",
            Self::TagPush => "Tag Pushes",
            Self::WikiPage => "Wiki Pages",
        }
    }

    /// Legal values for a `state` condition, or `None` when the kind has no
    /// lifecycle state.
    #[must_use]
    pub const fn states(self) -> Option<&'static [&'static str]> {
        match self {
            Self::MergeRequest => Some(&["opened", "closed", "locked", "merged"]),
            Self::Issue | Self::ConfidentialIssue => Some(&["opened", "closed"]),
            Self::Release => Some(&["create", "update", "delete"]),
            _ => None,
        }
    }

    /// Legal values for an action `status`, or `None` when the kind cannot
    /// be transitioned.
    #[must_use]
    pub const fn action_statuses(self) -> Option<&'static [&'static str]> {
        match self {
            Self::MergeRequest => Some(&["approved", "opened", "closed"]),
            Self::Issue | Self::ConfidentialIssue => Some(&["opened", "closed"]),
            _ => None,
        }
    }
}
