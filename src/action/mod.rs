//! Policy actions.
//!
//! An [`ActionSet`] is plain data; which remote operations it implies is a
//! pure derivation ([`ActionSet::capabilities`]) the executor walks in a
//! fixed order.

mod executor;

use serde::{Deserialize, Serialize};

pub use executor::{ActionExecutor, OperationResult};

/// Remote operation kinds an action set can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Add and remove labels.
    UpdateLabels,
    /// Change the item's state or approve it.
    UpdateState,
    /// Post a comment.
    AddNote,
}

impl Capability {
    /// Snake-case name used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateLabels => "update_labels",
            Self::UpdateState => "update_state",
            Self::AddNote => "add_note",
        }
    }
}

/// Updates to apply to the event's item when a policy matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionSet {
    /// Labels to add.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Labels to remove.
    #[serde(alias = "removeLabels", skip_serializing_if = "Vec::is_empty")]
    pub remove_labels: Vec<String>,
    /// Target status, e.g. `closed` or `approved`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Handles to mention in the posted note.
    #[serde(rename = "mention", alias = "mentions", skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    /// Comment text, posted after any mentions.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

impl ActionSet {
    /// An empty action set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the labels to add.
    #[must_use]
    pub fn add_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the labels to remove.
    #[must_use]
    pub fn remove_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the target status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the handles to mention.
    #[must_use]
    pub fn mention<I, S>(mut self, handles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions = handles.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the comment text.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Whether labels are added or removed.
    #[must_use]
    pub fn update_labels(&self) -> bool {
        !self.labels.is_empty() || !self.remove_labels.is_empty()
    }

    /// Whether a status change is requested.
    #[must_use]
    pub fn update_state(&self) -> bool {
        !self.status.is_empty()
    }

    /// Whether a comment is posted.
    #[must_use]
    pub fn add_note(&self) -> bool {
        !self.mentions.is_empty() || !self.comment.is_empty()
    }

    /// Requested operations in execution order: labels, state, note.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        [
            (self.update_labels(), Capability::UpdateLabels),
            (self.update_state(), Capability::UpdateState),
            (self.add_note(), Capability::AddNote),
        ]
        .into_iter()
        .filter_map(|(wanted, cap)| wanted.then_some(cap))
        .collect()
    }

    /// Note text: the mentions as `@handle`, then the comment.
    #[must_use]
    pub fn comment_body(&self) -> String {
        let mut parts: Vec<String> = self
            .mentions
            .iter()
            .map(|m| format!("@{}", m.trim_start_matches('@')))
            .collect();
        if !self.comment.is_empty() {
            parts.push(self.comment.clone());
        }
        parts.join(" ")
    }
}

/// The remote `state_event` for an action status, `None` for statuses that
/// are not state transitions (`approved` is its own operation).
#[must_use]
pub fn state_event(status: &str) -> Option<&'static str> {
    match status {
        "closed" => Some("close"),
        "opened" => Some("reopen"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_follow_the_fixed_order() {
        let actions = ActionSet::new()
            .with_comment("done")
            .with_status("closed")
            .add_labels(["approved"]);
        assert_eq!(
            actions.capabilities(),
            vec![
                Capability::UpdateLabels,
                Capability::UpdateState,
                Capability::AddNote
            ]
        );
    }

    #[test]
    fn empty_action_set_requests_nothing() {
        assert!(ActionSet::new().capabilities().is_empty());
    }

    #[test]
    fn removal_alone_is_a_label_update() {
        let actions = ActionSet::new().remove_labels(["triage"]);
        assert_eq!(actions.capabilities(), vec![Capability::UpdateLabels]);
    }

    #[test]
    fn mentions_alone_post_a_note() {
        let actions = ActionSet::new().mention(["alice"]);
        assert_eq!(actions.capabilities(), vec![Capability::AddNote]);
        assert_eq!(actions.comment_body(), "@alice");
    }

    #[test]
    fn comment_body_does_not_double_the_at_sign() {
        let actions = ActionSet::new()
            .mention(["alice", "@bob"])
            .with_comment("please review");
        assert_eq!(actions.comment_body(), "@alice @bob please review");
    }

    #[test]
    fn status_maps_to_state_event() {
        assert_eq!(state_event("closed"), Some("close"));
        assert_eq!(state_event("opened"), Some("reopen"));
        assert_eq!(state_event("approved"), None);
    }
}
