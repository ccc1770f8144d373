//! Comment predicate: note type, mentions and command.

use serde::{Deserialize, Serialize};

use crate::event::EventAdapter;
use crate::vocab::{vocabulary_impls, Keyword, Vocabulary};

use super::{Condition, MatchContext};

/// Item kinds a comment can be left on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteType {
    /// A commit.
    Commit,
    /// A merge request.
    MergeRequest,
    /// An issue.
    Issue,
    /// A code snippet.
    Snippet,
}

impl Vocabulary for NoteType {
    const ALL: &'static [Self] = &[Self::Commit, Self::MergeRequest, Self::Issue, Self::Snippet];
    const FIELD: &'static str = "note:noteType";

    fn as_str(self) -> &'static str {
        match self {
            Self::Commit => "Commit",
            Self::MergeRequest => "MergeRequest",
            Self::Issue => "Issue",
            Self::Snippet => "Snippet",
        }
    }
}

vocabulary_impls!(NoteType);

impl NoteType {
    /// Whether actions can be executed for comments on this item kind.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(self, Self::Commit | Self::Issue)
    }

    /// Canonical spellings of supported note types.
    #[must_use]
    pub fn supported() -> String {
        Self::ALL
            .iter()
            .filter(|t| t.is_supported())
            .map(|t| format!("`{}`", t.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Conjunction of three comment filters. Each is a wildcard when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NoteCondition {
    /// Kind of item the comment is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_type: Option<Keyword<NoteType>>,
    /// Any one of these handles must be mentioned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
    /// Substring the comment must contain.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command: String,
}

impl NoteCondition {
    /// A filter that accepts every comment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires comments on `note_type` items.
    #[must_use]
    pub fn with_type(mut self, note_type: NoteType) -> Self {
        self.note_type = Some(Keyword::Known(note_type));
        self
    }

    /// Requires a mention of one of `mentions`.
    #[must_use]
    pub fn with_mentions<I, S>(mut self, mentions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mentions = mentions.into_iter().map(Into::into).collect();
        self
    }

    /// Requires `command` in the comment text.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    fn type_met(&self, event: &dyn EventAdapter) -> bool {
        match &self.note_type {
            None => true,
            Some(wanted) => event.note_type() == Some(wanted.as_str()),
        }
    }

    fn mentions_met(&self, event: &dyn EventAdapter) -> bool {
        if self.mentions.is_empty() {
            return true;
        }
        let mentioned = event.mentions();
        self.mentions
            .iter()
            .map(|m| m.trim_start_matches('@'))
            .any(|m| mentioned.iter().any(|h| h == m))
    }
}

impl Condition for NoteCondition {
    fn condition_met(&self, event: &dyn EventAdapter, _ctx: &MatchContext) -> bool {
        let Some(text) = event.note() else {
            return false;
        };
        self.type_met(event)
            && self.mentions_met(event)
            && (self.command.is_empty() || text.contains(&self.command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MergeRequestEvent, NoteEvent};

    fn help_request() -> NoteCondition {
        NoteCondition::new()
            .with_type(NoteType::Issue)
            .with_mentions(["botuser"])
            .with_command("-help")
    }

    #[test]
    fn all_three_parts_must_hold() {
        let ctx = MatchContext::now();
        let on_issue = NoteEvent::new(1, "Issue", "@botuser -help");
        let on_commit = NoteEvent::new(1, "Commit", "@botuser -help");
        assert!(help_request().condition_met(&on_issue, &ctx));
        assert!(!help_request().condition_met(&on_commit, &ctx));
    }

    #[test]
    fn type_comparison_is_case_sensitive() {
        let ctx = MatchContext::now();
        let ev = NoteEvent::new(1, "issue", "text");
        let cond = NoteCondition::new().with_type(NoteType::Issue);
        assert!(!cond.condition_met(&ev, &ctx));
    }

    #[test]
    fn any_listed_mention_is_enough() {
        let ctx = MatchContext::now();
        let ev = NoteEvent::new(1, "Issue", "ping @carol");
        let cond = NoteCondition::new().with_mentions(["alice", "@carol"]);
        assert!(cond.condition_met(&ev, &ctx));

        let cond = NoteCondition::new().with_mentions(["alice", "bob"]);
        assert!(!cond.condition_met(&ev, &ctx));
    }

    #[test]
    fn command_is_a_case_sensitive_substring() {
        let ctx = MatchContext::now();
        let ev = NoteEvent::new(1, "Issue", "please run -deploy now");
        assert!(NoteCondition::new()
            .with_command("-deploy")
            .condition_met(&ev, &ctx));
        assert!(!NoteCondition::new()
            .with_command("-Deploy")
            .condition_met(&ev, &ctx));
    }

    #[test]
    fn non_comment_events_never_match() {
        let ctx = MatchContext::now();
        let mr = MergeRequestEvent::new(1, 1);
        assert!(!NoteCondition::new().condition_met(&mr, &ctx));
    }

    #[test]
    fn unknown_type_survives_decoding() {
        let cond: NoteCondition = serde_yaml::from_str("noteType: Epic").unwrap();
        assert_eq!(cond.note_type, Some(Keyword::Unknown("Epic".to_string())));
    }

    #[test]
    fn supported_subset() {
        assert!(NoteType::Issue.is_supported());
        assert!(NoteType::Commit.is_supported());
        assert!(!NoteType::MergeRequest.is_supported());
        assert!(!NoteType::Snippet.is_supported());
        assert_eq!(NoteType::supported(), "`Commit`, `Issue`");
    }
}
