//! Policy conditions.
//!
//! A [`ConditionSet`] is a conjunction of independent predicates. Each
//! predicate is a self-contained value implementing [`Condition`]; an unset
//! predicate (`None`) is always satisfied, which `Option<T>`'s own
//! `Condition` impl encodes once for every predicate type.
//!
//! Predicates are pure functions of the event and the [`MatchContext`], so
//! the order they are evaluated in only affects how early a mismatch is
//! found, never the verdict.

mod date;
mod labels;
mod milestone;
mod note;
mod state;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventAdapter;

pub use date::{DateAttribute, DateFilter, DateIntervalType, DateCondition};
pub use labels::{ForbiddenLabels, Labels};
pub use milestone::Milestone;
pub use note::{NoteCondition, NoteType};
pub use state::StateCondition;

/// Per-request evaluation inputs that are not part of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchContext {
    /// Reference instant for relative date conditions.
    pub now: DateTime<Utc>,
}

impl MatchContext {
    /// A context pinned to the current instant.
    #[must_use]
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }

    /// A context pinned to `now`.
    #[must_use]
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for MatchContext {
    fn default() -> Self {
        Self::now()
    }
}

/// A single predicate over an incoming event.
pub trait Condition {
    /// Whether the event satisfies this predicate.
    ///
    /// A capability the event does not have counts as not satisfied.
    fn condition_met(&self, event: &dyn EventAdapter, ctx: &MatchContext) -> bool;
}

impl<T: Condition> Condition for Option<T> {
    fn condition_met(&self, event: &dyn EventAdapter, ctx: &MatchContext) -> bool {
        self.as_ref().map_or(true, |c| c.condition_met(event, ctx))
    }
}

/// Everything a policy requires of an event besides its resource kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConditionSet {
    /// Allowed lifecycle states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateCondition>,
    /// Labels the item must carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
    /// Labels the item must not carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden_labels: Option<ForbiddenLabels>,
    /// Required milestone id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
    /// Relative age of a timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateFilter>,
    /// Comment filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteCondition>,
}

impl ConditionSet {
    /// True when no predicate is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.labels.is_none()
            && self.forbidden_labels.is_none()
            && self.milestone.is_none()
            && self.date.is_none()
            && self.note.is_none()
    }

    /// Requires one of `states`.
    #[must_use]
    pub fn with_state<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state = Some(StateCondition::new(states));
        self
    }

    /// Requires every one of `labels`.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(Labels::new(labels));
        self
    }

    /// Rejects any of `labels`.
    #[must_use]
    pub fn with_forbidden_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_labels = Some(ForbiddenLabels::new(labels));
        self
    }

    /// Requires milestone `milestone`.
    #[must_use]
    pub const fn with_milestone(mut self, milestone: u64) -> Self {
        self.milestone = Some(Milestone(milestone));
        self
    }

    /// Sets the date filter.
    #[must_use]
    pub fn with_date(mut self, date: DateFilter) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the comment filters.
    #[must_use]
    pub fn with_note(mut self, note: NoteCondition) -> Self {
        self.note = Some(note);
        self
    }
}

impl Condition for ConditionSet {
    fn condition_met(&self, event: &dyn EventAdapter, ctx: &MatchContext) -> bool {
        self.labels.condition_met(event, ctx)
            && self.forbidden_labels.condition_met(event, ctx)
            && self.state.condition_met(event, ctx)
            && self.milestone.condition_met(event, ctx)
            && self.note.condition_met(event, ctx)
            && self.date.condition_met(event, ctx)
    }
}
