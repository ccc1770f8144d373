//! Lifecycle state predicate.

use serde::{Deserialize, Deserializer, Serialize};

use crate::event::EventAdapter;

use super::{Condition, MatchContext};

/// Accepted states; the event must be in any one of them.
///
/// Written in a policy file as a single string or a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StateCondition(pub Vec<String>);

impl StateCondition {
    /// Accepts any of `states`.
    #[must_use]
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(states.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for StateCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(s) => Self(vec![s]),
            OneOrMany::Many(v) => Self(v),
        })
    }
}

impl Condition for StateCondition {
    fn condition_met(&self, event: &dyn EventAdapter, _ctx: &MatchContext) -> bool {
        if self.0.is_empty() {
            return true;
        }
        // A state filter on a stateless event is a mismatch, not a wildcard.
        let Some(current) = event.state() else {
            return false;
        };
        let current = current.to_lowercase();
        self.0.iter().any(|s| s.to_lowercase() == current)
    }
}
