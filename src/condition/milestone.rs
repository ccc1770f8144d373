//! Milestone predicate.

use serde::{Deserialize, Serialize};

use crate::event::EventAdapter;

use super::{Condition, MatchContext};

/// Milestone id the event must carry.
///
/// Zero means "unset" and matches every event, including ones on a
/// milestone whose id really is zero. Validation rejects an explicit zero in
/// policy files for that reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milestone(pub u64);

impl Milestone {
    /// True for the zero sentinel.
    #[must_use]
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl Condition for Milestone {
    fn condition_met(&self, event: &dyn EventAdapter, _ctx: &MatchContext) -> bool {
        if self.is_unset() {
            return true;
        }
        event.milestone() == Some(self.0)
    }
}
