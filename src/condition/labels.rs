//! Required and forbidden label predicates.
//!
//! Label names compare case-insensitively.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::event::EventAdapter;

use super::{Condition, MatchContext};

fn lowered(event: &dyn EventAdapter) -> Option<HashSet<String>> {
    event
        .labels()
        .map(|labels| labels.into_iter().map(str::to_lowercase).collect())
}

/// Labels that must all be present on the event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(pub Vec<String>);

impl Labels {
    /// Labels that must all be present.
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }
}

impl Condition for Labels {
    fn condition_met(&self, event: &dyn EventAdapter, _ctx: &MatchContext) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let Some(present) = lowered(event) else {
            return false;
        };
        self.0.iter().all(|l| present.contains(&l.to_lowercase()))
    }
}

/// Labels that must all be absent from the event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForbiddenLabels(pub Vec<String>);

impl ForbiddenLabels {
    /// Labels none of which may be present.
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }
}

impl Condition for ForbiddenLabels {
    fn condition_met(&self, event: &dyn EventAdapter, _ctx: &MatchContext) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let Some(present) = lowered(event) else {
            return false;
        };
        !self.0.iter().any(|l| present.contains(&l.to_lowercase()))
    }
}
