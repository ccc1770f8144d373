//! Policy matching.
//!
//! Matching is pure: no I/O, no shared state. The resource kind is compared
//! first since it rejects most policies for any given event.

use crate::condition::{Condition, MatchContext};
use crate::event::EventAdapter;
use crate::policy::Policy;

/// Verdict for one (policy, event) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult<'a> {
    /// The evaluated policy.
    pub policy: &'a Policy,
    /// Whether the event satisfied it.
    pub matched: bool,
}

/// Evaluates policies against events under one [`MatchContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchingEngine {
    ctx: MatchContext,
}

impl MatchingEngine {
    /// An engine evaluating against `ctx`.
    #[must_use]
    pub const fn new(ctx: MatchContext) -> Self {
        Self { ctx }
    }

    /// The pinned evaluation context.
    #[must_use]
    pub const fn context(&self) -> &MatchContext {
        &self.ctx
    }

    /// Whether `policy` applies to `event`.
    ///
    /// A policy whose resource is not a known kind never matches.
    #[must_use]
    pub fn is_match(&self, policy: &Policy, event: &dyn EventAdapter) -> bool {
        policy.resource.known() == Some(event.resource_type())
            && policy.conditions.condition_met(event, &self.ctx)
    }

    /// Evaluates one policy against one event.
    pub fn evaluate<'a>(&self, policy: &'a Policy, event: &dyn EventAdapter) -> MatchResult<'a> {
        let matched = self.is_match(policy, event);
        tracing::debug!(
            policy = %policy.name,
            resource = %policy.resource,
            event = %event.resource_type(),
            matched,
            "policy evaluated"
        );
        MatchResult { policy, matched }
    }
}
