//! Hooks without a dedicated payload type.

use serde::{Deserialize, Serialize};

use super::payload::ProjectRef;
use super::{EventAdapter, EventKind};

/// Any other hook (push, tag push, pipeline, job, deployment, system).
///
/// Only the kind is exposed, so such events can match policies that filter
/// on resource alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericEvent {
    /// Kind from the payload discriminator.
    pub kind: EventKind,
    /// Owning project, when the payload has one.
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

impl GenericEvent {
    /// An event of `kind` with no project.
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self {
            kind,
            project: None,
        }
    }
}

impl EventAdapter for GenericEvent {
    fn resource_type(&self) -> EventKind {
        self.kind
    }
}
