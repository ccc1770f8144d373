//! The remote system boundary.
//!
//! The core never talks HTTP itself; it calls a [`RemoteClient`]. Every
//! call reports the endpoint it used (or would have used) so results can be
//! attributed even when the call fails.

use std::sync::{Mutex, PoisonError};

use crate::error::RemoteError;
use crate::event::{ItemRef, Target};

/// Operations the executor issues against the remote system.
///
/// Implementations are shared across dispatcher workers. Retries, if any,
/// belong here rather than in the executor.
pub trait RemoteClient: Send + Sync {
    /// Adds and removes labels on an item.
    fn update_labels(
        &self,
        target: &Target,
        add: &[String],
        remove: &[String],
    ) -> Result<String, RemoteError>;

    /// Sends a `state_event` (`close`, `reopen`) for an item.
    fn update_state(&self, target: &Target, state_event: &str) -> Result<String, RemoteError>;

    /// Approves a merge request.
    fn approve(&self, target: &Target) -> Result<String, RemoteError>;

    /// Posts a comment on an item.
    fn create_note(&self, target: &Target, body: &str) -> Result<String, RemoteError>;
}

/// REST path of the item itself.
#[must_use]
pub fn item_endpoint(target: &Target) -> String {
    let project = target.project;
    match &target.item {
        ItemRef::MergeRequest(iid) => format!("/projects/{project}/merge_requests/{iid}"),
        ItemRef::Issue(iid) => format!("/projects/{project}/issues/{iid}"),
        ItemRef::Commit(sha) => format!("/projects/{project}/repository/commits/{sha}"),
        ItemRef::Snippet(id) => format!("/projects/{project}/snippets/{id}"),
    }
}

/// REST path comments are posted to.
#[must_use]
pub fn note_endpoint(target: &Target) -> String {
    match &target.item {
        ItemRef::Commit(_) => format!("{}/comments", item_endpoint(target)),
        _ => format!("{}/notes", item_endpoint(target)),
    }
}

/// REST path for approving a merge request.
#[must_use]
pub fn approve_endpoint(target: &Target) -> String {
    format!("{}/approve", item_endpoint(target))
}

/// A call a [`DryRunClient`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    /// Labels added and removed.
    UpdateLabels {
        /// Item endpoint.
        endpoint: String,
        /// Labels added.
        add: Vec<String>,
        /// Labels removed.
        remove: Vec<String>,
    },
    /// State changed.
    UpdateState {
        /// Item endpoint.
        endpoint: String,
        /// `close` or `reopen`.
        state_event: String,
    },
    /// Merge request approved.
    Approve {
        /// Approval endpoint.
        endpoint: String,
    },
    /// Comment posted.
    CreateNote {
        /// Notes or comments endpoint.
        endpoint: String,
        /// Comment text.
        body: String,
    },
}

impl RemoteCall {
    /// Endpoint the call was addressed to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::UpdateLabels { endpoint, .. }
            | Self::UpdateState { endpoint, .. }
            | Self::Approve { endpoint }
            | Self::CreateNote { endpoint, .. } => endpoint,
        }
    }
}

/// A client that logs and records what it would do and never fails.
#[derive(Debug, Default)]
pub struct DryRunClient {
    calls: Mutex<Vec<RemoteCall>>,
}

impl DryRunClient {
    /// A client with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: RemoteCall) -> String {
        let endpoint = call.endpoint().to_string();
        tracing::info!(endpoint = %endpoint, call = ?call, "dry run: remote call skipped");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        endpoint
    }
}

impl RemoteClient for DryRunClient {
    fn update_labels(
        &self,
        target: &Target,
        add: &[String],
        remove: &[String],
    ) -> Result<String, RemoteError> {
        Ok(self.record(RemoteCall::UpdateLabels {
            endpoint: item_endpoint(target),
            add: add.to_vec(),
            remove: remove.to_vec(),
        }))
    }

    fn update_state(&self, target: &Target, state_event: &str) -> Result<String, RemoteError> {
        Ok(self.record(RemoteCall::UpdateState {
            endpoint: item_endpoint(target),
            state_event: state_event.to_string(),
        }))
    }

    fn approve(&self, target: &Target) -> Result<String, RemoteError> {
        Ok(self.record(RemoteCall::Approve {
            endpoint: approve_endpoint(target),
        }))
    }

    fn create_note(&self, target: &Target, body: &str) -> Result<String, RemoteError> {
        Ok(self.record(RemoteCall::CreateNote {
            endpoint: note_endpoint(target),
            body: body.to_string(),
        }))
    }
}
