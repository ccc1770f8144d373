//! Sequential execution of a matched policy's actions.

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::event::{EventAdapter, Target};
use crate::policy::Policy;
use crate::remote::{item_endpoint, RemoteClient};

use super::{state_event, ActionSet, Capability};

const APPROVED: &str = "approved";

/// Outcome of one remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    /// The action set that was executed.
    pub action: ActionSet,
    /// Which operation this result is for.
    pub capability: Capability,
    /// Endpoint the operation was sent to, empty when none was attempted.
    pub endpoint: String,
    /// Failure message, `None` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Turns a policy's [`ActionSet`] into remote calls against one client.
pub struct ActionExecutor<'a> {
    client: &'a dyn RemoteClient,
}

impl<'a> ActionExecutor<'a> {
    /// An executor sending operations through `client`.
    #[must_use]
    pub fn new(client: &'a dyn RemoteClient) -> Self {
        Self { client }
    }

    /// Runs every requested operation in order and reports each one.
    ///
    /// A failed operation does not stop the ones after it.
    pub fn execute(&self, policy: &Policy, event: &dyn EventAdapter) -> Vec<OperationResult> {
        let actions = &policy.actions;
        let target = event.target();

        actions
            .capabilities()
            .into_iter()
            .map(|capability| {
                let outcome = match &target {
                    Some(target) => self.call(capability, actions, target),
                    None => Err(RemoteError::new("", "event has no remote target")),
                };
                let (endpoint, error) = match outcome {
                    Ok(endpoint) => (endpoint, None),
                    Err(err) => {
                        tracing::warn!(
                            policy = %policy.name,
                            operation = capability.as_str(),
                            endpoint = %err.endpoint,
                            error = %err.message,
                            "remote operation failed"
                        );
                        (err.endpoint, Some(err.message))
                    }
                };
                OperationResult {
                    action: actions.clone(),
                    capability,
                    endpoint,
                    error,
                }
            })
            .collect()
    }

    fn call(
        &self,
        capability: Capability,
        actions: &ActionSet,
        target: &Target,
    ) -> Result<String, RemoteError> {
        match capability {
            Capability::UpdateLabels => {
                self.client
                    .update_labels(target, &actions.labels, &actions.remove_labels)
            }
            Capability::UpdateState if actions.status == APPROVED => self.client.approve(target),
            Capability::UpdateState => match state_event(&actions.status) {
                Some(event) => self.client.update_state(target, event),
                None => Err(RemoteError::new(
                    item_endpoint(target),
                    format!("unsupported status `{}`", actions.status),
                )),
            },
            Capability::AddNote => self.client.create_note(target, &actions.comment_body()),
        }
    }
}
