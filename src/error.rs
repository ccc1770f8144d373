//! Error types for Quetzal.
//!
//! All errors in Quetzal are strongly typed using thiserror. Configuration
//! problems are collected and reported as a batch; remote failures are
//! captured per operation and never escape the dispatcher.

use thiserror::Error;

/// A single problem found while validating one policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The policy has no name.
    #[error("policy name cannot be empty")]
    EmptyPolicyName,

    /// A keyword field holds a value outside its vocabulary.
    #[error("`{field}` allowed options are: {allowed}. But received: {value}")]
    UnknownKeyword {
        /// Field path, e.g. `date:attribute`.
        field: &'static str,
        /// Accepted spellings, comma separated.
        allowed: String,
        /// The rejected value.
        value: String,
    },

    /// A state condition on a kind that has no lifecycle state.
    #[error("`{resource}` events have no state, but a state condition was given")]
    StatelessResource {
        /// The policy's resource.
        resource: String,
    },

    /// A state that the resource never reports.
    #[error("available states for {resource} are: {allowed}. But received: {value}")]
    IllegalState {
        /// The policy's resource.
        resource: String,
        /// States the resource reports.
        allowed: String,
        /// The rejected state.
        value: String,
    },

    /// A known note type that actions cannot be executed for.
    #[error("note type `{value}` is recognised but not supported")]
    UnsupportedNoteType {
        /// The rejected note type.
        value: String,
    },

    /// An explicit milestone of 0.
    #[error("`milestone` must not be 0; omit the field to match any milestone")]
    ZeroMilestone,

    /// A date interval below 1.
    #[error("`date:interval` must be at least 1, but received: {value}")]
    NonPositiveInterval {
        /// The rejected interval.
        value: i64,
    },

    /// An action status the resource cannot be moved to.
    #[error("action status `{value}` is not valid for {resource} events")]
    IllegalActionStatus {
        /// The policy's resource.
        resource: String,
        /// The rejected status.
        value: String,
    },
}

/// Every validation problem found for one policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("policy `{policy}` is invalid: {}", join_errors(.errors))]
pub struct PolicyValidationError {
    /// Name of the invalid policy.
    pub policy: String,
    /// Problems in check order.
    pub errors: Vec<ValidationError>,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors decoding an incoming webhook body.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body does not parse as the expected payload.
    #[error("webhook body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither a header nor a payload discriminator names the kind.
    #[error("webhook body has no `object_kind` and no event header was given")]
    MissingKind,

    /// The kind is not a known hook category.
    #[error("unknown webhook event kind: {0}")]
    UnknownKind(String),

    /// The header and the payload name different kinds.
    #[error("event header says `{header}` but payload says `{payload}`")]
    KindMismatch {
        /// Kind from the `X-Gitlab-Event` header.
        header: String,
        /// Kind from the payload discriminator.
        payload: String,
    },
}

/// Errors loading the policy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("config file could not be read at {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or has unknown or mistyped fields.
    #[error("config file could not be parsed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// One or more policies failed validation.
    #[error("{}", describe_invalid_policies(.0))]
    InvalidPolicies(Vec<PolicyValidationError>),
}

fn describe_invalid_policies(errors: &[PolicyValidationError]) -> String {
    let noun = if errors.len() == 1 { "policy" } else { "policies" };
    let detail = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ");
    format!("{} invalid {noun}: {detail}", errors.len())
}

/// Dispatcher infrastructure failures.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A worker or fan-in thread could not be started.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name.
        name: String,
        /// Underlying spawn failure.
        #[source]
        source: std::io::Error,
    },
}

/// A failed remote call.
///
/// The endpoint is kept even on failure so results can report which call
/// was attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} ({endpoint})")]
pub struct RemoteError {
    /// Endpoint the call was addressed to.
    pub endpoint: String,
    /// What went wrong.
    pub message: String,
}

impl RemoteError {
    /// A failure of the call to `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

/// Top-level error type for Quetzal.
#[derive(Debug, Error)]
pub enum QuetzalError {
    /// A policy failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] PolicyValidationError),

    /// A webhook body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The dispatcher could not start.
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),
}

impl QuetzalError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
            || matches!(self, Self::Config(ConfigError::InvalidPolicies(_)))
    }

    /// Returns true if this is a decode error.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type alias for Quetzal operations.
pub type QuetzalResult<T> = Result<T, QuetzalError>;
