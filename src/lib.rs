//! # Quetzal - Policy-Driven GitLab Webhook Automation
//!
//! Quetzal matches incoming GitLab webhook events against a set of
//! declarative policies and, for every policy that matches, applies the
//! label, state and comment updates the policy asks for.
//!
//! ## Core Concepts
//!
//! - **Policy**: a named rule pairing a resource kind and conditions with actions
//! - **EventAdapter**: a uniform capability surface over differently shaped hook payloads
//! - **ConditionSet**: independent predicates that must all hold; unset means "any"
//! - **Dispatcher**: evaluates a whole policy set concurrently and streams the matches
//! - **ActionExecutor**: turns one matched policy into ordered remote operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quetzal::{config, Dispatcher, DryRunClient, Webhook};
//!
//! let config = config::load("policies.yaml")?;
//! let hook = Webhook::decode(Some("Merge Request Hook"), &body)?;
//!
//! let results = Dispatcher::new(config.dispatcher.clone()).dispatch_all(
//!     config.shared_policies(),
//!     Arc::new(hook),
//!     Arc::new(DryRunClient::new()),
//! )?;
//! for result in results {
//!     println!("{} matched ({} operations)", result.policy.name, result.operations.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Vocabulary and events
pub mod error;
pub mod event;
pub mod vocab;
pub mod webhook;

// Policies
pub mod action;
pub mod condition;
pub mod policy;
pub mod validate;

// Evaluation and execution
pub mod config;
pub mod dispatch;
pub mod matcher;
pub mod remote;

// Re-export primary types at crate root for convenience
pub use action::{ActionExecutor, ActionSet, Capability, OperationResult};
pub use condition::{Condition, ConditionSet, MatchContext};
pub use config::Config;
pub use dispatch::{DispatchResult, DispatchStream, Dispatcher, DispatcherConfig};
pub use error::{
    ConfigError, DecodeError, ExecutionError, PolicyValidationError, QuetzalError, QuetzalResult,
    RemoteError, ValidationError,
};
pub use event::{EventAdapter, EventKind, ItemRef, Target};
pub use matcher::{MatchResult, MatchingEngine};
pub use policy::{Policy, PolicySet};
pub use remote::{DryRunClient, RemoteCall, RemoteClient};
pub use validate::{validate, validate_all};
pub use vocab::{Keyword, Vocabulary};
pub use webhook::Webhook;
