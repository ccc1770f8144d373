//! Load-time policy validation.
//!
//! Each check is an independent function over one policy; none depends on
//! another's outcome, so every problem in a policy is reported at once.

use crate::error::{PolicyValidationError, ValidationError};
use crate::policy::Policy;

type Check = fn(&Policy, &mut Vec<ValidationError>);

const CHECKS: &[Check] = &[
    check_name,
    check_resource,
    check_date,
    check_state,
    check_note_type,
    check_milestone,
    check_action_status,
];

/// Every problem found in `policy`. Empty means valid.
#[must_use]
pub fn validate(policy: &Policy) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for check in CHECKS {
        check(policy, &mut errors);
    }
    errors
}

/// Validates a batch, returning one entry per invalid policy.
#[must_use]
pub fn validate_all<'a, I>(policies: I) -> Vec<PolicyValidationError>
where
    I: IntoIterator<Item = &'a Policy>,
{
    policies
        .into_iter()
        .filter_map(|p| p.validate().err())
        .collect()
}

impl Policy {
    /// Validates this policy.
    pub fn validate(&self) -> Result<(), PolicyValidationError> {
        let errors = validate(self);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PolicyValidationError {
                policy: self.name.clone(),
                errors,
            })
        }
    }
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("`{v}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_name(policy: &Policy, errors: &mut Vec<ValidationError>) {
    if policy.name.trim().is_empty() {
        errors.push(ValidationError::EmptyPolicyName);
    }
}

fn check_resource(policy: &Policy, errors: &mut Vec<ValidationError>) {
    if let Err(err) = policy.resource.check() {
        errors.push(err);
    }
}

fn check_date(policy: &Policy, errors: &mut Vec<ValidationError>) {
    let Some(date) = &policy.conditions.date else {
        return;
    };
    errors.extend(date.attribute.check().err());
    errors.extend(date.condition.check().err());
    errors.extend(date.interval_type.check().err());
    if date.interval < 1 {
        errors.push(ValidationError::NonPositiveInterval {
            value: date.interval,
        });
    }
}

fn check_state(policy: &Policy, errors: &mut Vec<ValidationError>) {
    let (Some(kind), Some(state)) = (policy.resource.known(), &policy.conditions.state) else {
        return;
    };
    if state.0.is_empty() {
        return;
    }
    let Some(allowed) = kind.states() else {
        errors.push(ValidationError::StatelessResource {
            resource: kind.display_name().to_string(),
        });
        return;
    };
    for value in &state.0 {
        let legal = allowed.iter().any(|a| a.eq_ignore_ascii_case(value));
        if !legal {
            errors.push(ValidationError::IllegalState {
                resource: kind.display_name().to_string(),
                allowed: quoted(allowed),
                value: value.clone(),
            });
        }
    }
}

fn check_note_type(policy: &Policy, errors: &mut Vec<ValidationError>) {
    let Some(note_type) = policy
        .conditions
        .note
        .as_ref()
        .and_then(|n| n.note_type.as_ref())
    else {
        return;
    };
    match note_type.check() {
        Ok(t) if !t.is_supported() => errors.push(ValidationError::UnsupportedNoteType {
            value: t.to_string(),
        }),
        Ok(_) => {}
        Err(err) => errors.push(err),
    }
}

fn check_milestone(policy: &Policy, errors: &mut Vec<ValidationError>) {
    if policy.conditions.milestone.is_some_and(|m| m.is_unset()) {
        errors.push(ValidationError::ZeroMilestone);
    }
}

fn check_action_status(policy: &Policy, errors: &mut Vec<ValidationError>) {
    let status = &policy.actions.status;
    let Some(kind) = policy.resource.known() else {
        return;
    };
    if status.is_empty() {
        return;
    }
    let legal = kind
        .action_statuses()
        .is_some_and(|statuses| statuses.contains(&status.as_str()));
    if !legal {
        errors.push(ValidationError::IllegalActionStatus {
            resource: kind.display_name().to_string(),
            value: status.clone(),
        });
    }
}
