//! Declarative policies.

use serde::{Deserialize, Serialize};

use crate::action::ActionSet;
use crate::condition::ConditionSet;
use crate::event::EventKind;
use crate::vocab::Keyword;

/// A named rule: when an event of `resource` satisfies `conditions`, apply
/// `actions`.
///
/// Names are for reporting only and need not be unique. Keys outside the
/// known fields are rejected at every level of a policy, so a misspelled or
/// unsupported condition fails the load instead of widening the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Display name for logs and reports.
    #[serde(default)]
    pub name: String,
    /// Event kind the policy applies to.
    pub resource: Keyword<EventKind>,
    /// What the event must satisfy.
    #[serde(default)]
    pub conditions: ConditionSet,
    /// What to do on a match.
    #[serde(default)]
    pub actions: ActionSet,
}

impl Policy {
    /// A policy with no conditions and no actions.
    #[must_use]
    pub fn new(name: impl Into<String>, resource: EventKind) -> Self {
        Self {
            name: name.into(),
            resource: Keyword::Known(resource),
            conditions: ConditionSet::default(),
            actions: ActionSet::default(),
        }
    }

    /// Sets the conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: ConditionSet) -> Self {
        self.conditions = conditions;
        self
    }

    /// Sets the actions.
    #[must_use]
    pub fn with_actions(mut self, actions: ActionSet) -> Self {
        self.actions = actions;
        self
    }
}

/// An ordered policy collection, as loaded from one configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicySet(pub Vec<Policy>);

impl PolicySet {
    /// Number of policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no policies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Policies in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Policy> {
        self.0.iter()
    }

    /// Policies for one resource kind, in file order.
    pub fn for_resource(&self, kind: EventKind) -> impl Iterator<Item = &Policy> {
        self.0.iter().filter(move |p| p.resource.known() == Some(kind))
    }
}

impl From<Vec<Policy>> for PolicySet {
    fn from(policies: Vec<Policy>) -> Self {
        Self(policies)
    }
}

impl FromIterator<Policy> for PolicySet {
    fn from_iter<I: IntoIterator<Item = Policy>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PolicySet {
    type Item = &'a Policy;
    type IntoIter = std::slice::Iter<'a, Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for PolicySet {
    type Item = Policy;
    type IntoIter = std::vec::IntoIter<Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_policy_file_entry() {
        let policy: Policy = serde_yaml::from_str(
            r"
name: label critical merge requests
resource: Merge Request Hook
conditions:
  state: opened
  labels: [critical]
actions:
  labels: [needs-review]
  remove_labels: [triage]
  mention: [lead]
  comment: please take a look
",
        )
        .unwrap();
        assert_eq!(policy.name, "label critical merge requests");
        assert_eq!(policy.resource.known(), Some(EventKind::MergeRequest));
        assert!(policy.conditions.labels.is_some());
        assert_eq!(policy.actions.remove_labels, vec!["triage".to_string()]);
        assert_eq!(policy.actions.mentions, vec!["lead".to_string()]);
    }

    #[test]
    fn unknown_resource_survives_decoding() {
        let policy: Policy = serde_yaml::from_str("{name: x, resource: Epic Hook}").unwrap();
        assert_eq!(policy.resource, Keyword::Unknown("Epic Hook".to_string()));
    }

    #[test]
    fn filters_by_resource() {
        let set: PolicySet = vec![
            Policy::new("a", EventKind::MergeRequest),
            Policy::new("b", EventKind::Issue),
            Policy::new("c", EventKind::MergeRequest),
        ]
        .into();
        let names: Vec<_> = set
            .for_resource(EventKind::MergeRequest)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn unknown_keys_are_rejected_at_every_level() {
        for yaml in [
            "{resource: Issue Hook, limit: {oldest: 1}}",
            "{resource: Issue Hook, conditions: {forbidden_labels: [wip]}}",
            "{resource: Note Hook, conditions: {note: {note_type: Issue}}}",
            "{resource: Issue Hook, conditions: {date: {attribute: created_at, condition: older_than, interval_type: days, interval: 1}}}",
            "{resource: Issue Hook, actions: {http: {method: GET}}}",
        ] {
            let err = serde_yaml::from_str::<Policy>(yaml).unwrap_err();
            assert!(err.to_string().contains("unknown field"), "{yaml}: {err}");
        }
    }

    #[test]
    fn action_aliases_are_still_accepted() {
        let policy: Policy = serde_yaml::from_str(
            "{resource: Issue Hook, actions: {removeLabels: [triage], mentions: [lead]}}",
        )
        .unwrap();
        assert_eq!(policy.actions.remove_labels, vec!["triage".to_string()]);
        assert_eq!(policy.actions.mentions, vec!["lead".to_string()]);
    }
}
