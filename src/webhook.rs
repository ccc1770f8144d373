//! Decoding of raw webhook deliveries into event adapters.
//!
//! The variant is chosen from the `X-Gitlab-Event` header when the caller
//! has one, otherwise from the payload's own `object_kind`. When both are
//! present they must agree.

use serde_json::Value as JsonValue;

use crate::error::{DecodeError, QuetzalResult};
use crate::event::{
    EventAdapter, EventKind, GenericEvent, IssueEvent, MergeRequestEvent, NoteEvent, ProjectRef,
    ReleaseEvent, WikiPageEvent,
};
use crate::vocab::{Keyword, Vocabulary};

/// One decoded webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Webhook {
    /// Merge request hook.
    MergeRequest(MergeRequestEvent),
    /// Issue hook, confidential or not.
    Issue(IssueEvent),
    /// Note hook, confidential or not.
    Note(NoteEvent),
    /// Wiki page hook.
    WikiPage(WikiPageEvent),
    /// Release hook.
    Release(ReleaseEvent),
    /// Any other kind, with no conditionable fields.
    Other(GenericEvent),
}

impl Webhook {
    /// Decodes a delivery body.
    ///
    /// `header` is the `X-Gitlab-Event` value, when known.
    pub fn decode(header: Option<&str>, body: &[u8]) -> QuetzalResult<Self> {
        let json: JsonValue = serde_json::from_slice(body).map_err(DecodeError::from)?;
        Self::from_json(header, json)
    }

    /// Decodes an already parsed delivery body.
    pub fn from_json(header: Option<&str>, json: JsonValue) -> QuetzalResult<Self> {
        let header_kind = header
            .map(|h| EventKind::lookup(h).ok_or_else(|| DecodeError::UnknownKind(h.to_string())))
            .transpose()?;

        let payload_kind = || {
            discriminator(&json)
                .map(|raw| {
                    EventKind::lookup(raw).ok_or_else(|| DecodeError::UnknownKind(raw.to_string()))
                })
                .transpose()
        };

        let kind = match header_kind {
            // System hooks reuse project hook bodies (`object_kind: push`, ...).
            Some(EventKind::SystemHook) => EventKind::SystemHook,
            Some(h) => {
                if let Some(p) = payload_kind()? {
                    if !same_family(h, p) {
                        return Err(DecodeError::KindMismatch {
                            header: h.header().to_string(),
                            payload: p.header().to_string(),
                        }
                        .into());
                    }
                }
                h
            }
            None => payload_kind()?.ok_or(DecodeError::MissingKind)?,
        };

        let hook = match kind {
            EventKind::MergeRequest => Self::MergeRequest(decode_as(json)?),
            EventKind::Issue | EventKind::ConfidentialIssue => {
                let mut ev: IssueEvent = decode_as(json)?;
                ev.event_type = Some(Keyword::Known(kind));
                Self::Issue(ev)
            }
            EventKind::Note | EventKind::ConfidentialNote => {
                let mut ev: NoteEvent = decode_as(json)?;
                ev.event_type = Some(Keyword::Known(kind));
                Self::Note(ev)
            }
            EventKind::WikiPage => Self::WikiPage(decode_as(json)?),
            EventKind::Release => Self::Release(decode_as(json)?),
            other => {
                let project = json
                    .get("project")
                    .cloned()
                    .and_then(|p| serde_json::from_value::<ProjectRef>(p).ok());
                Self::Other(GenericEvent {
                    kind: other,
                    project,
                })
            }
        };

        tracing::debug!(kind = %hook.resource_type(), "decoded webhook");
        Ok(hook)
    }

    /// The wrapped event as a capability surface.
    #[must_use]
    pub fn adapter(&self) -> &dyn EventAdapter {
        match self {
            Self::MergeRequest(ev) => ev,
            Self::Issue(ev) => ev,
            Self::Note(ev) => ev,
            Self::WikiPage(ev) => ev,
            Self::Release(ev) => ev,
            Self::Other(ev) => ev,
        }
    }
}

impl EventAdapter for Webhook {
    fn resource_type(&self) -> EventKind {
        self.adapter().resource_type()
    }

    fn state(&self) -> Option<&str> {
        self.adapter().state()
    }

    fn labels(&self) -> Option<Vec<&str>> {
        self.adapter().labels()
    }

    fn milestone(&self) -> Option<u64> {
        self.adapter().milestone()
    }

    fn note(&self) -> Option<&str> {
        self.adapter().note()
    }

    fn mentions(&self) -> Vec<String> {
        self.adapter().mentions()
    }

    fn note_type(&self) -> Option<&str> {
        self.adapter().note_type()
    }

    fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.adapter().created_at()
    }

    fn updated_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.adapter().updated_at()
    }

    fn target(&self) -> Option<crate::event::Target> {
        self.adapter().target()
    }
}

impl From<MergeRequestEvent> for Webhook {
    fn from(ev: MergeRequestEvent) -> Self {
        Self::MergeRequest(ev)
    }
}

impl From<IssueEvent> for Webhook {
    fn from(ev: IssueEvent) -> Self {
        Self::Issue(ev)
    }
}

impl From<NoteEvent> for Webhook {
    fn from(ev: NoteEvent) -> Self {
        Self::Note(ev)
    }
}

impl From<WikiPageEvent> for Webhook {
    fn from(ev: WikiPageEvent) -> Self {
        Self::WikiPage(ev)
    }
}

impl From<ReleaseEvent> for Webhook {
    fn from(ev: ReleaseEvent) -> Self {
        Self::Release(ev)
    }
}

/// `event_type` refines `object_kind` (confidential issues and notes), so it
/// wins when present and known.
fn discriminator(json: &JsonValue) -> Option<&str> {
    let event_type = json
        .get("event_type")
        .and_then(JsonValue::as_str)
        .filter(|raw| EventKind::lookup(raw).is_some());
    event_type.or_else(|| json.get("object_kind").and_then(JsonValue::as_str))
}

/// Header and payload agree when they select the same payload shape.
fn same_family(a: EventKind, b: EventKind) -> bool {
    fn family(kind: EventKind) -> EventKind {
        match kind {
            EventKind::ConfidentialIssue => EventKind::Issue,
            EventKind::ConfidentialNote => EventKind::Note,
            EventKind::Build => EventKind::Job,
            other => other,
        }
    }
    family(a) == family(b)
}

fn decode_as<T: serde::de::DeserializeOwned>(json: JsonValue) -> Result<T, DecodeError> {
    Ok(serde_json::from_value(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_variant_from_object_kind() {
        let body = br#"{"object_kind": "wiki_page", "project": {"id": 1}}"#;
        let hook = Webhook::decode(None, body).unwrap();
        assert!(matches!(hook, Webhook::WikiPage(_)));
        assert_eq!(hook.resource_type(), EventKind::WikiPage);
    }

    #[test]
    fn header_and_payload_must_agree() {
        let body = br#"{"object_kind": "wiki_page", "project": {"id": 1}}"#;
        let err = Webhook::decode(Some("Merge Request Hook"), body).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn confidential_header_accepts_plain_object_kind() {
        let body = br#"{
            "object_kind": "issue",
            "event_type": "confidential_issue",
            "project": {"id": 1},
            "object_attributes": {"iid": 2}
        }"#;
        let hook = Webhook::decode(Some("Confidential Issue Hook"), body).unwrap();
        assert_eq!(hook.resource_type(), EventKind::ConfidentialIssue);
    }

    #[test]
    fn confidential_header_without_event_type() {
        let body = br#"{
            "object_kind": "note",
            "project": {"id": 1},
            "object_attributes": {"note": "hi", "noteable_type": "Issue"}
        }"#;
        let hook = Webhook::decode(Some("Confidential Note Hook"), body).unwrap();
        assert_eq!(hook.resource_type(), EventKind::ConfidentialNote);
        assert_eq!(hook.note(), Some("hi"));
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let body = br#"{"object_kind": "feature_flag"}"#;
        assert!(Webhook::decode(None, body).is_err());
    }

    #[test]
    fn missing_kind_is_rejected() {
        let err = Webhook::decode(None, b"{}").unwrap_err();
        assert!(matches!(
            err,
            crate::error::QuetzalError::Decode(DecodeError::MissingKind)
        ));
    }

    #[test]
    fn push_decodes_as_generic() {
        let body = br#"{"object_kind": "push", "project": {"id": 15}, "ref": "refs/heads/main"}"#;
        let hook = Webhook::decode(Some("Push Hook"), body).unwrap();
        match hook {
            Webhook::Other(ev) => {
                assert_eq!(ev.kind, EventKind::Push);
                assert_eq!(ev.project.map(|p| p.id), Some(15));
            }
            other => panic!("expected generic event, got {other:?}"),
        }
    }

    #[test]
    fn system_hook_trusts_the_header() {
        let body = br#"{"object_kind": "push", "event_name": "push"}"#;
        let hook = Webhook::decode(Some("System Hook"), body).unwrap();
        assert_eq!(hook.resource_type(), EventKind::SystemHook);
    }
}
