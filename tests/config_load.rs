use std::io::Write;
use std::sync::Arc;

use tempfile::NamedTempFile;

use quetzal::config;
use quetzal::remote::RemoteCall;
use quetzal::{
    ConfigError, Dispatcher, DryRunClient, QuetzalError, RemoteClient, ValidationError, Webhook,
};

const POLICIES: &str = r"
user: triage-bot
repoHost: https://gitlab.example.com
dryRun: true
policies:
  - name: flag critical merge requests
    resource: Merge Request Hook
    conditions:
      state: opened
      labels: [critical]
      forbiddenLabels: [wip]
    actions:
      labels: [needs-review]
      mention: [lead]
      comment: please take a look
  - name: answer help requests
    resource: Note Hook
    conditions:
      note:
        noteType: Issue
        mentions: [triage-bot]
        command: -help
    actions:
      comment: see the contributing guide
";

const MR_HOOK: &str = r#"{
  "object_kind": "merge_request",
  "project": {"id": 42, "path_with_namespace": "group/app"},
  "object_attributes": {
    "iid": 7,
    "title": "Fix crash",
    "state": "opened",
    "milestone_id": null,
    "created_at": "2024-01-02 03:04:05 UTC",
    "updated_at": "2024-01-03T03:04:05Z"
  },
  "labels": [{"title": "Critical"}, {"title": "api"}]
}"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_a_valid_file() {
    let file = write_config(POLICIES);
    let cfg = config::load(file.path()).unwrap();
    assert_eq!(cfg.user, "triage-bot");
    assert!(cfg.dry_run);
    assert_eq!(cfg.policies.len(), 2);
}

#[test]
fn loaded_policies_dispatch_a_decoded_hook() {
    let file = write_config(POLICIES);
    let cfg = config::load(file.path()).unwrap();
    let hook = Webhook::decode(Some("Merge Request Hook"), MR_HOOK.as_bytes()).unwrap();
    let client = Arc::new(DryRunClient::new());

    let results = Dispatcher::new(cfg.dispatcher.clone())
        .dispatch_all(
            cfg.shared_policies(),
            Arc::new(hook),
            Arc::clone(&client) as Arc<dyn RemoteClient>,
        )
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].policy.name, "flag critical merge requests");
    assert_eq!(results[0].operations.len(), 2);

    let calls = client.calls();
    assert_eq!(
        calls[0],
        RemoteCall::UpdateLabels {
            endpoint: "/projects/42/merge_requests/7".to_string(),
            add: vec!["needs-review".to_string()],
            remove: Vec::new(),
        }
    );
    assert_eq!(
        calls[1],
        RemoteCall::CreateNote {
            endpoint: "/projects/42/merge_requests/7/notes".to_string(),
            body: "@lead please take a look".to_string(),
        }
    );
}

#[test]
fn invalid_policies_fail_the_whole_load() {
    let file = write_config(
        r"
policies:
  - name: good
    resource: Issue Hook
  - name: bad date
    resource: Issue Hook
    conditions:
      date:
        attribute: closed_at
        condition: older_than
        intervalType: days
        interval: 3
  - name: bad state
    resource: Wiki Page Hook
    conditions:
      state: opened
",
    );
    let err = config::load(file.path()).unwrap_err();
    let ConfigError::InvalidPolicies(invalid) = &err else {
        panic!("expected invalid policies, got {err:?}");
    };
    assert_eq!(invalid.len(), 2);
    assert_eq!(invalid[0].policy, "bad date");
    assert!(matches!(
        invalid[0].errors.as_slice(),
        [ValidationError::UnknownKeyword {
            field: "date:attribute",
            ..
        }]
    ));
    assert!(matches!(
        invalid[1].errors.as_slice(),
        [ValidationError::StatelessResource { .. }]
    ));
    assert!(err.to_string().starts_with("2 invalid policies:"));

    let err: QuetzalError = err.into();
    assert!(err.is_validation());
}

#[test]
fn missing_file_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn yaml_syntax_errors_are_reported() {
    let file = write_config("policies:\n  - name: [unclosed\n");
    let err = config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

#[test]
fn misspelled_condition_keys_fail_the_load() {
    let file = write_config(
        r"
policies:
  - name: skip work in progress
    resource: Merge Request Hook
    conditions:
      forbidden_labels: [wip]
    actions:
      comment: ready for review
",
    );
    let err = config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)), "got {err:?}");
    assert!(
        err.to_string().contains("unknown field `forbidden_labels`"),
        "{err}"
    );
}

#[test]
fn unsupported_policy_blocks_fail_the_load() {
    let cases = [
        (
            "discussion",
            r"
policies:
  - name: stale threads
    resource: Merge Request Hook
    conditions:
      discussion:
        attribute: threads
        condition: greater_than
        threshold: 3
",
        ),
        (
            "limit",
            r"
policies:
  - name: newest only
    resource: Issue Hook
    limit:
      mostRecent: 5
",
        ),
        (
            "http",
            r"
policies:
  - name: notify ci
    resource: Merge Request Hook
    actions:
      http:
        method: POST
        endpoint: https://ci.example.com/hook
",
        ),
    ];
    for (key, yaml) in cases {
        let file = write_config(yaml);
        let err = config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)), "{key}: got {err:?}");
        assert!(
            err.to_string().contains(&format!("unknown field `{key}`")),
            "{key}: {err}"
        );
    }
}

#[test]
fn unknown_top_level_keys_fail_the_load() {
    let file = write_config("user: bot\nrepo_host: https://gitlab.example.com\n");
    let err = config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("unknown field `repo_host`"), "{err}");
}
