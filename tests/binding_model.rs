//! Binding model compatibility tests
//!
//! Guard the wire format of `SPIAccessTokenBinding` against the shape the
//! SPI operator actually writes.

use serde_json::json;
use spibind::models::{BindingPhase, DEFAULT_SECRET_TYPE, Permission};
use spibind::services::build_binding;
use spibind::{BindingSnapshot, SPIAccessTokenBinding};

#[test]
fn test_operator_written_status() {
    let binding: SPIAccessTokenBinding = serde_json::from_value(json!({
        "apiVersion": "appstudio.redhat.com/v1beta1",
        "kind": "SPIAccessTokenBinding",
        "metadata": {
            "name": "git-auth-x7k2p",
            "namespace": "dev",
            "resourceVersion": "12345"
        },
        "spec": {
            "repoUrl": "https://github.com/org/repo",
            "permissions": {"required": [{"type": "rw", "area": "repository"}]},
            "secret": {"type": "kubernetes.io/basic-auth"},
            "lifetime": "never"
        },
        "status": {
            "phase": "AwaitingTokenData",
            "linkedAccessTokenName": "generated-spi-access-token-abc",
            "oAuthUrl": "https://spi.example/oauth/authenticate?state=xyz",
            "uploadUrl": "https://spi.example/token/dev/generated-spi-access-token-abc",
            "syncedObjectRef": {"name": "", "kind": "", "apiVersion": ""}
        }
    }))
    .unwrap();

    assert_eq!(binding.phase(), Some(BindingPhase::Pending));
    assert_eq!(
        binding.oauth_url(),
        Some("https://spi.example/oauth/authenticate?state=xyz")
    );
    // An empty syncedObjectRef name is not a secret
    assert_eq!(binding.synced_secret_name(), None);
    assert_eq!(binding.spec.lifetime.as_deref(), Some("never"));

    let snapshot = BindingSnapshot::from(&binding);
    assert_eq!(snapshot.phase, Some(BindingPhase::Pending));
    assert!(snapshot.synced_secret.is_none());
}

#[test]
fn test_unknown_fields_are_tolerated() {
    let binding: SPIAccessTokenBinding = serde_json::from_value(json!({
        "apiVersion": "appstudio.redhat.com/v1beta1",
        "kind": "SPIAccessTokenBinding",
        "metadata": {"name": "tok-1"},
        "spec": {"repoUrl": "https://github.com/org/repo", "futureField": true},
        "status": {"phase": "Refreshing", "somethingNew": {"a": 1}}
    }))
    .unwrap();

    assert_eq!(
        binding.phase(),
        Some(BindingPhase::Unknown("Refreshing".to_string()))
    );
}

#[test]
fn test_built_binding_manifest() {
    let config = spibind::config::BindingConfig {
        secret_type: DEFAULT_SECRET_TYPE.to_string(),
        permissions: vec![Permission::new("rw", "repository")],
    };
    let binding = build_binding("https://github.com/org/repo", "dev", &config, None).unwrap();
    let value = serde_json::to_value(&binding).unwrap();

    assert_eq!(value["apiVersion"], "appstudio.redhat.com/v1beta1");
    assert_eq!(value["kind"], "SPIAccessTokenBinding");
    assert_eq!(value["metadata"]["generateName"], "git-auth-");
    assert_eq!(value["metadata"]["namespace"], "dev");
    assert_eq!(value["spec"]["repoUrl"], "https://github.com/org/repo");
    assert_eq!(
        value["spec"]["permissions"]["required"],
        json!([{"type": "rw", "area": "repository"}])
    );
    assert_eq!(value["spec"]["secret"], json!({"type": "kubernetes.io/basic-auth"}));
    assert!(value.get("status").is_none_or(|s| s.is_null()));
}

#[test]
fn test_build_binding_rejects_ssh_urls() {
    let config = spibind::config::BindingConfig::default();
    assert!(build_binding("git@github.com:org/repo.git", "dev", &config, None).is_err());
}
