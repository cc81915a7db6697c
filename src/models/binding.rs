//! SPIAccessTokenBinding custom resource
//!
//! Hand-written model for `appstudio.redhat.com/v1beta1` bindings. Only the
//! fields this tool reads or sets are modeled; unknown fields are ignored on
//! deserialization.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

use super::BindingPhase;

/// Secret type requested when none is configured
pub const DEFAULT_SECRET_TYPE: &str = "kubernetes.io/basic-auth";

/// Prefix for server-generated binding names
pub const GENERATE_NAME_PREFIX: &str = "git-auth-";

/// Desired state of an SPI access token binding
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "appstudio.redhat.com",
    version = "v1beta1",
    kind = "SPIAccessTokenBinding",
    plural = "spiaccesstokenbindings",
    namespaced,
    status = "SPIAccessTokenBindingStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct SPIAccessTokenBindingSpec {
    /// Repository the token grants access to
    pub repo_url: String,

    #[serde(default)]
    pub permissions: BindingPermissions,

    #[serde(default)]
    pub secret: BindingSecret,

    /// Token lifetime as understood by the operator (e.g. "never", "1h")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BindingPermissions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<Permission>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_scopes: Vec<String>,
}

/// A single `{type, area}` permission, e.g. `rw` on `repository`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Permission {
    #[serde(rename = "type")]
    pub kind: String,
    pub area: String,
}

impl Permission {
    pub fn new(kind: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            area: area.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BindingSecret {
    /// Fixed secret name; the operator generates one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default = "default_secret_type")]
    pub secret_type: String,
}

impl Default for BindingSecret {
    fn default() -> Self {
        Self {
            name: None,
            secret_type: default_secret_type(),
        }
    }
}

fn default_secret_type() -> String {
    DEFAULT_SECRET_TYPE.to_string()
}

/// Observed state written by the SPI operator
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SPIAccessTokenBindingStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Present only while authorization is pending
    #[serde(rename = "oAuthUrl", default, skip_serializing_if = "Option::is_none")]
    pub oauth_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_access_token_name: Option<String>,

    /// Present only once the phase is Injected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_object_ref: Option<SyncedObjectRef>,
}

/// Reference to the object the operator synced the token into
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncedObjectRef {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl SPIAccessTokenBinding {
    /// Build a binding for `repo_url` with a server-generated name
    pub fn for_repository(
        repo_url: &str,
        namespace: &str,
        secret_type: &str,
        permissions: Vec<Permission>,
    ) -> Self {
        let spec = SPIAccessTokenBindingSpec {
            repo_url: repo_url.to_string(),
            permissions: BindingPermissions {
                required: permissions,
                additional_scopes: Vec::new(),
            },
            secret: BindingSecret {
                name: None,
                secret_type: secret_type.to_string(),
            },
            lifetime: None,
        };

        let mut binding = SPIAccessTokenBinding::new("", spec);
        binding.metadata.name = None;
        binding.metadata.generate_name = Some(GENERATE_NAME_PREFIX.to_string());
        binding.metadata.namespace = Some(namespace.to_string());
        binding
    }

    /// Current phase, if the operator has reported one
    pub fn phase(&self) -> Option<BindingPhase> {
        BindingPhase::from_status(self.status.as_ref().and_then(|s| s.phase.as_deref()))
    }

    /// Name of the secret the token was injected into
    pub fn synced_secret_name(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.synced_object_ref.as_ref())
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
    }

    pub fn oauth_url(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.oauth_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn error_message(&self) -> Option<&str> {
        self.status.as_ref().and_then(|s| s.error_message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_deserialization() {
        let obj = json!({
            "apiVersion": "appstudio.redhat.com/v1beta1",
            "kind": "SPIAccessTokenBinding",
            "metadata": {"name": "tok-1", "namespace": "dev"},
            "spec": {"repoUrl": "https://github.com/org/repo"},
            "status": {
                "phase": "Injected",
                "oAuthUrl": "",
                "syncedObjectRef": {"name": "secret-abc", "kind": "Secret", "apiVersion": "v1"}
            }
        });

        let binding: SPIAccessTokenBinding = serde_json::from_value(obj).unwrap();
        assert_eq!(binding.phase(), Some(BindingPhase::Injected));
        assert_eq!(binding.synced_secret_name(), Some("secret-abc"));
        assert_eq!(binding.oauth_url(), None);
        assert_eq!(binding.spec.secret.secret_type, DEFAULT_SECRET_TYPE);
    }

    #[test]
    fn test_accessors_without_status() {
        let binding = SPIAccessTokenBinding::new(
            "tok-1",
            SPIAccessTokenBindingSpec {
                repo_url: "https://github.com/org/repo".into(),
                ..Default::default()
            },
        );
        assert_eq!(binding.phase(), None);
        assert_eq!(binding.synced_secret_name(), None);
        assert_eq!(binding.error_message(), None);
    }

    #[test]
    fn test_for_repository_uses_generate_name() {
        let binding = SPIAccessTokenBinding::for_repository(
            "https://github.com/org/repo",
            "dev",
            DEFAULT_SECRET_TYPE,
            vec![Permission::new("rw", "repository")],
        );
        assert_eq!(binding.metadata.name, None);
        assert_eq!(binding.metadata.generate_name.as_deref(), Some("git-auth-"));
        assert_eq!(binding.metadata.namespace.as_deref(), Some("dev"));
        assert_eq!(binding.spec.permissions.required.len(), 1);
    }
}
