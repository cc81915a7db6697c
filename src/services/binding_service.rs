//! Binding service for Kubernetes operations
//!
//! Creates and fetches `SPIAccessTokenBinding` objects.

use anyhow::{Context, Result};
use kube::api::PostParams;
use kube::{Api, ResourceExt};
use url::Url;

use crate::config::BindingConfig;
use crate::models::SPIAccessTokenBinding;

/// Check that `repo_url` is an absolute http(s) URL with a host
pub fn validate_repo_url(repo_url: &str) -> Result<Url> {
    let url = Url::parse(repo_url.trim())
        .with_context(|| format!("Invalid repository URL: {}", repo_url))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow::anyhow!(
            "Repository URL must use http or https, got '{}'",
            url.scheme()
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(anyhow::anyhow!("Repository URL has no host: {}", repo_url));
    }
    Ok(url)
}

/// Build a new binding for `repo_url` from configured defaults
pub fn build_binding(
    repo_url: &str,
    namespace: &str,
    config: &BindingConfig,
    secret_type: Option<&str>,
) -> Result<SPIAccessTokenBinding> {
    let url = validate_repo_url(repo_url)?;
    let secret_type = secret_type
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&config.secret_type);

    Ok(SPIAccessTokenBinding::for_repository(
        url.as_str(),
        namespace,
        secret_type,
        config.permissions.clone(),
    ))
}

/// Service for binding API operations
pub struct BindingService {
    client: kube::Client,
}

impl BindingService {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<SPIAccessTokenBinding> {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Create a binding; the returned object carries the server-assigned name
    pub async fn create(&self, binding: &SPIAccessTokenBinding) -> Result<SPIAccessTokenBinding> {
        let namespace = binding
            .namespace()
            .ok_or_else(|| anyhow::anyhow!("Binding has no namespace"))?;

        let created = self
            .api(&namespace)
            .create(&PostParams::default(), binding)
            .await
            .with_context(|| {
                format!(
                    "Failed to create SPIAccessTokenBinding for {} in {}",
                    binding.spec.repo_url, namespace
                )
            })?;

        tracing::info!(name = %created.name_any(), namespace = %namespace, "binding created");
        Ok(created)
    }

    /// Fetch a binding, returning `None` when it does not exist
    pub async fn get(&self, namespace: &str, name: &str) -> Result<Option<SPIAccessTokenBinding>> {
        self.api(namespace)
            .get_opt(name)
            .await
            .with_context(|| format!("Failed to fetch SPIAccessTokenBinding {}/{}", namespace, name))
    }
}
