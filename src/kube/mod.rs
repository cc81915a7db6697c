//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and resolution of the
//! namespace bindings are watched and created in.
//!
//! HTTP/HTTPS proxies are honoured through the standard `HTTP_PROXY`,
//! `HTTPS_PROXY` and `NO_PROXY` environment variables.

use anyhow::{Context, Result};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};

/// Namespace used when nothing else names one
pub const FALLBACK_NAMESPACE: &str = "default";

/// Load client configuration, optionally for an explicit kubeconfig context
///
/// Without a context the default loading strategy applies:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn load_config(context: Option<&str>) -> Result<Config> {
    match context {
        Some(ctx) => {
            let options = KubeConfigOptions {
                context: Some(ctx.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context '{}'", ctx))
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration"),
    }
}

/// Initialize and return a Kubernetes client together with the namespace
/// the kubeconfig (or in-cluster service account) considers the default
pub async fn create_client(context: Option<&str>) -> Result<(Client, String)> {
    let config = load_config(context).await?;
    let namespace = config.default_namespace.clone();
    tracing::debug!(cluster = %config.cluster_url, namespace = %namespace, "connecting to cluster");
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok((client, namespace))
}

/// Pick the namespace to operate in
///
/// Precedence: command-line flag, `SPIBIND_NAMESPACE` (already folded into
/// the configured value by the config loader), configured default, then the
/// kubeconfig namespace. Empty values are skipped.
pub fn resolve_namespace(flag: Option<&str>, configured: &str, kubeconfig: &str) -> String {
    [flag.unwrap_or_default(), configured, kubeconfig]
        .into_iter()
        .map(str::trim)
        .find(|ns| !ns.is_empty())
        .unwrap_or(FALLBACK_NAMESPACE)
        .to_string()
}
