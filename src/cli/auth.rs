//! Authorization command handlers (`watch`, `bind`, `status`)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kube::ResourceExt;

use crate::config::{Config, ConfigLoader};
use crate::effects::{
    AuthLauncher, BrowserLauncher, ConsoleNotifier, FormSink, PrintLauncher, PrintedForm, YamlForm,
};
use crate::models::BindingPhase;
use crate::reactor::BindingReactor;
use crate::services::{AuthSession, BindingService, SessionOutcome, build_binding};

/// Options shared by every command that waits for authorization
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Namespace of the binding (defaults to config, then kubeconfig)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// YAML form document to write `git.authSecret` into
    #[arg(long, value_name = "FILE")]
    pub form: Option<PathBuf>,

    /// Print the OAuth URL instead of opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Keep watching after the binding is Injected or Error
    #[arg(long)]
    pub keep_watching: bool,
}

/// Arguments for `spibind watch`
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Name of the SPIAccessTokenBinding to watch
    pub name: String,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `spibind bind`
#[derive(Args, Debug)]
pub struct BindArgs {
    /// Repository URL to request access for
    pub repo_url: String,

    /// Secret type for the injected token (overrides binding.secretType)
    #[arg(long)]
    pub secret_type: Option<String>,

    /// Print the binding manifest instead of creating it
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub session: SessionArgs,
}

/// Arguments for `spibind status`
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Name of the SPIAccessTokenBinding
    pub name: String,

    /// Namespace of the binding (defaults to config, then kubeconfig)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

/// Assemble a reactor with the capabilities selected by config and flags
pub fn build_reactor(
    name: &str,
    namespace: &str,
    config: &Config,
    args: &SessionArgs,
) -> Result<BindingReactor> {
    let launcher: Box<dyn AuthLauncher + Send> = if args.no_browser || !config.open_browser {
        Box::new(PrintLauncher)
    } else {
        Box::new(BrowserLauncher)
    };

    let form_path = args
        .form
        .clone()
        .or_else(|| config.form_path.as_ref().map(PathBuf::from));
    let form: Box<dyn FormSink + Send> = match form_path {
        Some(path) => Box::new(
            YamlForm::open(&path)
                .with_context(|| format!("Failed to open form document {}", path.display()))?,
        ),
        None => Box::new(PrintedForm),
    };

    Ok(BindingReactor::new(
        name,
        namespace,
        launcher,
        form,
        Box::new(ConsoleNotifier),
    ))
}

/// Handle `spibind watch`
pub async fn handle_watch(args: WatchArgs, context: Option<&str>) -> Result<()> {
    if args.name.trim().is_empty() {
        return Err(anyhow::anyhow!("Binding name must not be empty"));
    }

    let config = ConfigLoader::load(context).context("Failed to load configuration")?;
    let (client, kube_namespace) = crate::kube::create_client(context).await?;
    let namespace = crate::kube::resolve_namespace(
        args.session.namespace.as_deref(),
        &config.default_namespace,
        &kube_namespace,
    );

    run_session(client, &args.name, &namespace, &config, &args.session).await
}

/// Handle `spibind bind`
pub async fn handle_bind(args: BindArgs, context: Option<&str>) -> Result<()> {
    let config = ConfigLoader::load(context).context("Failed to load configuration")?;

    if args.dry_run {
        // No cluster access needed; fall back to the configured namespace
        let namespace = crate::kube::resolve_namespace(
            args.session.namespace.as_deref(),
            &config.default_namespace,
            "",
        );
        let binding = build_binding(
            &args.repo_url,
            &namespace,
            &config.binding,
            args.secret_type.as_deref(),
        )?;
        let yaml = serde_yaml::to_string(&binding).context("Failed to serialize binding")?;
        print!("{}", yaml);
        return Ok(());
    }

    let (client, kube_namespace) = crate::kube::create_client(context).await?;
    let namespace = crate::kube::resolve_namespace(
        args.session.namespace.as_deref(),
        &config.default_namespace,
        &kube_namespace,
    );
    let binding = build_binding(
        &args.repo_url,
        &namespace,
        &config.binding,
        args.secret_type.as_deref(),
    )?;

    let created = BindingService::new(client.clone()).create(&binding).await?;
    let name = created.name_any();
    eprintln!("Created SPIAccessTokenBinding {}/{}", namespace, name);

    run_session(client, &name, &namespace, &config, &args.session).await
}

/// Handle `spibind status`
pub async fn handle_status(args: StatusArgs, context: Option<&str>) -> Result<()> {
    let config = ConfigLoader::load(context).context("Failed to load configuration")?;
    let (client, kube_namespace) = crate::kube::create_client(context).await?;
    let namespace = crate::kube::resolve_namespace(
        args.namespace.as_deref(),
        &config.default_namespace,
        &kube_namespace,
    );

    let Some(binding) = BindingService::new(client).get(&namespace, &args.name).await? else {
        return Err(anyhow::anyhow!(
            "SPIAccessTokenBinding {}/{} not found",
            namespace,
            args.name
        ));
    };

    println!("name:       {}", binding.name_any());
    println!("namespace:  {}", namespace);
    println!("repository: {}", binding.spec.repo_url);
    println!(
        "phase:      {}",
        binding
            .phase()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(url) = binding.oauth_url() {
        println!("oAuthUrl:   {}", url);
    }
    if let Some(secret) = binding.synced_secret_name() {
        println!("secret:     {}", secret);
    }
    if let Some(message) = binding.error_message().filter(|m| !m.is_empty()) {
        println!("error:      {}", message);
    }
    Ok(())
}

async fn run_session(
    client: kube::Client,
    name: &str,
    namespace: &str,
    config: &Config,
    args: &SessionArgs,
) -> Result<()> {
    let reactor = build_reactor(name, namespace, config, args)?;
    let exit_on_terminal = config.exit_on_terminal && !args.keep_watching;

    eprintln!(
        "Waiting for SPIAccessTokenBinding {}/{} (Ctrl-C to stop)",
        namespace, name
    );
    let session = AuthSession::start(client, reactor, exit_on_terminal)?;

    match session.run().await? {
        SessionOutcome::Finished(BindingPhase::Error) => {
            Err(anyhow::anyhow!("Authorization of {}/{} failed", namespace, name))
        }
        SessionOutcome::Finished(phase) => {
            tracing::debug!(%phase, "session finished");
            Ok(())
        }
        SessionOutcome::Interrupted => {
            eprintln!("Stopped watching {}/{}", namespace, name);
            Ok(())
        }
        SessionOutcome::Closed => Ok(()),
    }
}
