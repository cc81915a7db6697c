//! Authorization launchers

use super::{AuthLauncher, EffectError};
use url::Url;

/// Reject anything that is not an absolute http(s) URL before handing it
/// to the operating system.
fn validate(url: &str) -> Result<Url, EffectError> {
    let parsed = Url::parse(url).map_err(|e| EffectError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(EffectError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Opens the OAuth page in the user's default browser
///
/// The URL is always echoed to stderr as well, so headless sessions can
/// copy it by hand when no browser is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserLauncher;

impl AuthLauncher for BrowserLauncher {
    fn launch(&self, url: &str) -> Result<(), EffectError> {
        let url = validate(url)?;
        eprintln!("Authorize access in your browser: {}", url);
        tracing::info!(%url, "opening authorization page");
        webbrowser::open(url.as_str()).map_err(EffectError::Launch)
    }
}

/// Only prints the OAuth URL (`--no-browser`)
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintLauncher;

impl AuthLauncher for PrintLauncher {
    fn launch(&self, url: &str) -> Result<(), EffectError> {
        let url = validate(url)?;
        eprintln!("Open this URL to authorize access: {}", url);
        tracing::info!(%url, "authorization URL printed");
        Ok(())
    }
}
