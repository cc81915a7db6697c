//! Pure decision logic: `(previous, next) -> effects`
//!
//! Two reactions are evaluated independently. Each one only runs when its
//! own dependency tuple differs from the previous observation, which is
//! what makes re-delivered snapshots free of side effects.

use super::observation::Observation;
use crate::effects::{AUTH_SECRET_FIELD, Notification};
use crate::models::BindingPhase;

pub const SUCCESS_TITLE: &str = "Authorization successful!!";
pub const SUCCESS_DESCRIPTION: &str = "Git repository successfully authorized.";
pub const FAILURE_TITLE: &str = "Authorization failed!!";
pub const INCOMPLETE_TITLE: &str = "Authorization incomplete";
pub const INCOMPLETE_DESCRIPTION: &str =
    "Binding reports Injected but does not reference a synced secret.";

/// A side effect the reactor wants executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the OAuth authorization page
    OpenUrl(String),
    /// Commit a value into the dependent form
    SetField { path: String, value: String },
    /// Show a notification to the user
    Notify(Notification),
}

/// Compute the effects caused by moving from `previous` to `next`
///
/// `previous == None` means nothing has been evaluated yet, so both
/// reactions run.
pub fn reduce(previous: Option<&Observation>, next: &Observation) -> Vec<Effect> {
    let mut effects = Vec::new();

    if previous.map(Observation::opener_deps) != Some(next.opener_deps()) {
        effects.extend(open_auth_window(next));
    }

    if previous.map(Observation::phase_deps) != Some(next.phase_deps()) {
        effects.extend(resolve_phase(next));
    }

    effects
}

fn open_auth_window(obs: &Observation) -> Option<Effect> {
    if !obs.is_active() {
        return None;
    }
    obs.oauth_url()
        .filter(|url| !url.is_empty())
        .map(|url| Effect::OpenUrl(url.to_string()))
}

fn resolve_phase(obs: &Observation) -> Vec<Effect> {
    if !obs.is_active() {
        return Vec::new();
    }

    match obs.phase() {
        Some(BindingPhase::Injected) => match obs.synced_secret() {
            Some(secret) => vec![
                Effect::SetField {
                    path: AUTH_SECRET_FIELD.to_string(),
                    value: secret.to_string(),
                },
                Effect::Notify(Notification::success(SUCCESS_TITLE, SUCCESS_DESCRIPTION)),
            ],
            None => {
                tracing::warn!(
                    binding = %obs.name,
                    "binding is Injected without syncedObjectRef.name"
                );
                vec![Effect::Notify(Notification::danger(
                    INCOMPLETE_TITLE,
                    INCOMPLETE_DESCRIPTION,
                ))]
            }
        },
        Some(BindingPhase::Error) => vec![Effect::Notify(Notification::danger(
            FAILURE_TITLE,
            obs.error_message().unwrap_or_default(),
        ))],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::BindingSnapshot;

    fn pending(url: &str) -> BindingSnapshot {
        BindingSnapshot {
            oauth_url: Some(url.to_string()),
            phase: Some(BindingPhase::Pending),
            ..Default::default()
        }
    }

    fn injected(secret: &str) -> BindingSnapshot {
        BindingSnapshot {
            phase: Some(BindingPhase::Injected),
            synced_secret: Some(secret.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_inactive_observations_do_nothing() {
        let unnamed = Observation::new("", true, Some(injected("s")));
        assert!(reduce(None, &unnamed).is_empty());

        let not_loaded = Observation::new("tok-1", false, Some(pending("https://a/x")));
        assert!(reduce(None, &not_loaded).is_empty());
    }

    #[test]
    fn test_opens_url_once() {
        let first = Observation::new("tok-1", true, Some(pending("https://auth.example/x")));
        assert_eq!(
            reduce(None, &first),
            vec![Effect::OpenUrl("https://auth.example/x".into())]
        );
        assert!(reduce(Some(&first), &first.clone()).is_empty());
    }

    #[test]
    fn test_url_change_reopens() {
        let first = Observation::new("tok-1", true, Some(pending("https://auth.example/x")));
        let second = Observation::new("tok-1", true, Some(pending("https://auth.example/y")));
        assert_eq!(
            reduce(Some(&first), &second),
            vec![Effect::OpenUrl("https://auth.example/y".into())]
        );
    }

    #[test]
    fn test_empty_url_is_ignored() {
        let obs = Observation::new("tok-1", true, Some(pending("")));
        assert!(reduce(None, &obs).is_empty());
    }

    #[test]
    fn test_loaded_transition_evaluates_both_reactions() {
        let before = Observation::new("tok-1", false, Some(pending("https://auth.example/x")));
        let after = Observation::new("tok-1", true, Some(pending("https://auth.example/x")));
        assert_eq!(
            reduce(Some(&before), &after),
            vec![Effect::OpenUrl("https://auth.example/x".into())]
        );
    }

    #[test]
    fn test_injected_sets_field_then_notifies() {
        let prev = Observation::new("tok-1", true, Some(pending("https://auth.example/x")));
        let next = Observation::new("tok-1", true, Some(injected("secret-abc")));
        let effects = reduce(Some(&prev), &next);
        assert_eq!(
            effects,
            vec![
                Effect::SetField {
                    path: "git.authSecret".into(),
                    value: "secret-abc".into()
                },
                Effect::Notify(Notification::success(
                    "Authorization successful!!",
                    "Git repository successfully authorized."
                )),
            ]
        );
    }

    #[test]
    fn test_injected_without_secret_reports_incomplete() {
        let snapshot = BindingSnapshot {
            phase: Some(BindingPhase::Injected),
            ..Default::default()
        };
        let effects = reduce(None, &Observation::new("tok-1", true, Some(snapshot)));
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::danger(
                INCOMPLETE_TITLE,
                INCOMPLETE_DESCRIPTION
            ))]
        );
    }

    #[test]
    fn test_error_notifies_with_message() {
        let snapshot = BindingSnapshot {
            phase: Some(BindingPhase::Error),
            error_message: Some("token expired".into()),
            ..Default::default()
        };
        let effects = reduce(None, &Observation::new("tok-1", true, Some(snapshot)));
        assert_eq!(
            effects,
            vec![Effect::Notify(Notification::danger(
                "Authorization failed!!",
                "token expired"
            ))]
        );
    }

    #[test]
    fn test_unknown_phase_does_nothing() {
        let snapshot = BindingSnapshot {
            phase: Some(BindingPhase::Unknown("Refreshing".into())),
            ..Default::default()
        };
        assert!(reduce(None, &Observation::new("tok-1", true, Some(snapshot))).is_empty());
    }
}
