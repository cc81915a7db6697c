//! Binding phase definitions
//!
//! Typed view over `status.phase` of an `SPIAccessTokenBinding`. The SPI
//! operator owns every transition; this tool only observes them.

use std::fmt;

/// Authorization progress reported by the SPI operator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingPhase {
    /// Waiting for the user to complete OAuth (`AwaitingTokenData`)
    Pending,
    /// A secret was created and is referenced by `status.syncedObjectRef`
    Injected,
    /// The operator failed; `status.errorMessage` carries the reason
    Error,
    /// Any phase this version does not know about
    Unknown(String),
}

impl BindingPhase {
    /// Wire value used by the SPI operator
    pub fn as_str(&self) -> &str {
        match self {
            BindingPhase::Pending => "AwaitingTokenData",
            BindingPhase::Injected => "Injected",
            BindingPhase::Error => "Error",
            BindingPhase::Unknown(raw) => raw,
        }
    }

    /// Parse an optional `status.phase` value
    ///
    /// Absent or empty phases map to `None` so callers can tell
    /// "no status yet" apart from an unrecognized phase.
    pub fn from_status(phase: Option<&str>) -> Option<Self> {
        match phase {
            Some(p) if !p.is_empty() => Some(Self::from(p)),
            _ => None,
        }
    }

    /// Injected and Error end the "waiting for authorization" flow
    pub fn is_terminal(&self) -> bool {
        matches!(self, BindingPhase::Injected | BindingPhase::Error)
    }
}

impl From<&str> for BindingPhase {
    fn from(s: &str) -> Self {
        match s {
            "AwaitingTokenData" | "Pending" => BindingPhase::Pending,
            "Injected" => BindingPhase::Injected,
            "Error" => BindingPhase::Error,
            other => BindingPhase::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for BindingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(BindingPhase::from("Injected"), BindingPhase::Injected);
        assert_eq!(BindingPhase::from("Error"), BindingPhase::Error);
        assert_eq!(BindingPhase::from("AwaitingTokenData"), BindingPhase::Pending);
        assert_eq!(BindingPhase::from("Pending"), BindingPhase::Pending);
        assert_eq!(
            BindingPhase::from("Refreshing"),
            BindingPhase::Unknown("Refreshing".to_string())
        );
    }

    #[test]
    fn test_from_status_empty() {
        assert_eq!(BindingPhase::from_status(None), None);
        assert_eq!(BindingPhase::from_status(Some("")), None);
        assert_eq!(
            BindingPhase::from_status(Some("Injected")),
            Some(BindingPhase::Injected)
        );
    }

    #[test]
    fn test_is_terminal() {
        assert!(BindingPhase::Injected.is_terminal());
        assert!(BindingPhase::Error.is_terminal());
        assert!(!BindingPhase::Pending.is_terminal());
        assert!(!BindingPhase::Unknown("x".into()).is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", BindingPhase::Pending), "AwaitingTokenData");
        assert_eq!(format!("{}", BindingPhase::Unknown("Odd".into())), "Odd");
    }
}
