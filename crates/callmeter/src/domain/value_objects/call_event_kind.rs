//! CallEventKind - Telephony provider lifecycle events

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle event reported by the telephony provider.
///
/// Unrecognised names are kept as `Other` so new provider events are
/// stored instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEventKind {
    CallStarted,
    CallEnded,
    CallDisconnected,
    CallAnalyzed,
    Other(String),
}

impl CallEventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "call_started" => Self::CallStarted,
            "call_ended" => Self::CallEnded,
            "call_disconnected" => Self::CallDisconnected,
            "call_analyzed" => Self::CallAnalyzed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CallStarted => "call_started",
            Self::CallEnded => "call_ended",
            Self::CallDisconnected => "call_disconnected",
            Self::CallAnalyzed => "call_analyzed",
            Self::Other(name) => name,
        }
    }

    /// Terminal events that settle usage
    pub fn is_billable(&self) -> bool {
        matches!(self, Self::CallEnded | Self::CallDisconnected)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for CallEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CallEventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallEventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_terminal_events_bill() {
        assert!(CallEventKind::CallEnded.is_billable());
        assert!(CallEventKind::CallDisconnected.is_billable());
        assert!(!CallEventKind::CallStarted.is_billable());
        assert!(!CallEventKind::CallAnalyzed.is_billable());
        assert!(!CallEventKind::parse("transcript_updated").is_billable());
    }

    #[test]
    fn test_unknown_event_is_preserved() {
        let kind = CallEventKind::parse("transcript_updated");
        assert_eq!(kind, CallEventKind::Other("transcript_updated".to_string()));
        assert!(!kind.is_known());
        assert_eq!(kind.to_string(), "transcript_updated");
    }
}
