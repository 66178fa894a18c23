//! CallStatus - Normalized state of a call record

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::CallEventKind;

/// Status stored on a call record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    InProgress,
    Completed,
    Analyzed,
    Failed,
    /// Provider status with no internal meaning
    Other(String),
}

impl CallStatus {
    /// Derive a status from the event and the provider's own `call_status`.
    ///
    /// An explicit provider status wins over the event-implied one.
    pub fn derive(kind: &CallEventKind, provider_status: Option<&str>) -> Self {
        if let Some(status) = provider_status.map(str::trim).filter(|s| !s.is_empty()) {
            return Self::from_provider(status);
        }

        match kind {
            CallEventKind::CallStarted => Self::InProgress,
            CallEventKind::CallEnded | CallEventKind::CallDisconnected => Self::Completed,
            CallEventKind::CallAnalyzed => Self::Analyzed,
            CallEventKind::Other(_) => Self::InProgress,
        }
    }

    pub fn from_provider(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "registered" | "ongoing" | "in_progress" => Self::InProgress,
            "ended" | "completed" => Self::Completed,
            "analyzed" => Self::Analyzed,
            "error" | "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Analyzed => "analyzed",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Analyzed | Self::Failed)
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CallStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CallStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let status = String::deserialize(deserializer)?;
        Ok(Self::from_provider(&status))
    }
}

impl From<&str> for CallStatus {
    fn from(value: &str) -> Self {
        Self::from_provider(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_implied_status() {
        assert_eq!(
            CallStatus::derive(&CallEventKind::CallStarted, None),
            CallStatus::InProgress
        );
        assert_eq!(
            CallStatus::derive(&CallEventKind::CallDisconnected, None),
            CallStatus::Completed
        );
        assert_eq!(
            CallStatus::derive(&CallEventKind::CallAnalyzed, Some("  ")),
            CallStatus::Analyzed
        );
    }

    #[test]
    fn test_provider_status_wins() {
        assert_eq!(
            CallStatus::derive(&CallEventKind::CallEnded, Some("error")),
            CallStatus::Failed
        );
        assert_eq!(
            CallStatus::derive(&CallEventKind::CallStarted, Some("ongoing")),
            CallStatus::InProgress
        );
        assert_eq!(CallStatus::from("voicemail").as_str(), "voicemail");
    }
}
