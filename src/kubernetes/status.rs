//! Cluster lifecycle state
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a cluster
///
/// Empty text decodes to [`ClusterStatusState::Invalid`]; any other unknown
/// text is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClusterStatusState {
    Provisioning,
    Running,
    Degraded,
    Error,
    Deleted,
    Upgrading,
    #[default]
    Invalid,
}

/// Unknown cluster state text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cluster state {0:?}")]
pub struct ParseStateError(pub String);

impl ClusterStatusState {
    /// Wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            ClusterStatusState::Provisioning => "provisioning",
            ClusterStatusState::Running => "running",
            ClusterStatusState::Degraded => "degraded",
            ClusterStatusState::Error => "error",
            ClusterStatusState::Deleted => "deleted",
            ClusterStatusState::Upgrading => "upgrading",
            ClusterStatusState::Invalid => "invalid",
        }
    }
}

impl FromStr for ClusterStatusState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "provisioning" => Ok(ClusterStatusState::Provisioning),
            "running" => Ok(ClusterStatusState::Running),
            "degraded" => Ok(ClusterStatusState::Degraded),
            "error" => Ok(ClusterStatusState::Error),
            "deleted" => Ok(ClusterStatusState::Deleted),
            "upgrading" => Ok(ClusterStatusState::Upgrading),
            "" | "invalid" => Ok(ClusterStatusState::Invalid),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}

impl fmt::Display for ClusterStatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ClusterStatusState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ClusterStatusState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Status block of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    #[serde(default)]
    pub state: ClusterStatusState,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_states() {
        let cases = [
            ("provisioning", ClusterStatusState::Provisioning),
            ("running", ClusterStatusState::Running),
            ("degraded", ClusterStatusState::Degraded),
            ("error", ClusterStatusState::Error),
            ("deleted", ClusterStatusState::Deleted),
            ("upgrading", ClusterStatusState::Upgrading),
            ("invalid", ClusterStatusState::Invalid),
        ];
        for (text, state) in cases {
            assert_eq!(text.parse::<ClusterStatusState>().unwrap(), state);
            assert_eq!(state.to_string(), text);
        }
        assert_eq!(
            "RUNNING".parse::<ClusterStatusState>().unwrap(),
            ClusterStatusState::Running
        );
    }

    #[test]
    fn test_empty_is_invalid_sentinel() {
        assert_eq!(
            "".parse::<ClusterStatusState>().unwrap(),
            ClusterStatusState::Invalid
        );
    }

    #[test]
    fn test_unknown_state_is_an_error() {
        let err = "frobnicated".parse::<ClusterStatusState>().unwrap_err();
        assert!(err.to_string().contains("frobnicated"));
    }

    #[test]
    fn test_status_json() {
        let status: ClusterStatus =
            serde_json::from_str(r#"{"state":"running","message":"Cluster is up"}"#).unwrap();
        assert_eq!(status.state, ClusterStatusState::Running);
        assert_eq!(status.message, "Cluster is up");

        let status: ClusterStatus = serde_json::from_str(r#"{"state":""}"#).unwrap();
        assert_eq!(status.state, ClusterStatusState::Invalid);

        let status: ClusterStatus = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(status.state, ClusterStatusState::Invalid);

        let err = serde_json::from_str::<ClusterStatus>(r#"{"state":"frobnicated"}"#).unwrap_err();
        assert!(err.to_string().contains("frobnicated"));
    }
}
