//! Node pool taints
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Taint applied to a node pool and, through it, to all of its nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Taint {
    #[serde(default, alias = "Key")]
    pub key: String,
    #[serde(default, alias = "Value", skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// `NoSchedule`, `PreferNoSchedule` or `NoExecute`
    #[serde(default, alias = "Effect")]
    pub effect: String,
}

/// Text that is not `key[=value]:effect`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid taint {0:?}, expected key[=value]:effect")]
pub struct ParseTaintError(pub String);

impl Taint {
    pub fn new(key: impl Into<String>, value: impl Into<String>, effect: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            effect: effect.into(),
        }
    }
}

impl fmt::Display for Taint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}:{}", self.key, self.effect)
        } else {
            write!(f, "{}={}:{}", self.key, self.value, self.effect)
        }
    }
}

impl FromStr for Taint {
    type Err = ParseTaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseTaintError(s.to_string());

        let (head, effect) = s.rsplit_once(':').ok_or_else(invalid)?;
        let (key, value) = head.split_once('=').unwrap_or((head, ""));
        if key.is_empty() || effect.is_empty() {
            return Err(invalid());
        }

        Ok(Taint::new(key, value, effect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_value() {
        let taint = Taint::new("dedicated", "", "NoSchedule");
        assert_eq!(taint.to_string(), "dedicated:NoSchedule");
    }

    #[test]
    fn test_display_with_value() {
        let taint = Taint::new("dedicated", "gpu", "NoExecute");
        assert_eq!(taint.to_string(), "dedicated=gpu:NoExecute");
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "dedicated=gpu:NoExecute".parse::<Taint>().unwrap(),
            Taint::new("dedicated", "gpu", "NoExecute")
        );
        assert_eq!(
            "dedicated:NoSchedule".parse::<Taint>().unwrap(),
            Taint::new("dedicated", "", "NoSchedule")
        );
        assert!("dedicated".parse::<Taint>().is_err());
        assert!(":NoSchedule".parse::<Taint>().is_err());
        assert!("dedicated=gpu:".parse::<Taint>().is_err());
    }

    #[test]
    fn test_json_omits_empty_value() {
        let json = serde_json::to_value(Taint::new("k", "", "NoSchedule")).unwrap();
        assert_eq!(json, serde_json::json!({"key": "k", "effect": "NoSchedule"}));

        let taint: Taint =
            serde_json::from_str(r#"{"key":"k","value":"v","effect":"NoExecute"}"#).unwrap();
        assert_eq!(taint.to_string(), "k=v:NoExecute");
    }

    #[test]
    fn test_json_accepts_capitalised_and_partial_fields() {
        let taint: Taint =
            serde_json::from_str(r#"{"Key":"k","Value":"v","Effect":"NoSchedule"}"#).unwrap();
        assert_eq!(taint, Taint::new("k", "v", "NoSchedule"));

        let taint: Taint = serde_json::from_str(r#"{"key":"k"}"#).unwrap();
        assert_eq!(taint, Taint::new("k", "", ""));
    }
}
