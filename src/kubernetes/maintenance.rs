//! Maintenance window policy and its day-of-week codec
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical wire names, indexed by ordinal
const DAYS: [&str; 8] = [
    "any",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Day of the week a maintenance window may start on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MaintenancePolicyDay {
    #[default]
    Any = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

/// Unknown day name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day: {0:?}")]
pub struct ParseDayError(pub String);

/// Ordinal outside `0..=7`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid day: {0}")]
pub struct InvalidDayError(pub u8);

impl MaintenancePolicyDay {
    pub const ALL: [MaintenancePolicyDay; 8] = [
        MaintenancePolicyDay::Any,
        MaintenancePolicyDay::Monday,
        MaintenancePolicyDay::Tuesday,
        MaintenancePolicyDay::Wednesday,
        MaintenancePolicyDay::Thursday,
        MaintenancePolicyDay::Friday,
        MaintenancePolicyDay::Saturday,
        MaintenancePolicyDay::Sunday,
    ];

    /// Lowercase wire name
    pub fn as_str(self) -> &'static str {
        DAYS[self as usize]
    }

    /// Ordinal value, `any` being 0 and `sunday` 7
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Wire name for a raw ordinal
    pub fn name_for_ordinal(ordinal: u8) -> Result<&'static str, InvalidDayError> {
        Self::try_from(ordinal).map(Self::as_str)
    }
}

impl TryFrom<u8> for MaintenancePolicyDay {
    type Error = InvalidDayError;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(ordinal as usize)
            .copied()
            .ok_or(InvalidDayError(ordinal))
    }
}

impl FromStr for MaintenancePolicyDay {
    type Err = ParseDayError;

    /// Case-insensitive lookup of the day name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        DAYS.iter()
            .position(|day| *day == lower)
            .map(|index| Self::ALL[index])
            .ok_or_else(|| ParseDayError(s.to_string()))
    }
}

impl fmt::Display for MaintenancePolicyDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MaintenancePolicyDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MaintenancePolicyDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Maintenance window of a cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenancePolicy {
    /// Window start in `HH:MM` UTC
    #[serde(default)]
    pub start_time: String,
    /// Window length as reported by the API, e.g. `4h0m0s`
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub day: MaintenancePolicyDay,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        for input in ["monday", "Monday", "MONDAY", "mOnDaY"] {
            let day: MaintenancePolicyDay = input.parse().unwrap();
            assert_eq!(day, MaintenancePolicyDay::Monday);
            assert_eq!(day.to_string(), "monday");
        }
        assert_eq!("ANY".parse::<MaintenancePolicyDay>().unwrap(), MaintenancePolicyDay::Any);
    }

    #[test]
    fn test_every_name_round_trips() {
        for name in DAYS {
            let upper = name.to_uppercase();
            let day: MaintenancePolicyDay = upper.parse().unwrap();
            assert_eq!(day.as_str(), name);
            assert_eq!(MaintenancePolicyDay::try_from(day.ordinal()).unwrap(), day);
        }
    }

    #[test]
    fn test_unknown_day_names_offending_string() {
        let err = "funday".parse::<MaintenancePolicyDay>().unwrap_err();
        assert_eq!(err, ParseDayError("funday".to_string()));
        assert!(err.to_string().contains("funday"));
    }

    #[test]
    fn test_ordinal_out_of_range() {
        assert_eq!(MaintenancePolicyDay::name_for_ordinal(0), Ok("any"));
        assert_eq!(MaintenancePolicyDay::name_for_ordinal(7), Ok("sunday"));

        let err = MaintenancePolicyDay::name_for_ordinal(8).unwrap_err();
        assert_eq!(err, InvalidDayError(8));
        assert_eq!(err.to_string(), "invalid day: 8");
    }

    #[test]
    fn test_policy_json() {
        let policy: MaintenancePolicy =
            serde_json::from_str(r#"{"start_time":"00:00","duration":"4h0m0s","day":"Saturday"}"#)
                .unwrap();
        assert_eq!(policy.day, MaintenancePolicyDay::Saturday);

        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["day"], "saturday");
        assert_eq!(json["start_time"], "00:00");
    }

    #[test]
    fn test_policy_json_rejects_bad_day() {
        let err = serde_json::from_str::<MaintenancePolicy>(
            r#"{"start_time":"00:00","duration":"4h","day":"funday"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("funday"));
    }
}
