use chrono::{NaiveTime, Timelike};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Pickup time carried on the wire as `HH:MM` (24-hour, zero-padded).
///
/// Stored values may arrive as `HH:MM:SS`; the seconds component is dropped on
/// parse and never re-emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PickupTime(NaiveTime);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupTimeParseError {
    input: String,
}

impl fmt::Display for PickupTimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid pickup time '{}' (expected HH:MM or HH:MM:SS)",
            self.input
        )
    }
}

impl std::error::Error for PickupTimeParseError {}

impl PickupTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Parse an optional wire value: `None`, empty, and whitespace-only
    /// strings all mean "no pickup time".
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Self>, PickupTimeParseError> {
        match value {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => raw.trim().parse().map(Some),
        }
    }
}

impl FromStr for PickupTime {
    type Err = PickupTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"));
        match parsed {
            // Truncate, do not round: 14:30:59 is still 14:30.
            Ok(time) => Ok(Self(
                NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
                    .expect("hour/minute taken from a valid time"),
            )),
            Err(_) => Err(PickupTimeParseError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PickupTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for PickupTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct PickupTimeVisitor;

impl Visitor<'_> for PickupTimeVisitor {
    type Value = PickupTime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a pickup time string in HH:MM or HH:MM:SS form")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for PickupTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PickupTimeVisitor)
    }
}
