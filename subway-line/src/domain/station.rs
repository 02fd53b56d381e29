//! Station and line identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing a station from an invalid name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station: {reason}")]
pub struct InvalidStation {
    reason: &'static str,
}

/// An opaque station identity.
///
/// Two stations are the same station exactly when their names are equal.
/// Whether the station is known to the wider system is the caller's
/// concern; this type only guarantees the name is non-blank.
///
/// # Examples
///
/// ```
/// use subway_line::domain::Station;
///
/// let gangnam = Station::new("Gangnam").unwrap();
/// assert_eq!(gangnam.as_str(), "Gangnam");
///
/// // Blank names are rejected
/// assert!(Station::new("").is_err());
/// assert!(Station::new("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Station(String);

impl Station {
    /// Create a station from its name.
    ///
    /// Surrounding whitespace is trimmed; the remaining name must be non-empty.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidStation> {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(InvalidStation {
                reason: "name cannot be blank",
            });
        }

        if trimmed.len() == name.len() {
            Ok(Station(name))
        } else {
            Ok(Station(trimmed.to_string()))
        }
    }

    /// Returns the station name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Station {
    type Error = InvalidStation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Station::new(value)
    }
}

impl From<Station> for String {
    fn from(station: Station) -> Self {
        station.0
    }
}

impl fmt::Debug for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station({})", self.0)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the line a segment belongs to.
///
/// The path algorithm never inspects it; it is copied onto remainder
/// segments created by a split so they stay attached to the same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line#{}", self.0)
    }
}
