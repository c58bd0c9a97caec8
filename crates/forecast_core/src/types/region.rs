//! Market-zone identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from region identifier construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionError {
    /// The identifier was empty after trimming.
    #[error("Region identifier is empty")]
    Empty,

    /// The identifier contains a character that would corrupt tabular output.
    #[error("Region identifier {id:?} contains invalid character {ch:?}")]
    InvalidCharacter {
        /// The offending identifier.
        id: String,
        /// The first invalid character found.
        ch: char,
    },
}

/// A validated market-zone identifier (e.g. `"NSW1"`, `"NORTH"`).
///
/// Regions form the partition key of every table in a run: historical
/// records, forecasts and deltas are all grouped and sorted by region
/// first. The identifier is kept exactly as supplied (no case folding)
/// but must be non-empty and free of whitespace, commas and control
/// characters so it can round-trip through CSV keys unquoted.
///
/// # Examples
/// ```
/// use forecast_core::types::Region;
///
/// let r = Region::new("NSW1").unwrap();
/// assert_eq!(r.as_str(), "NSW1");
/// assert!(Region::new("  ").is_err());
/// assert!(Region::new("A,B").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    /// Creates a validated region identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::Empty`] for an empty or all-whitespace
    /// identifier, and [`RegionError::InvalidCharacter`] if it contains
    /// whitespace, a comma or a control character.
    pub fn new(id: impl Into<String>) -> Result<Self, RegionError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(RegionError::Empty);
        }
        if let Some(ch) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || *c == ',' || c.is_control())
        {
            return Err(RegionError::InvalidCharacter {
                id: id.clone(),
                ch,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_region() {
        let r = Region::new("QLD1").unwrap();
        assert_eq!(r.as_str(), "QLD1");
        assert_eq!(format!("{}", r), "QLD1");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let r = Region::new(" VIC1 ").unwrap();
        assert_eq!(r.as_str(), "VIC1");
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Region::new(""), Err(RegionError::Empty));
        assert_eq!(Region::new("   "), Err(RegionError::Empty));
    }

    #[test]
    fn test_interior_whitespace_rejected() {
        assert!(matches!(
            Region::new("NEW SOUTH"),
            Err(RegionError::InvalidCharacter { ch: ' ', .. })
        ));
    }

    #[test]
    fn test_comma_rejected() {
        assert!(matches!(
            Region::new("A,B"),
            Err(RegionError::InvalidCharacter { ch: ',', .. })
        ));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = Region::new("NSW1").unwrap();
        let b = Region::new("QLD1").unwrap();
        assert!(a < b);
    }
}
