//! Core enums shared by the pipeline, configuration and command line.
//!
//! All enums serialize in lowercase so they can be written directly in the
//! TOML configuration file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// How much per-photo detail a run collects beyond the list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// List data only, no extra calls.
    #[default]
    Basic,
    /// One detail call per photo, merged over the list data.
    Detailed,
    /// Detail call plus derived direct-access URLs.
    Full,
}

impl DetailLevel {
    /// Whether photos at this level need a per-photo detail fetch.
    pub fn needs_detail(self) -> bool {
        !matches!(self, Self::Basic)
    }

    /// Whether photos at this level get derived direct-access URLs.
    pub fn derives_urls(self) -> bool {
        matches!(self, Self::Full)
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Detailed => write!(f, "detailed"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl FromStr for DetailLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "detailed" => Ok(Self::Detailed),
            "full" => Ok(Self::Full),
            other => Err(Error::input(format!(
                "unknown detail level '{other}' (expected basic, detailed or full)"
            ))),
        }
    }
}

/// Size variant of a derived direct-access photo URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSize {
    Thumbnail,
    Small,
    Medium,
    Large,
    Original,
}

impl PhotoSize {
    /// Every size, smallest first.
    pub const ALL: [PhotoSize; 5] = [
        Self::Thumbnail,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Original,
    ];

    /// File-name suffix letter used by the static image host.
    ///
    /// `Medium` is the host's unsuffixed default rendition.
    pub fn suffix(self) -> Option<char> {
        match self {
            Self::Thumbnail => Some('t'),
            Self::Small => Some('m'),
            Self::Medium => None,
            Self::Large => Some('b'),
            Self::Original => Some('o'),
        }
    }
}

impl fmt::Display for PhotoSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thumbnail => write!(f, "thumbnail"),
            Self::Small => write!(f, "small"),
            Self::Medium => write!(f, "medium"),
            Self::Large => write!(f, "large"),
            Self::Original => write!(f, "original"),
        }
    }
}

/// Content filter applied by search runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyLevel {
    #[default]
    Safe,
    Moderate,
    Restricted,
}

impl SafetyLevel {
    /// Numeric code expected by the source's search call.
    pub fn code(self) -> u8 {
        match self {
            Self::Safe => 1,
            Self::Moderate => 2,
            Self::Restricted => 3,
        }
    }
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "safe"),
            Self::Moderate => write!(f, "moderate"),
            Self::Restricted => write!(f, "restricted"),
        }
    }
}

impl FromStr for SafetyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "safe" | "1" => Ok(Self::Safe),
            "moderate" | "2" => Ok(Self::Moderate),
            "restricted" | "3" => Ok(Self::Restricted),
            other => Err(Error::input(format!(
                "unknown safety level '{other}' (expected safe, moderate or restricted)"
            ))),
        }
    }
}

/// What to do when enriching a single photo fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run with the enrichment error.
    Abort,
    /// Log the failure, skip the photo and continue.
    Skip,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(Error::input(format!(
                "unknown failure policy '{other}' (expected abort or skip)"
            ))),
        }
    }
}

/// Kind of run: walking one album, or walking search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Album,
    Search,
}

impl RunMode {
    /// Enrichment failure policy applied when none is configured.
    ///
    /// Album imports abort on the first failed photo; search runs skip it.
    pub fn default_failure_policy(self) -> FailurePolicy {
        match self {
            Self::Album => FailurePolicy::Abort,
            Self::Search => FailurePolicy::Skip,
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Album => write!(f, "album"),
            Self::Search => write!(f, "search"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_level_parse_and_display() {
        for level in [DetailLevel::Basic, DetailLevel::Detailed, DetailLevel::Full] {
            assert_eq!(level.to_string().parse::<DetailLevel>().unwrap(), level);
        }
        assert_eq!(" FULL ".parse::<DetailLevel>().unwrap(), DetailLevel::Full);
        assert!("everything".parse::<DetailLevel>().is_err());
    }

    #[test]
    fn test_detail_level_capabilities() {
        assert!(!DetailLevel::Basic.needs_detail());
        assert!(DetailLevel::Detailed.needs_detail());
        assert!(!DetailLevel::Detailed.derives_urls());
        assert!(DetailLevel::Full.derives_urls());
        assert!(DetailLevel::Basic < DetailLevel::Full);
    }

    #[test]
    fn test_photo_size_suffixes() {
        let suffixes: Vec<_> = PhotoSize::ALL.iter().map(|s| s.suffix()).collect();
        assert_eq!(
            suffixes,
            vec![Some('t'), Some('m'), None, Some('b'), Some('o')]
        );
    }

    #[test]
    fn test_safety_level_codes() {
        assert_eq!(SafetyLevel::Safe.code(), 1);
        assert_eq!("moderate".parse::<SafetyLevel>().unwrap().code(), 2);
        assert_eq!("3".parse::<SafetyLevel>().unwrap(), SafetyLevel::Restricted);
    }

    #[test]
    fn test_run_mode_default_policies_differ() {
        assert_eq!(RunMode::Album.default_failure_policy(), FailurePolicy::Abort);
        assert_eq!(RunMode::Search.default_failure_policy(), FailurePolicy::Skip);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&DetailLevel::Detailed).unwrap(),
            "\"detailed\""
        );
        let policy: FailurePolicy = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(policy, FailurePolicy::Skip);
    }
}
