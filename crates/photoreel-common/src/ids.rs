//! Typed identifier wrappers.
//!
//! Source-side identifiers (collections, owners, photos) are opaque strings
//! handed out by the remote API. They are wrapped so a photo id can never be
//! passed where an owner id is expected. [`RunId`] is generated locally.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

macro_rules! source_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a ", $label, " from a non-empty string.")]
            ///
            /// Surrounding whitespace is trimmed.
            pub fn new(value: impl AsRef<str>) -> Result<Self> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(Error::input(concat!($label, " must not be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

source_id!(
    /// Identifier of an album (or other named collection) at the source.
    CollectionId,
    "collection id"
);

source_id!(
    /// Identifier of the account that owns a collection or photo.
    OwnerId,
    "owner id"
);

source_id!(
    /// Identifier of a single photo at the source.
    PhotoId,
    "photo id"
);

/// Unique identifier for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a new random run ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RunId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_source_ids_trim_whitespace() {
        let id = CollectionId::new("  72157  ").unwrap();
        assert_eq!(id.as_str(), "72157");
        assert_eq!(id.to_string(), "72157");
    }

    #[test]
    fn test_empty_ids_are_input_errors() {
        assert_eq!(OwnerId::new("").unwrap_err().kind(), ErrorKind::Input);
        assert_eq!(PhotoId::new("   ").unwrap_err().kind(), ErrorKind::Input);
    }

    #[test]
    fn test_from_str() {
        let owner: OwnerId = "12345678@N00".parse().unwrap();
        assert_eq!(owner.as_ref(), "12345678@N00");
    }

    #[test]
    fn test_serde_transparent() {
        let id = PhotoId::new("987").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"987\"");
        let back: PhotoId = serde_json::from_str("\"987\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_run_ids_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}
