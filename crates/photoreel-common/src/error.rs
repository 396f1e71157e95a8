//! Error taxonomy for photoreel runs.
//!
//! Every failure a run can surface maps to exactly one [`ErrorKind`], so
//! callers can branch on the outcome without inspecting message text.

use std::fmt;

/// Unified error type for photoreel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The run input could not be understood (bad collection reference,
    /// missing owner, empty identifier). Raised before any fetch.
    #[error("Invalid input: {0}")]
    Input(String),

    /// Fetching a page or collection description from the source failed.
    #[error("Source fetch failed [{context}]: {message}")]
    SourceFetch {
        /// What was being fetched (e.g. "page 3", "collection info").
        context: String,
        /// Human-readable error description.
        message: String,
    },

    /// Enriching a single photo failed.
    #[error("Enrichment failed for photo {photo_id}: {message}")]
    Enrichment {
        /// Identifier of the photo being enriched, or `"<unknown>"`.
        photo_id: String,
        /// Human-readable error description.
        message: String,
    },

    /// A cache backend operation failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The configuration is invalid or incomplete.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Discriminator for [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Input,
    SourceFetch,
    Enrichment,
    Cache,
    Config,
}

impl Error {
    /// Which category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Input(_) => ErrorKind::Input,
            Error::SourceFetch { .. } => ErrorKind::SourceFetch,
            Error::Enrichment { .. } => ErrorKind::Enrichment,
            Error::Cache(_) => ErrorKind::Cache,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Process exit code used by the command-line front end.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Input | ErrorKind::Config => 2,
            ErrorKind::SourceFetch => 3,
            ErrorKind::Enrichment => 4,
            ErrorKind::Cache => 1,
        }
    }

    /// Create a new Input error.
    pub fn input<S: Into<String>>(msg: S) -> Self {
        Self::Input(msg.into())
    }

    /// Create a new SourceFetch error.
    pub fn source_fetch(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SourceFetch {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a new Enrichment error.
    pub fn enrichment(photo_id: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Enrichment {
            photo_id: photo_id.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a new Cache error.
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a new Config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::input("no owner segment");
        assert_eq!(err.to_string(), "Invalid input: no owner segment");

        let err = Error::source_fetch("page 2", "connection reset");
        assert_eq!(
            err.to_string(),
            "Source fetch failed [page 2]: connection reset"
        );

        let err = Error::enrichment("123", "detail call returned 500");
        assert_eq!(
            err.to_string(),
            "Enrichment failed for photo 123: detail call returned 500"
        );

        let err = Error::config("page_size must be at least 1");
        assert_eq!(
            err.to_string(),
            "Configuration error: page_size must be at least 1"
        );
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let kinds = [
            Error::input("a").kind(),
            Error::source_fetch("b", "c").kind(),
            Error::enrichment("d", "e").kind(),
            Error::cache("f").kind(),
            Error::config("g").kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::input("x").exit_code(), 2);
        assert_eq!(Error::config("x").exit_code(), 2);
        assert_eq!(Error::source_fetch("x", "y").exit_code(), 3);
        assert_eq!(Error::enrichment("x", "y").exit_code(), 4);
    }
}
