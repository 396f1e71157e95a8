//! Photoreel-Common: Shared types and errors.
//!
//! This crate provides the vocabulary used across photoreel:
//!
//! - **Typed IDs**: Wrappers for collection, owner, photo and run identifiers
//! - **Core Types**: Detail levels, photo sizes, search safety levels, run modes
//! - **Records**: The [`PhotoRecord`] field map returned by photo sources
//! - **Error Handling**: The run error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use photoreel_common::{CollectionId, DetailLevel, Error, ErrorKind, Result};
//!
//! let album = CollectionId::new("72157600000000000").unwrap();
//! assert_eq!(album.as_str(), "72157600000000000");
//!
//! let level: DetailLevel = "full".parse().unwrap();
//! assert_eq!(level, DetailLevel::Full);
//!
//! fn example() -> Result<()> {
//!     Err(Error::input("missing owner"))
//! }
//! assert_eq!(example().unwrap_err().kind(), ErrorKind::Input);
//! ```

pub mod error;
pub mod ids;
pub mod record;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use ids::*;
pub use record::PhotoRecord;
pub use types::*;
