//! Parsing of user-supplied album references.
//!
//! An album can be named either by its bare id (the owner must then be given
//! separately) or by its web URL, which carries both:
//!
//! ```text
//! https://www.flickr.com/photos/<owner>/albums/<id>
//! https://www.flickr.com/photos/<owner>/sets/<id>/with/<photo>
//! ```

use photoreel_common::{CollectionId, Error, OwnerId, Result};
use reqwest::Url;

/// A fully resolved album address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    pub collection: CollectionId,
    pub owner: OwnerId,
}

impl CollectionRef {
    /// Resolve `reference` (bare id or URL) and an optional explicit owner.
    ///
    /// Fails with [`Error::Input`] when no owner can be determined, when the
    /// URL does not point at an album, or when an explicit owner contradicts
    /// the owner segment of the URL.
    pub fn parse(reference: &str, owner: Option<&str>) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(Error::input("collection reference is empty"));
        }

        let explicit_owner = owner.map(OwnerId::new).transpose()?;

        if !reference.contains('/') {
            let collection = CollectionId::new(reference)?;
            let owner = explicit_owner.ok_or_else(|| {
                Error::input(format!(
                    "collection '{reference}' was given without an owner; pass --owner or use the album URL"
                ))
            })?;
            return Ok(Self { collection, owner });
        }

        let (url_owner, collection) = parse_album_url(reference)?;
        if let Some(explicit) = explicit_owner {
            if explicit != url_owner {
                return Err(Error::input(format!(
                    "owner '{explicit}' does not match owner '{url_owner}' in the album URL"
                )));
            }
        }

        Ok(Self {
            collection,
            owner: url_owner,
        })
    }
}

fn parse_album_url(reference: &str) -> Result<(OwnerId, CollectionId)> {
    let with_scheme = if reference.contains("://") {
        reference.to_string()
    } else {
        format!("https://{reference}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| Error::input(format!("'{reference}' is not a valid URL: {e}")))?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let photos_at = segments
        .iter()
        .position(|seg| *seg == "photos")
        .ok_or_else(|| Error::input(format!("'{reference}' has no /photos/<owner> segment")))?;

    match segments.get(photos_at + 1..photos_at + 4) {
        Some([owner, "albums" | "sets", id]) => Ok((OwnerId::new(owner)?, CollectionId::new(id)?)),
        _ => Err(Error::input(format!(
            "'{reference}' does not point at an album (expected /photos/<owner>/albums/<id>)"
        ))),
    }
}
