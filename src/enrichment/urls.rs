//! Direct-access URLs derived from a record's storage coordinates.

use std::collections::BTreeMap;

use photoreel_common::{PhotoRecord, PhotoSize};

/// Host serving static renditions. `{farm}` is substituted per photo.
const STATIC_HOST: &str = "staticflickr.com";

/// Build the URL of one rendition.
///
/// `https://farm{farm}.staticflickr.com/{server}/{id}_{secret}[_{suffix}].jpg`
pub fn photo_url(farm: &str, server: &str, id: &str, secret: &str, size: PhotoSize) -> String {
    match size.suffix() {
        Some(suffix) => {
            format!("https://farm{farm}.{STATIC_HOST}/{server}/{id}_{secret}_{suffix}.jpg")
        }
        None => format!("https://farm{farm}.{STATIC_HOST}/{server}/{id}_{secret}.jpg"),
    }
}

/// URLs for every [`PhotoSize`], or an empty map when any of `farm`,
/// `server`, `id` or `secret` is missing.
pub fn derived_urls(record: &PhotoRecord) -> BTreeMap<PhotoSize, String> {
    let (Some(farm), Some(server), Some(id), Some(secret)) = (
        record.text("farm"),
        record.text("server"),
        record.text("id"),
        record.text("secret"),
    ) else {
        return BTreeMap::new();
    };

    PhotoSize::ALL
        .into_iter()
        .map(|size| (size, photo_url(&farm, &server, &id, &secret, size)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> PhotoRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn derives_every_size() {
        let urls = derived_urls(&record(
            json!({"farm": 1, "server": "2", "id": "123", "secret": "abc"}),
        ));

        assert_eq!(urls.len(), 5);
        assert_eq!(
            urls[&PhotoSize::Thumbnail],
            "https://farm1.staticflickr.com/2/123_abc_t.jpg"
        );
        assert_eq!(
            urls[&PhotoSize::Small],
            "https://farm1.staticflickr.com/2/123_abc_m.jpg"
        );
        assert_eq!(
            urls[&PhotoSize::Medium],
            "https://farm1.staticflickr.com/2/123_abc.jpg"
        );
        assert_eq!(
            urls[&PhotoSize::Large],
            "https://farm1.staticflickr.com/2/123_abc_b.jpg"
        );
        assert_eq!(
            urls[&PhotoSize::Original],
            "https://farm1.staticflickr.com/2/123_abc_o.jpg"
        );
    }

    #[test]
    fn missing_secret_yields_nothing() {
        let urls = derived_urls(&record(json!({"farm": 1, "server": "2", "id": "123"})));
        assert!(urls.is_empty());
    }

    #[test]
    fn empty_field_counts_as_missing() {
        let urls = derived_urls(&record(
            json!({"farm": 1, "server": "", "id": "123", "secret": "abc"}),
        ));
        assert!(urls.is_empty());
    }
}
