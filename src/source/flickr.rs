//! Flickr-style REST JSON client.
//!
//! Implements [`PhotoSource`] against a `services/rest` endpoint that takes a
//! `method` query parameter and answers with `{"stat": "ok", ...}` or
//! `{"stat": "fail", "code": .., "message": ..}`.
//!
//! Features:
//! - Token-bucket rate limiting via [`governor`].
//! - Configurable request timeout.
//! - Tolerant parsing: counters may be numbers or numeric strings, and
//!   `{"_content": ..}` wrappers are flattened to plain values.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use photoreel_common::{CollectionId, OwnerId, PhotoId, PhotoRecord};
use serde_json::{Map, Value};
use tracing::debug;

use super::{CollectionInfo, PhotoSource, SearchQuery, SourcePage};
use crate::config::SourceConfig;

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the photo API.
///
/// # Examples
///
/// ```no_run
/// use photoreel::config::SourceConfig;
/// use photoreel::source::FlickrClient;
///
/// let client = FlickrClient::new(&SourceConfig {
///     api_key: "your-api-key".into(),
///     ..SourceConfig::default()
/// })
/// .unwrap();
/// ```
pub struct FlickrClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl FlickrClient {
    /// Create a client from the `[source]` configuration section.
    pub fn new(config: &SourceConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    /// Call one API method and return the unwrapped JSON body.
    async fn call(&self, method: &str, params: &[(&str, String)]) -> anyhow::Result<Value> {
        self.rate_limiter.until_ready().await;

        let mut query: Vec<(&str, &str)> = vec![
            ("method", method),
            ("api_key", self.api_key.as_str()),
            ("format", "json"),
            ("nojsoncallback", "1"),
        ];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        debug!(method, "photo API request");

        let body: Value = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("{method} request failed"))?
            .error_for_status()
            .with_context(|| format!("{method} returned an error status"))?
            .json()
            .await
            .with_context(|| format!("failed to parse {method} response"))?;

        if body.get("stat").and_then(Value::as_str) == Some("fail") {
            let code = body.get("code").and_then(as_u64).unwrap_or_default();
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            anyhow::bail!("{method} failed (code {code}): {message}");
        }

        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Read a counter that may be encoded as a number or a numeric string.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    as_u64(value).and_then(|n| u32::try_from(n).ok())
}

/// Unwrap `{"_content": x}` to `x`; leave every other value alone.
fn unwrap_content(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("_content") => {
            map.remove("_content").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value.cloned().map(unwrap_content)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Turn a list-call photo object into a record.
fn list_record(value: Value) -> Option<PhotoRecord> {
    match value {
        Value::Object(map) => Some(
            map.into_iter()
                .map(|(k, v)| (k, unwrap_content(v)))
                .collect(),
        ),
        _ => None,
    }
}

/// Turn a detail-call photo object into a record whose field names line up
/// with the list-call extras (`ownername`, `dateupload`, space-joined `tags`).
fn detail_record(map: Map<String, Value>) -> PhotoRecord {
    let mut record = PhotoRecord::new();

    for (key, value) in map {
        match (key.as_str(), value) {
            ("owner", Value::Object(owner)) => {
                if let Some(nsid) = owner.get("nsid").cloned() {
                    record.insert("owner", nsid);
                }
                if let Some(name) = owner.get("username").cloned() {
                    record.insert("ownername", name);
                }
            }
            ("dates", Value::Object(dates)) => {
                for (from, to) in [
                    ("posted", "dateupload"),
                    ("taken", "datetaken"),
                    ("lastupdate", "lastupdate"),
                ] {
                    if let Some(v) = dates.get(from).cloned() {
                        record.insert(to, v);
                    }
                }
            }
            ("tags", Value::Object(tags)) => {
                let joined = tags
                    .get("tag")
                    .and_then(Value::as_array)
                    .map(|list| {
                        list.iter()
                            .filter_map(|t| text_of(Some(t)))
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .unwrap_or_default();
                record.insert("tags", joined);
            }
            ("urls", Value::Object(urls)) => {
                let page_url = urls
                    .get("url")
                    .and_then(Value::as_array)
                    .and_then(|list| {
                        list.iter()
                            .find(|u| u.get("type").and_then(Value::as_str) == Some("photopage"))
                    })
                    .and_then(|u| text_of(Some(u)));
                if let Some(url) = page_url {
                    record.insert("photopage", url);
                }
            }
            (_, value) => {
                record.insert(key.clone(), unwrap_content(value));
            }
        }
    }

    record
}

/// Parse the envelope shared by `photosets.getPhotos` and `photos.search`.
fn parse_page(envelope: &Value, with_collection: bool) -> SourcePage {
    let photos = envelope
        .get("photo")
        .and_then(Value::as_array)
        .map(|list| list.iter().cloned().filter_map(list_record).collect())
        .unwrap_or_default();

    let total = envelope.get("total").and_then(as_u64);

    let collection = with_collection.then(|| CollectionInfo {
        title: text_of(envelope.get("title")).unwrap_or_default(),
        description: text_of(envelope.get("description")),
        total_count: total.unwrap_or_default(),
        owner: text_of(envelope.get("owner")),
    });

    SourcePage {
        photos,
        page: envelope.get("page").and_then(as_u32),
        pages: envelope.get("pages").and_then(as_u32),
        total,
        collection,
    }
}

fn section<'a>(body: &'a Value, key: &str, method: &str) -> anyhow::Result<&'a Value> {
    body.get(key)
        .with_context(|| format!("{method} response has no '{key}' object"))
}

// ---------------------------------------------------------------------------
// PhotoSource implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl PhotoSource for FlickrClient {
    fn name(&self) -> &'static str {
        "flickr"
    }

    async fn collection_info(
        &self,
        collection: &CollectionId,
        owner: &OwnerId,
    ) -> anyhow::Result<CollectionInfo> {
        const METHOD: &str = "flickr.photosets.getInfo";
        let body = self
            .call(
                METHOD,
                &[
                    ("photoset_id", collection.to_string()),
                    ("user_id", owner.to_string()),
                ],
            )
            .await?;
        let set = section(&body, "photoset", METHOD)?;

        Ok(CollectionInfo {
            title: text_of(set.get("title")).unwrap_or_default(),
            description: text_of(set.get("description")),
            total_count: set
                .get("photos")
                .or_else(|| set.get("count_photos"))
                .and_then(as_u64)
                .unwrap_or_default(),
            owner: text_of(set.get("owner")),
        })
    }

    async fn collection_page(
        &self,
        collection: &CollectionId,
        owner: &OwnerId,
        page: u32,
        per_page: u32,
        extras: &[String],
    ) -> anyhow::Result<SourcePage> {
        const METHOD: &str = "flickr.photosets.getPhotos";
        let body = self
            .call(
                METHOD,
                &[
                    ("photoset_id", collection.to_string()),
                    ("user_id", owner.to_string()),
                    ("page", page.to_string()),
                    ("per_page", per_page.to_string()),
                    ("extras", extras.join(",")),
                ],
            )
            .await?;

        Ok(parse_page(section(&body, "photoset", METHOD)?, true))
    }

    async fn search_page(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
        extras: &[String],
    ) -> anyhow::Result<SourcePage> {
        const METHOD: &str = "flickr.photos.search";

        let mut params = vec![
            ("safe_search", query.safety.code().to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("extras", extras.join(",")),
        ];
        if let Some(text) = &query.text {
            params.push(("text", text.clone()));
        }
        if !query.tags.is_empty() {
            params.push(("tags", query.tags.join(",")));
            params.push(("tag_mode", query.tag_mode.to_string()));
        }
        if let Some(user) = &query.user {
            params.push(("user_id", user.to_string()));
        }
        if let Some(sort) = &query.sort {
            params.push(("sort", sort.clone()));
        }

        let body = self.call(METHOD, &params).await?;
        Ok(parse_page(section(&body, "photos", METHOD)?, false))
    }

    /// The detail call resolves photos by id alone; `_owner` only scopes the
    /// cache identity upstream.
    async fn photo_detail(
        &self,
        photo: &PhotoId,
        _owner: &OwnerId,
    ) -> anyhow::Result<PhotoRecord> {
        const METHOD: &str = "flickr.photos.getInfo";
        let body = self
            .call(METHOD, &[("photo_id", photo.to_string())])
            .await?;

        match section(&body, "photo", METHOD)? {
            Value::Object(map) => Ok(detail_record(map.clone())),
            _ => anyhow::bail!("{METHOD} returned a non-object 'photo'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counters_accept_numbers_and_strings() {
        assert_eq!(as_u64(&json!(12)), Some(12));
        assert_eq!(as_u64(&json!("12")), Some(12));
        assert_eq!(as_u64(&json!(" 7 ")), Some(7));
        assert_eq!(as_u64(&json!("many")), None);
        assert_eq!(as_u64(&json!(null)), None);
    }

    #[test]
    fn content_wrappers_are_flattened() {
        assert_eq!(unwrap_content(json!({"_content": "hi"})), json!("hi"));
        assert_eq!(unwrap_content(json!({"lat": 1})), json!({"lat": 1}));
        assert_eq!(unwrap_content(json!("plain")), json!("plain"));
    }

    #[test]
    fn page_envelope_parsing() {
        let envelope = json!({
            "id": "721",
            "owner": "12@N01",
            "title": "Holiday",
            "page": "2",
            "pages": 3,
            "total": "7",
            "photo": [
                {"id": "1", "title": "a", "description": {"_content": "first"}},
                {"id": "2", "title": "b"},
                "garbage"
            ]
        });
        let page = parse_page(&envelope, true);
        assert_eq!(page.page, Some(2));
        assert_eq!(page.pages, Some(3));
        assert_eq!(page.total, Some(7));
        assert_eq!(page.photos.len(), 2);
        assert_eq!(page.photos[0].text("description").as_deref(), Some("first"));

        let collection = page.collection.unwrap();
        assert_eq!(collection.title, "Holiday");
        assert_eq!(collection.total_count, 7);
        assert_eq!(collection.owner.as_deref(), Some("12@N01"));
    }

    #[test]
    fn page_without_pagination_fields() {
        let page = parse_page(&json!({"photo": []}), false);
        assert_eq!(page.pages, None);
        assert_eq!(page.total, None);
        assert!(page.collection.is_none());
    }

    #[test]
    fn detail_record_normalizes_nested_objects() {
        let raw = json!({
            "id": "123",
            "secret": "abc",
            "server": "2",
            "farm": 1,
            "title": {"_content": "Pier"},
            "description": {"_content": ""},
            "owner": {"nsid": "12@N01", "username": "walker"},
            "dates": {"posted": "1600000000", "taken": "2020-09-13 10:00:00"},
            "views": "42",
            "tags": {"tag": [{"raw": "Sea", "_content": "sea"}, {"raw": "Dusk", "_content": "dusk"}]},
            "urls": {"url": [{"type": "photopage", "_content": "https://example.test/p/123"}]}
        });
        let Value::Object(map) = raw else { unreachable!() };
        let record = detail_record(map);

        assert_eq!(record.title(), Some("Pier"));
        assert_eq!(record.text("description"), None);
        assert_eq!(record.text("owner").as_deref(), Some("12@N01"));
        assert_eq!(record.text("ownername").as_deref(), Some("walker"));
        assert_eq!(record.text("dateupload").as_deref(), Some("1600000000"));
        assert_eq!(record.text("datetaken").as_deref(), Some("2020-09-13 10:00:00"));
        assert_eq!(record.text("tags").as_deref(), Some("sea dusk"));
        assert_eq!(
            record.text("photopage").as_deref(),
            Some("https://example.test/p/123")
        );
        assert_eq!(record.text("farm").as_deref(), Some("1"));
    }

    #[test]
    fn client_name() {
        let client = FlickrClient::new(&SourceConfig::default()).unwrap();
        assert_eq!(client.name(), "flickr");
    }
}
