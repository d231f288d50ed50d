//! Content records consumed by the scorers.
//!
//! A [`ContentItem`] is either a video or a post as fetched from the
//! document store. Every field is optional on the wire: missing text is
//! read as empty, missing counters as zero, and counters may arrive either
//! as a number or as the sequence they count (e.g. the list of comments).
//! A field of the wrong type reads as missing rather than rejecting the
//! whole record, and document-store export shapes (`{"$oid": ..}`,
//! `{"$date": ..}`) are unwrapped.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Whether an item is a video upload or a text/image post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Video,
    Post,
}

/// A counter that is stored either as a number or as the sequence it counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Tally {
    Count(f64),
    List(Vec<serde_json::Value>),
}

impl Tally {
    /// Resolve to a non-negative number. Negative and NaN counts read as 0.
    pub fn value(&self) -> f64 {
        match self {
            Tally::Count(n) if n.is_finite() && *n > 0.0 => *n,
            Tally::Count(_) => 0.0,
            Tally::List(items) => items.len() as f64,
        }
    }
}

impl Default for Tally {
    fn default() -> Self {
        Tally::Count(0.0)
    }
}

impl From<u64> for Tally {
    fn from(n: u64) -> Self {
        Tally::Count(n as f64)
    }
}

/// A video or post, as handed over by the fetch layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::kind")]
    pub kind: ContentKind,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub hashtags: Option<Vec<String>>,
    #[serde(
        default,
        alias = "authorName",
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_name: Option<String>,
    #[serde(
        default,
        alias = "authorId",
        deserialize_with = "lenient::id_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_id: Option<String>,
    #[serde(
        default,
        alias = "category",
        deserialize_with = "lenient::string",
        skip_serializing_if = "Option::is_none"
    )]
    pub specialization: Option<String>,
    #[serde(
        default,
        alias = "views",
        deserialize_with = "lenient::tally",
        skip_serializing_if = "Option::is_none"
    )]
    pub view_count: Option<Tally>,
    #[serde(
        default,
        deserialize_with = "lenient::tally",
        skip_serializing_if = "Option::is_none"
    )]
    pub comments: Option<Tally>,
    #[serde(
        default,
        deserialize_with = "lenient::tally",
        skip_serializing_if = "Option::is_none"
    )]
    pub likes: Option<Tally>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub watch_time: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub impressions: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl ContentItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hashtags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hashtags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_channel(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }

    pub fn with_channel_id(mut self, id: impl Into<String>) -> Self {
        self.channel_id = Some(id.into());
        self
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = Some(specialization.into());
        self
    }

    pub fn with_counts(mut self, views: u64, comments: u64, likes: u64) -> Self {
        self.view_count = Some(views.into());
        self.comments = Some(comments.into());
        self.likes = Some(likes.into());
        self
    }

    pub fn with_watch_time(mut self, watch_time: f64) -> Self {
        self.watch_time = Some(watch_time);
        self
    }

    pub fn with_impressions(mut self, impressions: f64) -> Self {
        self.impressions = Some(impressions);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

// ---------------------------------------------------------------------------
// Defensive accessors
// ---------------------------------------------------------------------------

impl ContentItem {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn hashtags(&self) -> &[String] {
        self.hashtags.as_deref().unwrap_or(&[])
    }

    pub fn channel_name(&self) -> &str {
        self.channel_name.as_deref().unwrap_or("")
    }

    /// Channel identity used for preference and variety matching.
    ///
    /// Falls back to the display name when the record carries no id.
    pub fn channel_key(&self) -> &str {
        match self.channel_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => self.channel_name(),
        }
    }

    pub fn specialization(&self) -> &str {
        self.specialization.as_deref().unwrap_or("")
    }

    pub fn views(&self) -> f64 {
        tally(&self.view_count)
    }

    pub fn comment_count(&self) -> f64 {
        tally(&self.comments)
    }

    pub fn like_count(&self) -> f64 {
        tally(&self.likes)
    }

    pub fn watch_time(&self) -> f64 {
        non_negative(self.watch_time)
    }

    pub fn impressions(&self) -> f64 {
        non_negative(self.impressions)
    }
}

fn tally(field: &Option<Tally>) -> f64 {
    field.as_ref().map_or(0.0, Tally::value)
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Lenient field readers
// ---------------------------------------------------------------------------

/// Field deserializers that read through [`Value`] and map anything of the
/// wrong shape to `None` (or the field default) instead of failing.
mod lenient {
    use super::*;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(values) => Some(
                values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(object_id(Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn id_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(object_id(Value::deserialize(d)?))
    }

    pub fn kind<'de, D: Deserializer<'de>>(d: D) -> Result<ContentKind, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) if s.eq_ignore_ascii_case("post") => ContentKind::Post,
            _ => ContentKind::Video,
        })
    }

    pub fn tally<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Tally>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => Some(Tally::List(items)),
            other => as_f64(&other).map(Tally::Count),
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(as_f64(&Value::deserialize(d)?))
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(parse_timestamp(&Value::deserialize(d)?))
    }

    /// Plain string, number, or `{"$oid": "..."}`.
    fn object_id(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(mut map) => match map.remove("$oid") {
                Some(Value::String(s)) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    /// Number, numeric string, or `{"$numberLong": "..."}`-style wrapper.
    fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Value::Object(map) => ["$numberLong", "$numberInt", "$numberDouble"]
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(as_f64),
            _ => None,
        }
    }

    /// RFC 3339 string, epoch milliseconds, or `{"$date": <either>}`.
    fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            Value::Number(n) => n
                .as_i64()
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            Value::Object(map) => match map.get("$date") {
                Some(Value::Object(inner)) => inner.get("$numberLong").and_then(|v| {
                    as_f64(v).and_then(|ms| Utc.timestamp_millis_opt(ms as i64).single())
                }),
                Some(inner) => parse_timestamp(inner),
                None => None,
            },
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
