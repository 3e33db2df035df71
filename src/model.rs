//! # Content Model
//!
//! Normalized content types shared by the whole engine:
//!
//! - `ContentItem` — one consumable unit (article, post, episode) as the
//!   fetch layer hands it over. Immutable; the engine only reads it.
//! - `Source` — a subscribed content origin with a deterministic id.
//! - `MetaValue` — closed variant type for the per-item metadata bag
//!   (author, interaction counts, duration, word count). Replaces an
//!   untyped dictionary while keeping the scorer generic across types.
//!
//! Source ids are derived with a versioned SHA-256 scheme so the same
//! logical source maps to the same id across runs and platforms. Selected
//! sources are matched to catalog entries by this id, so the derivation is
//! load-bearing: do not change it without bumping the version prefix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Version prefix baked into every derived source id.
const SOURCE_ID_VERSION: &str = "v1";

/// Well-known metadata keys. Fetchers are free to add others; the engine
/// only ever reads these.
pub mod meta {
    pub const AUTHOR: &str = "author";
    pub const LIKES: &str = "likes";
    pub const COMMENTS: &str = "comments";
    pub const REPOSTS: &str = "reposts";
    pub const WORD_COUNT: &str = "word_count";
    pub const DURATION_SECS: &str = "duration_secs";
}

/// Kind of content a source produces / an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Article,
    LinkPost,
    MicroPost,
    SocialPost,
    PodcastEpisode,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::LinkPost => "link_post",
            ContentType::MicroPost => "micro_post",
            ContentType::SocialPost => "social_post",
            ContentType::PodcastEpisode => "podcast_episode",
        }
    }

    /// Audio content is time-budgeted by explicit duration, not word count.
    pub fn is_audio(&self) -> bool {
        matches!(self, ContentType::PodcastEpisode)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identifier of a subscribed source (16 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    /// Derive the id from the source's identity triple.
    ///
    /// `sha256("v1|{name}|{type}|{handle}")`, first 8 bytes as lowercase
    /// hex. The `|` separator keeps ("ab", "c") and ("a", "bc") distinct.
    pub fn derive(name: &str, content_type: ContentType, handle: Option<&str>) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(SOURCE_ID_VERSION.as_bytes());
        hasher.update(b"|");
        hasher.update(name.as_bytes());
        hasher.update(b"|");
        hasher.update(content_type.as_str().as_bytes());
        hasher.update(b"|");
        hasher.update(handle.unwrap_or_default().as_bytes());
        let digest = hasher.finalize();

        let mut out = String::with_capacity(16);
        for b in digest.iter().take(8) {
            use std::fmt::Write as _;
            let _ = write!(&mut out, "{:02x}", b);
        }
        Self(out)
    }

    /// Wrap an already-derived id (e.g. read back from user state).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A subscribed content origin. Owned by the source catalog; the engine
/// only ever sees the set of selected `SourceId`s plus catalog lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
}

impl Source {
    /// Build a source, deriving its id from name + type + handle.
    pub fn new(name: impl Into<String>, content_type: ContentType, handle: Option<String>) -> Self {
        let name = name.into();
        let id = SourceId::derive(&name, content_type, handle.as_deref());
        Self {
            id,
            name,
            content_type,
            description: String::new(),
            handle,
            feed_url: None,
        }
    }
}

/// One metadata value. A small closed set so the scorer and summarizer can
/// stay total over whatever a fetcher attaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Float(f64),
    DurationSecs(u64),
    Url(String),
}

impl MetaValue {
    /// Numeric view, if the value is numeric. Strings never coerce.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MetaValue::Int(n) => Some(*n),
            MetaValue::Float(f) => Some(*f as i64),
            MetaValue::DurationSecs(s) => i64::try_from(*s).ok(),
            _ => None,
        }
    }

    pub fn as_secs(&self) -> Option<u64> {
        match self {
            MetaValue::DurationSecs(s) => Some(*s),
            MetaValue::Int(n) if *n >= 0 => Some(*n as u64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) | MetaValue::Url(s) => Some(s),
            _ => None,
        }
    }
}

/// A normalized unit of consumable content, as produced by the fetch layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub published_at: DateTime<Utc>,
    pub content_type: ContentType,
    /// Plain-or-HTML preview of the body; the summarizer normalizes it.
    #[serde(default)]
    pub preview: String,
    /// Consumption progress in [0, 1]; maintained by on-device trackers.
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub metadata: HashMap<String, MetaValue>,
    pub source_id: SourceId,
}

impl ContentItem {
    /// Integer metadata lookup with safe fallback.
    pub fn meta_i64(&self, key: &str) -> Option<i64> {
        self.metadata.get(key).and_then(MetaValue::as_i64)
    }

    /// Sum of the interaction-count metadata fields (missing ⇒ 0).
    /// Saturating, since the counts are upstream-supplied.
    pub fn interaction_count(&self) -> i64 {
        [meta::LIKES, meta::COMMENTS, meta::REPOSTS]
            .iter()
            .filter_map(|k| self.meta_i64(k))
            .filter(|n| *n > 0)
            .fold(0i64, i64::saturating_add)
    }

    /// Explicit audio duration, when the fetcher provided one.
    pub fn duration_secs(&self) -> Option<u64> {
        self.metadata.get(meta::DURATION_SECS).and_then(MetaValue::as_secs)
    }

    /// Word count metadata, when the fetcher provided one.
    pub fn word_count(&self) -> Option<u64> {
        self.meta_i64(meta::WORD_COUNT)
            .and_then(|n| u64::try_from(n).ok())
    }
}
