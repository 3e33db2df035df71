//! # Read-Time Estimator
//!
//! Per-item consumption-time estimates. Text content is
//! budgeted by word count at a configurable reading rate; audio content by
//! its explicit duration. Missing metadata degrades to safe defaults
//! rather than erroring (missing duration ⇒ zero, per the error-handling
//! contract).

use crate::model::ContentItem;

/// Floor for non-empty text so a one-line post still costs something.
const MIN_TEXT_SECS: u64 = 5;

/// Estimated consumption time for one item, in seconds.
pub fn estimate(item: &ContentItem, reading_wpm: u32) -> u64 {
    if item.content_type.is_audio() {
        return item.duration_secs().unwrap_or(0);
    }

    let words = item
        .word_count()
        .unwrap_or_else(|| item.preview.split_whitespace().count() as u64);
    if words == 0 {
        return 0;
    }
    let wpm = reading_wpm.max(1) as u64;
    // Word counts come from upstream metadata and can be garbage; saturate
    // rather than trust them.
    (words.saturating_mul(60) / wpm).max(MIN_TEXT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{meta, ContentType, MetaValue, SourceId};
    use chrono::Utc;
    use std::collections::HashMap;

    fn item(ct: ContentType, preview: &str) -> ContentItem {
        ContentItem {
            id: "x".into(),
            title: "t".into(),
            subtitle: None,
            published_at: Utc::now(),
            content_type: ct,
            preview: preview.into(),
            progress: 0.0,
            metadata: HashMap::new(),
            source_id: SourceId::from_raw("0000000000000000"),
        }
    }

    #[test]
    fn word_count_metadata_beats_preview_length() {
        let mut it = item(ContentType::Article, "just a few words");
        it.metadata
            .insert(meta::WORD_COUNT.into(), MetaValue::Int(600));
        // 600 words at 200 wpm = 180s
        assert_eq!(estimate(&it, 200), 180);
    }

    #[test]
    fn preview_words_used_when_no_metadata() {
        let preview = "word ".repeat(100);
        let it = item(ContentType::Article, preview.trim());
        // 100 words at 200 wpm = 30s
        assert_eq!(estimate(&it, 200), 30);
    }

    #[test]
    fn short_text_hits_floor() {
        let it = item(ContentType::MicroPost, "tiny post");
        assert_eq!(estimate(&it, 200), MIN_TEXT_SECS);
    }

    #[test]
    fn empty_text_costs_nothing() {
        let it = item(ContentType::Article, "");
        assert_eq!(estimate(&it, 200), 0);
    }

    #[test]
    fn audio_uses_duration_metadata() {
        let mut it = item(ContentType::PodcastEpisode, "show notes ".repeat(50).trim());
        it.metadata
            .insert(meta::DURATION_SECS.into(), MetaValue::DurationSecs(1800));
        assert_eq!(estimate(&it, 200), 1800);
    }

    #[test]
    fn audio_without_duration_estimates_zero() {
        let it = item(ContentType::PodcastEpisode, "long show notes here");
        assert_eq!(estimate(&it, 200), 0);
    }

    #[test]
    fn absurd_word_count_saturates_instead_of_panicking() {
        let mut it = item(ContentType::Article, "ignored");
        it.metadata
            .insert(meta::WORD_COUNT.into(), MetaValue::Int(i64::MAX));
        assert_eq!(estimate(&it, 200), u64::MAX / 200);
    }

    #[test]
    fn absurd_duration_passes_through_without_arithmetic() {
        let mut it = item(ContentType::PodcastEpisode, "");
        it.metadata
            .insert(meta::DURATION_SECS.into(), MetaValue::DurationSecs(u64::MAX));
        assert_eq!(estimate(&it, 200), u64::MAX);
    }
}
