//! # Summarizer
//!
//! Derives a plain-text, length-capped summary and a display category for
//! each chosen item. Total for every well-formed item: an empty or
//! HTML-only preview falls back to the title, never an error.

use crate::brief::{BriefCategory, BriefMode, SelectionReason};
use crate::model::{ContentItem, ContentType};
use once_cell::sync::OnceCell;
use regex::Regex;

/// Summarize one chosen item under the mode's length cap.
pub fn summarize(item: &ContentItem, reason: SelectionReason, mode: BriefMode) -> String {
    let mut text = normalize_preview(&item.preview);
    if text.is_empty() {
        text = normalize_preview(&item.title);
    }
    if text.is_empty() {
        // Title was itself empty/markup; keep the invariant anyway.
        text = reason.explanation().to_string();
    }
    truncate_chars(&text, mode.summary_cap_chars())
}

/// Map content type + selection context to a display category.
pub fn categorize(item: &ContentItem, reason: SelectionReason) -> BriefCategory {
    if item.content_type == ContentType::PodcastEpisode {
        return BriefCategory::Podcasts;
    }
    match reason {
        SelectionReason::Trending => BriefCategory::Trending,
        SelectionReason::DiversityPick => BriefCategory::Diversity,
        _ => BriefCategory::TopStories,
    }
}

/// Normalize a preview into clean plain text: decode HTML entities, strip
/// tags, fold typographic quotes, collapse whitespace.
pub fn normalize_preview(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize typographic quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Truncate on a char boundary; the `…` terminator counts inside the cap.
fn truncate_chars(s: &str, cap: usize) -> String {
    if s.chars().count() <= cap {
        return s.to_string();
    }
    let mut out: String = s.chars().take(cap.saturating_sub(1)).collect();
    // Avoid a dangling space before the ellipsis.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('…');
    out
}
