//! # Engine Configuration
//!
//! Tunable knobs for scoring, selection, and mode auto-detection, loadable
//! from TOML. The precise weighting formula is deliberately not a product
//! invariant, so every coefficient lives here rather than in code.
//!
//! TOML shape (all keys optional, defaults apply):
//!
//! ```toml
//! trending_threshold = 50
//! recency_window_secs = 172800
//! reading_wpm = 200
//! slack_factor = 2.0
//! engagement_capacity = 1024
//!
//! [weights]
//! w_recency = 1.0
//! w_trending = 0.8
//! w_follow_up = 0.9
//!
//! [mode_policy]
//! weekend_days = [6, 7]   # ISO weekday numbers
//! rush_start_hour = 6
//! rush_end_hour = 9
//! ```

use crate::brief::BriefMode;
use chrono::{DateTime, Datelike, TimeZone, Timelike};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/brief-engine.toml";
pub const ENV_CONFIG_PATH: &str = "BRIEF_ENGINE_CONFIG";

/// Relative contribution of each scoring signal.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub w_recency: f32,
    pub w_trending: f32,
    pub w_follow_up: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            w_recency: 1.0,
            w_trending: 0.8,
            w_follow_up: 0.9,
        }
    }
}

impl ScoreWeights {
    /// Replace non-finite or negative coefficients with defaults.
    fn hardened(self) -> Self {
        let d = Self::default();
        let fix = |v: f32, d: f32| if v.is_finite() && v >= 0.0 { v } else { d };
        Self {
            w_recency: fix(self.w_recency, d.w_recency),
            w_trending: fix(self.w_trending, d.w_trending),
            w_follow_up: fix(self.w_follow_up, d.w_follow_up),
        }
    }
}

/// Time-of-day / day-of-week policy for resolving a mode when the caller
/// passes none. No observed behavior pins these thresholds; they are
/// policy, not inference.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModePolicy {
    /// ISO weekday numbers (1 = Monday … 7 = Sunday) that map to Weekend.
    pub weekend_days: Vec<u8>,
    /// Local-hour window [start, end) on non-weekend days that maps to Rush.
    pub rush_start_hour: u32,
    pub rush_end_hour: u32,
}

impl Default for ModePolicy {
    fn default() -> Self {
        Self {
            weekend_days: vec![6, 7],
            rush_start_hour: 6,
            rush_end_hour: 9,
        }
    }
}

impl ModePolicy {
    /// Resolve the mode for a given instant. Pure, so tests pin the clock.
    pub fn detect<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> BriefMode {
        let iso_day = now.weekday().number_from_monday() as u8;
        if self.weekend_days.contains(&iso_day) {
            return BriefMode::Weekend;
        }
        let hour = now.hour();
        if hour >= self.rush_start_hour && hour < self.rush_end_hour {
            return BriefMode::Rush;
        }
        BriefMode::Standard
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    /// Combined interaction count (likes + comments + reposts) at or above
    /// which an item counts as trending.
    pub trending_threshold: i64,
    /// Age at which the recency signal has fully decayed.
    pub recency_window_secs: u64,
    /// Reading rate used by the read-time estimator.
    pub reading_wpm: u32,
    /// Budget slack: admission stops once the running estimate would exceed
    /// `target_read_time * slack_factor`.
    pub slack_factor: f32,
    /// Ring capacity of the engagement store.
    pub engagement_capacity: usize,
    pub mode_policy: ModePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            trending_threshold: 50,
            recency_window_secs: 48 * 3600,
            reading_wpm: 200,
            slack_factor: 2.0,
            engagement_capacity: 1024,
            mode_policy: ModePolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML string, hardening odd values.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let cfg: EngineConfig = toml::from_str(s)?;
        Ok(cfg.hardened())
    }

    /// Load from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to read engine config at {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `BRIEF_ENGINE_CONFIG` (or the default path), falling back
    /// to defaults when no file is present or it fails to parse.
    pub fn from_env_or_default() -> Self {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&path).unwrap_or_default()
    }

    /// Clamp degenerate values back to usable defaults.
    fn hardened(mut self) -> Self {
        let d = Self::default();
        self.weights = self.weights.hardened();
        if self.trending_threshold <= 0 {
            self.trending_threshold = d.trending_threshold;
        }
        if self.recency_window_secs == 0 {
            self.recency_window_secs = d.recency_window_secs;
        }
        if self.reading_wpm == 0 {
            self.reading_wpm = d.reading_wpm;
        }
        if !self.slack_factor.is_finite() || self.slack_factor < 1.0 {
            self.slack_factor = d.slack_factor;
        }
        self.engagement_capacity = self.engagement_capacity.clamp(1, 10_000);
        self
    }
}
