// src/lib.rs
// Public library surface for integration tests (and embedding apps).

pub mod brief;
pub mod catalog;
pub mod config;
pub mod engagement;
pub mod generator;
pub mod model;
pub mod readtime;
pub mod scoring;
pub mod select;
pub mod summarize;

// ---- Re-exports for a stable public API ----
pub use crate::brief::{BriefCategory, BriefItem, BriefMode, DailyBrief, SelectionReason};
pub use crate::catalog::{ContentCatalog, FetchOutcome, SourceSelection};
pub use crate::config::{EngineConfig, ModePolicy, ScoreWeights};
pub use crate::engagement::{
    EngagementAction, EngagementHistory, EngagementRecord, EngagementStore,
};
pub use crate::generator::{BriefGenerator, EngineError, GeneratorPhase, StateSnapshot};
pub use crate::model::{ContentItem, ContentType, MetaValue, Source, SourceId};
