// tests/engagement.rs
// The feedback loop: recording engagement never disturbs the current
// brief, never raises, and only influences future generations.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use daily_brief_engine::{
    BriefGenerator, BriefMode, ContentCatalog, ContentItem, ContentType, EngagementAction,
    EngagementStore, EngineConfig, SelectionReason, SourceId, SourceSelection,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

struct FixedSelection(HashSet<SourceId>);

impl SourceSelection for FixedSelection {
    fn selected_sources(&self) -> HashSet<SourceId> {
        self.0.clone()
    }
}

struct MapCatalog(HashMap<SourceId, Vec<ContentItem>>);

#[async_trait]
impl ContentCatalog for MapCatalog {
    async fn fetch_candidates(&self, source: &SourceId) -> anyhow::Result<Vec<ContentItem>> {
        Ok(self.0.get(source).cloned().unwrap_or_default())
    }
}

fn item(id: &str, source: &SourceId, age_mins: i64) -> ContentItem {
    ContentItem {
        id: id.into(),
        title: format!("Coverage of {id}"),
        subtitle: None,
        published_at: Utc::now() - Duration::minutes(age_mins),
        content_type: ContentType::Article,
        preview: "Preview text for the story.".into(),
        progress: 0.0,
        metadata: HashMap::new(),
        source_id: source.clone(),
    }
}

fn two_source_generator(store: Arc<EngagementStore>) -> (BriefGenerator, SourceId, SourceId) {
    let blog = SourceId::derive("Favorite Blog", ContentType::Article, None);
    let other = SourceId::derive("Other Site", ContentType::Article, None);
    let map = HashMap::from([
        (
            blog.clone(),
            vec![item("b1", &blog, 10), item("b2", &blog, 120)],
        ),
        (
            other.clone(),
            vec![item("o1", &other, 10), item("o2", &other, 120)],
        ),
    ]);
    let sel = FixedSelection([blog.clone(), other.clone()].into_iter().collect());
    let gen = BriefGenerator::new(
        Arc::new(sel),
        Arc::new(MapCatalog(map)),
        store,
        EngineConfig::default(),
    );
    (gen, blog, other)
}

#[tokio::test]
async fn recording_engagement_does_not_alter_current_brief() {
    let (gen, _, _) = two_source_generator(Arc::new(EngagementStore::default()));
    let brief = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    let first = &brief.items[0];

    gen.record_engagement(first.id, &first.content.id, 42, EngagementAction::Clicked);

    let current = gen.current_brief().unwrap();
    assert_eq!(current.id, brief.id);
    assert_eq!(current.items, brief.items);
    assert!(gen.last_error().is_none());
}

#[tokio::test]
async fn recording_with_unknown_ids_never_raises() {
    let (gen, _, _) = two_source_generator(Arc::new(EngagementStore::default()));
    // No brief generated yet; ids match nothing.
    gen.record_engagement(Uuid::new_v4(), "ghost", 0, EngagementAction::Dismissed);
    gen.record_engagement(Uuid::new_v4(), "", u64::MAX, EngagementAction::Skipped);
    assert!(gen.current_brief().is_none());
}

#[tokio::test]
async fn engaged_source_becomes_follow_up_on_next_generation() {
    let (gen, blog, _) = two_source_generator(Arc::new(EngagementStore::default()));

    let brief = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    let blog_item = brief
        .items
        .iter()
        .find(|i| i.content.source_id == blog)
        .expect("blog item selected");
    gen.record_engagement(
        blog_item.id,
        &blog_item.content.id,
        90,
        EngagementAction::Completed,
    );

    let next = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    let reasons: Vec<SelectionReason> = next
        .items
        .iter()
        .filter(|i| i.content.source_id == blog)
        .map(|i| i.reason)
        .collect();
    assert!(
        reasons.iter().any(|r| *r == SelectionReason::FollowUp),
        "expected a follow-up from the engaged source, got {reasons:?}"
    );
}

#[tokio::test]
async fn dismissals_do_not_create_follow_ups() {
    let (gen, blog, _) = two_source_generator(Arc::new(EngagementStore::default()));

    let brief = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    let blog_item = brief
        .items
        .iter()
        .find(|i| i.content.source_id == blog)
        .unwrap();
    gen.record_engagement(
        blog_item.id,
        &blog_item.content.id,
        1,
        EngagementAction::Dismissed,
    );

    let next = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    assert!(next
        .items
        .iter()
        .all(|i| i.reason != SelectionReason::FollowUp));
}

#[tokio::test]
async fn generator_built_from_config_feeds_follow_ups() {
    let blog = SourceId::derive("Favorite Blog", ContentType::Article, None);
    let map = HashMap::from([(
        blog.clone(),
        vec![item("b1", &blog, 10), item("b2", &blog, 120)],
    )]);
    let gen = BriefGenerator::from_config(
        Arc::new(FixedSelection([blog.clone()].into_iter().collect())),
        Arc::new(MapCatalog(map)),
        EngineConfig::default(),
    );

    let brief = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    let first = &brief.items[0];
    gen.record_engagement(first.id, &first.content.id, 60, EngagementAction::Completed);

    let next = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    assert!(next
        .items
        .iter()
        .any(|i| i.reason == SelectionReason::FollowUp));
}

#[tokio::test]
async fn engagement_store_is_shared_and_observable() {
    let store = Arc::new(EngagementStore::default());
    let (gen, _, _) = two_source_generator(store.clone());

    let brief = gen.generate_brief(Some(BriefMode::Standard)).await.unwrap();
    let first = &brief.items[0];
    gen.record_engagement(first.id, &first.content.id, 30, EngagementAction::Clicked);

    let snap = store.snapshot();
    assert_eq!(snap.records().len(), 1);
    let rec = &snap.records()[0];
    assert_eq!(rec.content_id, first.content.id);
    assert_eq!(rec.source_id.as_ref(), Some(&first.content.source_id));
    assert_eq!(rec.action, EngagementAction::Clicked);
}
