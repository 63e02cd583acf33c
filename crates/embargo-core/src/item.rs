use crate::config::ItemDefaults;
use crate::error::{EmbargoError, Result};
use crate::paths;
use crate::record::{TargetRecord, WorkflowBinding};
use crate::timing::TimingFields;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// LiveVersion
// ---------------------------------------------------------------------------

/// The published copy of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveVersion {
    pub title: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ContentItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub slug: String,
    pub title: String,
    /// Draft content, edited freely until published.
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<LiveVersion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// `None` for items without embargo/expiry support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingFields>,
    /// `None` for items that can never be governed by a workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowBinding>,
}

impl ContentItem {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, defaults: &ItemDefaults) -> Self {
        let now = Utc::now();
        Self {
            slug: slug.into(),
            title: title.into(),
            content: String::new(),
            live: None,
            created_at: now,
            updated_at: now,
            timing: defaults.timing.then(TimingFields::default),
            workflow: defaults.workflow.then(WorkflowBinding::default),
        }
    }

    pub fn is_published(&self) -> bool {
        self.live.is_some()
    }

    pub fn publish(&mut self) {
        self.live = Some(LiveVersion {
            title: self.title.clone(),
            content: self.content.clone(),
            published_at: Utc::now(),
        });
    }

    pub fn unpublish(&mut self) {
        self.live = None;
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(EmbargoError::Validation(format!(
                "item '{}' must have a title",
                self.slug
            )));
        }
        if let Some(timing) = &self.timing {
            timing.validate()?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn create(
        root: &Path,
        slug: impl Into<String>,
        title: impl Into<String>,
        defaults: &ItemDefaults,
    ) -> Result<Self> {
        let slug = slug.into();
        paths::validate_slug(&slug)?;

        if paths::item_path(root, &slug).exists() {
            return Err(EmbargoError::ItemExists(slug));
        }

        let item = Self::new(slug, title, defaults);
        item.validate()?;
        item.save(root)?;
        Ok(item)
    }

    pub fn load(root: &Path, slug: &str) -> Result<Self> {
        let path = paths::item_path(root, slug);
        if !path.exists() {
            return Err(EmbargoError::ItemNotFound(slug.to_string()));
        }
        let data = std::fs::read_to_string(&path)?;
        let item: ContentItem = serde_yaml::from_str(&data)?;
        Ok(item)
    }

    /// Like `load`, but a missing item is `None` rather than an error.
    pub fn find(root: &Path, slug: &str) -> Result<Option<Self>> {
        match Self::load(root, slug) {
            Ok(item) => Ok(Some(item)),
            Err(EmbargoError::ItemNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::item_path(root, &self.slug);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn list(root: &Path) -> Result<Vec<Self>> {
        let items_dir = root.join(paths::ITEMS_DIR);
        if !items_dir.exists() {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for entry in std::fs::read_dir(&items_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match Self::load(root, slug) {
                Ok(item) => items.push(item),
                Err(EmbargoError::ItemNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// ItemRecord
// ---------------------------------------------------------------------------

/// A `ContentItem` bound to the project root it persists under.
pub struct ItemRecord<'r> {
    root: &'r Path,
    pub item: ContentItem,
}

impl<'r> ItemRecord<'r> {
    pub fn new(root: &'r Path, item: ContentItem) -> Self {
        Self { root, item }
    }

    pub fn load(root: &'r Path, slug: &str) -> Result<Self> {
        Ok(Self::new(root, ContentItem::load(root, slug)?))
    }
}

impl TargetRecord for ItemRecord<'_> {
    fn id(&self) -> &str {
        &self.item.slug
    }

    fn timing(&self) -> Option<&TimingFields> {
        self.item.timing.as_ref()
    }

    fn timing_mut(&mut self) -> Option<&mut TimingFields> {
        self.item.timing.as_mut()
    }

    fn governance(&self) -> Option<&WorkflowBinding> {
        self.item.workflow.as_ref()
    }

    fn publish_now(&mut self) -> Result<()> {
        self.item.publish();
        self.persist()
    }

    fn unpublish_now(&mut self) -> Result<()> {
        self.item.unpublish();
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        self.item.validate()?;
        self.item.updated_at = Utc::now();
        self.item.save(self.root)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embargo;
    use crate::engine::PublicationAction;
    use crate::gate::SuppressionGate;
    use crate::jobs::{JobDb, JobQueue, MemoryJobQueue};
    use crate::record::Capability;
    use crate::testing::{at, now};
    use crate::workflow::WorkflowDefinition;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn defaults() -> ItemDefaults {
        ItemDefaults::default()
    }

    #[test]
    fn create_and_load() {
        let dir = TempDir::new().unwrap();
        ContentItem::create(dir.path(), "home", "Home", &defaults()).unwrap();

        let item = ContentItem::load(dir.path(), "home").unwrap();
        assert_eq!(item.title, "Home");
        assert!(!item.is_published());
        assert!(item.timing.is_some());
        assert_eq!(item.workflow, Some(WorkflowBinding::default()));
    }

    #[test]
    fn create_rejects_duplicates_and_bad_slugs() {
        let dir = TempDir::new().unwrap();
        ContentItem::create(dir.path(), "home", "Home", &defaults()).unwrap();
        assert!(matches!(
            ContentItem::create(dir.path(), "home", "Home", &defaults()),
            Err(EmbargoError::ItemExists(_))
        ));
        assert!(matches!(
            ContentItem::create(dir.path(), "Bad Slug", "Home", &defaults()),
            Err(EmbargoError::InvalidSlug(_))
        ));
    }

    #[test]
    fn missing_item_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ContentItem::load(dir.path(), "ghost"),
            Err(EmbargoError::ItemNotFound(_))
        ));
        assert!(ContentItem::find(dir.path(), "ghost").unwrap().is_none());
    }

    #[test]
    fn defaults_control_capabilities() {
        let plain = ItemDefaults {
            timing: false,
            workflow: false,
        };
        let item = ContentItem::new("banner", "Banner", &plain);
        let dir = TempDir::new().unwrap();
        let record = ItemRecord::new(dir.path(), item);
        assert_eq!(record.capability(), Capability::Plain);
        assert!(record.governance().is_none());
    }

    #[test]
    fn list_sorted_by_creation() {
        let dir = TempDir::new().unwrap();
        ContentItem::create(dir.path(), "first", "First", &defaults()).unwrap();
        ContentItem::create(dir.path(), "second", "Second", &defaults()).unwrap();
        let slugs: Vec<String> = ContentItem::list(dir.path())
            .unwrap()
            .into_iter()
            .map(|i| i.slug)
            .collect();
        assert_eq!(slugs, ["first", "second"]);
    }

    #[test]
    fn publish_now_copies_draft_to_live_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut item = ContentItem::create(dir.path(), "home", "Home", &defaults()).unwrap();
        item.content = "Content to go live".to_string();
        let mut record = ItemRecord::new(dir.path(), item);

        record.publish_now().unwrap();

        let stored = ContentItem::load(dir.path(), "home").unwrap();
        let live = stored.live.unwrap();
        assert_eq!(live.content, "Content to go live");

        record.unpublish_now().unwrap();
        assert!(!ContentItem::load(dir.path(), "home").unwrap().is_published());
    }

    #[test]
    fn persist_rejects_blank_title() {
        let dir = TempDir::new().unwrap();
        let mut item = ContentItem::create(dir.path(), "home", "Home", &defaults()).unwrap();
        item.title = "  ".to_string();
        let mut record = ItemRecord::new(dir.path(), item);
        assert!(matches!(
            record.persist(),
            Err(EmbargoError::Validation(_))
        ));
        assert_eq!(ContentItem::load(dir.path(), "home").unwrap().title, "Home");
    }

    #[test]
    fn inverted_dates_fail_the_action_without_persisting() {
        let dir = TempDir::new().unwrap();
        let mut item = ContentItem::create(dir.path(), "home", "Home", &defaults()).unwrap();
        if let Some(timing) = item.timing.as_mut() {
            timing.desired_publish_at = Some(at(8));
            timing.desired_unpublish_at = Some(at(6));
        }
        item.save(dir.path()).unwrap();
        let mut record = ItemRecord::new(dir.path(), item);
        let queue = MemoryJobQueue::new();

        let err = PublicationAction::publish(0)
            .reconcile(&mut record, &queue, now())
            .unwrap_err();

        assert!(matches!(err, EmbargoError::Validation(_)));
        let stored = ContentItem::load(dir.path(), "home").unwrap();
        let timing = stored.timing.unwrap();
        assert_eq!(timing.desired_publish_at, Some(at(8)));
        assert_eq!(timing.publish_job, None);
        assert!(queue.is_empty());
    }

    #[test]
    fn rejected_save_leaves_no_jobs_in_the_db() {
        let dir = TempDir::new().unwrap();
        let mut item = ContentItem::create(dir.path(), "home", "Home", &defaults()).unwrap();
        if let Some(timing) = item.timing.as_mut() {
            timing.desired_publish_at = Some(at(8));
            timing.desired_unpublish_at = Some(at(6));
        }
        let db = JobDb::open(&dir.path().join("jobs.db")).unwrap();
        let defs = BTreeMap::<String, WorkflowDefinition>::new();
        let gate = SuppressionGate::new(&defs);
        let mut record = ItemRecord::new(dir.path(), item);

        let err = embargo::write(&mut record, &db, &gate).unwrap_err();

        assert!(matches!(err, EmbargoError::Validation(_)));
        assert!(db.list().unwrap().is_empty());
        let stored = ContentItem::load(dir.path(), "home").unwrap().timing.unwrap();
        assert_eq!(stored.publish_job, None);
        assert_eq!(stored.unpublish_job, None);
    }
}
