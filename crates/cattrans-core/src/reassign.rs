//! Bulk category reassignment on workflow transitions.

use crate::error::{BatchError, ItemError, StoreError};
use crate::item::{CategoryId, ItemId};
use crate::message::{MessageQueue, OperatorMessage, Severity};
use crate::store::ItemStore;
use crate::transition::{ReassignPlan, TransitionEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Outcome of one reassignment call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// Items moved to the target category.
    pub processed: usize,
    /// Items already in the target category, or not found.
    pub skipped: usize,
    /// Items that could not be moved.
    pub errors: usize,
    /// Every operator message produced by the call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<OperatorMessage>,
}

impl BatchResult {
    /// Number of items the call accounted for.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.processed + self.skipped + self.errors
    }

    /// True if the call had no effect on any item.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// What happened to a single item.
enum ItemOutcome {
    Moved,
    AlreadyInCategory,
}

/// Moves the items of a transition into the transition's target category.
#[derive(Debug, Clone, Default)]
pub struct CategoryReassigner {
    extensions: Vec<String>,
}

impl CategoryReassigner {
    /// A reassigner that handles transitions of every extension.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict handling to the given extensions. An empty list means all.
    #[must_use]
    pub fn with_extensions(
        mut self,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether transitions of `extension` are handled.
    #[must_use]
    pub fn supports(&self, extension: &str) -> bool {
        self.extensions.is_empty() || self.extensions.iter().any(|e| e == extension)
    }

    /// Handle a completed transition.
    ///
    /// Never fails: a bad event produces one error message and a zero result,
    /// and item-level failures are counted and reported without stopping the
    /// batch.
    pub fn on_transition_completed(
        &self,
        event: &TransitionEvent,
        store: &mut dyn ItemStore,
        messages: &mut dyn MessageQueue,
    ) -> BatchResult {
        let mut result = BatchResult::default();

        if !self.supports(&event.extension) {
            debug!(extension = %event.extension, "Extension not handled, ignoring transition");
            return result;
        }

        let plan = match ReassignPlan::from_event(event) {
            Ok(plan) => plan,
            Err(err) => {
                Self::reject(&err, &mut result, messages);
                return result;
            }
        };

        let target = plan.target_category;
        info!(
            extension = %event.extension,
            target_category = target,
            items = plan.item_ids.len(),
            "Reassigning category after transition"
        );

        for &id in plan.item_ids {
            match Self::reassign_one(id, target, store) {
                Ok(ItemOutcome::Moved) => {
                    debug!(id, target_category = target, "Moved article");
                    result.processed += 1;
                }
                Ok(ItemOutcome::AlreadyInCategory) => {
                    debug!(id, "Article already in target category");
                    result.skipped += 1;
                }
                Err(err @ ItemError::NotFound(_)) => {
                    result.skipped += 1;
                    Self::notify(&mut result, messages, err.severity(), err.to_string());
                }
                Err(err) => {
                    result.errors += 1;
                    Self::notify(&mut result, messages, err.severity(), err.to_string());
                }
            }
        }

        if result.errors > 0 {
            let text = format!("Encountered errors with {} articles", result.errors);
            Self::notify(&mut result, messages, Severity::Warning, text);
        }

        info!(
            processed = result.processed,
            skipped = result.skipped,
            errors = result.errors,
            "Category reassignment finished"
        );

        result
    }

    /// Move one article, keeping its modification provenance.
    fn reassign_one(
        id: ItemId,
        target: CategoryId,
        store: &mut dyn ItemStore,
    ) -> Result<ItemOutcome, ItemError> {
        let mut article = store.load(id).map_err(|err| match err {
            StoreError::NotFound(_) => ItemError::NotFound(id),
            other => ItemError::Unexpected {
                id,
                reason: other.to_string(),
            },
        })?;

        if article.category_id == target {
            return Ok(ItemOutcome::AlreadyInCategory);
        }

        let provenance = article.provenance();
        article.category_id = target;
        article.restore_provenance(provenance);

        store.save(&article).map_err(|err| ItemError::Store {
            id,
            reason: err.to_string(),
        })?;

        Ok(ItemOutcome::Moved)
    }

    fn reject(err: &BatchError, result: &mut BatchResult, messages: &mut dyn MessageQueue) {
        Self::notify(result, messages, Severity::Error, err.to_string());
    }

    fn notify(
        result: &mut BatchResult,
        messages: &mut dyn MessageQueue,
        severity: Severity,
        text: String,
    ) {
        match severity {
            Severity::Info => info!(message = %text, "Operator message"),
            Severity::Warning => warn!(message = %text, "Operator message"),
            Severity::Error => error!(message = %text, "Operator message"),
        }

        let message = OperatorMessage::new(severity, text);
        result.messages.push(message.clone());
        messages.enqueue(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Article, Provenance};
    use crate::message::MessageLog;
    use crate::store::MemoryStore;
    use crate::transition::TransitionDescriptor;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn provenance(day: u32, user: u64) -> Provenance {
        Provenance {
            modified: Utc.with_ymd_and_hms(2024, 5, day, 9, 30, 0).unwrap(),
            modified_by: user,
        }
    }

    fn article(id: u64, category: u64) -> Article {
        Article::new(id, format!("Article {id}"), category)
            .with_provenance(provenance(u32::try_from(id % 28).unwrap() + 1, 100 + id))
    }

    fn move_event(ids: &[u64], category: impl Into<Value>) -> TransitionEvent {
        TransitionEvent::new(
            "com_content.article",
            ids.iter().copied(),
            TransitionDescriptor::new(7, "Move to news").with_option("category_id", category),
        )
    }

    /// Store that refuses or fails on selected ids.
    struct FaultyStore {
        inner: MemoryStore,
        reject_save: Vec<u64>,
        broken_load: Vec<u64>,
    }

    impl ItemStore for FaultyStore {
        fn load(&self, id: u64) -> Result<Article, StoreError> {
            if self.broken_load.contains(&id) {
                return Err(StoreError::Backend("disk unreadable".to_string()));
            }
            self.inner.load(id)
        }

        fn save(&mut self, article: &Article) -> Result<(), StoreError> {
            if self.reject_save.contains(&article.id) {
                return Err(StoreError::Rejected("row is checked out".to_string()));
            }
            self.inner.save(article)
        }
    }

    #[test]
    fn test_mixed_batch() {
        let mut store =
            MemoryStore::with_articles([article(10, 3), article(11, 5), article(12, 3)]);
        let mut log = MessageLog::new();

        let result = CategoryReassigner::new().on_transition_completed(
            &move_event(&[10, 11, 12], 5),
            &mut store,
            &mut log,
        );

        assert_eq!(result.processed, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 0);
        assert!(log.is_empty());

        for id in [10, 12] {
            let moved = store.get(id).unwrap();
            assert_eq!(moved.category_id, 5);
            assert_eq!(moved.provenance(), article(id, 3).provenance());
        }
        assert_eq!(store.saves(), &[10, 12]);
    }

    #[test]
    fn test_second_run_skips_everything() {
        let mut store = MemoryStore::with_articles([article(1, 2), article(2, 2), article(3, 9)]);
        let reassigner = CategoryReassigner::new();
        let event = move_event(&[1, 2, 3], "9");

        let first = reassigner.on_transition_completed(&event, &mut store, &mut MessageLog::new());
        assert_eq!(first.processed, 2);

        let second = reassigner.on_transition_completed(&event, &mut store, &mut MessageLog::new());
        assert_eq!(second.processed, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(store.saves().len(), 2);
    }

    #[test]
    fn test_missing_item_warns_and_continues() {
        let mut store = MemoryStore::with_articles([article(1, 2), article(2, 2)]);
        let mut log = MessageLog::new();

        let result = CategoryReassigner::new().on_transition_completed(
            &move_event(&[1, 999, 2], 4),
            &mut store,
            &mut log,
        );

        assert_eq!(result.processed, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 0);
        assert_eq!(
            log.messages(),
            &[OperatorMessage::warning("Article not found: 999")]
        );
        assert_eq!(result.messages, log.messages());
        assert_eq!(store.get(2).unwrap().category_id, 4);
    }

    #[test]
    fn test_store_failures_are_isolated() {
        let mut store = FaultyStore {
            inner: MemoryStore::with_articles([article(1, 2), article(2, 2), article(3, 2)]),
            reject_save: vec![1],
            broken_load: vec![2],
        };
        let mut log = MessageLog::new();

        let result = CategoryReassigner::new().on_transition_completed(
            &move_event(&[1, 2, 3], 6),
            &mut store,
            &mut log,
        );

        assert_eq!(result.processed, 1);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.errors, 2);
        assert_eq!(result.total(), 3);

        let texts: Vec<&str> = log.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Failed to update article ID 1: row is checked out",
                "Error processing article 2: storage failure: disk unreadable",
                "Encountered errors with 2 articles",
            ]
        );
        assert_eq!(log.count(Severity::Error), 2);
        assert_eq!(log.count(Severity::Warning), 1);
        assert_eq!(store.inner.get(1).unwrap().category_id, 2);
        assert_eq!(store.inner.get(3).unwrap().category_id, 6);
    }

    #[test]
    fn test_malformed_category_touches_nothing() {
        for category in [json!(0), json!(-1), json!("news"), Value::Null] {
            let mut store = MemoryStore::with_articles([article(1, 2)]);
            let mut log = MessageLog::new();

            let result = CategoryReassigner::new().on_transition_completed(
                &move_event(&[1], category),
                &mut store,
                &mut log,
            );

            assert!(result.is_zero());
            assert_eq!(log.messages().len(), 1);
            assert_eq!(log.count(Severity::Error), 1);
            assert!(store.saves().is_empty());
        }
    }

    #[test]
    fn test_non_mapping_options_touch_nothing() {
        for options in [json!("category_id=5"), json!(7), json!([5])] {
            let mut store = MemoryStore::with_articles([article(1, 2)]);
            let mut log = MessageLog::new();
            let event = TransitionEvent::new(
                "com_content.article",
                [1],
                TransitionDescriptor::new(2, "Move").with_options(options),
            );

            let result =
                CategoryReassigner::new().on_transition_completed(&event, &mut store, &mut log);

            assert!(result.is_zero());
            assert_eq!(
                log.messages(),
                &[OperatorMessage::error(
                    "Transition options are not a valid options mapping"
                )]
            );
            assert!(store.saves().is_empty());
            assert_eq!(store.get(1).unwrap().category_id, 2);
        }
    }

    #[test]
    fn test_integral_float_category_moves_articles() {
        let mut store = MemoryStore::with_articles([article(1, 2)]);
        let mut log = MessageLog::new();

        let result = CategoryReassigner::new().on_transition_completed(
            &move_event(&[1], json!(5.0)),
            &mut store,
            &mut log,
        );

        assert_eq!(result.processed, 1);
        assert_eq!(store.get(1).unwrap().category_id, 5);
        assert!(log.is_empty());
    }

    #[test]
    fn test_absent_category_option() {
        let mut store = MemoryStore::with_articles([article(1, 2)]);
        let mut log = MessageLog::new();
        let event = TransitionEvent::new(
            "com_content.article",
            [1],
            TransitionDescriptor::new(1, "No options"),
        );

        let result =
            CategoryReassigner::new().on_transition_completed(&event, &mut store, &mut log);

        assert!(result.is_zero());
        assert_eq!(
            log.messages(),
            &[OperatorMessage::error("Invalid category ID specified: (none)")]
        );
    }

    #[test]
    fn test_empty_batch_never_calls_store() {
        struct PanicStore;

        impl ItemStore for PanicStore {
            fn load(&self, _id: u64) -> Result<Article, StoreError> {
                panic!("load must not be called");
            }

            fn save(&mut self, _article: &Article) -> Result<(), StoreError> {
                panic!("save must not be called");
            }
        }

        let mut log = MessageLog::new();
        let result = CategoryReassigner::new().on_transition_completed(
            &move_event(&[], 5),
            &mut PanicStore,
            &mut log,
        );

        assert!(result.is_zero());
        assert_eq!(
            log.messages(),
            &[OperatorMessage::error("No valid primary keys found")]
        );
    }

    #[test]
    fn test_missing_transition_reports_error() {
        let event = TransitionEvent {
            extension: "com_content.article".to_string(),
            item_ids: vec![1],
            transition: None,
        };
        let mut store = MemoryStore::with_articles([article(1, 2)]);
        let mut log = MessageLog::new();

        let result =
            CategoryReassigner::new().on_transition_completed(&event, &mut store, &mut log);

        assert!(result.is_zero());
        assert_eq!(
            log.messages(),
            &[OperatorMessage::error("Invalid transition object type")]
        );
    }

    #[test]
    fn test_unsupported_extension_is_ignored() {
        let mut store = MemoryStore::with_articles([article(1, 2)]);
        let mut log = MessageLog::new();
        let reassigner = CategoryReassigner::new().with_extensions(["com_content.article"]);

        let mut event = move_event(&[1], 5);
        event.extension = "com_contact.contact".to_string();

        let result = reassigner.on_transition_completed(&event, &mut store, &mut log);

        assert!(result.is_zero());
        assert!(log.is_empty());
        assert_eq!(store.get(1).unwrap().category_id, 2);
        assert!(reassigner.supports("com_content.article"));
    }

    #[test]
    fn test_counts_cover_batch() {
        let mut store = MemoryStore::with_articles((1..=6).map(|id| article(id, 1)));
        let ids = [1, 2, 40, 3, 41, 4, 5, 6];

        let result = CategoryReassigner::new().on_transition_completed(
            &move_event(&ids, 2),
            &mut store,
            &mut MessageLog::new(),
        );

        assert_eq!(result.total(), ids.len());
        assert_eq!(result.processed, 6);
        assert_eq!(result.skipped, 2);
    }
}
