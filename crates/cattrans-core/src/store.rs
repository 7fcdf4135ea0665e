//! Item store contract.

use crate::error::StoreError;
use crate::item::{Article, ItemId};
use std::collections::BTreeMap;

/// Load/save access to articles by id.
///
/// `save` persists the article exactly as given. In particular it must not
/// stamp `modified`/`modified_by`; callers that want an edit recorded call
/// `Article::touch` first.
pub trait ItemStore {
    /// Load an article.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no article has this id, or another
    /// variant if the storage itself fails.
    fn load(&self, id: ItemId) -> Result<Article, StoreError>;

    /// Save an existing article.
    ///
    /// # Errors
    /// Returns the store's reason when the save is refused or fails.
    fn save(&mut self, article: &Article) -> Result<(), StoreError>;
}

/// Article store held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    articles: BTreeMap<ItemId, Article>,
    saves: Vec<ItemId>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a set of articles.
    #[must_use]
    pub fn with_articles(articles: impl IntoIterator<Item = Article>) -> Self {
        let mut store = Self::new();
        for article in articles {
            store.insert(article);
        }
        store
    }

    /// Insert or replace an article without counting it as a save.
    pub fn insert(&mut self, article: Article) {
        self.articles.insert(article.id, article);
    }

    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Article> {
        self.articles.get(&id)
    }

    /// Ids passed to `save`, in call order.
    #[must_use]
    pub fn saves(&self) -> &[ItemId] {
        &self.saves
    }
}

impl ItemStore for MemoryStore {
    fn load(&self, id: ItemId) -> Result<Article, StoreError> {
        self.articles
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn save(&mut self, article: &Article) -> Result<(), StoreError> {
        self.saves.push(article.id);
        match self.articles.get_mut(&article.id) {
            Some(slot) => {
                *slot = article.clone();
                Ok(())
            }
            None => Err(StoreError::Rejected(format!(
                "article {} does not exist",
                article.id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.load(5), Err(StoreError::NotFound(5)));
    }

    #[test]
    fn test_save_records_calls() {
        let mut store = MemoryStore::with_articles([Article::new(1, "One", 2)]);

        let mut article = store.load(1).unwrap();
        article.category_id = 8;
        store.save(&article).unwrap();

        assert_eq!(store.get(1).unwrap().category_id, 8);
        assert_eq!(store.saves(), &[1]);
    }

    #[test]
    fn test_save_unknown_rejected() {
        let mut store = MemoryStore::new();
        let result = store.save(&Article::new(3, "Ghost", 1));
        assert!(matches!(result, Err(StoreError::Rejected(_))));
    }
}
