//! Article model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a content item.
pub type ItemId = u64;

/// Identifier of a category.
pub type CategoryId = u64;

/// Identifier of a user.
pub type UserId = u64;

/// Publishing state of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleState {
    #[default]
    Unpublished,
    Published,
    Archived,
    Trashed,
}

impl std::fmt::Display for ArticleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpublished => write!(f, "unpublished"),
            Self::Published => write!(f, "published"),
            Self::Archived => write!(f, "archived"),
            Self::Trashed => write!(f, "trashed"),
        }
    }
}

impl std::str::FromStr for ArticleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unpublished" => Ok(Self::Unpublished),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            "trashed" => Ok(Self::Trashed),
            other => Err(format!("unknown article state '{other}'")),
        }
    }
}

/// Who last modified a record, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provenance {
    pub modified: DateTime<Utc>,
    pub modified_by: UserId,
}

/// A persisted content record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    /// Primary key.
    pub id: ItemId,

    /// Human-readable title.
    pub title: String,

    /// URL alias, usually derived from the title.
    #[serde(default)]
    pub alias: String,

    /// Category the article is filed under.
    pub category_id: CategoryId,

    /// Publishing state.
    #[serde(default)]
    pub state: ArticleState,

    /// Creation timestamp (ISO 8601 UTC).
    pub created: DateTime<Utc>,

    /// Author.
    #[serde(default)]
    pub created_by: UserId,

    /// Last modification timestamp (ISO 8601 UTC).
    pub modified: DateTime<Utc>,

    /// Last editor.
    #[serde(default)]
    pub modified_by: UserId,
}

impl Article {
    /// Create a new article filed under `category_id`.
    #[must_use]
    pub fn new(id: ItemId, title: impl Into<String>, category_id: CategoryId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            alias: String::new(),
            category_id,
            state: ArticleState::default(),
            created: now,
            created_by: 0,
            modified: now,
            modified_by: 0,
        }
    }

    /// Set the URL alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Set the publishing state.
    #[must_use]
    pub const fn with_state(mut self, state: ArticleState) -> Self {
        self.state = state;
        self
    }

    /// Set the author, who is also the initial editor.
    #[must_use]
    pub const fn with_author(mut self, user: UserId) -> Self {
        self.created_by = user;
        self.modified_by = user;
        self
    }

    /// Set the modification provenance explicitly.
    #[must_use]
    pub const fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.restore_provenance(provenance);
        self
    }

    /// Record an edit by `user` at the current time.
    pub fn touch(&mut self, user: UserId) {
        self.modified = Utc::now();
        self.modified_by = user;
    }

    /// Snapshot of the modification provenance.
    #[must_use]
    pub const fn provenance(&self) -> Provenance {
        Provenance {
            modified: self.modified,
            modified_by: self.modified_by,
        }
    }

    /// Put back a previously taken provenance snapshot.
    pub const fn restore_provenance(&mut self, provenance: Provenance) {
        self.modified = provenance.modified;
        self.modified_by = provenance.modified_by;
    }

    /// Bind the article's editable values as form data.
    ///
    /// Keys follow the article edit form (`catid` for the category).
    #[must_use]
    pub fn form_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert("id".to_string(), Value::from(self.id));
        data.insert("title".to_string(), Value::from(self.title.clone()));
        data.insert("alias".to_string(), Value::from(self.alias.clone()));
        data.insert("catid".to_string(), Value::from(self.category_id));
        data.insert("state".to_string(), Value::from(self.state.to_string()));
        data
    }
}
