//! Site management and article storage.

use crate::config::SiteConfig;
use crate::error::{FsError, Result};
use crate::fields::{FieldResource, DEFAULT_FIELDS};
use cattrans_core::{
    Article, ArticleState, CategoryId, CategoryReassigner, CategoryTransition, ItemId, ItemStore,
    StoreError, UserId,
};
use slug::slugify;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directory name for cattrans configuration.
const CATTRANS_DIR: &str = ".cattrans";
/// Configuration file name.
const CONFIG_FILE: &str = "config.yml";
/// Articles directory name.
const ARTICLES_DIR: &str = "content/articles";
/// Article file extension.
const ARTICLE_EXT: &str = "yml";

/// A site keeps articles and plugin configuration on the filesystem.
#[derive(Debug)]
pub struct Site {
    /// Root path of the site.
    root: PathBuf,
    /// Site configuration.
    config: SiteConfig,
}

/// Operator edit to an article.
#[derive(Debug, Default, Clone)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub state: Option<ArticleState>,
    pub category_id: Option<CategoryId>,
}

impl Site {
    /// Initialize a new site at the given path.
    ///
    /// # Errors
    /// Returns error if the site already exists or IO fails.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let cattrans_dir = root.join(CATTRANS_DIR);

        if cattrans_dir.exists() {
            return Err(FsError::SiteExists(root));
        }

        fs::create_dir_all(&cattrans_dir)?;
        fs::create_dir_all(root.join(ARTICLES_DIR))?;

        let config = SiteConfig::default();
        fs::write(cattrans_dir.join(CONFIG_FILE), serde_yaml::to_string(&config)?)?;

        let fields_path = root.join(&config.plugin.fields_resource);
        if let Some(parent) = fields_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&fields_path, DEFAULT_FIELDS)?;

        info!(path = %root.display(), "Initialized site");

        Ok(Self { root, config })
    }

    /// Open an existing site at the given path.
    ///
    /// # Errors
    /// Returns error if the site doesn't exist or config is invalid.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let config_path = root.join(CATTRANS_DIR).join(CONFIG_FILE);

        if !config_path.exists() {
            return Err(FsError::SiteNotFound(root));
        }

        let config: SiteConfig = serde_yaml::from_str(&fs::read_to_string(&config_path)?)?;

        debug!(path = %root.display(), "Opened site");

        Ok(Self { root, config })
    }

    /// Get the site root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the site configuration.
    #[must_use]
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The transition form field resource configured for this site.
    #[must_use]
    pub fn field_resource(&self) -> FieldResource {
        FieldResource::new(self.root.join(&self.config.plugin.fields_resource))
    }

    /// Build the category transition plugin from the site configuration.
    #[must_use]
    pub fn plugin(&self) -> CategoryTransition<FieldResource> {
        let reassigner = CategoryReassigner::new()
            .with_extensions(self.config.plugin.extensions.iter().cloned());
        CategoryTransition::new(reassigner, self.field_resource())
    }

    fn articles_dir(&self) -> PathBuf {
        self.root.join(ARTICLES_DIR)
    }

    fn article_path(&self, id: ItemId) -> PathBuf {
        self.articles_dir().join(format!("{id}.{ARTICLE_EXT}"))
    }

    /// Ids of all stored articles, ascending.
    fn article_ids(&self) -> Result<Vec<ItemId>> {
        let dir = self.articles_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(ARTICLE_EXT)
            {
                continue;
            }

            match path.file_stem().and_then(|s| s.to_str()).map(str::parse::<ItemId>) {
                Some(Ok(id)) => ids.push(id),
                _ => debug!(path = %path.display(), "Ignoring non-article file"),
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    /// Create a new article with the next free id.
    ///
    /// # Errors
    /// Returns error if the title yields an empty alias or IO fails.
    pub fn create_article(
        &self,
        title: impl Into<String>,
        category_id: CategoryId,
        author: UserId,
    ) -> Result<Article> {
        let title = title.into();
        let alias = slugify(&title);
        if alias.is_empty() {
            return Err(FsError::InvalidTitle(title));
        }

        let id = self.article_ids()?.last().map_or(1, |last| last + 1);
        let article = Article::new(id, &title, category_id)
            .with_alias(alias)
            .with_author(author);

        self.write_article(&article)?;

        info!(id, title = %title, category_id, "Created article");

        Ok(article)
    }

    /// Get an article by id.
    ///
    /// # Errors
    /// Returns error if the article doesn't exist or its file is invalid.
    pub fn get_article(&self, id: ItemId) -> Result<Article> {
        let path = self.article_path(id);
        if !path.exists() {
            return Err(FsError::ArticleNotFound(id));
        }

        Ok(serde_yaml::from_str(&fs::read_to_string(&path)?)?)
    }

    /// List all articles, optionally filtered, ordered by id.
    ///
    /// # Errors
    /// Returns error if the articles directory cannot be read.
    pub fn list_articles(&self, filter: Option<&ArticleFilter>) -> Result<Vec<Article>> {
        let mut articles = Vec::new();

        for id in self.article_ids()? {
            match self.get_article(id) {
                Ok(article) => {
                    if filter.is_none_or(|f| f.matches(&article)) {
                        articles.push(article);
                    }
                }
                Err(e) => {
                    debug!(id, error = %e, "Failed to read article, skipping");
                }
            }
        }

        Ok(articles)
    }

    /// Apply an operator edit, recording `user` as the last editor.
    ///
    /// # Errors
    /// Returns error if the article doesn't exist or IO fails.
    pub fn update_article(
        &self,
        id: ItemId,
        update: &ArticleUpdate,
        user: UserId,
    ) -> Result<Article> {
        let mut article = self.get_article(id)?;

        if let Some(title) = &update.title {
            article.title.clone_from(title);
        }
        if let Some(state) = update.state {
            article.state = state;
        }
        if let Some(category_id) = update.category_id {
            article.category_id = category_id;
        }
        article.touch(user);

        self.write_article(&article)?;

        info!(id, user, "Updated article");

        Ok(article)
    }

    fn write_article(&self, article: &Article) -> Result<()> {
        fs::write(self.article_path(article.id), serde_yaml::to_string(article)?)?;
        Ok(())
    }
}

impl ItemStore for Site {
    fn load(&self, id: ItemId) -> std::result::Result<Article, StoreError> {
        self.get_article(id).map_err(|e| match e {
            FsError::ArticleNotFound(id) => StoreError::NotFound(id),
            other => StoreError::Backend(other.to_string()),
        })
    }

    /// Writes the article as given; provenance is not stamped.
    fn save(&mut self, article: &Article) -> std::result::Result<(), StoreError> {
        if !self.article_path(article.id).exists() {
            return Err(StoreError::Rejected(format!(
                "article {} no longer exists",
                article.id
            )));
        }

        self.write_article(article)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        debug!(id = article.id, category_id = article.category_id, "Saved article");
        Ok(())
    }
}

/// Filter criteria for listing articles.
#[derive(Debug, Default)]
pub struct ArticleFilter {
    /// Filter by category.
    pub category_id: Option<CategoryId>,
    /// Filter by publishing state.
    pub state: Option<ArticleState>,
}

impl ArticleFilter {
    /// Check if an article matches this filter.
    #[must_use]
    pub fn matches(&self, article: &Article) -> bool {
        if self.category_id.is_some_and(|c| c != article.category_id) {
            return false;
        }

        if self.state.is_some_and(|s| s != article.state) {
            return false;
        }

        true
    }
}
