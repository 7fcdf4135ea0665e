//! Filesystem backend for cattrans.
//!
//! A site directory holds:
//! - `.cattrans/config.yml`: Plugin configuration
//! - `content/articles/<id>.yml`: One file per article
//! - `forms/transition.yml`: Extra transition form fields (optional)

pub mod config;
pub mod error;
pub mod fields;
pub mod site;

pub use config::SiteConfig;
pub use error::{FsError, Result};
pub use fields::FieldResource;
pub use site::{ArticleFilter, ArticleUpdate, Site};
