//! Site configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Site configuration stored in `.cattrans/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Site settings.
    #[serde(default)]
    pub site: SiteSettings,

    /// Category transition plugin settings.
    #[serde(default)]
    pub plugin: PluginSettings,
}

fn default_version() -> u32 {
    1
}

/// Site-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Site name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Settings read once when the plugin is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Extensions whose transitions are handled. Empty means all.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Field resource merged into the transition form, relative to the site root.
    #[serde(default = "default_fields_resource")]
    pub fields_resource: PathBuf,
}

fn default_fields_resource() -> PathBuf {
    PathBuf::from("forms/transition.yml")
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            fields_resource: default_fields_resource(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            version: 1,
            site: SiteSettings::default(),
            plugin: PluginSettings::default(),
        }
    }
}
