//! Field-definition resource for the transition edit form.

use cattrans_core::{CoreError, FieldSet, FieldSource};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Field resource written by `Site::init`.
pub const DEFAULT_FIELDS: &str = "\
fields:
  - name: category_id
    type: category
    label: Target category
    attributes:
      required: \"true\"
      extension: com_content
";

/// A YAML field resource at a fixed path. The file is optional.
#[derive(Debug, Clone)]
pub struct FieldResource {
    path: PathBuf,
}

impl FieldResource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FieldSource for FieldResource {
    fn field_definitions(&self) -> cattrans_core::Result<Option<FieldSet>> {
        if !self.path.is_file() {
            debug!(path = %self.path.display(), "Field resource not present");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| CoreError::FieldResource(format!("{}: {e}", self.path.display())))?;
        let set: FieldSet = serde_yaml::from_str(&content)
            .map_err(|e| CoreError::FieldResource(format!("{}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), fields = set.fields.len(), "Loaded field resource");
        Ok(Some(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_resource_is_none() {
        let tmp = TempDir::new().unwrap();
        let resource = FieldResource::new(tmp.path().join("forms/transition.yml"));

        assert!(resource.field_definitions().unwrap().is_none());
    }

    #[test]
    fn test_default_resource_parses() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("transition.yml");
        fs::write(&path, DEFAULT_FIELDS).unwrap();

        let set = FieldResource::new(&path).field_definitions().unwrap().unwrap();
        assert_eq!(set.fields.len(), 1);
        assert_eq!(set.fields[0].name, "category_id");
        assert_eq!(set.fields[0].field_type, "category");
        assert_eq!(set.fields[0].attributes.get("required").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_malformed_resource_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("transition.yml");
        fs::write(&path, "fields: 42\n").unwrap();

        let result = FieldResource::new(&path).field_definitions();
        assert!(matches!(result, Err(CoreError::FieldResource(_))));
    }
}
