//! Edit-form model and the two adjustments applied before forms are shown.

use crate::error::Result;
use crate::item::Article;
use crate::transition::TransitionDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Form name of the article edit form.
pub const ARTICLE_FORM: &str = "com_content.article";
/// Form name of the transition edit form.
pub const TRANSITION_FORM: &str = "com_workflow.transition";
/// Field holding the article's category.
pub const CATEGORY_FIELD: &str = "catid";

/// Which form is being prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormContext {
    TransitionEdit,
    ArticleEdit,
    Other(String),
}

impl FormContext {
    /// Parse a context tag. Host form names are accepted as aliases.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "transition-edit" | TRANSITION_FORM => Self::TransitionEdit,
            "article-edit" | ARTICLE_FORM => Self::ArticleEdit,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for FormContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransitionEdit => write!(f, "transition-edit"),
            Self::ArticleEdit => write!(f, "article-edit"),
            Self::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// A single field definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,

    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Remaining attributes (`readonly`, `required`, `default`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl FormField {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// An ordered set of field definitions, as loaded from a field resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    #[serde(default)]
    pub fields: Vec<FormField>,
}

/// In-memory form model: field definitions plus bound data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<FormField>,

    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Form {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            data: Map::new(),
        }
    }

    /// The article edit form, bound to `article` if given.
    #[must_use]
    pub fn article(article: Option<&Article>) -> Self {
        let mut form = Self::new(ARTICLE_FORM)
            .with_field(
                FormField::new("title", "text")
                    .with_label("Title")
                    .with_attribute("required", "true"),
            )
            .with_field(FormField::new("alias", "text").with_label("Alias"))
            .with_field(
                FormField::new(CATEGORY_FIELD, "category")
                    .with_label("Category")
                    .with_attribute("required", "true"),
            )
            .with_field(FormField::new("state", "list").with_label("Status"));
        if let Some(article) = article {
            form.data = article.form_data();
        }
        form
    }

    /// The transition edit form, bound to `transition` if given.
    #[must_use]
    pub fn transition(transition: Option<&TransitionDescriptor>) -> Self {
        let mut form = Self::new(TRANSITION_FORM)
            .with_field(
                FormField::new("title", "text")
                    .with_label("Title")
                    .with_attribute("required", "true"),
            )
            .with_field(FormField::new("description", "textarea").with_label("Description"));
        if let Some(transition) = transition {
            form.data.insert("id".to_string(), Value::from(transition.id));
            form.data.insert("title".to_string(), Value::from(transition.title.clone()));
            form.data.insert("options".to_string(), transition.options.clone());
        }
        form
    }

    #[must_use]
    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Bound value of a field.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: Value) {
        self.data.insert(name.into(), value);
    }

    #[must_use]
    pub fn field_attribute(&self, name: &str, attribute: &str) -> Option<&str> {
        self.field(name)
            .and_then(|f| f.attributes.get(attribute))
            .map(String::as_str)
    }

    /// Set an attribute on a field. Returns false if the field does not exist.
    pub fn set_field_attribute(
        &mut self,
        name: &str,
        attribute: &str,
        value: impl Into<String>,
    ) -> bool {
        match self.field_mut(name) {
            Some(field) => {
                field.attributes.insert(attribute.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_readonly(&self, name: &str) -> bool {
        self.field_attribute(name, "readonly") == Some("true")
    }

    /// Merge field definitions into the form.
    ///
    /// A field with a name already on the form replaces it in place; new
    /// fields are appended in resource order. Returns `(added, replaced)`.
    pub fn merge_fields(&mut self, set: FieldSet) -> (usize, usize) {
        let mut added = 0;
        let mut replaced = 0;

        for field in set.fields {
            if let Some(existing) = self.field_mut(&field.name) {
                *existing = field;
                replaced += 1;
            } else {
                self.fields.push(field);
                added += 1;
            }
        }

        (added, replaced)
    }
}

/// Source of the optional extra field definitions for the transition form.
pub trait FieldSource {
    /// Load the field definitions. `Ok(None)` means no resource is deployed.
    ///
    /// # Errors
    /// Returns `CoreError::FieldResource` if a resource exists but is unusable.
    fn field_definitions(&self) -> Result<Option<FieldSet>>;
}

/// A field source with nothing deployed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFields;

impl FieldSource for NoFields {
    fn field_definitions(&self) -> Result<Option<FieldSet>> {
        Ok(None)
    }
}

impl FieldSource for FieldSet {
    fn field_definitions(&self) -> Result<Option<FieldSet>> {
        Ok(Some(self.clone()))
    }
}

/// What a prepare-form call did to the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormAdjustment {
    /// Extra field definitions were merged into the transition form.
    FieldsMerged { added: usize, replaced: usize },
    /// The article category field was locked.
    CategoryLocked,
    /// The form was left as it was.
    Unchanged,
}

/// Applies the prepare-form adjustments.
#[derive(Debug, Clone, Default)]
pub struct FormAdjuster<F> {
    fields: F,
}

impl<F: FieldSource> FormAdjuster<F> {
    #[must_use]
    pub const fn new(fields: F) -> Self {
        Self { fields }
    }

    /// Dispatch on the form context.
    ///
    /// # Errors
    /// Returns an error only if the field resource exists but cannot be used.
    pub fn prepare(&self, context: &FormContext, form: &mut Form) -> Result<FormAdjustment> {
        match context {
            FormContext::TransitionEdit => self.extend_transition_form(form),
            FormContext::ArticleEdit => Ok(Self::disable_category_field(form)),
            FormContext::Other(tag) => {
                debug!(context = %tag, "No adjustment for form context");
                Ok(FormAdjustment::Unchanged)
            }
        }
    }

    /// Merge the deployed field definitions into the transition form.
    ///
    /// # Errors
    /// Returns the field source's error; the form is untouched in that case.
    pub fn extend_transition_form(&self, form: &mut Form) -> Result<FormAdjustment> {
        let Some(set) = self.fields.field_definitions()? else {
            debug!(form = %form.name, "No field resource deployed");
            return Ok(FormAdjustment::Unchanged);
        };

        let (added, replaced) = form.merge_fields(set);
        debug!(form = %form.name, added, replaced, "Merged transition fields");
        Ok(FormAdjustment::FieldsMerged { added, replaced })
    }

    /// Lock the category field at its current value.
    ///
    /// Category changes for articles are driven by transitions, so the edit
    /// form shows the category but cannot change it.
    pub fn disable_category_field(form: &mut Form) -> FormAdjustment {
        if form.field(CATEGORY_FIELD).is_none() {
            debug!(form = %form.name, "Form has no category field");
            return FormAdjustment::Unchanged;
        }

        let current = form.value(CATEGORY_FIELD).cloned();

        form.set_field_attribute(CATEGORY_FIELD, "readonly", "true");
        if let Some(value) = current {
            form.set_field_attribute(CATEGORY_FIELD, "value", attribute_text(&value));
            form.set_value(CATEGORY_FIELD, value);
        }

        FormAdjustment::CategoryLocked
    }
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
