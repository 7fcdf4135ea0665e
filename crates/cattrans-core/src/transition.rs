//! Workflow transition notifications and their validation.
//!
//! Payloads arrive from the workflow host with an untyped options mapping.
//! Decoding is lenient so that a malformed payload still yields a
//! `TransitionEvent`; `ReassignPlan::from_event` is the single place where the
//! event is checked and turned into something the reassigner can act on.

use crate::error::BatchError;
use crate::item::{CategoryId, ItemId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Option key holding the target category.
pub const CATEGORY_OPTION: &str = "category_id";

/// An administrator-defined workflow transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDescriptor {
    /// Transition id in the host.
    #[serde(default)]
    pub id: u64,

    /// Transition title.
    #[serde(default)]
    pub title: String,

    /// Options configured on the transition, as stored by the host.
    #[serde(default)]
    pub options: Value,
}

impl TransitionDescriptor {
    /// Create a descriptor with an empty options mapping.
    #[must_use]
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            options: Value::Object(Map::new()),
        }
    }

    /// Replace the raw options value.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    /// Set a single option. Turns non-mapping options into a mapping first.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.options.is_object() {
            self.options = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut self.options {
            map.insert(key.into(), value.into());
        }
        self
    }
}

/// Notification sent by the host once a transition has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Content type that transitioned (e.g. `com_content.article`).
    #[serde(default)]
    pub extension: String,

    /// Affected items, in host order.
    #[serde(rename = "pks", default, deserialize_with = "lenient_ids")]
    pub item_ids: Vec<ItemId>,

    /// The transition that fired, if the payload carried a usable one.
    #[serde(default, deserialize_with = "lenient_transition")]
    pub transition: Option<TransitionDescriptor>,
}

impl TransitionEvent {
    #[must_use]
    pub fn new(
        extension: impl Into<String>,
        item_ids: impl IntoIterator<Item = ItemId>,
        transition: TransitionDescriptor,
    ) -> Self {
        Self {
            extension: extension.into(),
            item_ids: item_ids.into_iter().collect(),
            transition: Some(transition),
        }
    }
}

/// A validated reassignment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignPlan<'a> {
    pub target_category: CategoryId,
    pub item_ids: &'a [ItemId],
}

impl<'a> ReassignPlan<'a> {
    /// Validate an event.
    ///
    /// Checks run in a fixed order (transition, options, category, batch) and
    /// the first failure wins.
    ///
    /// # Errors
    /// Returns the `BatchError` describing the first failed check.
    pub fn from_event(event: &'a TransitionEvent) -> Result<Self, BatchError> {
        let transition = event
            .transition
            .as_ref()
            .ok_or(BatchError::InvalidTransition)?;

        let Value::Object(options) = &transition.options else {
            return Err(BatchError::InvalidOptions);
        };

        let target_category = category_from_options(options)?;

        if event.item_ids.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        Ok(Self {
            target_category,
            item_ids: &event.item_ids,
        })
    }
}

/// Read `category_id` as a positive integer.
///
/// Integers and numeric strings are accepted. Missing, zero, negative and
/// non-numeric values are all the same error.
fn category_from_options(options: &Map<String, Value>) -> Result<CategoryId, BatchError> {
    let raw = options.get(CATEGORY_OPTION);
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(integral_id)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed {
        Some(id) if id > 0 => Ok(id),
        _ => Err(BatchError::InvalidCategory(describe_raw(raw))),
    }
}

/// Whole-valued floats such as `5.0` name the same category as `5`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integral_id(value: f64) -> Option<CategoryId> {
    // Above 2^53 a float no longer identifies a single integer.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    (value.fract() == 0.0 && (1.0..=MAX_EXACT).contains(&value)).then(|| value as CategoryId)
}

fn describe_raw(raw: Option<&Value>) -> String {
    match raw {
        None | Some(Value::Null) => "(none)".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn parse_id(value: &Value) -> Option<ItemId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Anything but a list of ids decodes as an empty batch.
fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<ItemId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(entries) = value else {
        return Ok(Vec::new());
    };

    Ok(entries
        .iter()
        .map(parse_id)
        .collect::<Option<Vec<_>>>()
        .unwrap_or_default())
}

/// A transition that is not an object of the expected shape decodes as `None`.
fn lenient_transition<'de, D>(deserializer: D) -> Result<Option<TransitionDescriptor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}
