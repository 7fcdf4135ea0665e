//! cattrans-core: Category reassignment driven by workflow transitions.
//!
//! This crate provides:
//! - `Article`: The content record whose category follows workflow transitions
//! - `TransitionEvent`: The "after transition" notification and its validation
//! - `CategoryReassigner`: Bulk category reassignment with per-item isolation
//! - `FormAdjuster`: Transition/article edit form adjustments
//! - `WorkflowPlugin`: One method per host notification kind

pub mod error;
pub mod form;
pub mod item;
pub mod message;
pub mod plugin;
pub mod reassign;
pub mod store;
pub mod transition;

pub use error::{BatchError, CoreError, ItemError, Result, StoreError};
pub use form::{
    FieldSet, FieldSource, Form, FormAdjuster, FormAdjustment, FormContext, FormField, NoFields,
};
pub use item::{Article, ArticleState, CategoryId, ItemId, Provenance, UserId};
pub use message::{MessageLog, MessageQueue, OperatorMessage, Severity};
pub use plugin::{
    CategoryTransition, HostContext, PrepareFormEvent, WorkflowPlugin, PLUGIN_GROUP, PLUGIN_NAME,
};
pub use reassign::{BatchResult, CategoryReassigner};
pub use store::{ItemStore, MemoryStore};
pub use transition::{ReassignPlan, TransitionDescriptor, TransitionEvent};
