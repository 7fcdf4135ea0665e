//! Host notification interface.
//!
//! The workflow host calls one method per notification kind. Per-call
//! collaborators (item store, message queue) are passed in; the plugin itself
//! only holds configuration fixed at construction.

use crate::error::Result;
use crate::form::{FieldSource, Form, FormAdjuster, FormAdjustment, FormContext, NoFields};
use crate::item::Article;
use crate::message::MessageQueue;
use crate::reassign::{BatchResult, CategoryReassigner};
use crate::store::ItemStore;
use crate::transition::TransitionEvent;

/// Plugin group the category transition plugin registers under.
pub const PLUGIN_GROUP: &str = "workflow";
/// Plugin element name.
pub const PLUGIN_NAME: &str = "category_transition";

/// Collaborators the host supplies for one notification.
pub struct HostContext<'a> {
    pub store: &'a mut dyn ItemStore,
    pub messages: &'a mut dyn MessageQueue,
}

impl<'a> HostContext<'a> {
    pub fn new(store: &'a mut dyn ItemStore, messages: &'a mut dyn MessageQueue) -> Self {
        Self { store, messages }
    }
}

/// A "prepare form" notification.
pub struct PrepareFormEvent<'a> {
    pub context: FormContext,
    pub form: &'a mut Form,
}

impl<'a> PrepareFormEvent<'a> {
    /// Build the event from the form's own name as context tag.
    pub fn for_form(form: &'a mut Form) -> Self {
        Self {
            context: FormContext::from_tag(&form.name),
            form,
        }
    }
}

/// Notifications a workflow plugin receives from the host.
pub trait WorkflowPlugin {
    /// A transition has been committed by the host.
    fn on_transition_completed(
        &self,
        event: &TransitionEvent,
        host: &mut HostContext<'_>,
    ) -> BatchResult;

    /// A form is about to be rendered.
    ///
    /// # Errors
    /// Implementations report resources they could not use.
    fn on_prepare_form(&self, event: PrepareFormEvent<'_>) -> Result<FormAdjustment>;

    /// An item is about to be saved. Reserved for validation; does nothing by default.
    fn on_before_save(&self, _article: &Article) {}
}

/// Moves articles to the category configured on a transition, and locks the
/// category field on the article edit form.
#[derive(Debug, Clone, Default)]
pub struct CategoryTransition<F = NoFields> {
    reassigner: CategoryReassigner,
    forms: FormAdjuster<F>,
}

impl<F: FieldSource> CategoryTransition<F> {
    #[must_use]
    pub const fn new(reassigner: CategoryReassigner, fields: F) -> Self {
        Self {
            reassigner,
            forms: FormAdjuster::new(fields),
        }
    }
}

impl<F: FieldSource> WorkflowPlugin for CategoryTransition<F> {
    fn on_transition_completed(
        &self,
        event: &TransitionEvent,
        host: &mut HostContext<'_>,
    ) -> BatchResult {
        self.reassigner
            .on_transition_completed(event, &mut *host.store, &mut *host.messages)
    }

    fn on_prepare_form(&self, event: PrepareFormEvent<'_>) -> Result<FormAdjustment> {
        self.forms.prepare(&event.context, event.form)
    }
}
