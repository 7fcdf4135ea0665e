//! CLI command implementations.

use crate::output::{self, ArticleSummary, OutputFormat};
use anyhow::{Context, Result};
use cattrans_core::{
    ArticleState, Form, FormContext, HostContext, MessageLog, PrepareFormEvent,
    TransitionDescriptor, TransitionEvent, WorkflowPlugin,
};
use cattrans_fs::{ArticleFilter, ArticleUpdate, Site};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Initialize a new site.
pub fn init(path: &Path, format: OutputFormat) -> Result<()> {
    Site::init(path).context("Failed to initialize site")?;
    output::print_success(&format!("Initialized site at {}", path.display()), format);
    Ok(())
}

/// Create a new article.
pub fn new_article(
    path: &Path,
    title: &str,
    category: u64,
    author: u64,
    state: Option<ArticleState>,
    format: OutputFormat,
) -> Result<()> {
    let site = Site::open(path).context("Failed to open site")?;

    let article = site
        .create_article(title, category, author)
        .context("Failed to create article")?;

    let article = match state {
        Some(state) if state != article.state => site
            .update_article(
                article.id,
                &ArticleUpdate {
                    state: Some(state),
                    ..Default::default()
                },
                author,
            )
            .context("Failed to set initial state")?,
        _ => article,
    };

    output::print(&article, format);
    Ok(())
}

/// List articles.
pub fn list(
    path: &Path,
    category: Option<u64>,
    state: Option<ArticleState>,
    format: OutputFormat,
) -> Result<()> {
    let site = Site::open(path).context("Failed to open site")?;

    let filter = if category.is_some() || state.is_some() {
        Some(ArticleFilter {
            category_id: category,
            state,
        })
    } else {
        None
    };

    let articles = site
        .list_articles(filter.as_ref())
        .context("Failed to list articles")?;

    let summaries: Vec<ArticleSummary> = articles.iter().map(ArticleSummary::from).collect();
    output::print_article_list(&summaries, format);
    Ok(())
}

/// Show an article.
pub fn get(path: &Path, id: u64, format: OutputFormat) -> Result<()> {
    let site = Site::open(path).context("Failed to open site")?;
    let article = site.get_article(id).context("Failed to get article")?;
    output::print(&article, format);
    Ok(())
}

/// Edit an article as an operator.
pub fn edit(
    path: &Path,
    id: u64,
    title: Option<String>,
    state: Option<ArticleState>,
    user: u64,
    format: OutputFormat,
) -> Result<()> {
    let site = Site::open(path).context("Failed to open site")?;
    let update = ArticleUpdate {
        title,
        state,
        category_id: None,
    };
    let article = site
        .update_article(id, &update, user)
        .context("Failed to update article")?;
    output::print(&article, format);
    Ok(())
}

/// Transition settings given on the command line.
pub struct TransitionArgs {
    pub category_id: String,
    pub extension: String,
    pub transition_id: u64,
    pub title: String,
}

/// Fire a transition built from command-line arguments.
pub fn move_articles(
    path: &Path,
    ids: &[u64],
    args: &TransitionArgs,
    format: OutputFormat,
) -> Result<()> {
    let transition = TransitionDescriptor::new(args.transition_id, &args.title)
        .with_option("category_id", Value::String(args.category_id.clone()));
    let event = TransitionEvent::new(&args.extension, ids.iter().copied(), transition);

    deliver(path, &event, format)
}

/// Deliver a raw host payload.
pub fn transition(path: &Path, payload: &str, format: OutputFormat) -> Result<()> {
    let event: TransitionEvent =
        serde_json::from_str(payload).context("Invalid transition payload")?;

    deliver(path, &event, format)
}

fn deliver(path: &Path, event: &TransitionEvent, format: OutputFormat) -> Result<()> {
    let mut site = Site::open(path).context("Failed to open site")?;
    let plugin = site.plugin();

    debug!(
        extension = %event.extension,
        items = event.item_ids.len(),
        "Delivering transition"
    );

    let mut messages = MessageLog::new();
    let result =
        plugin.on_transition_completed(event, &mut HostContext::new(&mut site, &mut messages));

    output::print(&result, format);
    Ok(())
}

/// Prepare a form for the given context and print it.
pub fn form(path: &Path, context: &str, article: Option<u64>, format: OutputFormat) -> Result<()> {
    let site = Site::open(path).context("Failed to open site")?;
    let context = FormContext::from_tag(context);

    let mut form = match &context {
        FormContext::ArticleEdit => {
            let article = article
                .map(|id| site.get_article(id))
                .transpose()
                .context("Failed to get article")?;
            Form::article(article.as_ref())
        }
        FormContext::TransitionEdit => Form::transition(None),
        FormContext::Other(tag) => Form::new(tag.clone()),
    };

    site.plugin()
        .on_prepare_form(PrepareFormEvent {
            context,
            form: &mut form,
        })
        .context("Failed to prepare form")?;

    output::print(&form, format);
    Ok(())
}

/// Start the hook server.
pub fn serve(path: &Path, host: &str, port: u16) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { cattrans_hookserver::serve(path, host, port).await })
}
