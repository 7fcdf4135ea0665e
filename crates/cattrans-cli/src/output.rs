//! Output formatting for the CLI.

use cattrans_core::{Article, ArticleState, BatchResult, Form, OperatorMessage, Severity};
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::fmt::Write;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Print output in the specified format.
pub fn print<T: Serialize + HumanDisplay>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Human => println!("{}", value.human_display()),
        OutputFormat::Json => print_serialized(serde_json::to_string_pretty(value)),
        OutputFormat::Yaml => print_serialized(serde_yaml::to_string(value)),
    }
}

fn print_serialized<E: std::fmt::Display>(rendered: Result<String, E>) {
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

/// Print a list of article summaries with dynamic column widths.
pub fn print_article_list(articles: &[ArticleSummary], format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            if articles.is_empty() {
                println!("No articles found.");
                return;
            }

            let id_width = articles
                .iter()
                .map(|a| a.id.to_string().len())
                .max()
                .unwrap_or(2)
                .max(2);
            let state_width = articles
                .iter()
                .map(|a| a.state.to_string().len())
                .max()
                .unwrap_or(5)
                .max(5);

            println!(
                "{:>id_w$}  {:>8}  {:<state_w$}  TITLE",
                "ID",
                "CATEGORY",
                "STATE",
                id_w = id_width,
                state_w = state_width
            );
            println!("{}", "-".repeat(id_width + state_width + 40));

            for article in articles {
                println!(
                    "{:>id_w$}  {:>8}  {:<state_w$}  {}",
                    article.id,
                    article.category_id,
                    article.state.to_string(),
                    article.title,
                    id_w = id_width,
                    state_w = state_width
                );
            }
        }
        OutputFormat::Json => print_serialized(serde_json::to_string_pretty(articles)),
        OutputFormat::Yaml => print_serialized(serde_yaml::to_string(articles)),
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Human => println!("{message}"),
        OutputFormat::Json => print_serialized(serde_json::to_string_pretty(&success(message))),
        OutputFormat::Yaml => print_serialized(serde_yaml::to_string(&success(message))),
    }
}

fn success(message: &str) -> serde_json::Value {
    serde_json::json!({ "status": "ok", "message": message })
}

/// Trait for human-readable display.
pub trait HumanDisplay {
    fn human_display(&self) -> String;
}

impl HumanDisplay for Article {
    fn human_display(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "ID:        {}", self.id);
        let _ = writeln!(out, "Title:     {}", self.title);
        let _ = writeln!(out, "Alias:     {}", self.alias);
        let _ = writeln!(out, "Category:  {}", self.category_id);
        let _ = writeln!(out, "State:     {}", self.state);
        let _ = writeln!(
            out,
            "Created:   {} by {}",
            format_time(&self.created),
            self.created_by
        );
        let _ = writeln!(
            out,
            "Modified:  {} by {}",
            format_time(&self.modified),
            self.modified_by
        );

        out
    }
}

impl HumanDisplay for BatchResult {
    fn human_display(&self) -> String {
        let mut out = String::new();

        for message in &self.messages {
            let _ = writeln!(out, "{}", format_message(message));
        }

        let summary = format!(
            "processed: {}  skipped: {}  errors: {}",
            self.processed, self.skipped, self.errors
        );
        let summary = if self.errors > 0 {
            style(summary).yellow().bold()
        } else {
            style(summary).green().bold()
        };
        let _ = write!(out, "{summary}");

        out
    }
}

impl HumanDisplay for Form {
    fn human_display(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Form: {}", self.name);
        for field in &self.fields {
            let value = self
                .data
                .get(&field.name)
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let flags: Vec<String> = field
                .attributes
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();

            let _ = write!(out, "  {:<14} {:<10} {}", field.name, field.field_type, value);
            if !flags.is_empty() {
                let _ = write!(out, "  [{}]", flags.join(", "));
            }
            let _ = writeln!(out);
        }

        out
    }
}

fn format_message(message: &OperatorMessage) -> String {
    let tag = match message.severity {
        Severity::Info => style("info").cyan(),
        Severity::Warning => style("warning").yellow(),
        Severity::Error => style("error").red(),
    };
    format!("  {tag}: {}", message.text)
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Summary view of an article for list output.
#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub id: u64,
    pub title: String,
    pub category_id: u64,
    pub state: ArticleState,
}

impl From<&Article> for ArticleSummary {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            category_id: article.category_id,
            state: article.state,
        }
    }
}
