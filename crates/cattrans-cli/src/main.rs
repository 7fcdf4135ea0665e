//! cattrans CLI - Fire workflow category transitions from the command line.

mod commands;
mod output;

use anyhow::{Context, Result};
use cattrans_core::ArticleState;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cattrans")]
#[command(author, version, about = "Workflow category transition CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: output::OutputFormat,

    /// Site path (defaults to current directory)
    #[arg(long, short = 'C', global = true)]
    path: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init,

    /// Create a new article
    New {
        /// Article title
        title: String,

        /// Category id
        #[arg(long, short = 'c')]
        category: u64,

        /// Author user id
        #[arg(long, short = 'a', default_value = "0")]
        author: u64,

        /// Initial state
        #[arg(long, short = 's')]
        state: Option<ArticleState>,
    },

    /// List articles
    #[command(alias = "ls")]
    List {
        /// Filter by category
        #[arg(long, short = 'c')]
        category: Option<u64>,

        /// Filter by state
        #[arg(long, short = 's')]
        state: Option<ArticleState>,
    },

    /// Show an article
    Get {
        /// Article id
        id: u64,
    },

    /// Edit an article as an operator
    Edit {
        /// Article id
        id: u64,

        /// New title
        #[arg(long, short = 't')]
        title: Option<String>,

        /// New state
        #[arg(long, short = 's')]
        state: Option<ArticleState>,

        /// Editing user id
        #[arg(long, short = 'u', default_value = "0")]
        user: u64,
    },

    /// Fire a transition that moves articles to a category
    Move {
        /// Article ids
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Target category, passed to the plugin unparsed
        #[arg(long)]
        category_id: String,

        /// Extension the articles belong to
        #[arg(long, default_value = "com_content.article")]
        extension: String,

        /// Transition id
        #[arg(long, default_value = "0")]
        transition_id: u64,

        /// Transition title
        #[arg(long, default_value = "Manual transition")]
        title: String,
    },

    /// Deliver a raw transition payload as the workflow host would
    Transition {
        /// JSON payload with `extension`, `pks` and `transition`
        #[arg(long)]
        payload: String,
    },

    /// Prepare a form and print the result
    Form {
        /// Form context (article-edit, transition-edit, or a host form name)
        context: String,

        /// Bind the article form to this article
        #[arg(long)]
        article: Option<u64>,
    },

    /// Start the hook server for workflow host notifications
    Serve {
        /// Port to listen on
        #[arg(long, short = 'p', default_value = "17474")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Determine site path
    let site_path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Init => commands::init(&site_path, cli.format),
        Commands::New {
            title,
            category,
            author,
            state,
        } => commands::new_article(&site_path, &title, category, author, state, cli.format),
        Commands::List { category, state } => {
            commands::list(&site_path, category, state, cli.format)
        }
        Commands::Get { id } => commands::get(&site_path, id, cli.format),
        Commands::Edit {
            id,
            title,
            state,
            user,
        } => commands::edit(&site_path, id, title, state, user, cli.format),
        Commands::Move {
            ids,
            category_id,
            extension,
            transition_id,
            title,
        } => commands::move_articles(
            &site_path,
            &ids,
            &commands::TransitionArgs {
                category_id,
                extension,
                transition_id,
                title,
            },
            cli.format,
        ),
        Commands::Transition { payload } => {
            commands::transition(&site_path, &payload, cli.format)
        }
        Commands::Form { context, article } => {
            commands::form(&site_path, &context, article, cli.format)
        }
        Commands::Serve { port, host } => commands::serve(&site_path, &host, port),
    }
}
