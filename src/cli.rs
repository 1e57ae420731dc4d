use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keeps AI-generated summaries in sync with the content they summarize
#[derive(Debug, Parser)]
#[command(name = "ai-summary")]
#[command(about = "Keeps AI-generated summaries in sync with the content they summarize")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Add or update content items from a JSON file
    Import { file: PathBuf },
    /// Show every item and its summary state
    List,
    /// Generate (or regenerate) one summary
    Generate {
        id: String,
        /// System prompt for this call only
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Print the stored summary
    Show { id: String },
    /// Delete the stored summary
    Clear { id: String },
    /// Generate missing and outdated summaries (all items when no ids given)
    Bulk { ids: Vec<String> },
    /// Record a new revision and run the update hook
    Touch { id: String, revision: String },
    /// Delete all stored summaries
    Purge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Import(PathBuf),
    List,
    Generate { id: String, prompt: Option<String> },
    Show(String),
    Clear(String),
    Bulk(Vec<String>),
    Touch { id: String, revision: String },
    Purge,
}

impl From<Commands> for AppAction {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Import { file } => AppAction::Import(file),
            Commands::List => AppAction::List,
            Commands::Generate { id, prompt } => AppAction::Generate { id, prompt },
            Commands::Show { id } => AppAction::Show(id),
            Commands::Clear { id } => AppAction::Clear(id),
            Commands::Bulk { ids } => AppAction::Bulk(ids),
            Commands::Touch { id, revision } => AppAction::Touch { id, revision },
            Commands::Purge => AppAction::Purge,
        }
    }
}
