mod commands;
mod config;
mod document;
mod session;

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use seekpad_search::SearchState;

use config::AppConfig;
use document::Document;
use session::Session;

#[derive(Parser)]
#[command(name = "seekpad")]
#[command(about = "Search a text document interactively", long_about = None)]
#[command(version)]
struct Cli {
    /// Document to load; starts with an empty buffer when omitted
    path: Option<PathBuf>,

    /// Treat queries as regular expressions
    #[arg(long)]
    regex: bool,

    /// Ignore letter case when matching
    #[arg(long)]
    ignore_case: bool,

    /// Read settings from this file instead of the default config location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load_or_create(),
    };
    if cli.regex {
        config.regex = true;
    }
    if cli.ignore_case {
        config.case_sensitive = false;
    }

    let text = match &cli.path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => String::new(),
    };

    let document = Document::new(text);
    info!(
        "Loaded {} chars; mode {}, case sensitive {}",
        document.char_len(),
        config.search_config().mode.label(),
        config.case_sensitive
    );

    let search = SearchState::with_config(config.search_config());
    let lines = session::spawn_stdin_reader();
    Session::new(document, search, config, io::stdout()).run(lines)
}
