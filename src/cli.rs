//! CLI parsing and orchestration. Parses args, resolves the story URL, fetches
//! metadata and pages, and writes one text file per story. Maps errors to exit codes.

use crate::api::{self, ApiClient, FetchError};
use crate::config;
use crate::model::StoryId;
use crate::writer::{self, WriteError};
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_FORMAT: &str = "[{author}]/{title}.txt";

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Write(#[from] WriteError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) | CliRunError::Fetch(FetchError::InvalidUrl { .. }) => 1,
            CliRunError::Fetch(_) => 2,
            CliRunError::Write(_) => 3,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "litscrape")]
#[command(about = "Download Literotica stories and series as plain text")]
#[command(
    after_help = "Config file keys (output_dir, format, user_agent, timeout_secs) are read from ./litscrape.toml or $XDG_CONFIG_HOME/litscrape/config.toml. CLI flags override config."
)]
pub struct Args {
    /// Story URL, e.g. https://www.literotica.com/s/some-story-title.
    pub url: String,

    /// Print debug logging to stderr.
    #[arg(short, long)]
    pub debug: bool,

    /// Output directory, created if missing. Default: output.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Download every entry of the series the story belongs to.
    #[arg(short, long)]
    pub series: bool,

    /// Filename template with {author} and {title} placeholders. Default: [{author}]/{title}.txt.
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Fetch all pages of one story, with a progress bar over page fetches unless
/// suppressed (the bar would interleave with debug log lines).
fn download_story(
    client: &ApiClient,
    id: &StoryId,
    page_count: u32,
    show_progress: bool,
) -> Result<Vec<String>, FetchError> {
    let bar = if show_progress {
        let bar = indicatif::ProgressBar::new(page_count as u64);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{spinner} {msg} [{bar:40}] {pos}/{len} ({elapsed})")
                .unwrap()
                .progress_chars("█▉▊▋▌▍▎▏ "),
        );
        Some(bar)
    } else {
        None
    };
    let progress_cb = |n: u32, total: u32| {
        if let Some(ref bar) = bar {
            bar.set_position(n as u64);
            bar.set_message(format!("Fetching page {}/{}", n, total));
        }
    };
    let progress: Option<&dyn Fn(u32, u32)> = if show_progress {
        Some(&progress_cb)
    } else {
        None
    };
    let result = api::fetch_story_text(client, id, page_count, progress);
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    result
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and message on failure.
///
/// Single pass, no backtracking: resolve options, create the output directory,
/// parse the URL, fetch top-level metadata, then download and write either the
/// one story or every series entry in listed order. The first failure at any
/// stage aborts the run; files already written stay on disk.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let config = config::load_config().map_err(CliRunError::InvalidInput)?;

    let output_dir: PathBuf = args
        .output
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.output_dir.clone()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let template = args
        .format
        .clone()
        .or_else(|| config.as_ref().and_then(|c| c.format.clone()))
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());

    std::fs::create_dir_all(&output_dir).map_err(|e| WriteError::CreateDir {
        path: output_dir.clone(),
        source: e,
    })?;

    let id = api::parse_story_url(&args.url)?;

    let mut builder = ApiClient::builder();
    if let Some(ua) = config.as_ref().and_then(|c| c.user_agent.clone()) {
        builder = builder.user_agent(ua);
    }
    if let Some(secs) = config.as_ref().and_then(|c| c.timeout_secs) {
        builder = builder.timeout_secs(secs);
    }
    let client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let info = api::fetch_story_info(&client, &id)?;
    let show_progress = !args.debug;

    if args.series {
        let items = info.series_items.clone().ok_or_else(|| {
            CliRunError::InvalidInput(format!(
                "{} is not part of a series (metadata has no series listing). Drop --series to download just this story.",
                args.url
            ))
        })?;
        // Files are named from the top-level author and each item's own title.
        for item in &items {
            let item_info = api::fetch_story_info(&client, &item.id)?;
            log::debug!("Downloading {} by {}", item.title, info.author);
            let pages = download_story(&client, &item.id, item_info.page_count, show_progress)?;
            let path = writer::story_path(&output_dir, &template, &info.author, &item.title);
            writer::write_story(&path, &pages)?;
            eprintln!("Wrote {}", path.display());
        }
    } else {
        log::debug!("Downloading {} by {}", info.title, info.author);
        let pages = download_story(&client, &info.id, info.page_count, show_progress)?;
        let path = writer::story_path(&output_dir, &template, &info.author, &info.title);
        writer::write_story(&path, &pages)?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}
