use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use refinery_core::{
    ExtractionMode, Facet, RequestOptions, DEFAULT_LIMIT, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES,
};
use refinery_engine::DEFAULT_API_URL;

#[derive(Parser, Debug)]
#[command(name = "refinery")]
#[command(about = "Client for a web extraction service: scrape, crawl, map and search")]
#[command(version)]
pub struct Args {
    /// Base URL of the extraction service
    #[arg(long, env = "REFINERY_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Minimum time a successful request stays in the loading state
    #[arg(long, default_value_t = 1500, global = true)]
    pub min_display_ms: u64,

    #[arg(long, default_value_t = 10, global = true)]
    pub connect_timeout_secs: u64,

    /// Total request timeout; unbounded when omitted
    #[arg(long, global = true)]
    pub request_timeout_secs: Option<u64>,

    /// Directory for exported pages and batch archives
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogTo::Terminal, global = true)]
    pub log_to: LogTo,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogTo {
    Terminal,
    File,
    Both,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a single page
    Scrape {
        url: String,
        #[command(flatten)]
        selectors: SelectorArgs,
        #[arg(long)]
        include_images: bool,
        /// Ask the service for a summary of the page
        #[arg(long)]
        summarize: bool,
        /// Extra output formats, e.g. `--format pdf`
        #[arg(long = "format", value_delimiter = ',')]
        formats: Vec<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Follow links from a start page
    Crawl {
        url: String,
        #[arg(long, default_value_t = i64::from(DEFAULT_MAX_DEPTH), allow_negative_numbers = true)]
        max_depth: i64,
        #[arg(long, default_value_t = i64::from(DEFAULT_MAX_PAGES), allow_negative_numbers = true)]
        max_pages: i64,
        #[arg(long)]
        wait_for: Option<String>,
        #[arg(long)]
        include_images: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// List the links reachable from a page
    Map { url: String },
    /// Search the web and extract the top results
    Search {
        query: String,
        #[arg(long, default_value_t = i64::from(DEFAULT_LIMIT), allow_negative_numbers = true)]
        limit: i64,
        #[arg(long)]
        include_images: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Scrape several pages into one zip archive
    Batch {
        /// URLs, separated by spaces, commas or newlines
        #[arg(required = true, num_args = 1..)]
        urls: Vec<String>,
        #[arg(long)]
        wait_for: Option<String>,
        #[arg(long)]
        include_images: bool,
    },
    /// Interactive session reading commands from stdin
    Shell,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SelectorArgs {
    /// CSS selector to wait for before extracting
    #[arg(long)]
    pub wait_for: Option<String>,
    /// CSS selector limiting extraction to part of the page
    #[arg(long)]
    pub target: Option<String>,
    /// CSS selector of elements to drop
    #[arg(long)]
    pub remove: Option<String>,
}

/// Which part of the result to print.
#[derive(ClapArgs, Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewArgs {
    /// 1-based page of a multi-page result
    #[arg(long)]
    pub page: Option<usize>,
    #[arg(long)]
    pub facet: Option<Facet>,
    /// Show the combined search page
    #[arg(long)]
    pub combined: bool,
}

/// A one-shot submission resolved from a mode subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneShot {
    pub mode: ExtractionMode,
    pub input: String,
    pub options: RequestOptions,
    pub view: ViewArgs,
}

impl Command {
    pub fn one_shot(&self) -> Option<OneShot> {
        let defaults = RequestOptions::default();
        let one_shot = match self {
            Command::Scrape {
                url,
                selectors,
                include_images,
                summarize,
                formats,
                view,
            } => OneShot {
                mode: ExtractionMode::Scrape,
                input: url.clone(),
                options: RequestOptions {
                    wait_for_selector: selectors.wait_for.clone().unwrap_or_default(),
                    target_selector: selectors.target.clone().unwrap_or_default(),
                    remove_selector: selectors.remove.clone().unwrap_or_default(),
                    include_images: *include_images,
                    summarize: *summarize,
                    formats: formats.clone(),
                    ..defaults
                },
                view: view.clone(),
            },
            Command::Crawl {
                url,
                max_depth,
                max_pages,
                wait_for,
                include_images,
                view,
            } => OneShot {
                mode: ExtractionMode::Crawl,
                input: url.clone(),
                options: RequestOptions {
                    max_depth: *max_depth,
                    max_pages: *max_pages,
                    wait_for_selector: wait_for.clone().unwrap_or_default(),
                    include_images: *include_images,
                    ..defaults
                },
                view: view.clone(),
            },
            Command::Map { url } => OneShot {
                mode: ExtractionMode::Map,
                input: url.clone(),
                options: defaults,
                view: ViewArgs::default(),
            },
            Command::Search {
                query,
                limit,
                include_images,
                view,
            } => OneShot {
                mode: ExtractionMode::Search,
                input: query.clone(),
                options: RequestOptions {
                    limit: *limit,
                    include_images: *include_images,
                    ..defaults
                },
                view: view.clone(),
            },
            Command::Batch { .. } | Command::Shell => return None,
        };
        Some(one_shot)
    }
}
