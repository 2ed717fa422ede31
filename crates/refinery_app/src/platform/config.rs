use std::path::PathBuf;
use std::time::Duration;

use engine_logging::{LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use refinery_engine::{ClientSettings, EngineSettings};

use crate::cli::{Args, LogTo};

/// Output directory used when `--output` is not given.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Settings resolved from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
    pub min_display: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Option<Duration>,
    /// Set only when the user asked for output; one-shot runs export only then.
    pub output_dir: Option<PathBuf>,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let log_file = PathBuf::from(DEFAULT_LOG_FILE);
        Self {
            api_url: args.api_url.clone(),
            min_display: Duration::from_millis(args.min_display_ms),
            connect_timeout: Duration::from_secs(args.connect_timeout_secs),
            request_timeout: args.request_timeout_secs.map(Duration::from_secs),
            output_dir: args.output.clone(),
            log_destination: match args.log_to {
                LogTo::Terminal => LogDestination::Terminal,
                LogTo::File => LogDestination::File(log_file),
                LogTo::Both => LogDestination::Both(log_file),
            },
            log_level: args.log_level.filter(),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            api_url: self.api_url.clone(),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            ..ClientSettings::default()
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            min_display: self.min_display,
        }
    }

    /// Directory for exports in interactive and batch runs.
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}
