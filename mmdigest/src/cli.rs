use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Mattermost server URL
    #[arg(long, env = "MATTERMOST_URL", global = true)]
    pub mm_url: Option<String>,

    /// Mattermost access token
    #[arg(long, env = "MATTERMOST_TOKEN", global = true, hide_env_values = true)]
    pub mm_token: Option<String>,

    /// Mattermost channel receiving the digest
    #[arg(long, env = "MATTERMOST_CHANNEL_ID", global = true)]
    pub channel_id: Option<String>,

    /// Print the pages instead of posting them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log verbosity
    #[arg(short, long, value_name = "LEVEL", default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Table of user requests still waiting on the team
    Requests(RequestsArgs),
    /// Notice for a finished CI build
    Builds(BuildsArgs),
    /// Recently authored commits of a local clone
    Commits(CommitsArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RequestsArgs {
    /// JSON array of posts fetched from the forum
    pub snapshot: PathBuf,

    /// Team members, whose posts answer requests (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub team: Vec<String>,

    /// Leave out requests idle for more days than this
    #[arg(long, allow_hyphen_values = true)]
    pub max_age_days: Option<i64>,

    /// Order of the rows
    #[arg(long, value_enum, default_value_t = SortOrder::Staleness)]
    pub sort: SortOrder,

    /// Reverse the row order
    #[arg(long)]
    pub reverse: bool,

    /// Detailed table with delays and response/thread counts per last author
    #[arg(long)]
    pub owners: bool,

    /// Add a celebration gif when nobody is waiting
    #[arg(long, overrides_with = "no_gif")]
    pub gif: bool,

    /// Leave the celebration gif out, even if the config file asks for it
    #[arg(long, overrides_with = "gif")]
    pub no_gif: bool,

    /// Reference instant (RFC 3339), defaults to the current time
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct BuildsArgs {
    /// Build JSON (`<build url>/api/json`)
    pub build: PathBuf,

    /// Test report JSON of the same build
    #[arg(long, requires = "tests_url")]
    pub tests: Option<PathBuf>,

    /// URL of that test report, used to link configurations
    #[arg(long)]
    pub tests_url: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CommitsArgs {
    /// Local clone to read the history from
    pub repo: PathBuf,

    /// How many days of history to report
    #[arg(long, default_value_t = 1)]
    pub since_days: u32,

    /// Prefix turning a commit id into a web URL
    #[arg(long)]
    pub web_commit_url: Option<String>,

    /// Reference instant (RFC 3339), defaults to the current time
    #[arg(long)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Days since the last relevant event
    Staleness,
    /// Number of threads already owned by the last author
    Load,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl From<LogLevel> for LevelFilter {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Off => write!(f, "off"),
        }
    }
}
