use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(about = "trellis - serve, render and check server-driven screen documents")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/trellis/config.toml)
    #[arg(short = 'C', long, global = true, env = "TRELLIS_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Level requested on the command line, if any
    pub fn level_override(&self) -> Option<LevelFilter> {
        match (self.log_level, self.verbose) {
            (Some(level), _) => Some(level.into()),
            (None, true) => Some(LevelFilter::DEBUG),
            (None, false) => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the screen server
    Serve(ServeArgs),

    /// Interpret a screen document against a context snapshot
    Render(RenderArgs),

    /// Validate a screen document without rendering it
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Port (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory JSON file with technicians and routes (overrides config)
    #[arg(long)]
    pub data: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Screen document JSON file
    #[arg(short, long, conflicts_with = "remote", required_unless_present = "remote")]
    pub screen: Option<PathBuf>,

    /// Fetch this screen id from the configured server instead
    #[arg(long)]
    pub remote: Option<String>,

    /// Context JSON file (`values` and `collections`)
    #[arg(short = 'c', long)]
    pub context: Option<PathBuf>,

    /// `userId` sent with --remote
    #[arg(long, requires = "remote")]
    pub user: Option<String>,

    /// `routeId` sent with --remote
    #[arg(long, requires = "remote")]
    pub route: Option<String>,

    /// `locale` sent with --remote (overrides config)
    #[arg(long, requires = "remote")]
    pub locale: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Screen document JSON file
    #[arg(short, long)]
    pub screen: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented outline
    Tree,
    /// Machine-readable JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_means_debug() {
        let cli = Cli::parse_from(["trellis", "-v", "check", "--screen", "s.json"]);
        assert_eq!(cli.level_override(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_explicit_level_wins() {
        let cli = Cli::parse_from(["trellis", "-v", "-l", "warn", "check", "-s", "s.json"]);
        assert_eq!(cli.level_override(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_render_needs_a_source() {
        assert!(Cli::try_parse_from(["trellis", "render"]).is_err());
        assert!(Cli::try_parse_from(["trellis", "render", "--user", "tech-7", "-s", "s.json"]).is_err());
        assert!(Cli::try_parse_from(["trellis", "render", "--remote", "dashboard", "--user", "tech-7"]).is_ok());
    }
}
