use std::{io::IsTerminal, path::PathBuf, time::Duration};

use clap::{error::ErrorKind, ArgAction, ArgGroup, CommandFactory, Parser, ValueEnum};

use crate::{
    check::{CheckPlan, ServerPair, TransportPolicy},
    config::{CompareConfig, DEFAULT_WORKERS},
    error::ConfigError,
    names::NameSource,
    record::RecordType,
    report::{OutputFormat, Palette},
};

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn parse_record_type(input: &str) -> Result<RecordType, ConfigError> {
    input.parse()
}

/// Compare the records two DNS servers return for a list of names
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["name", "file"])))]
pub struct CompareArgs {
    /// First DNS server, e.g. `1.1.1.1`, `[::1]:5353` or `ns1.example.com`
    #[arg(short = 'a', long)]
    pub server_a: String,

    /// Second DNS server
    #[arg(short = 'b', long)]
    pub server_b: String,

    /// Single name to check
    #[arg(short, long)]
    pub name: Option<String>,

    /// File with one name per line
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Number of names checked in parallel
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-query timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Record types to compare, comma separated. Defaults to all supported types
    /// that are not fetch-only
    #[arg(long, value_delimiter = ',', value_parser = parse_record_type)]
    pub types: Vec<RecordType>,

    /// Record types that are fetched and counted but not compared
    #[arg(long, value_delimiter = ',', value_parser = parse_record_type)]
    pub fetch_only: Vec<RecordType>,

    /// Report failed lookups as errors instead of treating them as empty answers
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Disable colored output
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Only log errors
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// More logging, repeat for even more
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CompareArgs {
    pub fn from_env() -> Self {
        Self::parse()
    }

    /// Log filter directive requested on the command line, if any.
    pub fn log_directive(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("error");
        }
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }

    /// Wraps a validation error so it is printed and exits like clap's own errors.
    pub fn config_error(error: &ConfigError) -> clap::Error {
        Self::command().error(ErrorKind::ValueValidation, error)
    }

    pub fn into_config(self) -> Result<CompareConfig, ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let (server_a, server_b) = (self.server_a.trim(), self.server_b.trim());
        if server_a.is_empty() || server_b.is_empty() {
            return Err(ConfigError::EmptyServer);
        }

        let names = match (self.name, self.file) {
            (Some(name), _) if name.trim().is_empty() => return Err(ConfigError::EmptyName),
            (Some(name), _) => NameSource::Single(name.trim().to_string()),
            (None, Some(path)) => NameSource::File(path),
            (None, None) => return Err(ConfigError::MissingNames),
        };

        let compared: Vec<_> = if self.types.is_empty() {
            RecordType::ALL
                .into_iter()
                .filter(|t| !self.fetch_only.contains(t))
                .collect()
        } else {
            self.types
        };
        let plan = CheckPlan::new(&compared, &self.fetch_only)?;

        let transport_policy = if self.strict {
            TransportPolicy::Report
        } else {
            TransportPolicy::EmptySet
        };
        let palette = if self.no_color || !std::io::stdout().is_terminal() {
            Palette::plain()
        } else {
            Palette::ansi()
        };

        Ok(CompareConfig {
            servers: ServerPair::new(server_a, server_b),
            names,
            workers: self.workers,
            timeout: Duration::from_millis(self.timeout_ms),
            plan,
            transport_policy,
            format: self.format.into(),
            palette,
        })
    }
}
