use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use dns_compare::{cli::CompareArgs, fetch::UdpFetcher, report};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

fn init_logging(args: &CompareArgs) {
    let filter = match args.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let args = CompareArgs::from_env();
    init_logging(&args);

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => CompareArgs::config_error(&e).exit(),
    };

    let source = Arc::new(UdpFetcher::new(config.timeout));
    let stdout = io::stdout();
    let mut write_error = None;

    let summary = dns_compare::run(&config, source, |name_report| {
        if write_error.is_some() {
            return;
        }
        let written = report::render(name_report, config.format, &config.palette)
            .map_err(anyhow::Error::from)
            .and_then(|block| Ok(stdout.lock().write_all(block.as_bytes())?));
        if let Err(e) = written {
            write_error = Some(e);
        }
    })?;

    if let Some(e) = write_error {
        return Err(e.context("writing report"));
    }

    if config.format == report::OutputFormat::Text {
        println!("{}", summary.render());
    }
    Ok(ExitCode::from(summary.exit_code()))
}
