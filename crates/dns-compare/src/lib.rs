//! Compares the record sets two DNS servers return for a list of names.
//!
//! Every name is checked by a [`check::Checker`] that fetches each configured record
//! type from both servers and classifies the difference as OK, WARN or ERROR. Names
//! are spread over a fixed-size [`pool::JobRunner`].

pub mod check;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod names;
pub mod pool;
pub mod record;
pub mod report;

use std::sync::Arc;

use tracing::{error, info};

use crate::{
    check::{Checker, NameReport},
    config::CompareConfig,
    error::PoolError,
    fetch::RecordSource,
    pool::JobRunner,
    report::Summary,
};

/// Checks every name of `config` with one job per name and hands each finished report
/// to `on_report` as soon as it is available. Names whose job panicked are only
/// counted in the summary.
pub fn run<F>(
    config: &CompareConfig,
    source: Arc<dyn RecordSource>,
    mut on_report: F,
) -> Result<Summary, PoolError>
where
    F: FnMut(&NameReport),
{
    let checker = Arc::new(Checker::new(
        source,
        config.servers.clone(),
        config.plan.clone(),
        config.transport_policy,
    ));

    let names = config.names.names();
    info!(
        names = names.len(),
        workers = config.workers,
        first = %config.servers.first,
        second = %config.servers.second,
        "comparing servers"
    );

    let mut runner = JobRunner::new(config.workers)?;
    for name in names {
        let checker = Arc::clone(&checker);
        runner.submit(name, move |name: &str| checker.check(name))?;
    }
    runner.run()?;

    let mut summary = Summary::default();
    runner.wait_all(|name, report| match report {
        Some(report) => {
            summary.record(&report);
            on_report(&report);
        }
        None => {
            error!(name, "check did not complete");
            summary.record_failure();
        }
    })?;

    Ok(summary)
}
