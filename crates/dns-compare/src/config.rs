use std::time::Duration;

use dns::resolver::DEFAULT_TIMEOUT;

use crate::{
    check::{CheckPlan, ServerPair, TransportPolicy},
    names::NameSource,
    report::{OutputFormat, Palette},
};

pub const DEFAULT_WORKERS: usize = 8;

/// Validated settings for one comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareConfig {
    pub servers: ServerPair,
    pub names: NameSource,
    pub workers: usize,
    pub timeout: Duration,
    pub plan: CheckPlan,
    pub transport_policy: TransportPolicy,
    pub format: OutputFormat,
    pub palette: Palette,
}

impl CompareConfig {
    pub fn new(servers: ServerPair, names: NameSource) -> Self {
        Self {
            servers,
            names,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
            plan: CheckPlan::default(),
            transport_policy: TransportPolicy::default(),
            format: OutputFormat::default(),
            palette: Palette::default(),
        }
    }
}
