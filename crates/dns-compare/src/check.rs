use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    classify::{classify, CheckResult, Finding, Severity},
    error::ConfigError,
    fetch::RecordSource,
    record::{RecordSet, RecordType},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CheckMode {
    /// Fetched from both servers and classified.
    Compare,
    /// Fetched from both servers, only the counts are reported.
    FetchOnly,
}

/// Which record types are looked up for every name, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPlan {
    entries: Vec<(RecordType, CheckMode)>,
}

impl CheckPlan {
    /// Builds a plan in [`RecordType::ALL`] order. A type may not be both compared and
    /// fetch-only, and at least one type has to remain.
    pub fn new(compared: &[RecordType], fetch_only: &[RecordType]) -> Result<Self, ConfigError> {
        if let Some(conflict) = compared.iter().find(|t| fetch_only.contains(t)) {
            return Err(ConfigError::ConflictingRecordType(*conflict));
        }

        let entries: Vec<_> = RecordType::ALL
            .into_iter()
            .filter_map(|t| {
                if compared.contains(&t) {
                    Some((t, CheckMode::Compare))
                } else if fetch_only.contains(&t) {
                    Some((t, CheckMode::FetchOnly))
                } else {
                    None
                }
            })
            .collect();

        if entries.is_empty() {
            return Err(ConfigError::EmptyPlan);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(RecordType, CheckMode)] {
        &self.entries
    }
}

impl Default for CheckPlan {
    fn default() -> Self {
        Self {
            entries: RecordType::ALL
                .into_iter()
                .map(|t| (t, CheckMode::Compare))
                .collect(),
        }
    }
}

/// What a failed lookup turns into.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TransportPolicy {
    /// The server is treated as having returned no records.
    #[default]
    EmptySet,
    /// The type is reported as an ERROR naming the failing server.
    Report,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPair {
    pub first: String,
    pub second: String,
}

impl ServerPair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Everything checked for one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameReport {
    pub name: String,
    pub severity: Severity,
    pub results: Vec<CheckResult>,
}

impl NameReport {
    pub fn new(name: impl Into<String>, results: Vec<CheckResult>) -> Self {
        let severity = results
            .iter()
            .map(CheckResult::severity)
            .max()
            .unwrap_or(Severity::Ok);
        Self {
            name: name.into(),
            severity,
            results,
        }
    }
}

/// Runs the per-type lookups for a name against both servers and classifies them.
///
/// Types are checked one after the other in plan order; parallelism happens across
/// names, see [`crate::pool`].
pub struct Checker {
    source: Arc<dyn RecordSource>,
    servers: ServerPair,
    plan: CheckPlan,
    policy: TransportPolicy,
}

impl Checker {
    pub fn new(
        source: Arc<dyn RecordSource>,
        servers: ServerPair,
        plan: CheckPlan,
        policy: TransportPolicy,
    ) -> Self {
        Self {
            source,
            servers,
            plan,
            policy,
        }
    }

    pub fn servers(&self) -> &ServerPair {
        &self.servers
    }

    fn lookup(
        &self,
        name: &str,
        server: &str,
        record_type: RecordType,
    ) -> Result<RecordSet, Finding> {
        match self.policy {
            TransportPolicy::EmptySet => Ok(self.source.fetch(name, server, record_type)),
            TransportPolicy::Report => self
                .source
                .try_fetch(name, server, record_type)
                .map_err(|e| {
                    warn!(name, server, %record_type, error = %e.source, "lookup failed");
                    Finding::new(
                        Severity::Error,
                        format!("lookup failed on {server}: {}", e.source),
                    )
                }),
        }
    }

    fn check_type(&self, name: &str, record_type: RecordType, mode: CheckMode) -> CheckResult {
        let first = self.lookup(name, &self.servers.first, record_type);
        let second = self.lookup(name, &self.servers.second, record_type);

        let (a, b) = match (first, second) {
            (Ok(a), Ok(b)) => (a, b),
            (first, second) => {
                let mut result = CheckResult::new(record_type);
                result.findings.extend(first.err());
                result.findings.extend(second.err());
                return result;
            }
        };

        match mode {
            CheckMode::Compare => classify(record_type, &a, &b),
            CheckMode::FetchOnly => CheckResult::with_finding(
                record_type,
                Finding::new(
                    Severity::Ok,
                    format!("fetched only: {} vs {} records", a.len(), b.len()),
                ),
            ),
        }
    }

    pub fn check(&self, name: &str) -> NameReport {
        let results: Vec<_> = self
            .plan
            .entries()
            .iter()
            .map(|(record_type, mode)| self.check_type(name, *record_type, *mode))
            .collect();

        let report = NameReport::new(name, results);
        debug!(name, severity = %report.severity, "checked");
        report
    }
}
