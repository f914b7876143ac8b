use std::fmt;

use serde::Serialize;

use crate::record::{RecordSet, RecordType};

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Outcome of comparing one record type for one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub record_type: RecordType,
    pub findings: Vec<Finding>,
    pub equal_values: Vec<String>,
}

impl CheckResult {
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            findings: vec![],
            equal_values: vec![],
        }
    }

    pub fn with_finding(record_type: RecordType, finding: Finding) -> Self {
        Self {
            findings: vec![finding],
            ..Self::new(record_type)
        }
    }

    /// Highest severity among the findings.
    pub fn severity(&self) -> Severity {
        self.findings
            .iter()
            .map(|finding| finding.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }
}

/// Compares the records two servers returned for the same name and type.
///
/// A count mismatch short-circuits, otherwise the sets are compared index by index and
/// every mismatching position is reported on its own.
pub fn classify(record_type: RecordType, a: &RecordSet, b: &RecordSet) -> CheckResult {
    let mut result = CheckResult::new(record_type);

    if a.len() != b.len() {
        result.findings.push(Finding::new(
            record_type.count_mismatch_severity(),
            format!("{} vs {} records", a.len(), b.len()),
        ));
        return result;
    }

    if a.is_empty() {
        result
            .findings
            .push(Finding::new(Severity::Ok, "0 records"));
        return result;
    }

    for (left, right) in a.values().zip(b.values()) {
        if left == right {
            result.equal_values.push(left.to_owned());
        } else {
            result.findings.push(Finding::new(
                record_type.value_mismatch_severity(),
                format!("{left} != {right}"),
            ));
        }
    }

    if !result.equal_values.is_empty() {
        result.findings.push(Finding::new(
            Severity::Ok,
            format!("{} equal records", result.equal_values.len()),
        ));
    }

    result
}
