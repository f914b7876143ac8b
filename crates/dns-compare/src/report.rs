use std::fmt::Write as _;

use crate::{
    check::NameReport,
    classify::{CheckResult, Severity},
};

const RESET: &str = "\x1b[0m";

/// ANSI color codes per severity. Passed to the renderer explicitly so tests and
/// `--no-color` runs render plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub ok: &'static str,
    pub warn: &'static str,
    pub error: &'static str,
    pub name: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn ansi() -> Self {
        Self {
            ok: "\x1b[32m",
            warn: "\x1b[33m",
            error: "\x1b[31m",
            name: "\x1b[1m",
            reset: RESET,
        }
    }

    pub fn plain() -> Self {
        Self {
            ok: "",
            warn: "",
            error: "",
            name: "",
            reset: "",
        }
    }

    fn severity(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Ok => self.ok,
            Severity::Warn => self.warn,
            Severity::Error => self.error,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::ansi()
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn render_result(out: &mut String, result: &CheckResult, palette: &Palette) {
    for finding in &result.findings {
        let _ = writeln!(
            out,
            "  {:<6}{}{:<6}{} {}",
            result.record_type.as_str(),
            palette.severity(finding.severity),
            finding.severity.as_str(),
            palette.reset,
            finding.message
        );
    }
    for value in &result.equal_values {
        let _ = writeln!(out, "          {value}");
    }
}

/// Renders one block per name: a header line, one line per finding and the equal
/// values indented below their type.
pub fn render_text(report: &NameReport, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}{}{} {}{}{}",
        palette.name,
        report.name,
        palette.reset,
        palette.severity(report.severity),
        report.severity,
        palette.reset
    );
    for result in &report.results {
        render_result(&mut out, result, palette);
    }
    out
}

pub fn render_json(report: &NameReport) -> serde_json::Result<String> {
    serde_json::to_string(report)
}

pub fn render(
    report: &NameReport,
    format: OutputFormat,
    palette: &Palette,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, palette)),
        OutputFormat::Json => render_json(report).map(|mut line| {
            line.push('\n');
            line
        }),
    }
}

/// Finding counts over a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub names: usize,
    pub failed_jobs: usize,
    pub ok: usize,
    pub warn: usize,
    pub error: usize,
}

impl Summary {
    pub fn record(&mut self, report: &NameReport) {
        self.names += 1;
        for finding in report.results.iter().flat_map(|r| &r.findings) {
            match finding.severity {
                Severity::Ok => self.ok += 1,
                Severity::Warn => self.warn += 1,
                Severity::Error => self.error += 1,
            }
        }
    }

    /// A name whose check could not produce a report at all.
    pub fn record_failure(&mut self) {
        self.names += 1;
        self.failed_jobs += 1;
    }

    pub fn has_errors(&self) -> bool {
        self.error > 0 || self.failed_jobs > 0
    }

    /// `0` when nothing is ERROR, `1` otherwise.
    pub fn exit_code(&self) -> u8 {
        u8::from(self.has_errors())
    }

    pub fn render(&self) -> String {
        let mut line = format!(
            "{} names checked: {} ok, {} warn, {} error",
            self.names, self.ok, self.warn, self.error
        );
        if self.failed_jobs > 0 {
            let _ = write!(line, ", {} failed", self.failed_jobs);
        }
        line
    }
}
