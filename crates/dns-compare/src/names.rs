use std::path::{Path, PathBuf};

use tracing::warn;

/// Where the names to check come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    Single(String),
    File(PathBuf),
}

impl NameSource {
    pub fn names(&self) -> Vec<String> {
        match self {
            NameSource::Single(name) => match name.trim() {
                "" => vec![],
                name => vec![name.to_string()],
            },
            NameSource::File(path) => read_names(path),
        }
    }
}

/// One name per line; surrounding whitespace is trimmed, blank lines and `#` comments
/// are skipped.
pub fn parse_names(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Reads a name list. A missing or unreadable file yields no names.
pub fn read_names(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_names(&content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read name list");
            vec![]
        }
    }
}
