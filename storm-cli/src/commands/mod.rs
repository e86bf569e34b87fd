//! Command implementations

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};

pub mod extract;
pub mod list;

/// Wildcard filter over sanitized archive paths
///
/// `*` and `?` stay within one path component; `**` spans directories.
/// Matching ignores case since listfile paths are lowercased.
#[derive(Debug, Clone)]
pub struct Filter {
    pattern: Pattern,
}

impl Filter {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    pub fn new(pattern: &str) -> Result<Self> {
        let pattern =
            Pattern::new(pattern).with_context(|| format!("Invalid filter: {}", pattern))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches_with(path, Self::OPTIONS)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}
