//! File and branch patterns
//!
//! A pattern is either a shell-style glob or a regular expression. In the
//! config file a plain string is a glob, `{ regex = "..." }` is a regex:
//!
//! ```toml
//! [default.file_pattern_labels]
//! db_review = "db/*"
//! test_review = [{ regex = 'test/[a-z_]+\.rb' }, "spec/*"]
//! ```

use crate::error::ConfigError;
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;
use serde::Deserialize;
use std::fmt;

/// A pattern as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Glob(String),
    Regex { regex: String },
}

/// One value or a list of values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Glob where `*` also matches `/`; the whole input must match
    Glob { source: String, matcher: GlobMatcher },

    /// Regular expression matched at the start of the input
    Regex { source: String, regex: Regex },
}

impl Pattern {
    /// Compile a glob pattern
    pub fn glob(pattern: &str) -> Result<Self, ConfigError> {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .backslash_escape(true)
            .build()
            .map_err(|source| ConfigError::Glob {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Pattern::Glob {
            source: pattern.to_string(),
            matcher: glob.compile_matcher(),
        })
    }

    /// Compile a regular expression, anchored at the start of the input
    pub fn regex(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            ConfigError::Regex {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Pattern::Regex {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Does `input` (a file path or branch name) match this pattern?
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Pattern::Glob { matcher, .. } => matcher.is_match(input),
            Pattern::Regex { regex, .. } => regex.is_match(input),
        }
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Glob { source, .. } | Pattern::Regex { source, .. } => source,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Glob { source, .. } => write!(f, "{}", source),
            Pattern::Regex { source, .. } => write!(f, "/{}/", source),
        }
    }
}

impl TryFrom<&PatternSpec> for Pattern {
    type Error = ConfigError;

    fn try_from(spec: &PatternSpec) -> Result<Self, Self::Error> {
        match spec {
            PatternSpec::Glob(glob) => Pattern::glob(glob),
            PatternSpec::Regex { regex } => Pattern::regex(regex),
        }
    }
}
