//! File-name patterns used to filter filesystem children
//!
//! Patterns are written as globs (`*.txt`) or, with a `re:` prefix, as
//! regular expressions (`re:.*\.(png|jpe?g)`). Both are matched against the
//! whole lower-cased file name.

use glob::Pattern as GlobPattern;
use regex::Regex;

use super::error::{PatternError, PatternKind};

/// Prefix that marks a regex pattern
pub const REGEX_PREFIX: &str = "re:";

/// Compiled file-name pattern
#[derive(Debug, Clone)]
pub enum NamePattern {
    Regex { original: String, compiled: Regex },
    Glob { original: String, spec: GlobPattern },
}

impl NamePattern {
    /// Construct a regex pattern; it must match the whole name.
    ///
    /// # Errors
    /// * Returns `PatternError::InvalidEmpty` if `p` is empty.
    /// * Returns `PatternError::InvalidRegex` if the regex fails to compile.
    pub fn regex(p: &str) -> Result<Self, PatternError> {
        if p.is_empty() {
            return Err(PatternError::InvalidEmpty {
                kind: PatternKind::Regex,
            });
        }
        Regex::new(&format!("^(?:{p})$"))
            .map(|r| Self::Regex {
                original: p.to_string(),
                compiled: r,
            })
            .map_err(|e| PatternError::regex_compile(p, &e.to_string()))
    }

    /// Construct a glob pattern.
    ///
    /// # Errors
    /// * Returns `PatternError::InvalidEmpty` if `p` is empty.
    /// * Returns `PatternError::InvalidGlob` if the glob specification is invalid.
    pub fn glob(p: &str) -> Result<Self, PatternError> {
        if p.is_empty() {
            return Err(PatternError::InvalidEmpty {
                kind: PatternKind::Glob,
            });
        }
        GlobPattern::new(&p.to_lowercase())
            .map(|g| Self::Glob {
                original: p.to_string(),
                spec: g,
            })
            .map_err(|e| PatternError::glob_parse(p, &e.to_string()))
    }

    /// Parse a user-supplied pattern (`re:` prefix selects regex).
    ///
    /// # Errors
    /// Propagates errors from [`NamePattern::regex`] and [`NamePattern::glob`].
    pub fn parse(p: &str) -> Result<Self, PatternError> {
        p.strip_prefix(REGEX_PREFIX)
            .map_or_else(|| Self::glob(p), Self::regex)
    }

    #[must_use]
    pub const fn is_regex(&self) -> bool {
        matches!(self, Self::Regex { .. })
    }

    #[must_use]
    pub fn original(&self) -> &str {
        match self {
            Self::Regex { original, .. } | Self::Glob { original, .. } => original,
        }
    }

    /// Whether `file_name` (any case) matches
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();
        match self {
            Self::Regex { compiled, .. } => compiled.is_match(&name),
            Self::Glob { spec, .. } => spec.matches(&name),
        }
    }
}

/// Compile a list of patterns, failing on the first bad one.
///
/// # Errors
/// Returns the first `PatternError` encountered.
pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<NamePattern>, PatternError> {
    patterns.iter().map(|p| NamePattern::parse(p.as_ref())).collect()
}
