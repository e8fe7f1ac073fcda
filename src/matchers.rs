//! Label matchers for series selection.
//!
//! A [`Matcher`] pairs a label name with a predicate over label values. The
//! four [`MatchKind`]s mirror the PromQL selector operators, and regex
//! patterns are compiled once at construction and fully anchored, so
//! `env=~"prod"` matches exactly `prod` and not `production`.

use std::fmt;

use regex::Regex;

use crate::error::Error;

/// Predicate kind of a [`Matcher`], one per PromQL selector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Label value equals the matcher value (`=`).
    Equal,
    /// Label value differs from the matcher value (`!=`).
    NotEqual,
    /// Label value matches the anchored regex (`=~`).
    RegexMatch,
    /// Label value does not match the anchored regex (`!~`).
    RegexNoMatch,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::RegexMatch => "=~",
            Self::RegexNoMatch => "!~",
        };
        f.write_str(op)
    }
}

/// A label matcher: a label name, a predicate kind, and a value.
///
/// Immutable once constructed. A selection is an ordered sequence of
/// matchers, and a series satisfies the selection when every matcher
/// accepts the value the series carries for the matcher's label name.
#[derive(Debug, Clone)]
pub struct Matcher {
    name: String,
    value: String,
    kind: MatchKind,
    /// Compiled pattern, present exactly for the regex kinds.
    regex: Option<Regex>,
}

impl Matcher {
    /// Create a new matcher.
    ///
    /// # Parameters
    ///
    /// - `kind` - Predicate kind
    /// - `name` - Label name to match on
    /// - `value` - Exact value or regex pattern, depending on `kind`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Regex`] if `kind` is a regex kind and `value` does
    /// not compile as a regular expression.
    pub fn new(
        kind: MatchKind,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, Error> {
        let name = name.into();
        let value = value.into();
        let regex = match kind {
            MatchKind::Equal | MatchKind::NotEqual => None,
            MatchKind::RegexMatch | MatchKind::RegexNoMatch => {
                // Anchor like PromQL: the pattern must cover the whole value.
                Some(Regex::new(&format!("^(?:{value})$"))?)
            }
        };
        Ok(Self { name, value, kind, regex })
    }

    /// Create an equality matcher. Unlike [`Matcher::new`] this cannot
    /// fail, which keeps callers that only ever add `name="value"`
    /// constraints free of error handling.
    ///
    /// # Parameters
    ///
    /// - `name` - Label name to match on
    /// - `value` - Exact value to match
    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), kind: MatchKind::Equal, regex: None }
    }

    /// Label name this matcher operates on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw matcher value; for regex kinds this is the pattern source.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Predicate kind.
    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// Check whether the given label value satisfies this matcher.
    pub fn matches(&self, value: &str) -> bool {
        match self.kind {
            MatchKind::Equal => value == self.value,
            MatchKind::NotEqual => value != self.value,
            MatchKind::RegexMatch => self.regex.as_ref().is_some_and(|re| re.is_match(value)),
            MatchKind::RegexNoMatch => !self.regex.as_ref().is_some_and(|re| re.is_match(value)),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:?}", self.name, self.kind, self.value)
    }
}
