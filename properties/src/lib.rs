//! Flat `key=value` properties files.
//!
//! This crate reads and writes the line-oriented format used to keep build
//! secrets such as `key.properties` out of source control. Every key and
//! value is a plain string; there is no nesting and no typing.
//!
//! ```rust
//! let props = signkit_properties::parse("# signing\nkeyAlias=upload\n").unwrap();
//! assert_eq!(props.get("keyAlias"), Some("upload"));
//! ```

#![warn(missing_docs)]

mod parser;
mod writer;

pub use parser::parse;

use std::fmt;

/// Errors that can occur while parsing properties text.
///
/// Line numbers are 1-based and point at the first physical line of the
/// offending entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The entry has no `=` between key and value.
    #[error("line {line}: expected `key=value`, found no `=` separator")]
    MissingSeparator {
        /// Line of the entry.
        line: usize,
    },
    /// The entry has nothing before its `=`.
    #[error("line {line}: entry has an empty key")]
    EmptyKey {
        /// Line of the entry.
        line: usize,
    },
    /// A `\u` escape is not followed by four hex digits, or pairs surrogates badly.
    #[error("line {line}: malformed \\uXXXX escape")]
    InvalidUnicodeEscape {
        /// Line of the entry.
        line: usize,
    },
}

impl ParseError {
    /// The line the error was reported on.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::MissingSeparator { line }
            | Self::EmptyKey { line }
            | Self::InvalidUnicodeEscape { line } => *line,
        }
    }
}

/// An ordered set of string properties.
///
/// Keys keep the position of their first appearance. Inserting an existing
/// key replaces its value, so the last duplicate in a file wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Number of distinct keys.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

impl std::str::FromStr for Properties {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Writes one escaped `key=value` line per entry.
///
/// The output parses back to an equal set.
impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writer::write_entry(f, key, value)?;
        }
        Ok(())
    }
}
