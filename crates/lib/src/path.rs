//! Path expressions for addressing values inside a document.
//!
//! A path is a dotted sequence of map keys with optional bracketed list
//! indices, resolved from the root map:
//!
//! - `name`, `user.profile.name`
//! - `items[0]`, `items[0].title`, `matrix[1][2]`
//! - `$.user.name` - the `$.` prefix is accepted and ignored; bare `$` (or the
//!   empty string) is the root itself
//!
//! Empty key components are dropped, so `a..b` and `.a.b.` both mean `a.b`.
//!
//! # Usage
//!
//! ```rust
//! use replidoc::path::{Path, Segment};
//!
//! let path: Path = "$.items[2].title".parse()?;
//! assert_eq!(
//!     path.segments(),
//!     &[Segment::key("items"), Segment::Index(2), Segment::key("title")]
//! );
//! assert_eq!(path.to_string(), "items[2].title");
//! # Ok::<(), replidoc::path::PathError>(())
//! ```

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::constants::PATH_ROOT;

/// Error type for path parsing failures.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path string is not well-formed.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl PathError {
    /// Check if this error reports a malformed path.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, PathError::InvalidPath { .. })
    }

    /// The offending path string.
    pub fn path(&self) -> &str {
        match self {
            PathError::InvalidPath { path, .. } => path,
        }
    }
}

impl From<PathError> for crate::Error {
    fn from(err: PathError) -> Self {
        crate::Error::Path(err)
    }
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Look up a key in a map.
    Key(String),
    /// Take the n-th visible element of a list.
    Index(usize),
}

impl Segment {
    pub fn key(key: impl Into<String>) -> Self {
        Segment::Key(key.into())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{key}"),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A parsed path. The empty path addresses the root map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a path string.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        input.parse()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The parent path and final segment, or `None` for the root.
    pub fn split_last(&self) -> Option<(Path, &Segment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            Path {
                segments: parent.to_vec(),
            },
            last,
        ))
    }

    /// Appends a key segment.
    pub fn push_key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Appends an index segment.
    pub fn push_index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| PathError::InvalidPath {
            path: input.to_string(),
            reason,
        };

        let body = if input == PATH_ROOT {
            ""
        } else if let Some(rest) = input.strip_prefix("$.") {
            rest
        } else if input.starts_with("$[") {
            &input[1..]
        } else {
            input
        };

        let mut segments = Vec::new();
        let mut key = String::new();
        let mut after_index = false;
        let mut chars = body.char_indices();

        while let Some((pos, c)) = chars.next() {
            match c {
                '.' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    after_index = false;
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    let mut digits = String::new();
                    let mut closed = false;
                    for (_, d) in chars.by_ref() {
                        if d == ']' {
                            closed = true;
                            break;
                        }
                        digits.push(d);
                    }
                    if !closed {
                        return Err(invalid(format!("unclosed '[' at offset {pos}")));
                    }
                    if digits.is_empty() {
                        return Err(invalid(format!("empty index at offset {pos}")));
                    }
                    if !digits.chars().all(|d| d.is_ascii_digit()) {
                        return Err(invalid(format!("index '{digits}' is not a non-negative integer")));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|e| invalid(format!("index '{digits}': {e}")))?;
                    segments.push(Segment::Index(index));
                    after_index = true;
                }
                ']' => return Err(invalid(format!("unmatched ']' at offset {pos}"))),
                c => {
                    if after_index {
                        return Err(invalid(format!(
                            "unexpected '{c}' after ']' at offset {pos}; use '.' before a key"
                        )));
                    }
                    key.push(c);
                }
            }
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }

        Ok(Path { segments })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{PATH_ROOT}");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i > 0 => write!(f, ".{key}")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}
