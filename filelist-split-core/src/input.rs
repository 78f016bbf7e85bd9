//! Streaming parser for `<size><separator><path>` records.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contract::Item;
use crate::error::InputError;

/// How the size field is separated from the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldSeparator {
    /// Split at the first run of whitespace.
    #[default]
    Whitespace,
    /// Split at the first NUL byte.
    Nul,
    /// Split at the first occurrence of the given character.
    Char(char),
}

impl FromStr for FieldSeparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "whitespace" => Ok(FieldSeparator::Whitespace),
            "nul" | "null" | "\0" | "\\0" => Ok(FieldSeparator::Nul),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(FieldSeparator::Char(c)),
                    _ => Err(format!(
                        "field separator must be a single character, 'whitespace' or 'nul', got {other:?}"
                    )),
                }
            }
        }
    }
}

impl TryFrom<String> for FieldSeparator {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldSeparator> for String {
    fn from(sep: FieldSeparator) -> Self {
        sep.to_string()
    }
}

impl fmt::Display for FieldSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSeparator::Whitespace => f.write_str("whitespace"),
            FieldSeparator::Nul => f.write_str("nul"),
            FieldSeparator::Char(c) => write!(f, "{c}"),
        }
    }
}

impl FieldSeparator {
    /// Split `record` at the first separator. The remainder, including any
    /// further separators, is the path.
    fn split<'a>(&self, record: &'a str) -> Option<(&'a str, &'a str)> {
        match self {
            FieldSeparator::Whitespace => {
                let (size, rest) = record.split_once(char::is_whitespace)?;
                Some((size, rest.trim_start()))
            }
            FieldSeparator::Nul => record.split_once('\0'),
            FieldSeparator::Char(c) => record.split_once(*c),
        }
    }
}

/// Parse a single record. `line` is the 1-based line number used in errors.
pub fn parse_line(record: &str, separator: FieldSeparator, line: u64) -> Result<Item, InputError> {
    let record = record.trim();
    let (size, path) = separator
        .split(record)
        .ok_or(InputError::MissingSeparator { line })?;
    let size: u64 = size.parse().map_err(|_| InputError::InvalidSize {
        line,
        value: size.to_string(),
    })?;
    if path.is_empty() {
        return Err(InputError::EmptyPath { line });
    }
    Ok(Item::new(path, size))
}

/// Iterator over the items of a line-oriented input, one line at a time.
pub struct ItemReader<R> {
    reader: R,
    separator: FieldSeparator,
    line: u64,
    buf: String,
}

impl<R: BufRead> ItemReader<R> {
    pub fn new(reader: R, separator: FieldSeparator) -> Self {
        Self {
            reader,
            separator,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> u64 {
        self.line
    }
}

impl<R: BufRead> Iterator for ItemReader<R> {
    type Item = Result<Item, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        let line = self.line + 1;
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line = line;
                debug!(line, record = %self.buf.trim_end(), "Processing line");
                Some(parse_line(&self.buf, self.separator, line))
            }
            Err(source) => Some(Err(InputError::Io { line, source })),
        }
    }
}

/// Count the records in `reader`, used to estimate time remaining.
pub fn count_lines<R: BufRead>(mut reader: R) -> std::io::Result<u64> {
    let mut count = 0;
    let mut buf = Vec::new();
    while reader.read_until(b'\n', &mut buf)? > 0 {
        count += 1;
        buf.clear();
    }
    Ok(count)
}
