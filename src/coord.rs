//! Source coordinates: 1-indexed lines, 0-indexed columns counted in chars.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

pub type Line = usize;
pub type Col = usize;

/// A position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    /// 1-indexed.
    pub line: Line,
    /// 0-indexed, in chars.
    pub column: Col,
}

/// A range of source text. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Pos {
    pub fn new(line: Line, column: Col) -> Pos {
        Pos { line, column }
    }

    /// The start of the text.
    pub fn zero() -> Pos {
        Pos { line: 1, column: 0 }
    }

    /// The byte offset of this position in `text`, if it lies within it. A position at the end of
    /// a line (just before its newline) is within the text.
    pub fn to_offset(self, text: &str) -> Option<usize> {
        if self.line == 0 {
            return None;
        }
        let mut line_start = 0;
        for _ in 1..self.line {
            line_start += text[line_start..].find('\n')? + 1;
        }
        let line_text = match text[line_start..].find('\n') {
            Some(len) => &text[line_start..line_start + len],
            None => &text[line_start..],
        };
        if self.column == line_text.chars().count() {
            return Some(line_start + line_text.len());
        }
        line_text
            .char_indices()
            .nth(self.column)
            .map(|(offset, _)| line_start + offset)
    }
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Span {
        Span { start, end }
    }

    /// An empty span at `pos`, as used for a bare cursor.
    pub fn point(pos: Pos) -> Span {
        Span {
            start: pos,
            end: pos,
        }
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// The byte range of this span in `text`.
    pub fn to_range(self, text: &str) -> Option<Range<usize>> {
        let start = self.start.to_offset(text)?;
        let end = self.end.to_offset(text)?;
        if start <= end {
            Some(start..end)
        } else {
            None
        }
    }

    /// Removes this span from `text`. Returns `None` if the span does not lie within it.
    pub fn delete_from(self, text: &str) -> Option<String> {
        let range = self.to_range(text)?;
        let mut result = String::with_capacity(text.len() - range.len());
        result.push_str(&text[..range.start]);
        result.push_str(&text[range.end..]);
        Some(result)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(thiserror::Error, Debug)]
#[error("Failed to parse position from '{0}', expected LINE:COLUMN")]
pub struct PosParseError(String);

impl FromStr for Pos {
    type Err = PosParseError;

    fn from_str(s: &str) -> Result<Pos, PosParseError> {
        let err = || PosParseError(s.to_owned());
        let (line, column) = s.split_once(':').ok_or_else(err)?;
        let line = line.trim().parse::<Line>().map_err(|_| err())?;
        let column = column.trim().parse::<Col>().map_err(|_| err())?;
        if line == 0 {
            return Err(err());
        }
        Ok(Pos { line, column })
    }
}
