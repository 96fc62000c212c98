// muse-synth -- pitched music from rapidly triggered drums
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.


//! Turning byte spans into line and column positions for error reports.

use std::fmt::{self, Write};

pub use logos::Span;

/// Position inside a text in a form that's useful for human readers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct Pos {
    /// Line number, starting at 1
    pub line: usize,
    /// Position within the line, in characters, starting at 1
    pub column: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets of a source text to line/column based positions.
pub struct LineMap<'a> {
    /// Byte offset at which each line starts, the first one always being 0.
    line_starts: Vec<usize>,
    source: &'a str,
}

impl<'a> LineMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(pos, _)| pos + 1))
            .collect();
        Self {
            line_starts,
            source,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// # Examples
    ///
    /// ```
    /// # use musesynth_lang::line_map::{LineMap, Pos};
    /// let m = LineMap::new("abc\ndefg\naäb\n");
    /// assert_eq!(m.pos(0), Pos { line: 1, column: 1 });
    /// assert_eq!(m.pos(3), Pos { line: 1, column: 4 });
    /// assert_eq!(m.pos(4), Pos { line: 2, column: 1 });
    /// assert_eq!(m.pos(10), Pos { line: 3, column: 2 });
    /// assert_eq!(m.pos(12), Pos { line: 3, column: 3 });
    /// assert_eq!(m.pos(14), Pos { line: 4, column: 1 });
    /// ```
    pub fn pos(&self, offset: usize) -> Pos {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index - 1,
        };
        let start = self.line_starts[line];
        Pos {
            line: line + 1,
            column: self.source[start..offset].chars().count() + 1,
        }
    }

    /// Start and (exclusive) end position of a span.
    pub fn span_pos(&self, span: &Span) -> (Pos, Pos) {
        (self.pos(span.start), self.pos(span.end))
    }

    /// The extent of the given line (starting at 1), without its line break.
    ///
    /// ```
    /// # use musesynth_lang::line_map::LineMap;
    /// let m = LineMap::new("voices 1\nrest 1/4\n");
    /// assert_eq!(m.line_span(1), 0..8);
    /// assert_eq!(m.line_span(2), 9..17);
    /// assert_eq!(m.line_span(3), 18..18);
    /// ```
    pub fn line_span(&self, line: usize) -> Span {
        let index = line.max(1).min(self.line_count()) - 1;
        let begin = self.line_starts[index];
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.source.len(), |next| next - 1);
        begin..end
    }

    /// Print the lines touched by `span`, plus one before and one after, with line
    /// numbers, and underline the span itself with `^` symbols.
    ///
    /// # Examples
    ///
    /// ```
    /// # use musesynth_lang::line_map::*;
    /// let m = LineMap::new("voices 1\nnote H4 1/4\nrest 1/4");
    /// assert_eq!(
    ///   m.highlight(&(14..16), false),
    /// r#"   1|voices 1
    ///    2|note H4 1/4
    ///           ^^
    ///    3|rest 1/4
    /// "#
    /// )
    /// ```
    pub fn highlight(&self, span: &Span, colored: bool) -> String {
        let (start, end) = self.span_pos(span);
        let red = "\x1b[31;1m";
        let reset = "\x1b[0m";

        let mut out = String::new();
        let first = start.line.saturating_sub(1).max(1);
        let last = (end.line + 1).min(self.line_count());
        for line in first..=last {
            let text = &self.source[self.line_span(line)];
            let highlighted = line >= start.line && line <= end.line;

            if colored && highlighted {
                let _ = write!(&mut out, "{}{:4}{}|", red, line, reset);
            } else {
                let _ = write!(&mut out, "{:4}|", line);
            }
            out.push_str(text);
            out.push('\n');

            if highlighted {
                let from = if line == start.line { start.column } else { 1 };
                let to = if line == end.line {
                    end.column
                } else {
                    text.chars().count() + 1
                };
                out.push_str("     ");
                out.extend(std::iter::repeat(' ').take(from - 1));
                if colored {
                    out.push_str(red);
                }
                out.extend(std::iter::repeat('^').take(to.saturating_sub(from).max(1)));
                if colored {
                    out.push_str(reset);
                }
                out.push('\n');
            }
        }
        out
    }
}
