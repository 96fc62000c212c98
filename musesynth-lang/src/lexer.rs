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


//! Tokens of the command language.

use logos::Logos;

// Re-exports
pub use logos::Span;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(subpattern decimal = r"[0-9][_0-9]*")]
pub enum Token {
    // Punctuation
    #[token("=")]
    Equals,
    #[token(",")]
    Comma,
    #[token("\n")]
    Newline,

    // Keywords, note names, option names and `_`
    #[regex("[a-zA-Z_][a-zA-Z0-9_#♯♭]*")]
    Word,

    // Literals
    #[regex(r"[+-]?(?&decimal)")]
    LitInt,
    #[regex(r"[+-]?(?&decimal)\.(?&decimal)")]
    LitFloat,
    #[regex(r"[+-]?(?&decimal)/(?&decimal)")]
    LitRatio,

    #[error]
    #[regex(r"[ \t\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,
}
