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


//! A small line based language for writing down the events of a score.
//!
//! ```text
//! voices 2
//! tempo 100
//! note C4 1/4 glide=E4
//! note A3 1/4 harmony=_,6
//! rest 7/128
//! ```

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod line_map;
pub mod parser;
