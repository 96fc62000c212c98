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


//! The temporal pitch-synthesis engine.
//!
//! A drum that is hit often enough in a row is heard as a pitch. The engine
//! writes every note as a run of very short drum hits and sets the tempo so
//! that the hits arrive at the frequency of the note, while keeping the note
//! as long as the score asks for.

// Working out tempos and lengths
pub mod glide;
pub mod timer;
pub mod voices;

// Running a score
pub mod action;
pub mod config;
pub mod driver;
