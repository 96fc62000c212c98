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

//! The ways in which turning a list of events into a score can fail.
//!
//! All of these indicate malformed input. None of them is recovered from,
//! the run that raised one has to be discarded.

use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("Invalid note name {:?}", name))]
    InvalidNoteName { name: String },

    #[snafu(display("Invalid alteration {:?} in note {:?}", alteration, name))]
    InvalidAlteration { name: String, alteration: String },

    #[snafu(display("Invalid duration {:?}, expected a positive fraction", fraction))]
    InvalidDurationFraction { fraction: String },

    #[snafu(display("Unsupported event kind {:?}", kind))]
    UnsupportedEventKind { kind: String },

    #[snafu(display("The number of voices must be declared before the first note, rest or instrument"))]
    MissingVoiceConfiguration {},

    #[snafu(display("A score needs at least one voice, got {}", count))]
    InvalidVoiceCount { count: usize },

    #[snafu(display(
        "The score already uses {} voices, cannot change to {}",
        declared,
        requested
    ))]
    VoiceCountFixed { declared: usize, requested: usize },

    #[snafu(display("Voice {} does not exist, the score has {} voices", voice, voices))]
    UnknownVoice { voice: usize, voices: usize },

    #[snafu(display("The lead voice cannot rest"))]
    SilentLeadVoice {},

    #[snafu(display("Cannot notate a 128th note split into {} notes", count))]
    UnsupportedDivision { count: u32 },

    #[snafu(display("The {} must be positive, got {}", setting, value))]
    NonPositiveSetting { setting: &'static str, value: f64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
