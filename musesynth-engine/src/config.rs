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

//! Engine settings that are not part of the score itself.

use musesynth_core::event::DrumPitch;

/// Notes per smallest unit in the lead voice when a note does not say otherwise.
pub const DEFAULT_DIVISION: u32 = 4;

/// Low floor tom in the General MIDI percussion map.
pub const DEFAULT_DRUM: DrumPitch = 41;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Subdivision of the lead voice for notes without an explicit lead division.
    pub default_division: u32,
    /// Drum played by voices that were never assigned an instrument.
    pub default_instrument: DrumPitch,
    /// Initial state of the `displaytempos` preference.
    pub display_tempos: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_division: DEFAULT_DIVISION,
            default_instrument: DEFAULT_DRUM,
            display_tempos: false,
        }
    }
}
