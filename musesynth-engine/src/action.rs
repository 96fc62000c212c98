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

//! The output of the engine: an ordered list of abstract score actions.
//!
//! Turning these into an actual score document is left to whoever consumes them.

use std::fmt;

use musesynth_core::duration::{self, NoteValue};
use musesynth_core::event::DrumPitch;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Change the tempo (quarter notes per minute). Tempo marks without a label are
    /// not meant to be shown to a reader.
    SetTempo { bpm: f64, label: Option<String> },
    /// Start a group of `actual_notes` notes of `base_unit` in the time of `normal_notes`.
    BeginTuplet {
        normal_notes: u32,
        actual_notes: u32,
        base_unit: NoteValue,
        voice: usize,
    },
    /// Trigger the drum once.
    PlayUnit {
        instrument: DrumPitch,
        duration: NoteValue,
        voice: usize,
    },
    EndTuplet { voice: usize },
    EmitRest { duration: NoteValue, voice: usize },
    /// Length of the single measure holding the whole score, in 128th notes.
    SetMeasureLength { units: i64 },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SetTempo { bpm, label } => {
                write!(f, "tempo {:.3}", bpm)?;
                if let Some(label) = label {
                    write!(f, " {:?}", label)?;
                }
                Ok(())
            }
            Action::BeginTuplet {
                normal_notes,
                actual_notes,
                base_unit,
                voice,
            } => write!(
                f,
                "v{} tuplet {}:{} {}",
                voice, actual_notes, normal_notes, base_unit
            ),
            Action::PlayUnit {
                instrument,
                duration,
                voice,
            } => write!(f, "v{} play {} {}", voice, instrument, duration),
            Action::EndTuplet { voice } => write!(f, "v{} end tuplet", voice),
            Action::EmitRest { duration, voice } => write!(f, "v{} rest {}", voice, duration),
            Action::SetMeasureLength { units } => {
                write!(f, "measure {}", duration::fraction(*units))
            }
        }
    }
}

/// Receives actions in the order they are produced.
pub trait ScoreSink {
    fn emit(&mut self, action: Action);
}

impl ScoreSink for Vec<Action> {
    fn emit(&mut self, action: Action) {
        self.push(action);
    }
}
