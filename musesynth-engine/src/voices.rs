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

//! Deciding what every voice plays while a note sounds.
//!
//! Each voice fills the slot of a 128th note with `count` equally long
//! notes. Counts that are not a power of two are written as tuplets.

use musesynth_core::duration::NoteValue;
use musesynth_core::error::{Error, Result};
use musesynth_core::event::{DrumPitch, Harmony};

use crate::action::{Action, ScoreSink};

/// A subdivision of the smallest notated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Division {
    count: u32,
    normal_notes: u32,
    base_unit: NoteValue,
}

impl Division {
    /// # Examples
    ///
    /// ```
    /// # use musesynth_engine::voices::Division;
    /// let triplet = Division::new(3).unwrap();
    /// assert_eq!(triplet.normal_notes(), 2);
    /// assert_eq!(triplet.base_unit().name(), "256th");
    /// assert!(triplet.is_irregular());
    ///
    /// let four = Division::new(4).unwrap();
    /// assert_eq!(four.normal_notes(), 4);
    /// assert_eq!(four.base_unit().name(), "512th");
    /// assert!(!four.is_irregular());
    /// ```
    pub fn new(count: u32) -> Result<Division> {
        if count == 0 {
            return Err(Error::UnsupportedDivision { count });
        }
        // largest power of two not exceeding count
        let normal_notes: u32 = 1 << (31 - count.leading_zeros());
        let exponent = NoteValue::SMALLEST_UNIT.exponent() + normal_notes.trailing_zeros();
        let base_unit =
            NoteValue::from_exponent(exponent).ok_or(Error::UnsupportedDivision { count })?;
        Ok(Division {
            count,
            normal_notes,
            base_unit,
        })
    }

    pub fn count(self) -> u32 {
        self.count
    }

    pub fn normal_notes(self) -> u32 {
        self.normal_notes
    }

    pub fn base_unit(self) -> NoteValue {
        self.base_unit
    }

    /// Whether the notes have to be grouped as a tuplet.
    pub fn is_irregular(self) -> bool {
        self.count != self.normal_notes
    }
}

/// What a single voice does during one tuplet step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicePart {
    Play(Division),
    Rest,
}

impl VoicePart {
    pub fn division(self) -> Option<Division> {
        match self {
            VoicePart::Play(division) => Some(division),
            VoicePart::Rest => None,
        }
    }

    /// Write one step of this part, taking up the time of one 128th note.
    pub fn emit<S: ScoreSink + ?Sized>(self, voice: usize, instrument: DrumPitch, sink: &mut S) {
        match self {
            VoicePart::Play(division) => {
                if division.is_irregular() {
                    sink.emit(Action::BeginTuplet {
                        normal_notes: division.normal_notes,
                        actual_notes: division.count,
                        base_unit: division.base_unit,
                        voice,
                    });
                }
                for _ in 0..division.count {
                    sink.emit(Action::PlayUnit {
                        instrument,
                        duration: division.base_unit,
                        voice,
                    });
                }
                if division.is_irregular() {
                    sink.emit(Action::EndTuplet { voice });
                }
            }
            VoicePart::Rest => sink.emit(Action::EmitRest {
                duration: NoteValue::SMALLEST_UNIT,
                voice,
            }),
        }
    }
}

/// The parts of all voices for one note. The lead voice always plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voicing {
    pub lead: Division,
    /// One part per voice, starting with the lead.
    pub parts: Vec<VoicePart>,
}

/// Assign a part to each of `voices` voices according to `harmony`.
pub fn allocate(harmony: Option<&Harmony>, voices: usize, default_division: u32) -> Result<Voicing> {
    let declared = |voice: usize| harmony.and_then(|harmony| harmony.division(voice));

    if let Some(harmony) = harmony {
        if let Some(voice) = (voices..harmony.divisions.len()).find(|&voice| declared(voice).is_some())
        {
            return Err(Error::UnknownVoice { voice, voices });
        }
    }

    let lead = match declared(0) {
        Some(0) => return Err(Error::SilentLeadVoice {}),
        Some(count) => Division::new(count)?,
        None => Division::new(default_division)?,
    };

    let mut parts = Vec::with_capacity(voices);
    parts.push(VoicePart::Play(lead));
    for voice in 1..voices {
        parts.push(match declared(voice) {
            None | Some(0) => VoicePart::Rest,
            Some(count) => VoicePart::Play(Division::new(count)?),
        });
    }
    Ok(Voicing { lead, parts })
}
