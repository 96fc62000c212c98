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

//! The input of the synthesis engine: a flat, ordered list of events.

use crate::rational::Rational;

/// MIDI pitch of a drum sound, the "instrument" a voice is played on.
pub type DrumPitch = u8;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Set the nominal tempo in quarter notes per minute.
    Tempo(f64),
    /// Set the frequency of A4 in Hz.
    Tuning(f64),
    /// Declare the number of simultaneous voices.
    Voices(usize),
    /// Choose the drum a voice is played on.
    Instrument { voice: usize, pitch: DrumPitch },
    /// Turn a named preference on or off.
    Preference { name: String, enabled: bool },
    Note(NoteRequest),
    Rest(RestRequest),
}

impl Event {
    /// The keyword naming this kind of event in a command file.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Tempo(_) => "tempo",
            Event::Tuning(_) => "tuning",
            Event::Voices(_) => "voices",
            Event::Instrument { .. } => "instrument",
            Event::Preference { .. } => "preference",
            Event::Note(_) => "note",
            Event::Rest(_) => "rest",
        }
    }
}

/// A pitched note, played by the lead voice and optionally accompanied by the other voices.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRequest {
    /// Note name such as `C#4`.
    pub name: String,
    /// Nominal duration in whole notes.
    pub duration: Rational,
    /// Note to glide towards over the course of this note.
    pub glide: Option<String>,
    pub harmony: Option<Harmony>,
}

impl NoteRequest {
    pub fn new<S: Into<String>>(name: S, duration: Rational) -> Self {
        NoteRequest {
            name: name.into(),
            duration,
            glide: None,
            harmony: None,
        }
    }

    pub fn with_glide<S: Into<String>>(mut self, target: S) -> Self {
        self.glide = Some(target.into());
        self
    }

    pub fn with_harmony(mut self, harmony: Harmony) -> Self {
        self.harmony = Some(harmony);
        self
    }
}

/// A rest in all voices at once.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    /// Nominal duration in whole notes.
    pub duration: Rational,
}

/// How many notes each voice plays per smallest unit while a note sounds.
///
/// Entry `i` belongs to voice `i`, where voice 0 is the lead. `None` leaves the
/// choice to the engine: the default subdivision for the lead, a rest for the others.
/// A declared count of 0 is a rest as well.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Harmony {
    pub divisions: Vec<Option<u32>>,
}

impl Harmony {
    pub fn new(divisions: Vec<Option<u32>>) -> Self {
        Harmony { divisions }
    }

    pub fn division(&self, voice: usize) -> Option<u32> {
        self.divisions.get(voice).copied().flatten()
    }
}
