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

//! Working out at which tempo a note has to be written, and how many tuplets it takes.
//!
//! A drum triggered once per subdivision of a 128th note sounds at a pitch
//! proportional to the tempo. Raising the tempo also makes every notated
//! unit pass faster, so the number of written units is scaled by the same
//! factor to keep the note as long as it would be at the nominal tempo.

use musesynth_core::duration::{UNITS_PER_BEAT, UNITS_PER_WHOLE};
use musesynth_core::error::Result;
use musesynth_core::note;
use musesynth_core::rational::Rational;

/// Tempo and tuning in effect when an event is processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreContext {
    /// Nominal tempo in quarter notes per minute.
    pub tempo: f64,
    /// Frequency of A4 in Hz.
    pub tuning: f64,
}

impl Default for ScoreContext {
    fn default() -> Self {
        ScoreContext {
            tempo: 120.0,
            tuning: 440.0,
        }
    }
}

/// Everything needed to write a single pitched note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteTiming {
    /// Frequency in Hz.
    pub frequency: f64,
    /// Tempo at which the notes have to be written.
    pub tempo: f64,
    /// Number of tuplets, each of which takes the place of one 128th note.
    pub length: i64,
}

/// Tempo at which `division` triggers per 128th note produce `frequency`.
///
/// ```
/// # use musesynth_engine::timer::local_tempo;
/// assert_eq!(local_tempo(440.0, 4), 206.25);
/// ```
pub fn local_tempo(frequency: f64, division: u32) -> f64 {
    let triggers_per_minute = frequency * 60.0;
    let triggers_per_beat = division as f64 * UNITS_PER_BEAT as f64;
    triggers_per_minute / triggers_per_beat
}

/// Number of tuplets needed at `local` tempo to last as long as `duration` does at `nominal` tempo.
pub fn tuplet_count(local: f64, nominal: f64, duration: Rational, division: u32) -> i64 {
    let ratio = local / nominal;
    let notes_per_whole = (division as i64 * UNITS_PER_WHOLE) as f64;
    let notes = notes_per_whole * ratio * duration.to_f64();
    (notes / division as f64).round() as i64
}

/// Resolve a note name and nominal duration into the tempo and tuplet count that realize it.
///
/// This has no side effects, it is used for a note itself as well as for the
/// note it glides to.
pub fn resolve_note(
    name: &str,
    duration: Rational,
    division: u32,
    context: &ScoreContext,
) -> Result<NoteTiming> {
    let frequency = note::frequency(name, context.tuning)?;
    let tempo = local_tempo(frequency, division);
    let length = tuplet_count(tempo, context.tempo, duration, division);
    Ok(NoteTiming {
        frequency,
        tempo,
        length,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use musesynth_core::error::Error;

    #[test]
    fn quarter_middle_c() {
        let timing = resolve_note("C4", Rational::new(1, 4), 4, &ScoreContext::default()).unwrap();
        let frequency = 440.0 * 2.0f64.powf(-9.0 / 12.0);
        let tempo = frequency * 60.0 / (4.0 * 32.0);
        assert!((timing.frequency - frequency).abs() < 1e-9);
        assert!((timing.tempo - tempo).abs() < 1e-9);
        assert!((timing.tempo - 122.637).abs() < 1e-3);
        assert_eq!(timing.length, 33);
    }

    #[test]
    fn quarter_concert_a() {
        let timing = resolve_note("A4", Rational::new(1, 4), 4, &ScoreContext::default()).unwrap();
        assert_eq!(timing.tempo, 206.25);
        assert_eq!(timing.length, 55);
    }

    #[test]
    fn length_follows_nominal_tempo() {
        let slow = ScoreContext {
            tempo: 60.0,
            ..ScoreContext::default()
        };
        let timing = resolve_note("C4", Rational::new(1, 4), 4, &slow).unwrap();
        assert_eq!(timing.length, 65);
    }

    #[test]
    fn length_scales_with_duration() {
        let context = ScoreContext::default();
        let quarter = resolve_note("A4", Rational::new(1, 4), 4, &context).unwrap();
        let whole = resolve_note("A4", Rational::one(), 4, &context).unwrap();
        assert_eq!(whole.length, 4 * quarter.length);
    }

    #[test]
    fn finer_division_lowers_tempo() {
        let context = ScoreContext::default();
        let four = resolve_note("E5", Rational::new(1, 2), 4, &context).unwrap();
        let eight = resolve_note("E5", Rational::new(1, 2), 8, &context).unwrap();
        assert!((four.tempo - 2.0 * eight.tempo).abs() < 1e-9);
        // the tuplet count stays in the same ballpark, just rounded differently
        assert!((four.length - 2 * eight.length).abs() <= 1);
    }

    #[test]
    fn tuning_moves_the_tempo() {
        let baroque = ScoreContext {
            tuning: 415.0,
            ..ScoreContext::default()
        };
        let timing = resolve_note("A4", Rational::new(1, 4), 4, &baroque).unwrap();
        assert_eq!(timing.frequency, 415.0);
        assert_eq!(timing.tempo, 415.0 * 60.0 / 128.0);
    }

    #[test]
    fn invalid_names_propagate() {
        let result = resolve_note("C##4", Rational::new(1, 4), 4, &ScoreContext::default());
        assert!(matches!(result, Err(Error::InvalidAlteration { .. })));
    }
}
