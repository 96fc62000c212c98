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

//! Note names and the frequencies they stand for.
//!
//! A note is written as `<letter><alteration><octave>`, e.g. `C4`, `F#3`,
//! `Bb2`, `Gx5` or `Ebb1`. Frequencies follow twelve-tone equal temperament
//! relative to a configurable frequency of A4.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Highest octave a note name may use.
pub const MAX_OCTAVE: u32 = 20;

/// The name of a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteName {
    /// Both upper and lower case letters are accepted.
    pub fn from_char(ch: char) -> Option<NoteName> {
        match ch.to_ascii_uppercase() {
            'A' => Some(NoteName::A),
            'B' => Some(NoteName::B),
            'C' => Some(NoteName::C),
            'D' => Some(NoteName::D),
            'E' => Some(NoteName::E),
            'F' => Some(NoteName::F),
            'G' => Some(NoteName::G),
            _ => None,
        }
    }

    /// Distance from the C below, in semitones.
    pub fn semitones_from_c(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }
}

/// Any offset applied to a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    /// Parse the alteration between the letter and the octave of a note name.
    ///
    /// ```
    /// # use musesynth_core::note::Accidental;
    /// assert_eq!(Accidental::from_token(""), Some(Accidental::Natural));
    /// assert_eq!(Accidental::from_token("x"), Some(Accidental::DoubleSharp));
    /// assert_eq!(Accidental::from_token("♭"), Some(Accidental::Flat));
    /// assert_eq!(Accidental::from_token("##"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Accidental> {
        match token {
            "bb" => Some(Accidental::DoubleFlat),
            "b" | "♭" => Some(Accidental::Flat),
            "" => Some(Accidental::Natural),
            "#" | "♯" => Some(Accidental::Sharp),
            "x" => Some(Accidental::DoubleSharp),
            _ => None,
        }
    }

    pub fn semitones(self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Accidental::DoubleFlat => "bb",
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::DoubleSharp => "x",
        }
    }
}

/// A fully specified pitch in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pitch {
    pub name: NoteName,
    pub accidental: Accidental,
    pub octave: u32,
}

impl Pitch {
    /// Parse a name string of the format `<letter><alteration><octave>`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use musesynth_core::note::*;
    ///
    /// assert_eq!(
    ///     Pitch::parse("F#3"),
    ///     Ok(Pitch { name: NoteName::F, accidental: Accidental::Sharp, octave: 3 })
    /// );
    /// assert!(Pitch::parse("H4").is_err());
    /// assert!(Pitch::parse("C").is_err());
    /// ```
    pub fn parse(name_str: &str) -> Result<Pitch> {
        let invalid_name = || Error::InvalidNoteName {
            name: name_str.into(),
        };

        let mut chars = name_str.chars();
        let name = chars
            .next()
            .and_then(NoteName::from_char)
            .ok_or_else(invalid_name)?;

        let rest = chars.as_str();
        let alteration = rest.trim_end_matches(|ch: char| ch.is_ascii_digit());
        let accidental =
            Accidental::from_token(alteration).ok_or_else(|| Error::InvalidAlteration {
                name: name_str.into(),
                alteration: alteration.into(),
            })?;

        let octave_str = &rest[alteration.len()..];
        if octave_str.is_empty() {
            return Err(invalid_name());
        }
        let octave = octave_str
            .parse()
            .ok()
            .filter(|&octave| octave <= MAX_OCTAVE)
            .ok_or_else(invalid_name)?;

        Ok(Pitch {
            name,
            accidental,
            octave,
        })
    }

    /// Signed distance to A4 in semitones.
    ///
    /// ```
    /// # use musesynth_core::note::*;
    /// assert_eq!(Pitch::parse("A4").unwrap().semitones_from_a4(), 0);
    /// assert_eq!(Pitch::parse("C4").unwrap().semitones_from_a4(), -9);
    /// assert_eq!(Pitch::parse("Cb5").unwrap().semitones_from_a4(), 2);
    /// ```
    pub fn semitones_from_a4(self) -> i32 {
        // A4 sits 4 octaves and 9 semitones above C0
        self.name.semitones_from_c() + self.accidental.semitones() + 12 * self.octave as i32
            - (4 * 12 + 9)
    }

    /// Frequency in Hz when A4 sounds at `a4` Hz.
    ///
    /// This is `C1 * 2^(offset/12) * 2^(octave-1)` with `C1 = a4 / 16 * 2^(3/12)`,
    /// folded into a single power so that A4 maps onto `a4` exactly.
    pub fn frequency(self, a4: f64) -> f64 {
        a4 * 2.0f64.powf(self.semitones_from_a4() as f64 / 12.0)
    }
}

impl FromStr for Pitch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pitch::parse(s)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}{}{}",
            self.name,
            self.accidental.symbol(),
            self.octave
        )
    }
}

/// Resolve a note name to its frequency in Hz, given the frequency of A4.
///
/// # Examples
///
/// ```
/// # use musesynth_core::note::frequency;
/// assert_eq!(frequency("A4", 440.0), Ok(440.0));
/// assert_eq!(frequency("A5", 440.0), Ok(880.0));
/// assert_eq!(frequency("A4", 442.0), Ok(442.0));
/// ```
pub fn frequency(name: &str, a4: f64) -> Result<f64> {
    Pitch::parse(name).map(|pitch| pitch.frequency(a4))
}

#[cfg(test)]
mod test {
    use super::*;

    const SEMITONE: f64 = 1.059_463_094_359_295_3;

    fn hz(name: &str) -> f64 {
        frequency(name, 440.0).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9 * expected,
            "{} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn reference_anchor() {
        assert_eq!(hz("A4"), 440.0);
        assert_eq!(frequency("A4", 415.0).unwrap(), 415.0);
    }

    #[test]
    fn middle_c() {
        assert_close(hz("C4"), 261.625_565_300_598_6);
        // C1 as anchored from A0
        assert_close(hz("C1"), 440.0 / 16.0 * 2.0f64.powf(3.0 / 12.0));
    }

    #[test]
    fn octaves_increase_monotonically() {
        for name in &["C", "D", "Eb", "F#", "G", "Ax", "Bbb"] {
            let mut last = 0.0;
            for octave in 0..9 {
                let freq = hz(&format!("{}{}", name, octave));
                assert!(freq > last, "{}{} does not rise", name, octave);
                if octave > 0 {
                    assert_close(freq, 2.0 * last);
                }
                last = freq;
            }
        }
    }

    #[test]
    fn semitone_steps() {
        let chromatic = [
            "C4", "C#4", "D4", "D#4", "E4", "F4", "F#4", "G4", "G#4", "A4", "A#4", "B4", "C5",
        ];
        for pair in chromatic.windows(2) {
            assert_close(hz(pair[1]), hz(pair[0]) * SEMITONE);
        }
    }

    #[test]
    fn enharmonic_spellings() {
        assert_close(hz("Cb4"), hz("B3"));
        assert_close(hz("B#3"), hz("C4"));
        assert_close(hz("Fx4"), hz("G4"));
        assert_close(hz("Ebb4"), hz("D4"));
        assert_close(hz("G♯2"), hz("Ab2"));
        assert_close(hz("e♭5"), hz("D#5"));
    }

    #[test]
    fn invalid_alterations() {
        for letter in &["A", "B", "C", "D", "E", "F", "G"] {
            for alteration in &["##", "bbb", "xx", "s", "#b"] {
                let name = format!("{}{}4", letter, alteration);
                assert_eq!(
                    frequency(&name, 440.0),
                    Err(Error::InvalidAlteration {
                        name: name.clone(),
                        alteration: alteration.to_string(),
                    })
                );
            }
        }
        // also without an octave
        assert!(matches!(
            frequency("C##", 440.0),
            Err(Error::InvalidAlteration { .. })
        ));
    }

    #[test]
    fn invalid_names() {
        for name in &["", "H4", "4", "#4", "C", "Cb"] {
            assert_eq!(
                frequency(name, 440.0),
                Err(Error::InvalidNoteName {
                    name: name.to_string()
                })
            );
        }
    }

    #[test]
    fn octave_range() {
        assert!(hz("C20") > hz("B19"));
        for name in &["C21", "A200000000", "C99999999999"] {
            assert_eq!(
                frequency(name, 440.0),
                Err(Error::InvalidNoteName {
                    name: name.to_string()
                })
            );
        }
    }

    #[test]
    fn display_round_trips_spelling() {
        assert_eq!(Pitch::parse("g♯2").unwrap().to_string(), "G#2");
        assert_eq!(Pitch::parse("Ebb1").unwrap().to_string(), "Ebb1");
    }
}
