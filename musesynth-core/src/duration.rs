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

//! Converting between durations and counts of the smallest notated unit,
//! and spelling out durations with standard note values.

use std::fmt;

use crate::error::{Error, Result};
use crate::rational::Rational;

/// How many of the smallest notated units (128th notes) make up a whole note.
pub const UNITS_PER_WHOLE: i64 = 128;

/// How many of the smallest notated units make up one beat (a quarter note).
pub const UNITS_PER_BEAT: i64 = UNITS_PER_WHOLE / 4;

/// The largest note value used when spelling out rests, in units.
pub const MAX_REST_UNITS: i64 = 64;

/// A note length of `1 / 2^exponent` of a whole note, from a whole note down to a 1024th.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoteValue {
    exponent: u32,
}

impl NoteValue {
    pub const WHOLE: NoteValue = NoteValue { exponent: 0 };
    pub const HALF: NoteValue = NoteValue { exponent: 1 };
    pub const QUARTER: NoteValue = NoteValue { exponent: 2 };
    /// The smallest unit that a plain, non-subdivided note or rest may have.
    pub const SMALLEST_UNIT: NoteValue = NoteValue { exponent: 7 };

    const MAX_EXPONENT: u32 = 10;

    /// ```
    /// # use musesynth_core::duration::NoteValue;
    /// assert_eq!(NoteValue::from_exponent(2), Some(NoteValue::QUARTER));
    /// assert_eq!(NoteValue::from_exponent(11), None);
    /// ```
    pub fn from_exponent(exponent: u32) -> Option<NoteValue> {
        if exponent <= Self::MAX_EXPONENT {
            Some(NoteValue { exponent })
        } else {
            None
        }
    }

    /// The note value spanning `2^k` smallest units, for `k` in `0..=7`.
    ///
    /// ```
    /// # use musesynth_core::duration::NoteValue;
    /// assert_eq!(NoteValue::from_unit_power(0), Some(NoteValue::SMALLEST_UNIT));
    /// assert_eq!(NoteValue::from_unit_power(6), Some(NoteValue::HALF));
    /// assert_eq!(NoteValue::from_unit_power(8), None);
    /// ```
    pub fn from_unit_power(k: u32) -> Option<NoteValue> {
        Self::SMALLEST_UNIT
            .exponent
            .checked_sub(k)
            .map(|exponent| NoteValue { exponent })
    }

    pub fn exponent(self) -> u32 {
        self.exponent
    }

    /// Length as a fraction of a whole note.
    pub fn length(self) -> Rational {
        Rational::nth(1 << self.exponent)
    }

    /// Length in smallest units, if it is a whole number of them.
    ///
    /// ```
    /// # use musesynth_core::duration::NoteValue;
    /// assert_eq!(NoteValue::QUARTER.units(), Some(32));
    /// assert_eq!(NoteValue::from_exponent(9).unwrap().units(), None);
    /// ```
    pub fn units(self) -> Option<i64> {
        Self::SMALLEST_UNIT
            .exponent
            .checked_sub(self.exponent)
            .map(|k| 1 << k)
    }

    /// The name MuseScore uses as `durationType`.
    pub fn name(self) -> &'static str {
        match self.exponent {
            0 => "whole",
            1 => "half",
            2 => "quarter",
            3 => "eighth",
            4 => "16th",
            5 => "32nd",
            6 => "64th",
            7 => "128th",
            8 => "256th",
            9 => "512th",
            _ => "1024th",
        }
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of smallest units in a duration, rounded towards zero.
/// Fails for durations too long to be counted in units.
///
/// ```
/// # use musesynth_core::{duration::units, rational::Rational};
/// assert_eq!(units(Rational::new(1, 4)), Ok(32));
/// assert_eq!(units(Rational::new(7, 128)), Ok(7));
/// assert_eq!(units(Rational::new(1, 256)), Ok(0));
/// assert_eq!(units(Rational::int(2)), Ok(256));
/// assert!(units(Rational::int(1 << 60)).is_err());
/// ```
pub fn units(duration: Rational) -> Result<i64> {
    duration
        .checked_mul_int(UNITS_PER_WHOLE)
        .map(Rational::truncate)
        .ok_or_else(|| Error::InvalidDurationFraction {
            fraction: duration.to_string(),
        })
}

/// The duration spanned by a number of smallest units.
///
/// ```
/// # use musesynth_core::{duration::fraction, rational::Rational};
/// assert_eq!(fraction(96), Rational::new(3, 4));
/// ```
pub fn fraction(units: i64) -> Rational {
    Rational::new(units, UNITS_PER_WHOLE)
}

/// Parse a duration written as `<int>` or `<int>/<int>` whole notes.
/// The duration must be strictly positive.
///
/// ```
/// # use musesynth_core::{duration::parse_fraction, rational::Rational};
/// assert_eq!(parse_fraction("3/8"), Ok(Rational::new(3, 8)));
/// assert_eq!(parse_fraction("2"), Ok(Rational::int(2)));
/// assert!(parse_fraction("0/4").is_err());
/// assert!(parse_fraction("1/0").is_err());
/// assert!(parse_fraction("quarter").is_err());
/// ```
pub fn parse_fraction(text: &str) -> Result<Rational> {
    text.parse()
        .ok()
        .filter(|duration: &Rational| duration.is_positive())
        .ok_or_else(|| Error::InvalidDurationFraction {
            fraction: text.into(),
        })
}

/// Check that an already parsed duration is usable for a note or rest.
pub fn validate(duration: Rational) -> Result<Rational> {
    if duration.is_positive() {
        units(duration).map(|_| duration)
    } else {
        Err(Error::InvalidDurationFraction {
            fraction: duration.to_string(),
        })
    }
}

/// Spell out a rest of the given number of smallest units with as few note values as possible,
/// largest first. Half rests are the largest used, so that no rest ever crosses a beat grouping
/// that would require a whole-measure rest.
///
/// # Examples
///
/// ```
/// # use musesynth_core::duration::*;
/// let names: Vec<_> = decompose_rest(7).into_iter().map(NoteValue::name).collect();
/// assert_eq!(names, vec!["32nd", "64th", "128th"]);
/// ```
pub fn decompose_rest(units: i64) -> Vec<NoteValue> {
    let mut values = Vec::new();
    let mut remaining = units;
    while remaining > 0 {
        let k = (63 - remaining.leading_zeros()).min(MAX_REST_UNITS.trailing_zeros());
        values.push(NoteValue::from_unit_power(k).expect("k is at most 6"));
        remaining -= 1 << k;
    }
    values
}

#[cfg(test)]
mod test {
    use super::*;

    fn total_units(values: &[NoteValue]) -> i64 {
        values.iter().map(|value| value.units().unwrap()).sum()
    }

    #[test]
    fn rest_of_seven_units() {
        assert_eq!(
            decompose_rest(units(Rational::new(7, 128)).unwrap()),
            vec![
                NoteValue::from_exponent(5).unwrap(),
                NoteValue::from_exponent(6).unwrap(),
                NoteValue::SMALLEST_UNIT,
            ]
        );
    }

    #[test]
    fn rests_reconstruct_their_length() {
        for u in 1..2000 {
            let values = decompose_rest(u);
            assert_eq!(total_units(&values), u);
            let bound = (u + MAX_REST_UNITS - 1) / MAX_REST_UNITS + 6;
            assert!(values.len() as i64 <= bound, "{} symbols for {}", values.len(), u);
        }
    }

    #[test]
    fn rests_are_largest_first() {
        for u in 1..500 {
            let values = decompose_rest(u);
            assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn long_rests_repeat_half_notes() {
        let values = decompose_rest(3 * 64 + 32);
        assert_eq!(
            values,
            vec![
                NoteValue::HALF,
                NoteValue::HALF,
                NoteValue::HALF,
                NoteValue::QUARTER
            ]
        );
    }

    #[test]
    fn empty_rest() {
        assert!(decompose_rest(0).is_empty());
        assert!(decompose_rest(-3).is_empty());
    }

    #[test]
    fn note_value_lengths() {
        assert_eq!(NoteValue::WHOLE.length(), Rational::one());
        assert_eq!(NoteValue::SMALLEST_UNIT.length(), Rational::nth(128));
        assert_eq!(NoteValue::from_exponent(10).unwrap().length(), Rational::nth(1024));
        assert_eq!(NoteValue::from_exponent(10).unwrap().name(), "1024th");
        assert_eq!(NoteValue::WHOLE.units(), Some(128));
        assert_eq!(fraction(units(Rational::new(5, 16)).unwrap()), Rational::new(5, 16));
    }

    #[test]
    fn durations_too_long_to_count() {
        let huge = Rational::int(i64::MAX / 64);
        assert_eq!(
            validate(huge),
            Err(Error::InvalidDurationFraction {
                fraction: huge.to_string()
            })
        );
        assert_eq!(validate(Rational::int(1 << 40)), Ok(Rational::int(1 << 40)));
    }

    #[test]
    fn invalid_fractions() {
        for text in &["", "-1/4", "0", "1/0", "1/2/3", "a/4"] {
            assert_eq!(
                parse_fraction(text),
                Err(Error::InvalidDurationFraction {
                    fraction: text.to_string()
                })
            );
        }
        assert!(validate(Rational::ZERO).is_err());
        assert_eq!(validate(Rational::nth(8)), Ok(Rational::nth(8)));
    }
}
