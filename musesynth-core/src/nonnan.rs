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

//! Floats that cannot be NaN by construction, and hence are `Ord` and `Eq`.
//!
//! Tempo and tuning literals are kept in this form inside the syntax tree,
//! so that the tree can still derive `Eq`.

use std::{fmt, num::ParseFloatError, str::FromStr};

/// A non-nan f64.
#[derive(Debug, Clone, Copy)]
pub struct F64N(f64);

impl F64N {
    /// ```
    /// # use musesynth_core::nonnan::F64N;
    /// assert_eq!(F64N::new(442.5).map(F64N::into_inner), Some(442.5));
    /// assert!(F64N::new(f64::NAN).is_none());
    /// ```
    pub fn new(value: f64) -> Option<F64N> {
        if value.is_nan() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn into_inner(self) -> f64 {
        self.0
    }
}

impl PartialEq for F64N {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for F64N {}

impl PartialOrd for F64N {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for F64N {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).expect("bug: non-nan is nan")
    }
}

impl fmt::Display for F64N {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for F64N {
    type Err = ParseNonNanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.parse::<f64>()?).ok_or(ParseNonNanError::Nan)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseNonNanError {
    Nan,
    Other(ParseFloatError),
}

impl fmt::Display for ParseNonNanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseNonNanError::Nan => write!(f, "float was nan"),
            ParseNonNanError::Other(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for ParseNonNanError {}

impl From<ParseFloatError> for ParseNonNanError {
    fn from(err: ParseFloatError) -> Self {
        ParseNonNanError::Other(err)
    }
}
