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

//! Exact fractions, used for note durations measured in whole notes.

use std::convert::TryFrom;
use std::error::Error;
use std::fmt;
use std::{cmp::Ordering, ops};

/// Underlying integral type for the rational numbers.
type Int = i64;

/// A rational number, always fully normalized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Rational {
    /// The numerator of the fraction.
    /// If the fraction is negative, the numerator will be made negative.
    num: Int,
    /// The denominator of the fraction, always positive.
    denom: Int,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, denom: 1 };

    /// Create a new rational from a potentially unnormalized fraction.
    ///
    /// # Panic
    ///
    /// Panics if the denominator is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use musesynth_core::rational::*;
    ///
    /// assert_eq!(Rational::new(32, 128), Rational::new(1, 4));
    /// assert_eq!(Rational::new(-3, -12), Rational::new(1, 4));
    /// assert_eq!(Rational::new(-6, 8), Rational::new(3, -4));
    /// ```
    pub fn new(num: Int, denom: Int) -> Rational {
        assert_ne!(denom, 0, "Denominator must not be zero");
        Rational::checked_new(num, denom).expect("Int::MIN cannot be normalized")
    }

    /// Like [`Rational::new`], but returns `None` for a zero denominator or
    /// when numerator or denominator is `Int::MIN`, which has no positive counterpart.
    ///
    /// ```
    /// # use musesynth_core::rational::*;
    /// assert_eq!(Rational::checked_new(6, -8), Some(Rational::new(-3, 4)));
    /// assert_eq!(Rational::checked_new(1, 0), None);
    /// assert_eq!(Rational::checked_new(i64::MIN, 3), None);
    /// ```
    pub fn checked_new(num: Int, denom: Int) -> Option<Rational> {
        if denom == 0 {
            return None;
        }
        let sign = num.signum() * denom.signum();
        let (num, denom) = (num.checked_abs()?, denom.checked_abs()?);
        let div = gcd(num, denom);
        Some(Rational {
            num: sign * num / div,
            denom: denom / div,
        })
    }

    /// Multiply by an integer, or `None` on overflow.
    ///
    /// ```
    /// # use musesynth_core::rational::*;
    /// assert_eq!(Rational::new(3, 4).checked_mul_int(8), Some(Rational::int(6)));
    /// assert_eq!(Rational::int(1 << 60).checked_mul_int(128), None);
    /// ```
    pub fn checked_mul_int(self, rhs: Int) -> Option<Rational> {
        Rational::checked_new(self.num.checked_mul(rhs)?, self.denom)
    }

    pub const fn int(int: Int) -> Rational {
        Rational { num: int, denom: 1 }
    }

    pub const fn one() -> Rational {
        Rational::int(1)
    }

    /// The fraction `1/n`, e.g. `Rational::nth(128)` for a 128th note.
    pub fn nth(n: Int) -> Self {
        Rational::new(1, n)
    }

    pub const fn recip(self) -> Rational {
        Rational {
            num: self.denom,
            denom: self.num,
        }
    }

    /// Round towards zero.
    ///
    /// ```
    /// # use musesynth_core::rational::*;
    ///
    /// assert_eq!(Rational::new(10, 5).truncate(), 2);
    /// assert_eq!(Rational::new(-10, 6).truncate(), -1);
    /// assert_eq!(Rational::new(127, 128).truncate(), 0);
    /// ```
    pub const fn truncate(self) -> Int {
        self.num / self.denom
    }

    /// The closest floating point value.
    ///
    /// ```
    /// # use musesynth_core::rational::*;
    ///
    /// assert_eq!(Rational::new(1, 4).to_f64(), 0.25);
    /// assert_eq!(Rational::new(-3, 8).to_f64(), -0.375);
    /// ```
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    pub const fn is_positive(self) -> bool {
        self.num > 0
    }

    pub const fn numerator(self) -> Int {
        self.num
    }

    pub const fn denominator(self) -> Int {
        self.denom
    }
}

/// # Examples
///
/// ```
/// use musesynth_core::rational::*;
///
/// assert_eq!(Rational::new(1, 2) + Rational::new(3, 4), Rational::new(5, 4));
/// assert_eq!(Rational::new(1, 4) + Rational::new(-1, 8), Rational::new(1, 8));
/// ```
impl ops::Add for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Rational) -> Self::Output {
        Rational::new(
            self.num * rhs.denom + self.denom * rhs.num,
            self.denom * rhs.denom,
        )
    }
}

impl ops::Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Self::Output {
        self + (-rhs)
    }
}

impl ops::Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Self::Output {
        Rational::new(self.num * rhs.num, self.denom * rhs.denom)
    }
}

impl ops::Div for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Rational) -> Self::Output {
        self * rhs.recip()
    }
}

impl ops::Mul<Int> for Rational {
    type Output = Rational;

    fn mul(self, rhs: Int) -> Self::Output {
        Rational::new(self.num * rhs, self.denom)
    }
}

/// ```
/// # use musesynth_core::rational::*;
/// assert_eq!(Rational::new(1, 4) / 2, Rational::new(1, 8));
/// assert_eq!(Rational::int(1) / 3, Rational::new(1, 3));
/// ```
impl ops::Div<Int> for Rational {
    type Output = Rational;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: Int) -> Self::Output {
        Rational::new(self.num, self.denom * rhs)
    }
}

impl ops::Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational {
            num: -self.num,
            denom: self.denom,
        }
    }
}

impl ops::AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Rational {
        iter.fold(Rational::ZERO, |accum, item| accum + item)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Rational) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// ```
/// use musesynth_core::rational::*;
///
/// assert!(Rational::new(1, 8) < Rational::new(3, 16));
/// ```
impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // a / b < c / d  <=>  a * d < c * b, since both denominators are positive
        let l = self.num * other.denom;
        let r = other.num * self.denom;
        l.cmp(&r)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.num)?;
        if self.denom != 1 {
            write!(f, "/{}", self.denom)?;
        }
        Ok(())
    }
}

/// An error which can be returned when parsing a rational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRationalError(RationalErrorKind);

impl ParseRationalError {
    pub fn kind(&self) -> RationalErrorKind {
        self.0
    }
}

impl Error for ParseRationalError {}

impl fmt::Display for ParseRationalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            RationalErrorKind::InvalidInt => write!(f, "invalid integer literal"),
            RationalErrorKind::Zero => write!(f, "denominator is zero"),
            RationalErrorKind::Malformed => write!(f, "malformed fraction"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RationalErrorKind {
    /// The numerator or denominator could not be parsed as integer.
    InvalidInt,
    /// The denominator was zero
    Zero,
    /// The rational was not of the form `<int>` or `<int>/<int>`
    Malformed,
}

/// Parse `<int>` or `<int>/<int>`.
///
/// ```
/// # use musesynth_core::rational::*;
/// assert_eq!("3/4".parse::<Rational>(), Ok(Rational::new(3, 4)));
/// assert_eq!("2".parse::<Rational>(), Ok(Rational::int(2)));
/// assert_eq!("1/0".parse::<Rational>().unwrap_err().kind(), RationalErrorKind::Zero);
/// assert_eq!("1/2/3".parse::<Rational>().unwrap_err().kind(), RationalErrorKind::Malformed);
/// assert_eq!(
///     "-9223372036854775808/3".parse::<Rational>().unwrap_err().kind(),
///     RationalErrorKind::InvalidInt
/// );
/// ```
impl std::str::FromStr for Rational {
    type Err = ParseRationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        let numerator: Int = parts
            .next()
            .unwrap_or_default()
            .parse()
            .map_err(|_| ParseRationalError(RationalErrorKind::InvalidInt))?;

        if let Some(denominator_str) = parts.next() {
            let denominator = denominator_str
                .parse()
                .map_err(|_| ParseRationalError(RationalErrorKind::InvalidInt))?;
            if denominator == 0 {
                Err(ParseRationalError(RationalErrorKind::Zero))
            } else if parts.next().is_some() {
                Err(ParseRationalError(RationalErrorKind::Malformed))
            } else {
                Rational::checked_new(numerator, denominator)
                    .ok_or(ParseRationalError(RationalErrorKind::InvalidInt))
            }
        } else if numerator == Int::MIN {
            Err(ParseRationalError(RationalErrorKind::InvalidInt))
        } else {
            Ok(Rational::int(numerator))
        }
    }
}

/// Computes the greatest common divisor of two numbers using euclids algorithm.
///
/// # Example
///
/// ```
/// use musesynth_core::rational::*;
///
/// assert_eq!(gcd(128, 96), 32);
/// assert_eq!(gcd(20, 19), 1);
/// assert_eq!(gcd(10, 0), 10);
/// assert_eq!(gcd(0, 0), 0);
/// assert_eq!(gcd(10, -10), 10);
/// assert_eq!(gcd(i64::MIN, 6), 2);
/// ```
pub fn gcd(a: Int, b: Int) -> Int {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    // only gcd(Int::MIN, 0) and gcd(Int::MIN, Int::MIN) do not fit
    Int::try_from(a).unwrap_or(Int::MIN)
}
