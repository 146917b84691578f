//! Number implementation.

use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{pow, Signed, Zero};

use crate::error::{Error, Eval};


/// Fractional digits computed for square roots without an exact answer.
pub const SQRT_DIGITS: usize = 50;

/// Fractional digits printed for non-integers when no precision is given.
/// Trailing zeros are dropped.
pub const DISPLAY_DIGITS: usize = 20;


fn ten_to(digits: usize) -> BigInt {
    pow(BigInt::from(10), digits)
}


/// Write a rational in decimal notation, rounded to the given number of
/// fractional digits.
fn write_decimal(
    f: &mut std::fmt::Formatter<'_>,
    x: &BigRational,
    digits: usize,
    trim: bool,
) -> std::fmt::Result {
    let scaled = (x * BigRational::from_integer(ten_to(digits))).round().to_integer();

    let mut text = scaled.abs().to_string();
    if text.len() <= digits {
        text = format!("{}{}", "0".repeat(digits + 1 - text.len()), text);
    }
    let (whole, frac) = text.split_at(text.len() - digits);
    let frac = if trim { frac.trim_end_matches('0') } else { frac };

    if scaled.is_negative() {
        f.write_str("-")?;
    }
    f.write_str(whole)?;
    match (digits, frac) {
        (0, _) => Ok(()),
        (_, "") => f.write_str(".0"),
        (_, frac) => f.write_fmt(format_args!(".{}", frac)),
    }
}


/// All numbers prec can compute with.
///
/// Both variants are exact and unbounded. A rational is never integral: any
/// result with denominator one is an integer. Use [`Number::from`] on a
/// [`BigRational`] to keep that so.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Number {
    Integer(BigInt),
    Rational(BigRational),
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Self::Integer(BigInt::from(value))
    }
}

impl From<BigRational> for Number {
    fn from(value: BigRational) -> Self {
        if value.is_integer() {
            Self::Integer(value.to_integer())
        } else {
            Self::Rational(value)
        }
    }
}

impl FromStr for Number {
    type Err = Error;

    /// Parse an integer literal with an optional sign.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('+').unwrap_or(s);
        BigInt::from_str(digits)
            .map(Number::Integer)
            .map_err(|_| Error::new(Eval::InvalidLiteral(s.to_owned())))
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(x), Self::Integer(y)) => x.cmp(y),
            _ => self.to_rational().cmp(&other.to_rational()),
        }
    }
}

impl Display for Number {
    /// Integers print in full. Rationals print in decimal, rounded to the
    /// formatter's precision if there is one.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(x) => f.write_fmt(format_args!("{}", x)),
            Self::Rational(x) => match f.precision() {
                Some(p) => write_decimal(f, x, p, false),
                None => write_decimal(f, x, DISPLAY_DIGITS, true),
            },
        }
    }
}

impl Number {
    /// Convert to a rational. Never loses precision.
    pub fn to_rational(&self) -> BigRational {
        match self {
            Self::Integer(x) => BigRational::from_integer(x.clone()),
            Self::Rational(x) => x.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Integer(x) => x.is_zero(),
            Self::Rational(x) => x.is_zero(),
        }
    }

    /// Universal utility method for implementing operators.
    ///
    /// If both operands are integers, `ixi` is applied. Otherwise both are
    /// converted to rationals and `rxr` is applied.
    fn operate(
        &self,
        other: &Number,
        ixi: impl Fn(&BigInt, &BigInt) -> BigInt,
        rxr: impl Fn(&BigRational, &BigRational) -> BigRational,
    ) -> Number {
        match (self, other) {
            (Self::Integer(x), Self::Integer(y)) => Number::Integer(ixi(x, y)),
            _ => Number::from(rxr(&self.to_rational(), &other.to_rational())),
        }
    }

    /// Sum of two numbers.
    pub fn add(&self, other: &Number) -> Number {
        self.operate(other, |x, y| x + y, |x, y| x + y)
    }

    /// Difference of two numbers.
    pub fn sub(&self, other: &Number) -> Number {
        self.operate(other, |x, y| x - y, |x, y| x - y)
    }

    /// Product of two numbers.
    pub fn mul(&self, other: &Number) -> Number {
        self.operate(other, |x, y| x * y, |x, y| x * y)
    }

    /// Mathematical ratio of two numbers. Always exact; the quotient of two
    /// integers is an integer if the division has no remainder.
    pub fn div(&self, other: &Number) -> Result<Number, Error> {
        if other.is_zero() {
            return Err(Error::new(Eval::DivisionByZero));
        }
        Ok(Number::from(self.to_rational() / other.to_rational()))
    }

    /// Unary (mathematical) negation.
    pub fn neg(&self) -> Number {
        match self {
            Self::Integer(x) => Number::Integer(-x),
            Self::Rational(x) => Number::Rational(-x),
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Number {
        match self {
            Self::Integer(x) => Number::Integer(x.abs()),
            Self::Rational(x) => Number::Rational(x.abs()),
        }
    }

    /// Square root.
    ///
    /// The root is exact when numerator and denominator are perfect squares.
    /// Otherwise it is truncated after [`SQRT_DIGITS`] fractional digits.
    pub fn sqrt(&self) -> Result<Number, Error> {
        let x = self.to_rational();
        if x.is_negative() {
            return Err(Error::new(Eval::OutOfRange));
        }

        let (numer, denom) = (x.numer(), x.denom());
        let (nroot, droot) = (numer.sqrt(), denom.sqrt());
        if &nroot * &nroot == *numer && &droot * &droot == *denom {
            return Ok(Number::from(BigRational::new(nroot, droot)));
        }

        // sqrt(n / d) = sqrt(n * d) / d
        let scale = ten_to(SQRT_DIGITS);
        let root = (numer * denom * &scale * &scale).sqrt();
        Ok(Number::from(BigRational::new(root, denom * scale)))
    }
}
