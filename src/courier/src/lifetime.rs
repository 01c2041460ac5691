use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use snafu::prelude::*;

/// How long a cached instance stays valid after its last access.
///
/// A [`Lifetime`] is either bounded by a [`Duration`], counted from the most
/// recent access to the cached entry, or [`Lifetime::Unbounded`], in which
/// case the entry lives as long as the cache holding it. Bounded lifetimes
/// are ordered by their duration and every bounded lifetime is shorter than
/// [`Lifetime::Unbounded`].
///
/// Lifetimes are usually written as literals of the form `<n><unit>`:
///
/// ```rust
/// # use std::time::Duration;
/// # use courier::lifetime::Lifetime;
/// assert_eq!(Lifetime::parse("30s").unwrap(), Lifetime::from_millis(30_000));
/// assert_eq!(Lifetime::parse("2h").unwrap().as_duration(), Some(Duration::from_secs(7_200)));
/// assert!(Lifetime::parse("1y").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifetime {
    Bounded(Duration),
    Unbounded,
}

impl Lifetime {
    pub fn from_millis(millis: u64) -> Self {
        Self::Bounded(Duration::from_millis(millis))
    }

    /// Parses a literal matching `^(\d+)([smhd])$`. The whole input has to
    /// match, so surrounding whitespace, signs and fractions are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`LifetimeError::InvalidLifetimeFormat`] if the input doesn't
    /// match the pattern or its value overflows.
    pub fn parse(input: &str) -> Result<Self, LifetimeError> {
        let invalid = || InvalidLifetimeFormatSnafu { input }.build();

        let Some(unit) = input.chars().last() else {
            return Err(invalid());
        };
        let digits = &input[..input.len() - unit.len_utf8()];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let multiplier: u64 = match unit {
            's' => 1_000,
            'm' => 60_000,
            'h' => 3_600_000,
            'd' => 86_400_000,
            _ => return Err(invalid()),
        };
        let amount: u64 = digits.parse().map_err(|_| invalid())?;

        amount
            .checked_mul(multiplier)
            .map(Self::from_millis)
            .ok_or_else(invalid)
    }

    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded(_))
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Bounded(duration) => Some(*duration),
            Self::Unbounded => None,
        }
    }

    pub fn as_millis(&self) -> Option<u128> {
        self.as_duration().map(|duration| duration.as_millis())
    }
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Bounded(duration) => write!(f, "{}ms", duration.as_millis()),
            Self::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl FromStr for Lifetime {
    type Err = LifetimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Duration> for Lifetime {
    fn from(duration: Duration) -> Self {
        Self::Bounded(duration)
    }
}

/// Anything a cached delivery accepts as its lifetime.
///
/// Plain numbers are milliseconds. Strings go through [`Lifetime::parse`].
pub trait IntoLifetime {
    /// # Errors
    ///
    /// Returns [`LifetimeError::InvalidLifetime`] for negative numbers and
    /// [`LifetimeError::InvalidLifetimeFormat`] for malformed literals.
    fn into_lifetime(self) -> Result<Lifetime, LifetimeError>;
}

impl IntoLifetime for Lifetime {
    fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
        Ok(self)
    }
}

impl IntoLifetime for Duration {
    fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
        Ok(Lifetime::Bounded(self))
    }
}

impl IntoLifetime for &str {
    fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
        Lifetime::parse(self)
    }
}

impl IntoLifetime for String {
    fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
        Lifetime::parse(&self)
    }
}

impl IntoLifetime for &String {
    fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
        Lifetime::parse(self)
    }
}

macro_rules! impl_into_lifetime_for_unsigned {
    ($($ty:ty),*) => {$(
        impl IntoLifetime for $ty {
            fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
                Ok(Lifetime::from_millis(self as u64))
            }
        }
    )*};
}

macro_rules! impl_into_lifetime_for_signed {
    ($($ty:ty),*) => {$(
        impl IntoLifetime for $ty {
            fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
                ensure!(self >= 0, InvalidLifetimeSnafu { value: self as f64 });
                Ok(Lifetime::from_millis(self as u64))
            }
        }
    )*};
}

impl_into_lifetime_for_unsigned!(u8, u16, u32, u64, usize);
impl_into_lifetime_for_signed!(i8, i16, i32, i64, isize);

impl IntoLifetime for f64 {
    fn into_lifetime(self) -> Result<Lifetime, LifetimeError> {
        ensure!(
            !self.is_nan() && self >= 0.0,
            InvalidLifetimeSnafu { value: self }
        );
        if self.is_infinite() {
            Ok(Lifetime::Unbounded)
        } else {
            Ok(Lifetime::from_millis(self.trunc() as u64))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Snafu)]
#[non_exhaustive]
pub enum LifetimeError {
    #[snafu(display("lifetime literal {input:?} doesn't match `<n>s`, `<n>m`, `<n>h` or `<n>d`"))]
    #[non_exhaustive]
    InvalidLifetimeFormat { input: String },
    #[snafu(display("lifetime {value} is negative"))]
    #[non_exhaustive]
    InvalidLifetime { value: f64 },
}
