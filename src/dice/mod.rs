//! Dice terms, the signed groups of identical dice that make up an [`Expression`], and the [`Roller`]s that draw
//! values for them.
//!
//! [`Expression`]: crate::expr::Expression

pub mod roller;

use core::{fmt, num::NonZeroU16, ops::RangeInclusive};

pub use self::roller::Roller;

/// Polarity applied to every roll drawn for a [`DiceTerm`] (or to a constant in an expression)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[expect(clippy::exhaustive_enums, reason = "A sign has exactly two values")]
pub enum Sign {
	/// Added to the total (`+`)
	#[default]
	Positive,

	/// Subtracted from the total (`-`)
	Negative,
}

impl Sign {
	/// Applies the sign to a value.
	///
	/// # Examples
	/// ```
	/// use knucklebones::Sign;
	///
	/// assert_eq!(Sign::Positive.apply(4), 4);
	/// assert_eq!(Sign::Negative.apply(4), -4);
	/// ```
	#[must_use]
	#[inline]
	pub const fn apply(self, val: i32) -> i32 {
		match self {
			Self::Positive => val,
			Self::Negative => -val,
		}
	}

	/// Gets the sign matching an operator character, if it is one.
	#[must_use]
	pub const fn from_char(c: char) -> Option<Self> {
		match c {
			'+' => Some(Self::Positive),
			'-' => Some(Self::Negative),
			_ => None,
		}
	}

	/// Gets the operator character for the sign.
	#[must_use]
	#[inline]
	pub const fn as_char(self) -> char {
		match self {
			Self::Positive => '+',
			Self::Negative => '-',
		}
	}
}

impl fmt::Display for Sign {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_char())
	}
}

/// One signed group of identical dice, such as the `-2d4` in `d8 - 2d4 + 5`.
///
/// Both `count` and `sides` are non-zero by construction and the sign can only ever be one of two values, so every
/// term is rollable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[expect(clippy::exhaustive_structs, reason = "The notation is deliberately flat")]
pub struct DiceTerm {
	/// Number of dice to roll
	pub count: NonZeroU16,

	/// Number of sides for each die
	pub sides: NonZeroU16,

	/// Sign applied to every roll of this group
	pub sign: Sign,
}

impl DiceTerm {
	/// Creates a new dice term.
	#[must_use]
	pub const fn new(count: NonZeroU16, sides: NonZeroU16, sign: Sign) -> Self {
		Self { count, sides, sign }
	}

	/// Creates a new positive dice term from plain integers, returning [`None`] if either is zero.
	///
	/// # Examples
	/// ```
	/// use knucklebones::{DiceTerm, Sign};
	///
	/// let term = DiceTerm::plain(2, 6).unwrap();
	/// assert_eq!(term.to_string(), "2d6");
	/// assert_eq!(term.sign, Sign::Positive);
	/// assert!(DiceTerm::plain(0, 6).is_none());
	/// ```
	#[must_use]
	pub fn plain(count: u16, sides: u16) -> Option<Self> {
		Some(Self::new(NonZeroU16::new(count)?, NonZeroU16::new(sides)?, Sign::Positive))
	}

	/// Creates a copy of this term with the opposite sign.
	#[must_use]
	pub const fn negated(self) -> Self {
		Self {
			sign: match self.sign {
				Sign::Positive => Sign::Negative,
				Sign::Negative => Sign::Positive,
			},
			..self
		}
	}

	/// Range of values a single roll of this term can produce once the sign has been applied.
	#[must_use]
	pub fn roll_range(&self) -> RangeInclusive<i32> {
		let sides = i32::from(self.sides.get());
		match self.sign {
			Sign::Positive => 1..=sides,
			Sign::Negative => -sides..=-1,
		}
	}
}

impl fmt::Display for DiceTerm {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// Positive terms are written plainly (`2d6`), negative ones with a leading minus (`-2d6`).
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.sign == Sign::Negative {
			write!(f, "-")?;
		}
		write!(f, "{}d{}", self.count, self.sides)
	}
}
