//! Parsing of dice notation such as `2d6 + 1d4 - 3` into [`Expression`]s.
//!
//! Parsing happens in two steps. The [`grammar()`] splits the input into signed [`Token`]s, each one already divided
//! at its die marker, without looking at any digits. Each token is then interpreted: numbers are validated against
//! the [`Limits`] and the result is either a [`DiceTerm`] or a constant folded into the modifier.

#![cfg(feature = "parse")]

use alloc::{borrow::ToOwned, string::String, vec::Vec};
use core::{fmt, num::NonZeroU16, ops::Range, str::FromStr};

use chumsky::prelude::*;

use crate::{
	dice::{DiceTerm, Sign},
	expr::Expression,
};

/// Extra parser state used by the grammar
type Extra<'src> = extra::Err<Rich<'src, char>>;

/// One signed piece of an expression, split at its die marker but not yet interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Token {
	/// Explicit sign, if one was written
	pub sign: Option<Sign>,

	/// Text before the die marker, or the whole body if there is no marker
	pub head: String,

	/// Text after the die marker, if there is one
	pub sides: Option<String>,

	/// Byte offsets of the token within the parsed text
	pub span: Range<usize>,
}

/// Generates a parser for the body of a token: everything up to the next sign, split at the first die marker.
fn body<'src>() -> impl Parser<'src, &'src str, (String, Option<String>), Extra<'src>> + Clone {
	none_of("+-dD").repeated().collect::<String>().then(
		one_of("dD")
			.ignore_then(none_of("+-").repeated().collect::<String>())
			.or_not(),
	)
}

/// Generates a parser for a single token, given a parser for its (possibly optional) sign.
fn token<'src>(
	sign: impl Parser<'src, &'src str, Option<Sign>, Extra<'src>> + Clone,
) -> impl Parser<'src, &'src str, Token, Extra<'src>> + Clone {
	sign.then(body()).map_with(|(sign, (head, sides)), e| {
		let span: SimpleSpan = e.span();
		Token {
			sign,
			head,
			sides,
			span: span.start..span.end,
		}
	})
}

/// Generates a parser that splits a trimmed expression into its signed tokens.
///
/// The first token may omit its sign; every following token starts at a `+` or `-`. The grammar never interprets
/// digits, so a doubled operator shows up as a token with an empty body rather than as an error.
///
/// # Examples
/// ```
/// use chumsky::Parser;
/// use knucklebones::{parse::grammar, Sign};
///
/// let tokens = grammar().parse("2d6 ++ 1").into_result().unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1].sign, Some(Sign::Positive));
/// assert_eq!(tokens[1].head, "");
/// ```
pub fn grammar<'src>() -> impl Parser<'src, &'src str, Vec<Token>, Extra<'src>> + Clone {
	let sign = choice((
		just('+').to(Sign::Positive),
		just('-').to(Sign::Negative),
	));

	token(sign.clone().or_not())
		.then(token(sign.map(Some)).repeated().collect::<Vec<_>>())
		.then_ignore(end())
		.map(|(first, rest)| {
			let mut tokens = Vec::with_capacity(rest.len().saturating_add(1));
			tokens.push(first);
			tokens.extend(rest);
			tokens
		})
}

/// Bounds applied while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct Limits {
	/// Largest value accepted for any single count, side count, or constant
	pub max_value: u16,

	/// Largest number of dice the whole expression may roll, if limited
	pub max_dice: Option<u32>,
}

impl Limits {
	/// Largest value accepted for a single number by default
	pub const DEFAULT_MAX_VALUE: u16 = 10_000;

	/// Creates the default limits with a cap on the total number of dice across the whole expression.
	///
	/// # Examples
	/// ```
	/// use knucklebones::{parse_with, Limits, ParseError};
	///
	/// let limits = Limits::with_max_dice(100);
	/// assert!(parse_with("60d6 + 40d6", &limits).is_ok());
	/// assert!(matches!(parse_with("60d6 + 41d6", &limits), Err(ParseError::TooManyDice { count: 101, .. })));
	/// ```
	#[must_use]
	pub const fn with_max_dice(max_dice: u32) -> Self {
		Self {
			max_value: Self::DEFAULT_MAX_VALUE,
			max_dice: Some(max_dice),
		}
	}
}

impl Default for Limits {
	fn default() -> Self {
		Self {
			max_value: Self::DEFAULT_MAX_VALUE,
			max_dice: None,
		}
	}
}

/// Which part of a term a number was parsed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "The notation only has these three numbers")]
pub enum Field {
	/// Number of dice, before the marker
	Count,

	/// Number of sides, after the marker
	Sides,

	/// Bare constant
	Modifier,
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Count => "dice count",
			Self::Sides => "dice sides",
			Self::Modifier => "modifier",
		})
	}
}

/// Offending token of a [`ParseError`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct Fragment {
	/// Token text, including its sign
	pub text: String,

	/// Byte offsets of the token within the input
	pub span: Range<usize>,
}

impl fmt::Display for Fragment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Error that can occur while parsing an expression. Nothing is ever partially parsed: any error rejects the whole
/// input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
	/// The input is empty or only whitespace.
	#[error("expression is empty")]
	Empty,

	/// A term has no body after its sign, or a die marker has no sides after it.
	///
	/// # Examples
	/// ```
	/// use knucklebones::{parse, ParseError};
	///
	/// assert!(matches!(parse("2d6 ++ 1"), Err(ParseError::MalformedTerm(..))));
	/// assert!(matches!(parse("3d"), Err(ParseError::MalformedTerm(..))));
	/// ```
	#[error("malformed term \"{0}\"")]
	MalformedTerm(Fragment),

	/// A number contains something other than the digits `0`-`9`.
	#[error("{field} must be numeric in \"{token}\"")]
	NonNumeric {
		/// Number that was being parsed
		field: Field,

		/// Token containing the number
		token: Fragment,
	},

	/// A number is zero.
	#[error("{field} must be positive in \"{token}\"")]
	NonPositiveValue {
		/// Number that was being parsed
		field: Field,

		/// Token containing the number
		token: Fragment,
	},

	/// A number exceeds [`Limits::max_value`].
	#[error("{field} exceeds the maximum of {max} in \"{token}\"")]
	TooLarge {
		/// Number that was being parsed
		field: Field,

		/// Token containing the number
		token: Fragment,

		/// Largest allowed value
		max: u16,
	},

	/// The expression has no dice, only constants.
	#[error("expression must include at least one dice term")]
	NoDiceTerms,

	/// The expression rolls more dice in total than [`Limits::max_dice`] allows.
	#[error("expression rolls {count} dice, more than the maximum of {max}")]
	TooManyDice {
		/// Total number of dice in the expression
		count: u64,

		/// Largest allowed number of dice
		max: u32,
	},
}

impl ParseError {
	/// Gets the token responsible for the error, if the error is about a specific one.
	#[must_use]
	pub const fn token(&self) -> Option<&Fragment> {
		match self {
			Self::MalformedTerm(token)
			| Self::NonNumeric { token, .. }
			| Self::NonPositiveValue { token, .. }
			| Self::TooLarge { token, .. } => Some(token),
			Self::Empty | Self::NoDiceTerms | Self::TooManyDice { .. } => None,
		}
	}

	/// Gets the byte offsets within the input of the token responsible for the error, if there is one.
	#[must_use]
	pub fn span(&self) -> Option<Range<usize>> {
		self.token().map(|token| token.span.clone())
	}
}

/// Interpreted meaning of a single token
enum Piece {
	/// Group of dice
	Dice(DiceTerm),

	/// Signed constant
	Constant(i64),
}

/// Parses a dice expression with the default [`Limits`].
///
/// # Errors
/// If the input isn't a valid expression, a [`ParseError`] describing the first problem is returned.
///
/// # Examples
/// ```
/// use knucklebones::{parse, DiceTerm, ParseError};
///
/// let expr = parse("2d6 + 1d4 - 3")?;
/// assert_eq!(expr.terms(), &[DiceTerm::plain(2, 6).unwrap(), DiceTerm::plain(1, 4).unwrap()]);
/// assert_eq!(expr.modifier(), -3);
///
/// assert!(matches!(parse("5"), Err(ParseError::NoDiceTerms)));
/// # Ok::<(), ParseError>(())
/// ```
pub fn parse(input: &str) -> Result<Expression, ParseError> {
	parse_with(input, &Limits::default())
}

/// Parses a dice expression with the given [`Limits`].
///
/// # Errors
/// If the input isn't a valid expression or breaks the limits, a [`ParseError`] describing the first problem is
/// returned.
pub fn parse_with(input: &str, limits: &Limits) -> Result<Expression, ParseError> {
	let result = interpret(input, limits);
	match &result {
		Ok(expr) => tracing::debug!(input, expression = %expr, "parsed dice expression"),
		Err(err) => tracing::debug!(input, %err, "rejected dice expression"),
	}
	result
}

/// Runs the grammar over the input and interprets the resulting tokens.
fn interpret(input: &str, limits: &Limits) -> Result<Expression, ParseError> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(ParseError::Empty);
	}

	// Spans are reported relative to the untrimmed input
	let offset = input.len().saturating_sub(input.trim_start().len());
	// The grammar accepts every input, so this only surfaces if it ever gets stricter
	let tokens = grammar().parse(trimmed).into_result().map_err(|_errs| {
		ParseError::MalformedTerm(Fragment {
			text: trimmed.to_owned(),
			span: offset..offset.saturating_add(trimmed.len()),
		})
	})?;

	let mut terms = Vec::new();
	let mut modifier: i64 = 0;
	for token in &tokens {
		let fragment = Fragment {
			text: trimmed.get(token.span.clone()).unwrap_or_default().trim().to_owned(),
			span: offset.saturating_add(token.span.start)..offset.saturating_add(token.span.end),
		};

		match interpret_token(token, fragment, limits)? {
			Piece::Dice(term) => terms.push(term),
			// Can't saturate: every constant is bounded by the limits and each one needs at least two bytes of input
			Piece::Constant(val) => modifier = modifier.saturating_add(val),
		}
	}

	if let Some(max) = limits.max_dice {
		let count: u64 = terms.iter().map(|term| u64::from(term.count.get())).sum();
		if count > u64::from(max) {
			return Err(ParseError::TooManyDice { count, max });
		}
	}

	Expression::new(terms, modifier)
		.map(|expr| expr.with_source(input))
		.ok_or(ParseError::NoDiceTerms)
}

/// Interprets a single token as either a group of dice or a constant.
fn interpret_token(token: &Token, fragment: Fragment, limits: &Limits) -> Result<Piece, ParseError> {
	let sign = token.sign.unwrap_or_default();
	let head = token.head.trim();

	match token.sides.as_deref().map(str::trim) {
		Some(sides) => {
			if sides.is_empty() {
				return Err(ParseError::MalformedTerm(fragment));
			}

			let count = if head.is_empty() {
				NonZeroU16::MIN
			} else {
				number(head, Field::Count, &fragment, limits)?
			};
			let sides = number(sides, Field::Sides, &fragment, limits)?;
			Ok(Piece::Dice(DiceTerm::new(count, sides, sign)))
		}
		None => {
			if head.is_empty() {
				return Err(ParseError::MalformedTerm(fragment));
			}

			let val = number(head, Field::Modifier, &fragment, limits)?;
			Ok(Piece::Constant(i64::from(sign.apply(i32::from(val.get())))))
		}
	}
}

/// Parses a strictly positive decimal number no larger than [`Limits::max_value`].
fn number(text: &str, field: Field, fragment: &Fragment, limits: &Limits) -> Result<NonZeroU16, ParseError> {
	let mut val: u32 = 0;
	for c in text.chars() {
		let digit = c.to_digit(10).ok_or_else(|| ParseError::NonNumeric {
			field,
			token: fragment.clone(),
		})?;

		// Stops as soon as the cap is passed, so long digit runs can't overflow
		val = val.saturating_mul(10).saturating_add(digit);
		if val > u32::from(limits.max_value) {
			return Err(ParseError::TooLarge {
				field,
				token: fragment.clone(),
				max: limits.max_value,
			});
		}
	}

	u16::try_from(val)
		.ok()
		.and_then(NonZeroU16::new)
		.ok_or_else(|| ParseError::NonPositiveValue {
			field,
			token: fragment.clone(),
		})
}

impl FromStr for Expression {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse(s)
	}
}
