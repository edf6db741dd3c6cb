//! Parsed dice expressions and the results of rolling them.

use alloc::{
	borrow::Cow,
	format,
	string::{String, ToString},
	vec::Vec,
};
use core::{
	cmp::Ordering,
	fmt,
	hash::{Hash, Hasher},
};

use crate::dice::{
	roller::{Crypto as CryptoRoller, Roller},
	DiceTerm,
};

/// A flat dice expression: an ordered, non-empty list of signed [`DiceTerm`]s plus a constant modifier.
///
/// Expressions are immutable once created and can be rolled any number of times, from any number of threads. Each
/// roll draws fresh values, so only the structure is reproducible.
///
/// # Examples
/// ```
/// use knucklebones::{DiceTerm, Expression};
///
/// let expr = Expression::new(vec![DiceTerm::plain(2, 6).unwrap()], -3).unwrap();
/// assert_eq!(expr.to_string(), "2d6 - 3");
/// assert_eq!(expr.dice_count(), 2);
///
/// // An expression needs at least one group of dice
/// assert!(Expression::new(Vec::new(), 5).is_none());
/// ```
///
/// Two expressions are equal when their terms and modifier are, regardless of the text they were parsed from.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Expression {
	/// Dice groups, in the order they were written
	terms: Vec<DiceTerm>,

	/// Sum of all constants, each with its own sign
	modifier: i64,

	/// Text the expression was parsed from, if any
	#[cfg_attr(feature = "serde", serde(skip))]
	source: Option<String>,
}

impl Expression {
	/// Creates a new expression from its dice terms and modifier. Returns [`None`] if there are no terms, since an
	/// expression without any dice isn't a roll.
	#[must_use]
	pub fn new(terms: Vec<DiceTerm>, modifier: i64) -> Option<Self> {
		(!terms.is_empty()).then_some(Self {
			terms,
			modifier,
			source: None,
		})
	}

	/// Attaches the text the expression was parsed from.
	#[cfg(feature = "parse")]
	#[must_use]
	pub(crate) fn with_source(mut self, source: &str) -> Self {
		self.source = Some(source.into());
		self
	}

	/// Gets the dice terms, in the order they appeared.
	#[must_use]
	#[inline]
	pub fn terms(&self) -> &[DiceTerm] {
		&self.terms
	}

	/// Gets the constant modifier added after all dice are summed.
	#[must_use]
	#[inline]
	pub const fn modifier(&self) -> i64 {
		self.modifier
	}

	/// Gets the text the expression was parsed from, exactly as it was given. Expressions built with [`Self::new()`]
	/// have none.
	///
	/// # Examples
	/// ```
	/// let expr = knucklebones::parse(" d8-2d4+5")?;
	/// assert_eq!(expr.source(), Some(" d8-2d4+5"));
	/// assert_eq!(expr.to_string(), "1d8 - 2d4 + 5");
	/// # Ok::<(), knucklebones::ParseError>(())
	/// ```
	#[must_use]
	#[inline]
	pub fn source(&self) -> Option<&str> {
		self.source.as_deref()
	}

	/// Counts the individual dice that a roll of this expression draws.
	#[must_use]
	pub fn dice_count(&self) -> u64 {
		self.terms.iter().map(|term| u64::from(term.count.get())).sum()
	}

	/// Checks whether the expression is deterministic (will always yield the same total with every roll), which is
	/// the case only when every die has a single side.
	#[must_use]
	pub fn is_deterministic(&self) -> bool {
		self.terms.iter().all(|term| term.sides.get() == 1)
	}

	/// Rolls the expression, drawing every die from the given roller.
	///
	/// # Errors
	/// If the roller fails to produce a value, or produces the wrong number of values or a value outside of a term's
	/// range, [`EvalError::RandomSourceFailure`] is returned and no partial result is produced.
	///
	/// # Examples
	/// ```
	/// use knucklebones::dice::roller::{Iter as IterRoller, Max as MaxRoller};
	///
	/// let expr = knucklebones::parse("2d6 - d4 + 1")?;
	///
	/// let rolled = expr.roll_with(&mut IterRoller::new([3, 5, 2]))?;
	/// assert_eq!(rolled.rolls(), &[3, 5, -2]);
	/// assert_eq!(rolled.total(), 7);
	///
	/// let rolled = expr.roll_with(&mut MaxRoller)?;
	/// assert_eq!(rolled.total(), 9);
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	pub fn roll_with<R: Roller + ?Sized>(&self, roller: &mut R) -> Result<Rolled<'_>, EvalError> {
		let mut rolls = Vec::new();
		let mut total = self.modifier;

		for term in &self.terms {
			let term_rolls = roller.roll(term)?;
			check_term_rolls(term, &term_rolls)?;
			// Can't saturate: the number of rolls is bounded by memory and each one by u16::MAX
			total = term_rolls
				.iter()
				.fold(total, |sum, roll| sum.saturating_add(i64::from(*roll)));
			rolls.extend(term_rolls);
		}

		tracing::debug!(expression = %self, dice = rolls.len(), total, "rolled dice expression");
		Ok(Rolled {
			expr: Cow::Borrowed(self),
			rolls,
			total,
		})
	}
}

/// Verifies that a roller produced exactly one correctly signed, in-range value per die of a term.
fn check_term_rolls(term: &DiceTerm, rolls: &[i32]) -> Result<(), EvalError> {
	if rolls.len() != usize::from(term.count.get()) {
		return Err(EvalError::RandomSourceFailure(format!(
			"source produced {} rolls for {term}",
			rolls.len()
		)));
	}

	let range = term.roll_range();
	match rolls.iter().find(|&&roll| !range.contains(&roll)) {
		Some(roll) => Err(EvalError::RandomSourceFailure(format!(
			"source produced {roll} for {term}"
		))),
		None => Ok(()),
	}
}

impl Describe for Expression {
	/// Builds the canonical text of the expression: dice terms in order, followed by the net modifier (if any).
	/// Parsing the output yields an equal expression.
	///
	/// `list_limit` does not affect the output of this implementation in any way since there are no lists of results
	/// included, so it is always safe to pass `None`.
	fn describe(&self, _list_limit: Option<usize>) -> String {
		let mut parts = Vec::with_capacity(self.terms.len().saturating_add(1));
		for (idx, term) in self.terms.iter().enumerate() {
			parts.push(if idx == 0 {
				term.to_string()
			} else {
				format!("{} {}d{}", term.sign, term.count, term.sides)
			});
		}

		match self.modifier.cmp(&0) {
			Ordering::Greater => parts.push(format!("+ {}", self.modifier)),
			Ordering::Less => parts.push(format!("- {}", self.modifier.unsigned_abs())),
			Ordering::Equal => {}
		}

		parts.join(" ")
	}
}

impl PartialEq for Expression {
	fn eq(&self, other: &Self) -> bool {
		self.terms == other.terms && self.modifier == other.modifier
	}
}

impl Eq for Expression {}

impl Hash for Expression {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.terms.hash(state);
		self.modifier.hash(state);
	}
}

impl fmt::Display for Expression {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output of this implementation is equivalent to [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

/// Rolls an expression with the operating system's cryptographically secure random source.
///
/// # Errors
/// If the random source fails, [`EvalError::RandomSourceFailure`] is returned.
///
/// # Examples
/// ```
/// let expr = knucklebones::parse("2d6 + 1d4 - 3")?;
/// let rolled = knucklebones::roll(&expr)?;
///
/// assert_eq!(rolled.rolls().len(), 3);
/// assert_eq!(rolled.total(), -3 + rolled.rolls().iter().map(|&roll| i64::from(roll)).sum::<i64>());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn roll(expr: &Expression) -> Result<Rolled<'_>, EvalError> {
	expr.roll_with(&mut CryptoRoller::new())
}

/// Result of rolling an [`Expression`]: every individual signed roll and the total.
///
/// The rolls are listed in term order, then in the order they were drawn within each term, and the total is always
/// the expression's modifier plus the sum of the rolls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rolled<'a> {
	/// Expression that was rolled to produce this
	expr: Cow<'a, Expression>,

	/// Each individual signed roll that was made
	rolls: Vec<i32>,

	/// Modifier plus the sum of all rolls
	total: i64,
}

impl Rolled<'_> {
	/// Gets the expression that was rolled.
	#[must_use]
	#[inline]
	pub fn expression(&self) -> &Expression {
		&self.expr
	}

	/// Gets every individual roll, with the sign of its term applied.
	#[must_use]
	#[inline]
	pub fn rolls(&self) -> &[i32] {
		&self.rolls
	}

	/// Gets the modifier of the rolled expression.
	#[must_use]
	#[inline]
	pub fn modifier(&self) -> i64 {
		self.expr.modifier()
	}

	/// Gets the total: the modifier plus the sum of all rolls.
	#[must_use]
	#[inline]
	pub const fn total(&self) -> i64 {
		self.total
	}

	/// Moves all of self's owned data into a new instance and clones the expression if it is borrowed in order to
	/// create a `'static` instance of self.
	#[must_use]
	pub fn into_owned(self) -> Rolled<'static> {
		Rolled {
			expr: Cow::Owned(self.expr.into_owned()),
			rolls: self.rolls,
			total: self.total,
		}
	}
}

impl Describe for Rolled<'_> {
	/// Builds a string of the expression that was rolled, a list of all of the individual rolls, and the total.
	///
	/// If `list_limit` is specified and there are more rolls than it, the list of rolls will be truncated and
	/// appended with "X more..." (where X is the remaining roll count past the max).
	///
	/// # Examples
	/// ```
	/// use knucklebones::{dice::roller::Iter as IterRoller, expr::Describe};
	///
	/// let expr = knucklebones::parse("4d6 - 2")?;
	/// let rolled = expr.roll_with(&mut IterRoller::new([6, 2, 5, 3]))?;
	///
	/// assert_eq!(rolled.describe(None), "4d6 - 2 [6, 2, 5, 3] = 14");
	/// assert_eq!(rolled.describe(Some(2)), "4d6 - 2 [6, 2, 2 more...] = 14");
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	fn describe(&self, list_limit: Option<usize>) -> String {
		let list_limit = list_limit.unwrap_or(usize::MAX);
		let truncated_rolls = self.rolls.len().saturating_sub(list_limit);

		format!(
			"{} [{}{}] = {}",
			self.expr,
			self.rolls
				.iter()
				.take(list_limit)
				.map(ToString::to_string)
				.collect::<Vec<_>>()
				.join(", "),
			if truncated_rolls > 0 {
				format!(", {truncated_rolls} more...")
			} else {
				String::new()
			},
			self.total
		)
	}
}

impl fmt::Display for Rolled<'_> {
	/// Formats the value using the given formatter. [Read more][core::fmt::Debug::fmt()]
	///
	/// The output is equivalent to calling [`Self::describe(None)`].
	///
	/// [`Self::describe(None)`]: Self::describe()
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.describe(None))
	}
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rolled<'_> {
	/// Serializes the result in its wire shape: the expression text as it was given (or the canonical text if the
	/// expression wasn't parsed), the signed rolls, the modifier and the total.
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		use serde::ser::SerializeStruct as _;

		let text = self
			.expr
			.source()
			.map_or_else(|| Cow::Owned(self.expr.to_string()), Cow::Borrowed);

		let mut state = serializer.serialize_struct("Rolled", 4)?;
		state.serialize_field("expression", &text)?;
		state.serialize_field("rolls", &self.rolls)?;
		state.serialize_field("modifier", &self.expr.modifier())?;
		state.serialize_field("total", &self.total)?;
		state.end()
	}
}

/// Error that can occur while rolling an [`Expression`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
	/// The source of randomness couldn't produce a usable value. This is an infrastructure fault rather than a
	/// problem with the expression, and it is never retried internally.
	#[error("random source failure: {0}")]
	RandomSourceFailure(String),
}

/// Trait to allow creation of expanded descriptions with an optional max number of individual listed results where
/// applicable
pub trait Describe {
	/// Builds a detailed string, listing the specific individual results that occurred for any non-deterministic
	/// elements (ideally, up to `list_limit` of them).
	#[must_use]
	fn describe(&self, list_limit: Option<usize>) -> String;
}
