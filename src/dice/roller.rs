//! Sources of die values. Anything that can produce a uniform value in `1..=sides` can roll an
//! [`Expression`](crate::expr::Expression) by implementing [`Roller`].

use alloc::{format, vec::Vec};
use core::{iter::Peekable, num::NonZeroU16};

use rand::{rngs::OsRng, CryptoRng, RngCore};

use super::DiceTerm;
use crate::expr::EvalError;

/// Rolls dice - what else is there to say?
pub trait Roller {
	/// Rolls a single die, producing a value in `1..=sides`.
	///
	/// # Errors
	/// If the underlying source of randomness can't produce a value, [`EvalError::RandomSourceFailure`] is returned.
	fn roll_die(&mut self, sides: NonZeroU16) -> Result<u16, EvalError>;

	/// Rolls every die of a term, returning the rolls in draw order with the term's sign applied.
	///
	/// # Errors
	/// If any draw fails, or the roller produces a value outside of `1..=sides`, an
	/// [`EvalError::RandomSourceFailure`] is returned.
	fn roll(&mut self, term: &DiceTerm) -> Result<Vec<i32>, EvalError> {
		let mut rolls = Vec::with_capacity(usize::from(term.count.get()));
		for _ in 0..term.count.get() {
			let val = self.roll_die(term.sides)?;
			if val == 0 || val > term.sides.get() {
				return Err(EvalError::RandomSourceFailure(format!(
					"source produced {val} for a die with {} sides",
					term.sides
				)));
			}

			tracing::trace!(sides = term.sides.get(), val, "rolled die");
			rolls.push(term.sign.apply(i32::from(val)));
		}
		Ok(rolls)
	}
}

/// Generates rolls from a cryptographically secure random number generator. This is the roller used for fair play
/// and the one [`roll()`](crate::roll) uses.
///
/// Values are drawn as 32-bit words and mapped onto the die's faces with rejection sampling: the `2^32 % sides`
/// lowest words are discarded and redrawn, leaving a whole number of blocks of `sides` words so every face is
/// equally likely. Dice whose side count divides `2^32` never discard a draw.
/// Failures of the generator are reported as [`EvalError::RandomSourceFailure`] rather than panicking.
///
/// # Examples
///
/// ## Operating system source
/// ```
/// use knucklebones::{dice::roller::{Crypto as CryptoRoller, Roller}, DiceTerm};
///
/// let mut roller = CryptoRoller::new();
///
/// let term = DiceTerm::plain(4, 6).unwrap();
/// let rolls = roller.roll(&term)?;
/// assert_eq!(rolls.len(), 4);
/// assert!(rolls.iter().all(|roll| (1..=6).contains(roll)));
/// # Ok::<(), knucklebones::EvalError>(())
/// ```
///
/// ## Custom secure generator
/// ```
/// use knucklebones::{dice::roller::{Crypto as CryptoRoller, Roller}, DiceTerm};
///
/// let mut roller = CryptoRoller::with_rng(rand::thread_rng());
///
/// let term = DiceTerm::plain(2, 20).unwrap();
/// let _ = roller.roll(&term)?;
/// # Ok::<(), knucklebones::EvalError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Crypto<R = OsRng>(R);

impl Crypto {
	/// Creates a new roller that draws from the operating system's secure random source.
	#[must_use]
	#[inline]
	pub const fn new() -> Self {
		Self(OsRng)
	}
}

impl Default for Crypto {
	#[inline]
	fn default() -> Self {
		Self::new()
	}
}

impl<R: RngCore + CryptoRng> Crypto<R> {
	/// Creates a new roller that uses the given secure RNG to generate rolls.
	#[must_use]
	#[inline]
	pub const fn with_rng(rng: R) -> Self {
		Self(rng)
	}

	/// Draws one 32-bit word from the RNG.
	fn word(&mut self) -> Result<u32, EvalError> {
		let mut buf = [0; 4];
		self.0.try_fill_bytes(&mut buf).map_err(|err| {
			tracing::warn!(%err, "secure random source failed");
			EvalError::RandomSourceFailure(err.to_string())
		})?;
		Ok(u32::from_le_bytes(buf))
	}
}

impl<R: RngCore + CryptoRng> Roller for Crypto<R> {
	/// Rolls a single die using the secure RNG the roller was created with.
	fn roll_die(&mut self, sides: NonZeroU16) -> Result<u16, EvalError> {
		let sides = u32::from(sides.get());
		// 2^32 % sides: the lowest words that would leave an incomplete block of faces at the top
		let threshold = sides.wrapping_neg() % sides;

		loop {
			let word = self.word()?;
			if word >= threshold {
				#[expect(
					clippy::cast_possible_truncation,
					reason = "The remainder is below the side count, which is a u16"
				)]
				let face = (word % sides) as u16;
				return Ok(face.saturating_add(1));
			}

			tracing::trace!(word, threshold, "rejected biased draw");
		}
	}
}

/// Generates rolls with random values using [fastrand]. Requires the `fastrand` feature.
///
/// The generator is fast and can be seeded for reproducible results, but it is **not** cryptographically secure.
/// Use it for simulations and benchmarks, never for rolls that need to be fair against an adversary.
///
/// # Examples
/// ```
/// use knucklebones::{dice::roller::{FastRand as FastRandRoller, Roller}, DiceTerm};
///
/// let term = DiceTerm::plain(4, 6).unwrap();
/// let first = FastRandRoller::with_seed(0x750c38d574400).roll(&term)?;
/// let second = FastRandRoller::with_seed(0x750c38d574400).roll(&term)?;
/// assert_eq!(first, second);
/// # Ok::<(), knucklebones::EvalError>(())
/// ```
#[cfg(feature = "fastrand")]
#[derive(Debug, Clone, Default)]
pub struct FastRand(fastrand::Rng);

#[cfg(feature = "fastrand")]
impl FastRand {
	/// Creates a new fastrand roller that uses the given RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub const fn new(rng: fastrand::Rng) -> Self {
		Self(rng)
	}

	/// Creates a new fastrand roller that uses a pre-seeded RNG instance to generate rolls.
	#[must_use]
	#[inline]
	pub fn with_seed(seed: u64) -> Self {
		Self(fastrand::Rng::with_seed(seed))
	}
}

#[cfg(feature = "fastrand")]
impl Roller for FastRand {
	#[inline]
	fn roll_die(&mut self, sides: NonZeroU16) -> Result<u16, EvalError> {
		Ok(self.0.u16(1..=sides.get()))
	}
}

/// Generates rolls that always have their max value.
///
/// # Examples
/// ```
/// use knucklebones::{dice::roller::{Max as MaxRoller, Roller}, DiceTerm};
///
/// let mut roller = MaxRoller;
///
/// let term = DiceTerm::plain(4, 6).unwrap();
/// assert_eq!(roller.roll(&term)?, vec![6, 6, 6, 6]);
///
/// let term = DiceTerm::plain(2, 20).unwrap().negated();
/// assert_eq!(roller.roll(&term)?, vec![-20, -20]);
/// # Ok::<(), knucklebones::EvalError>(())
/// ```
#[derive(Debug, Default, Clone)]
#[expect(clippy::exhaustive_structs, reason = "Highly unlikely to change")]
pub struct Max;

impl Roller for Max {
	/// Rolls a single die, always with the max value (same as the number of sides).
	#[inline]
	fn roll_die(&mut self, sides: NonZeroU16) -> Result<u16, EvalError> {
		Ok(sides.get())
	}
}

/// Generates rolls from an iterator of values. Mainly useful for testing purposes.
///
/// Running out of values is reported as [`EvalError::RandomSourceFailure`], as is any value that doesn't fit the die
/// being rolled.
///
/// # Examples
/// ```
/// use knucklebones::{dice::roller::{Iter as IterRoller, Roller}, DiceTerm};
///
/// let mut roller = IterRoller::new(vec![1, 2, 3, 4, 5]);
/// let term = DiceTerm::plain(5, 6).unwrap();
/// assert_eq!(roller.roll(&term)?, vec![1, 2, 3, 4, 5]);
/// assert!(!roller.can_roll());
/// assert!(roller.roll(&term).is_err());
/// # Ok::<(), knucklebones::EvalError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Iter<I: Iterator<Item = u16>>(Peekable<I>);

impl<I: Iterator<Item = u16>> Iter<I> {
	/// Checks whether the iterator still has values available.
	#[inline]
	pub fn can_roll(&mut self) -> bool {
		self.0.peek().is_some()
	}

	/// Creates a new roller that uses the given iterator to provide roll values.
	#[must_use]
	#[inline]
	pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
		Self(iter.into_iter().peekable())
	}
}

impl<I: Iterator<Item = u16>> Roller for Iter<I> {
	/// Rolls a die with the value from the next iteration.
	#[inline]
	fn roll_die(&mut self, _sides: NonZeroU16) -> Result<u16, EvalError> {
		self.0
			.next()
			.ok_or_else(|| EvalError::RandomSourceFailure("iterator is finished".into()))
	}
}
