use core::num::NonZeroU16;

use crate::dice::{DiceTerm, Sign};

#[cfg(feature = "parse")]
mod parse;

/// Builds a dice term from plain integers.
fn term(count: u16, sides: u16, sign: Sign) -> DiceTerm {
	DiceTerm::new(
		NonZeroU16::new(count).unwrap(),
		NonZeroU16::new(sides).unwrap(),
		sign,
	)
}
