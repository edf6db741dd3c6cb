#![feature(test)]

extern crate test;

use chumsky::Parser;
use knucklebones::{parse_with, Expression, Limits};
use test::Bencher;

/// Builds an expression with a hundred alternating terms and constants.
fn long_expr() -> String {
	(1..=100)
		.map(|n| if n % 2 == 0 { format!("- {n}") } else { format!("+ {n}d{}", n * 7) })
		.collect::<Vec<_>>()
		.join(" ")
}

#[bench]
fn parse_basic(b: &mut Bencher) {
	b.iter(|| knucklebones::parse("4d8 + 4").unwrap());
}

#[bench]
fn parse_mixed(b: &mut Bencher) {
	b.iter(|| knucklebones::parse("  2d6 + 1d4 - 3 - d8 + 12 ").unwrap());
}

#[bench]
fn parse_long(b: &mut Bencher) {
	let input = long_expr();
	b.iter(|| knucklebones::parse(&input).unwrap());
}

#[bench]
fn parse_with_dice_limit(b: &mut Bencher) {
	let input = long_expr();
	let limits = Limits::with_max_dice(10_000);
	b.iter(|| parse_with(&input, &limits).unwrap());
}

#[bench]
fn parse_rejected(b: &mut Bencher) {
	b.iter(|| knucklebones::parse("2d6 + 1d4 - 3 ++ 4d10001").unwrap_err());
}

#[bench]
fn grammar_creation(b: &mut Bencher) {
	b.iter(knucklebones::parse::grammar);
}

#[bench]
fn grammar_only(b: &mut Bencher) {
	let grammar = knucklebones::parse::grammar();
	let input = long_expr();
	b.iter(|| grammar.parse(&input).into_result().unwrap());
}

#[bench]
fn fromstr_basic(b: &mut Bencher) {
	b.iter(|| "4d8 + 4".parse::<Expression>().unwrap());
}
