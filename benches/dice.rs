#![feature(test)]

extern crate test;

use test::Bencher;

use knucklebones::{
	dice::roller::{Crypto as CryptoRoller, Iter as IterRoller, Roller},
	expr::Describe,
	DiceTerm, Expression,
};

#[bench]
fn roll_4d8(b: &mut Bencher) {
	let term = DiceTerm::plain(4, 8).unwrap();
	let mut roller = CryptoRoller::new();
	b.iter(|| roller.roll(&term).unwrap());
}

#[bench]
fn roll_100d20(b: &mut Bencher) {
	let term = DiceTerm::plain(100, 20).unwrap();
	let mut roller = CryptoRoller::new();
	b.iter(|| roller.roll(&term).unwrap());
}

#[bench]
fn roll_100d10000(b: &mut Bencher) {
	let term = DiceTerm::plain(100, 10_000).unwrap();
	let mut roller = CryptoRoller::new();
	b.iter(|| roller.roll(&term).unwrap());
}

#[bench]
fn roll_thread_rng_100d20(b: &mut Bencher) {
	let term = DiceTerm::plain(100, 20).unwrap();
	let mut roller = CryptoRoller::with_rng(rand::thread_rng());
	b.iter(|| roller.roll(&term).unwrap());
}

#[bench]
fn roll_and_total_mixed(b: &mut Bencher) {
	let expr = Expression::new(
		vec![DiceTerm::plain(8, 6).unwrap(), DiceTerm::plain(3, 12).unwrap().negated()],
		5,
	)
	.unwrap();
	b.iter(|| knucklebones::roll(&expr).unwrap().total());
}

#[bench]
fn describe_4d8_result(b: &mut Bencher) {
	let expr = Expression::new(vec![DiceTerm::plain(4, 8).unwrap()], 4).unwrap();
	let rolled = expr.roll_with(&mut IterRoller::new([6, 6, 6, 6])).unwrap();
	b.iter(|| rolled.describe(None));
}

#[bench]
fn describe_truncated_100d20_result(b: &mut Bencher) {
	let expr = Expression::new(vec![DiceTerm::plain(100, 20).unwrap()], 0).unwrap();
	let rolled = expr.roll_with(&mut IterRoller::new((0..100).map(|n| n % 20 + 1))).unwrap();
	b.iter(|| rolled.describe(Some(10)));
}
