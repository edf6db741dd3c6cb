#![feature(test)]

extern crate test;

use test::Bencher;

#[bench]
fn e2e_basic(b: &mut Bencher) {
	b.iter(|| {
		let expr = knucklebones::parse("4d8 + 4").unwrap();
		knucklebones::roll(&expr).unwrap().total()
	});
}

#[bench]
fn e2e_mixed(b: &mut Bencher) {
	b.iter(|| {
		let expr = knucklebones::parse("2d6 + 1d4 - 3 - d8 + 12").unwrap();
		knucklebones::roll(&expr).unwrap().into_owned()
	});
}
