use chumsky::Parser as _;

use super::term;
use crate::{
	dice::Sign,
	expr::Expression,
	parse::{grammar, parse, parse_with, Field, Limits, ParseError},
};

#[test]
fn accepted_expressions() {
	let cases: &[(&str, Expression)] = &[
		("2d6", Expression::new(vec![term(2, 6, Sign::Positive)], 0).unwrap()),
		("d6", Expression::new(vec![term(1, 6, Sign::Positive)], 0).unwrap()),
		(
			"2d6 + 1d4 - 3",
			Expression::new(vec![term(2, 6, Sign::Positive), term(1, 4, Sign::Positive)], -3).unwrap(),
		),
		(
			"d8 - 2d4 + 5",
			Expression::new(vec![term(1, 8, Sign::Positive), term(2, 4, Sign::Negative)], 5).unwrap(),
		),
		(
			"  3D8   -   2 ",
			Expression::new(vec![term(3, 8, Sign::Positive)], -2).unwrap(),
		),
		("2d6+1", Expression::new(vec![term(2, 6, Sign::Positive)], 1).unwrap()),
		(
			"-2d6 + 10",
			Expression::new(vec![term(2, 6, Sign::Negative)], 10).unwrap(),
		),
		("+d20", Expression::new(vec![term(1, 20, Sign::Positive)], 0).unwrap()),
		(
			"3 + 1d4",
			Expression::new(vec![term(1, 4, Sign::Positive)], 3).unwrap(),
		),
	];

	for (input, expected) in cases {
		assert_eq!(parse(input).as_ref(), Ok(expected), "parsing {input:?}");
	}
}

#[test]
fn rejected_expressions() {
	assert_eq!(parse(""), Err(ParseError::Empty));
	assert_eq!(parse(" \t\n "), Err(ParseError::Empty));
	assert_eq!(parse("5"), Err(ParseError::NoDiceTerms));
	assert_eq!(parse("5 - 3"), Err(ParseError::NoDiceTerms));

	assert!(matches!(
		parse("d0"),
		Err(ParseError::NonPositiveValue { field: Field::Sides, .. })
	));
	assert!(matches!(
		parse("0d6"),
		Err(ParseError::NonPositiveValue { field: Field::Count, .. })
	));
	assert!(matches!(
		parse("2dx"),
		Err(ParseError::NonNumeric { field: Field::Sides, .. })
	));
	assert!(matches!(
		parse("xd6"),
		Err(ParseError::NonNumeric { field: Field::Count, .. })
	));
	assert!(matches!(
		parse("2d6 + 3x"),
		Err(ParseError::NonNumeric { field: Field::Modifier, .. })
	));
	assert!(matches!(
		parse("1.5d6"),
		Err(ParseError::NonNumeric { field: Field::Count, .. })
	));
	assert!(matches!(parse("2d6 ++ 1"), Err(ParseError::MalformedTerm(..))));
	assert!(matches!(parse("2d6 -"), Err(ParseError::MalformedTerm(..))));
	assert!(matches!(parse("2d"), Err(ParseError::MalformedTerm(..))));
	assert!(matches!(parse("+"), Err(ParseError::MalformedTerm(..))));
}

#[test]
fn values_are_capped() {
	assert!(parse("10000d10000").is_ok());
	assert!(parse("1d6 + 10000").is_ok());

	assert!(matches!(
		parse("10001d6"),
		Err(ParseError::TooLarge { field: Field::Count, max: 10_000, .. })
	));
	assert!(matches!(
		parse("1d10001"),
		Err(ParseError::TooLarge { field: Field::Sides, max: 10_000, .. })
	));
	assert!(matches!(
		parse("1d6 - 10001"),
		Err(ParseError::TooLarge { field: Field::Modifier, .. })
	));
}

#[test]
fn long_digit_runs_are_too_large() {
	let input = format!("1d{}", "9".repeat(500));
	assert!(matches!(
		parse(&input),
		Err(ParseError::TooLarge { field: Field::Sides, .. })
	));

	// Leading zeroes don't count towards the value
	assert_eq!(parse("0006d0020"), parse("6d20"));
}

#[test]
fn custom_limits() {
	let limits = Limits {
		max_value: 20,
		..Limits::default()
	};
	assert!(parse_with("20d20", &limits).is_ok());
	assert!(matches!(
		parse_with("1d100", &limits),
		Err(ParseError::TooLarge { max: 20, .. })
	));

	let limits = Limits::with_max_dice(10);
	assert!(parse_with("4d6 + 6d8 - 2", &limits).is_ok());
	assert_eq!(
		parse_with("4d6 - 7d8", &limits),
		Err(ParseError::TooManyDice { count: 11, max: 10 })
	);

	// Unlimited by default
	assert!(parse("10000d6 + 10000d6 + 10000d6").is_ok());
}

#[test]
fn error_tokens_point_into_the_input() {
	let input = "  2d6 + 0d4";
	let err = parse(input).unwrap_err();
	let token = err.token().unwrap();
	assert_eq!(token.text, "+ 0d4");
	assert_eq!(token.span, 6..11);
	assert_eq!(&input[token.span.clone()], "+ 0d4");

	let input = "1d6 ++ 2";
	let err = parse(input).unwrap_err();
	assert_eq!(err.token().map(|token| token.text.as_str()), Some("+"));
	assert_eq!(err.span(), Some(4..5));

	assert_eq!(parse("").unwrap_err().span(), None);
	assert_eq!(parse("7").unwrap_err().token(), None);
}

#[test]
fn error_messages() {
	assert_eq!(parse("2dx").unwrap_err().to_string(), "dice sides must be numeric in \"2dx\"");
	assert_eq!(
		parse("3d6 - 0").unwrap_err().to_string(),
		"modifier must be positive in \"- 0\""
	);
	assert_eq!(
		parse("99999d6").unwrap_err().to_string(),
		"dice count exceeds the maximum of 10000 in \"99999d6\""
	);
	assert_eq!(parse("4").unwrap_err().to_string(), "expression must include at least one dice term");
	assert_eq!(parse("2d6 ++ 1").unwrap_err().to_string(), "malformed term \"+\"");
}

#[test]
fn constants_fold_into_modifier() {
	let expr = parse("1d6 + 3 - 5 + 10").unwrap();
	assert_eq!(expr.modifier(), 8);

	let expr = parse("2d6 - 3 + 3").unwrap();
	assert_eq!(expr.modifier(), 0);
	assert_eq!(expr.to_string(), "2d6");

	let expr = parse("-4 + d4 - 4").unwrap();
	assert_eq!(expr.modifier(), -8);
	assert_eq!(expr.terms(), &[term(1, 4, Sign::Positive)]);
}

#[test]
fn parsing_is_deterministic() {
	for input in ["2d6 + 1d4 - 3", "-d100+50", "d20"] {
		assert_eq!(parse(input), parse(input));
	}
}

#[test]
fn display_round_trips() {
	for input in ["2d6 + 1d4 - 3", "-2d6 + 3", "d8 - 2d4 + 5", "  3D8   -   2 ", "10 - d4 - d4"] {
		let expr = parse(input).unwrap();
		assert_eq!(parse(&expr.to_string()), Ok(expr), "round trip of {input:?}");
	}

	assert_eq!(parse("d8-2d4+5").unwrap().to_string(), "1d8 - 2d4 + 5");
}

#[test]
fn from_str() {
	let expr: Expression = "3d6 + 2".parse().unwrap();
	assert_eq!(expr, parse("3d6 + 2").unwrap());
	assert!("3d".parse::<Expression>().is_err());
}

#[test]
fn grammar_splits_signed_tokens() {
	let tokens = grammar().parse("-2d6+ 3 -d4").into_result().unwrap();
	assert_eq!(tokens.len(), 3);

	assert_eq!(tokens[0].sign, Some(Sign::Negative));
	assert_eq!(tokens[0].head, "2");
	assert_eq!(tokens[0].sides.as_deref(), Some("6"));
	assert_eq!(tokens[0].span, 0..4);

	assert_eq!(tokens[1].sign, Some(Sign::Positive));
	assert_eq!(tokens[1].head, " 3 ");
	assert_eq!(tokens[1].sides, None);

	assert_eq!(tokens[2].sign, Some(Sign::Negative));
	assert_eq!(tokens[2].head, "");
	assert_eq!(tokens[2].sides.as_deref(), Some("4"));
	assert_eq!(tokens[2].span, 8..11);
}

#[test]
fn input_text_is_kept_but_not_compared() {
	let spaced = parse("  3D8   -   2 ").unwrap();
	let compact = parse("3d8-2").unwrap();
	assert_eq!(spaced.source(), Some("  3D8   -   2 "));
	assert_eq!(compact.source(), Some("3d8-2"));
	assert_eq!(spaced, compact);

	let built = Expression::new(vec![term(3, 8, Sign::Positive)], -2).unwrap();
	assert_eq!(built.source(), None);
	assert_eq!(built, compact);
}
