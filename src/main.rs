use std::{
	io::{self, BufRead as _, IsTerminal as _, Write as _},
	process::ExitCode,
};

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};
use clap::Parser;
use knucklebones::{
	dice::roller::{Crypto as CryptoRoller, FastRand as FastRandRoller, Roller},
	expr::Describe,
	parse_with, Limits, ParseError,
};
use tracing::Level;

/// Exit code used when the expression can't be parsed
const EXIT_PARSE: u8 = 2;

/// Name the input is reported under
const SOURCE_ID: &str = "expression";

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Dice expression to roll, such as "2d6 + 1d4 - 3". Read from stdin if omitted.
	#[arg(trailing_var_arg = true, allow_hyphen_values = true)]
	expression: Vec<String>,

	/// Number of times to roll the expression
	#[arg(short = 'n', long, default_value_t = 1)]
	times: u32,

	/// Seed a fast, reproducible generator instead of the secure one (NOT suitable for fair play)
	#[arg(long)]
	seed: Option<u64>,

	/// Largest total number of dice the expression may roll
	#[arg(long)]
	max_dice: Option<u32>,

	/// Largest number of individual rolls to list in the output
	#[arg(long)]
	list_limit: Option<usize>,

	/// Print each result as a JSON object
	#[arg(long, action)]
	json: bool,

	/// Enable debug logging
	#[arg(short, long, action)]
	debug: bool,
}

fn main() -> ExitCode {
	let args = Args::parse();

	tracing_subscriber::fmt()
		.with_writer(io::stderr)
		.with_target(false)
		.with_max_level(if args.debug { Level::DEBUG } else { Level::WARN })
		.init();

	let input = match read_input(&args.expression) {
		Ok(input) => input,
		Err(err) => {
			eprintln!("error: unable to read expression: {err}");
			return ExitCode::FAILURE;
		}
	};

	let mut limits = Limits::default();
	limits.max_dice = args.max_dice;
	let expr = match parse_with(&input, &limits) {
		Ok(expr) => expr,
		Err(err) => {
			report(&input, &err);
			return ExitCode::from(EXIT_PARSE);
		}
	};

	let mut roller: Box<dyn Roller> = match args.seed {
		Some(seed) => {
			tracing::warn!(seed, "using a seeded generator, rolls are reproducible and not secure");
			Box::new(FastRandRoller::with_seed(seed))
		}
		None => Box::new(CryptoRoller::new()),
	};

	for _ in 0..args.times {
		let rolled = match expr.roll_with(roller.as_mut()) {
			Ok(rolled) => rolled,
			Err(err) => {
				eprintln!("error: {err}");
				return ExitCode::FAILURE;
			}
		};

		if args.json {
			match serde_json::to_string(&rolled) {
				Ok(json) => println!("{json}"),
				Err(err) => {
					eprintln!("error: unable to serialize result: {err}");
					return ExitCode::FAILURE;
				}
			}
		} else {
			println!("{}", rolled.describe(args.list_limit));
		}
	}

	ExitCode::SUCCESS
}

/// Obtains the expression by combining all arguments, so that it can be left unquoted even with spaces. Without any
/// arguments, the first line of stdin is used instead.
fn read_input(args: &[String]) -> io::Result<String> {
	if !args.is_empty() {
		return Ok(args.join(" "));
	}

	// Only prompt when someone is there to see it
	let stdin = io::stdin();
	if stdin.is_terminal() {
		eprint!("Enter dice expression: ");
		io::stderr().flush()?;
	}

	stdin.lock().lines().next().unwrap_or_else(|| Ok(String::new()))
}

/// Prints a parse error to stderr, pointing at the offending term when there is one.
fn report(input: &str, err: &ParseError) {
	let span = err.span().unwrap_or(0..input.len());
	let label = err.span().map(|span| Label::new((SOURCE_ID, span)).with_message("in this term"));

	let printed = Report::build(ReportKind::Error, (SOURCE_ID, span))
		.with_config(Config::default().with_index_type(IndexType::Byte))
		.with_message(err)
		.with_labels(label)
		.finish()
		.eprint((SOURCE_ID, Source::from(input)));

	if printed.is_err() {
		eprintln!("error: {err}");
	}
}
