//! This module contains the main entrypoint to the suinz cli.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use suinz_core::{respond, Algorithm, Config, Family, SplitPreset, SplitRatio, TrainRequest};
use tracing::Level;

#[derive(Parser)]
#[clap(
	about = "Train a classifier on a dataset and evaluate it on held out rows.",
	disable_help_subcommand = true
)]
struct Options {
	#[clap(subcommand)]
	command: Command,
	#[clap(short, long, parse(from_occurrences), global = true, help = "log progress to stderr, repeat for more detail")]
	verbose: u8,
}

#[derive(Subcommand)]
enum Command {
	#[clap(about = "train and evaluate a classifier")]
	Train(TrainOptions),
	#[clap(about = "list the available algorithms")]
	Algorithms,
	#[clap(about = "list the split presets")]
	Splits,
}

#[derive(Parser, Debug)]
#[clap(long_about = "train a classifier on the first rows of a .csv or .arff file and evaluate it on the rest")]
struct TrainOptions {
	#[clap(short, long, help = "the path to your .csv or .arff file")]
	file: Option<PathBuf>,
	#[clap(
		short,
		long,
		default_value = "J48 (Decision Tree)",
		help = "the name of the algorithm, see `suinz algorithms`"
	)]
	algorithm: String,
	#[clap(
		short,
		long,
		default_value = "70% Train / 30% Test",
		help = "a split preset or the fraction of rows to train on"
	)]
	split: SplitRatio,
	#[clap(short, long, help = "the path to a .yaml or .json config file")]
	config: Option<PathBuf>,
}

fn main() {
	let options = Options::parse();
	init_tracing(options.verbose);
	let result = match options.command {
		Command::Train(options) => cli_train(options),
		Command::Algorithms => cli_algorithms(),
		Command::Splits => cli_splits(),
	};
	match result {
		Ok(true) => {}
		Ok(false) => std::process::exit(1),
		Err(error) => {
			eprintln!("{}: {:#}", "error".red().bold(), error);
			std::process::exit(1);
		}
	}
}

fn init_tracing(verbose: u8) {
	let level = match verbose {
		0 => Level::WARN,
		1 => Level::INFO,
		_ => Level::DEBUG,
	};
	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_target(false)
		.with_writer(std::io::stderr)
		.init();
}

/// Returns whether training succeeded.
fn cli_train(options: TrainOptions) -> Result<bool> {
	let config = Config::load(options.config.as_deref())?;
	let request = TrainRequest {
		file_path: options.file,
		algorithm: options.algorithm,
		split: options.split,
	};
	let response = respond(&request, &config);
	println!("{}", response);
	Ok(response.is_success())
}

fn cli_algorithms() -> Result<bool> {
	let families = [
		Family::Trees,
		Family::Bayes,
		Family::Lazy,
		Family::Functions,
		Family::Rules,
		Family::Meta,
	];
	for family in families.iter() {
		println!("{}", family.name().bold());
		for algorithm in Algorithm::all().filter(|algorithm| algorithm.family() == *family) {
			println!("  {}", algorithm);
		}
	}
	Ok(true)
}

fn cli_splits() -> Result<bool> {
	for preset in SplitPreset::ALL.iter() {
		println!("{}", preset.name());
	}
	Ok(true)
}
