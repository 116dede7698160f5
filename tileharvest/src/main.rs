mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use std::path::PathBuf;
use tileharvest::Config;

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// YAML configuration file (workers, fetch concurrency, HTTP settings)
	#[arg(long, short, global = true, value_name = "FILE")]
	config: Option<PathBuf>,

	#[command(flatten)]
	verbose: Verbosity<ErrorLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Harvest tiles of WMTS layers into an MBTiles file
	Harvest(tools::harvest::Subcommand),

	/// Estimate tile count and size of a harvest
	Estimate(tools::estimate::Subcommand),
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(cli.verbose.log_level_filter())
		.format_timestamp(None)
		.init();

	run(cli)
}

fn run(cli: Cli) -> Result<()> {
	let config = Config::load(cli.config.as_deref())?;
	match &cli.command {
		Commands::Harvest(arguments) => tools::harvest::run(arguments, &config),
		Commands::Estimate(arguments) => tools::estimate::run(arguments, &config),
	}
}
