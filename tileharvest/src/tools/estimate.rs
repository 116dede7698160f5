use super::request_args::RequestArgs;
use anyhow::Result;
use clap::Args;
use tileharvest::{Config, build_estimator, build_registry};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	#[command(flatten)]
	request: RequestArgs,
}

/// Prints the estimate as JSON on stdout.
#[tokio::main]
pub async fn run(arguments: &Subcommand, config: &Config) -> Result<()> {
	let request = arguments.request.to_request()?;
	let estimator = build_estimator(config, build_registry(config)?);
	let estimate = estimator.estimate(&request).await?;
	println!("{}", serde_json::to_string_pretty(&estimate)?);
	Ok(())
}
