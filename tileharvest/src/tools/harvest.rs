use super::{progress_bar::ProgressBar, request_args::RequestArgs};
use anyhow::{Result, bail};
use clap::Args;
use std::{path::PathBuf, time::Duration};
use tileharvest::{Config, JobState, build_queue, build_registry};

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// MBTiles file to write; tiles already in it are merged with the new ones
	#[arg(required = true, value_name = "OUTPUT")]
	output: PathBuf,

	#[command(flatten)]
	request: RequestArgs,

	/// don't draw a progress bar
	#[arg(long)]
	no_progress: bool,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand, config: &Config) -> Result<()> {
	let request = arguments.request.to_request()?;
	let queue = build_queue(config, build_registry(config)?);
	let job = queue.submit(request, arguments.output.clone());
	let id = job.id;

	let cancel_queue = queue.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			eprintln!();
			log::warn!("interrupted, stopping job {id}");
			cancel_queue.cancel(id);
		}
	});

	let reporter = (!arguments.no_progress).then(|| {
		let queue = queue.clone();
		tokio::spawn(async move {
			let mut bar = ProgressBar::new("harvest");
			let mut ticker = tokio::time::interval(Duration::from_millis(100));
			loop {
				ticker.tick().await;
				if let Some(progress) = queue.progress(id) {
					bar.set(progress.processed_tiles, progress.total_tiles);
				} else if queue.status(id).is_none_or(|s| s.state.is_terminal()) {
					break;
				}
			}
		})
	});

	let status = job.join().await?;
	if let Some(reporter) = reporter {
		reporter.abort();
		if status.total_tiles > 0 {
			ProgressBar::new("harvest").finish(status.processed_tiles, status.total_tiles);
		}
	}

	match status.state {
		JobState::Completed => {
			eprintln!(
				"harvested {} tiles into {}",
				status.processed_tiles,
				arguments.output.display()
			);
			Ok(())
		}
		JobState::Aborted => bail!(
			"harvest aborted after {} of {} tiles, {} is incomplete",
			status.processed_tiles,
			status.total_tiles,
			arguments.output.display()
		),
		_ => match status.error {
			Some(error) => Err(error.into()),
			None => bail!("job {id} ended as {}", status.state),
		},
	}
}
