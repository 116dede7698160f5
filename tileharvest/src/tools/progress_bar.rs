//! Single-line progress bar on stderr.

use std::{
	io::Write,
	time::{Duration, Instant},
};

const REDRAW_INTERVAL: Duration = Duration::from_millis(500);

pub struct ProgressBar {
	message: String,
	position: u64,
	total: u64,
	start: Instant,
	next_draw: Instant,
}

impl ProgressBar {
	pub fn new(message: &str) -> ProgressBar {
		let start = Instant::now();
		ProgressBar {
			message: message.to_owned(),
			position: 0,
			total: 0,
			start,
			next_draw: start,
		}
	}

	/// Updates the counters; redraws at most twice a second.
	pub fn set(&mut self, position: u64, total: u64) {
		self.total = total;
		self.position = position.min(total);
		if Instant::now() >= self.next_draw {
			self.draw();
		}
	}

	/// Draws the final state and ends the line.
	pub fn finish(&mut self, position: u64, total: u64) {
		self.total = total;
		self.position = position.min(total);
		self.draw();
		eprintln!();
	}

	fn draw(&mut self) {
		self.next_draw = Instant::now() + REDRAW_INTERVAL;
		let line = self.line(terminal_width());
		let mut output = std::io::stderr();
		let _ = write!(output, "\r\x1b[2K{line}");
		let _ = output.flush();
	}

	fn line(&self, width: usize) -> String {
		let total = self.total.max(1);
		let pos = self.position.min(total);
		let elapsed = self.start.elapsed().as_secs_f64();
		let per_sec = if elapsed > 0.0 { pos as f64 / elapsed } else { 0.0 };
		let eta_secs = if pos > 0 {
			elapsed * ((total - pos) as f64 / pos as f64)
		} else {
			0.0
		};

		let percent = (pos as f64 * 100.0 / total as f64).floor() as u64;
		let rate = format_rate(per_sec);
		let eta = format_eta(Duration::from_secs_f64(eta_secs));
		let msg = &self.message;
		let get_line = |bar: &str| format!("{msg}▕{bar}▏{pos}/{total} ({percent:>3}%) {rate:>5} {eta:>5}");

		let bar_width = width.saturating_sub(get_line("").chars().count());
		get_line(&make_bar(pos, total, bar_width))
	}
}

fn format_rate(per_sec: f64) -> String {
	if per_sec.is_finite() {
		human_number(per_sec) + "/s"
	} else {
		String::from("--/s")
	}
}

fn human_number(v: f64) -> String {
	let abs = v.abs();
	if abs >= 1_000_000.0 {
		format!("{:.1}M", v / 1_000_000.0)
	} else if abs >= 1_000.0 {
		format!("{:.1}k", v / 1_000.0)
	} else {
		format!("{v:.0}")
	}
}

fn format_eta(d: Duration) -> String {
	let total = d.as_secs();
	let hours = total / 3_600;
	let minutes = (total % 3_600) / 60;
	let seconds = total % 60;
	if total < 60 {
		format!("{seconds}s")
	} else if total < 3_600 {
		format!("{minutes:02}:{seconds:02}")
	} else {
		format!("{hours}:{minutes:02}:{seconds:02}")
	}
}

fn terminal_width() -> usize {
	terminal_size::terminal_size().map_or(80, |(width, _)| usize::from(width.0.max(10)))
}

fn make_bar(pos: u64, total: u64, width: usize) -> String {
	let width = width.max(1);
	let frac = (pos as f64 / total.max(1) as f64).clamp(0.0, 1.0);
	let exact = frac * width as f64;
	let whole = (exact.floor() as usize).min(width);

	// eighths of a cell, thinnest first
	let partials = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];

	let mut bar = "█".repeat(whole);
	if whole < width {
		let eighths = ((exact - whole as f64) * 8.0).floor() as usize;
		bar.push(if eighths > 0 { partials[eighths.min(7) - 1] } else { ' ' });
		bar.push_str(&" ".repeat(width - whole - 1));
	}
	bar
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[rstest]
	#[case(0, 10, 4, "    ")]
	#[case(5, 10, 4, "██  ")]
	#[case(10, 10, 4, "████")]
	#[case(1, 16, 2, "▏ ")]
	#[case(3, 0, 3, "███")]
	fn bar(#[case] pos: u64, #[case] total: u64, #[case] width: usize, #[case] expected: &str) {
		assert_eq!(make_bar(pos, total, width), expected);
	}

	#[rstest]
	#[case(5, "5s")]
	#[case(75, "01:15")]
	#[case(3_725, "1:02:05")]
	fn eta(#[case] secs: u64, #[case] expected: &str) {
		assert_eq!(format_eta(Duration::from_secs(secs)), expected);
	}

	#[rstest]
	#[case(12.4, "12/s")]
	#[case(2_500.0, "2.5k/s")]
	#[case(3_000_000.0, "3.0M/s")]
	#[case(f64::INFINITY, "--/s")]
	fn rate(#[case] per_sec: f64, #[case] expected: &str) {
		assert_eq!(format_rate(per_sec), expected);
	}

	#[test]
	fn line_fits_width() {
		let mut bar = ProgressBar::new("harvest");
		bar.position = 3;
		bar.total = 12;
		let line = bar.line(60);
		assert!(line.starts_with("harvest▕"));
		assert!(line.contains("3/12 ( 25%)"));
		assert_eq!(line.chars().count(), 60);
	}
}
