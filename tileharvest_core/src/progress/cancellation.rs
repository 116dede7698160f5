//! A flag a scheduler sets to ask a running harvest to stop.

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

/// Cloneable handle to one job's cancellation flag. All clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationSignal(Arc<AtomicBool>);

impl CancellationSignal {
	pub fn new() -> CancellationSignal {
		CancellationSignal::default()
	}

	/// Requests cancellation. Idempotent.
	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}
