//! External cooperative cancellation sources.

use tokio_util::sync::CancellationToken;

/// A caller-owned "stop waiting" signal, e.g. a UI progress indicator.
///
/// Firing the signal abandons bounded waits without cancelling the
/// underlying computation; explicit cancellation of the computation
/// stays a separate, deliberate call on the owning cache slot.
pub trait ProgressSignal: Send + Sync {
	/// Whether the external operation was cancelled.
	fn is_cancelled(&self) -> bool;
}

/// Signal that never fires; waits run to completion or deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl ProgressSignal for NeverCancelled {
	fn is_cancelled(&self) -> bool {
		false
	}
}

impl ProgressSignal for CancellationToken {
	fn is_cancelled(&self) -> bool {
		CancellationToken::is_cancelled(self)
	}
}
