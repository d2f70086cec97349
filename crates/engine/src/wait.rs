//! Bounded waiting on merged computations.

use std::time::Duration;

use tokio::time::Instant;

use crate::cache::MergedFuture;
use crate::progress::ProgressSignal;

/// Interval between cooperative cancellation checks while waiting.
const CHECK_TICK: Duration = Duration::from_millis(10);

/// Outcome of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
	/// The computation completed with merged results.
	Completed(T),
	/// The computation itself was cancelled.
	Cancelled,
	/// The wait was abandoned (the signal fired or the deadline passed).
	/// The computation keeps running and a later wait can still pick up
	/// its result.
	Abandoned,
}

/// Wait for a merged computation, checking an external signal.
///
/// The wait selects between the future and a check tick, so the signal
/// is observed within [`CHECK_TICK`] of firing even while the future is
/// quiet. Abandoning the wait never cancels the computation.
pub async fn wait_merged<T: Clone>(
	future: MergedFuture<T>,
	signal: &dyn ProgressSignal,
	timeout: Duration,
) -> WaitOutcome<Vec<T>> {
	let deadline = Instant::now() + timeout;
	let mut future = future;

	loop {
		if signal.is_cancelled() {
			return WaitOutcome::Abandoned;
		}

		let tick = deadline.min(Instant::now() + CHECK_TICK);
		tokio::select! {
			result = &mut future => {
				return match result {
					Ok(items) => WaitOutcome::Completed(items),
					Err(_) => WaitOutcome::Cancelled,
				};
			}
			_ = tokio::time::sleep_until(tick) => {
				if Instant::now() >= deadline {
					return WaitOutcome::Abandoned;
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use futures::FutureExt;
	use tokio_util::sync::CancellationToken;

	use super::*;
	use crate::merge::Cancelled;
	use crate::progress::NeverCancelled;

	fn ready(items: Vec<u32>) -> MergedFuture<u32> {
		std::future::ready(Ok(items)).boxed().shared()
	}

	fn pending() -> MergedFuture<u32> {
		std::future::pending().boxed().shared()
	}

	#[tokio::test]
	async fn test_wait_completes() {
		let outcome = wait_merged(ready(vec![1, 2]), &NeverCancelled, Duration::from_secs(1)).await;
		assert_eq!(outcome, WaitOutcome::Completed(vec![1, 2]));
	}

	#[tokio::test]
	async fn test_wait_reports_cancelled_computation() {
		let future: MergedFuture<u32> = std::future::ready(Err(Cancelled)).boxed().shared();
		let outcome = wait_merged(future, &NeverCancelled, Duration::from_secs(1)).await;
		assert_eq!(outcome, WaitOutcome::Cancelled);
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_abandons_at_deadline() {
		let outcome = wait_merged(pending(), &NeverCancelled, Duration::from_millis(50)).await;
		assert_eq!(outcome, WaitOutcome::Abandoned);
	}

	#[tokio::test(start_paused = true)]
	async fn test_signal_abandons_without_cancelling() {
		let signal = CancellationToken::new();
		signal.cancel();

		let future = pending();
		let outcome = wait_merged(future.clone(), &signal, Duration::from_secs(5)).await;

		assert_eq!(outcome, WaitOutcome::Abandoned);
		// The computation is untouched; it simply has not settled.
		assert!(future.peek().is_none());
	}
}
