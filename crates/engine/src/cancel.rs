//! Cooperative cancellation for grouped remote calls.

use tokio_util::sync::CancellationToken;

/// Cancels a set of in-flight remote calls as one unit.
///
/// A group starts active and transitions to cancelled exactly once; the
/// transition is one-way, idempotent, and safe under concurrent `cancel`
/// and `register` calls. Every registered call holds a child token that
/// fires together with the group, so a superseded computation never
/// leaves calls running against the remote process.
#[derive(Debug, Clone)]
pub struct CancelGroup {
	token: CancellationToken,
}

impl CancelGroup {
	/// Create an active group with no registered calls.
	pub fn new() -> Self {
		Self {
			token: CancellationToken::new(),
		}
	}

	/// Register one remote call with the group.
	///
	/// Returns `None` once the group is cancelled; the call must not be
	/// issued in that case. A registration racing the cancel may still
	/// receive a token, but that token is already cancelled, so the call
	/// aborts before producing traffic.
	pub fn register(&self) -> Option<CancellationToken> {
		if self.token.is_cancelled() {
			return None;
		}
		Some(self.token.child_token())
	}

	/// Cancel the group and every registered call.
	///
	/// Idempotent; repeated or concurrent cancels are no-ops.
	pub fn cancel(&self) {
		self.token.cancel();
	}

	/// Whether the group has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	/// Resolves once the group is cancelled.
	pub async fn cancelled(&self) {
		self.token.cancelled().await;
	}
}

impl Default for CancelGroup {
	fn default() -> Self {
		Self::new()
	}
}
