//! Merging per-server results.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::dispatch::{CallOutcome, PendingCall};

/// Terminal state of a cancelled computation.
///
/// Cancellation is not a failure: dependent work silently stops and
/// nothing is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("computation cancelled")]
pub struct Cancelled;

/// Await every pending call and concatenate contributions in dispatch
/// order.
///
/// Calls settle in any order; contributions are reassembled by index so
/// server order stays stable and intra-server response order is
/// preserved. A failing call contributes an empty list; the failure is
/// logged and the remaining servers are unaffected, so one slow or broken
/// server never poisons the merged answer. A call observing cancellation
/// collapses the whole merge immediately, without waiting for siblings.
pub async fn merge<T>(calls: Vec<PendingCall<T>>) -> Result<Vec<T>, Cancelled> {
	let mut contributions: Vec<Option<Vec<T>>> = Vec::new();
	contributions.resize_with(calls.len(), || None);

	let mut settling: FuturesUnordered<_> = calls
		.into_iter()
		.enumerate()
		.map(|(index, call)| {
			let server = call.server();
			async move { (index, server, call.future.await) }
		})
		.collect();

	while let Some((index, server, outcome)) = settling.next().await {
		match outcome {
			CallOutcome::Items(items) => contributions[index] = Some(items),
			CallOutcome::Failed(error) => {
				tracing::warn!(server = %server, error = %error, "server call failed, contributing no results");
				contributions[index] = Some(Vec::new());
			}
			CallOutcome::Cancelled => return Err(Cancelled),
		}
	}

	Ok(contributions.into_iter().flatten().flatten().collect())
}
