//! Per-server request fan-out.

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::cancel::CancelGroup;
use crate::proto::FeatureRequest;
use crate::server::{CallError, ServerHandle, ServerId};

/// Terminal state of one dispatched call.
#[derive(Debug)]
pub enum CallOutcome<T> {
	/// Normalized items, in server response order.
	Items(Vec<T>),
	/// The call failed; it contributes nothing to the merge.
	Failed(CallError),
	/// The call observed cancellation before settling.
	Cancelled,
}

/// One in-flight remote call, normalized at the boundary.
pub struct PendingCall<T> {
	pub(crate) server: ServerId,
	pub(crate) cancel: CancellationToken,
	pub(crate) future: BoxFuture<'static, CallOutcome<T>>,
}

impl<T> PendingCall<T> {
	/// The server this call was issued to.
	pub fn server(&self) -> ServerId {
		self.server
	}

	/// Cancel this call alone, leaving siblings untouched.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}
}

/// Issue one call per selected server under the group's cancellation.
///
/// Servers are visited in selector order and each call is registered
/// with the group before it is put on the wire. Once the group is
/// cancelled, registration is refused and no further calls are issued.
/// Responses are decoded through the feature definition as they arrive,
/// so the merge layer only ever sees the normalized shape.
pub fn dispatch<F: FeatureRequest>(
	params: &F::Params,
	servers: &[ServerHandle],
	group: &CancelGroup,
) -> Vec<PendingCall<F::Item>> {
	let mut calls = Vec::with_capacity(servers.len());
	for server in servers {
		let Some(token) = group.register() else {
			tracing::debug!(method = F::METHOD, "group cancelled, dispatch stopped");
			break;
		};
		calls.push(issue::<F>(params, server, token));
	}
	calls
}

fn issue<F: FeatureRequest>(
	params: &F::Params,
	server: &ServerHandle,
	token: CancellationToken,
) -> PendingCall<F::Item> {
	let id = server.id();

	let payload = match F::build(params, server.capabilities()) {
		Ok(payload) => payload,
		Err(error) => {
			return settled(id, token, CallOutcome::Failed(CallError::Malformed(error)));
		}
	};

	// The lifecycle manager may have dropped the server since selection.
	let Some(connection) = server.connection() else {
		return settled(id, token, CallOutcome::Failed(CallError::Disconnected));
	};

	let reply = connection.call(F::METHOD, payload, token.clone());
	let call_token = token.clone();
	let future = async move {
		tokio::select! {
			_ = call_token.cancelled() => CallOutcome::Cancelled,
			reply = reply => match reply {
				Ok(Ok(value)) => match F::decode(value) {
					Ok(items) => CallOutcome::Items(items),
					Err(error) => CallOutcome::Failed(CallError::Malformed(error)),
				},
				Ok(Err(error)) => CallOutcome::Failed(error),
				Err(_) => CallOutcome::Failed(CallError::Disconnected),
			},
		}
	}
	.boxed();

	PendingCall {
		server: id,
		cancel: token,
		future,
	}
}

fn settled<T: Send + 'static>(
	server: ServerId,
	cancel: CancellationToken,
	outcome: CallOutcome<T>,
) -> PendingCall<T> {
	PendingCall {
		server,
		cancel,
		future: std::future::ready(outcome).boxed(),
	}
}
