//! Shared test doubles for the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use lsp_types::{OneOf, ServerCapabilities};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::proto::ServerProtocol;
use crate::server::{CallError, CallReply, ServerConnection, ServerHandle, ServerId};

/// Connection that must never be called.
pub struct NullConnection;

impl ServerConnection for NullConnection {
	fn call(
		&self,
		method: &'static str,
		_params: JsonValue,
		_cancel: CancellationToken,
	) -> oneshot::Receiver<CallReply> {
		panic!("unexpected call to {method}");
	}
}

/// How a [`MockConnection`] answers incoming calls.
pub enum Script {
	/// Resolve immediately with the given payload.
	Reply(JsonValue),
	/// Resolve immediately with a protocol error.
	Fail { code: i64, message: &'static str },
	/// Never resolve; release the sender once the call is cancelled.
	Hang,
	/// Park the sender for the test to resolve later.
	Manual,
}

/// Scripted server connection with call accounting.
pub struct MockConnection {
	script: Script,
	calls: AtomicUsize,
	saw_cancel: Arc<AtomicBool>,
	parked: Mutex<Vec<oneshot::Sender<CallReply>>>,
}

impl MockConnection {
	pub fn new(script: Script) -> Arc<Self> {
		Arc::new(Self {
			script,
			calls: AtomicUsize::new(0),
			saw_cancel: Arc::new(AtomicBool::new(false)),
			parked: Mutex::new(Vec::new()),
		})
	}

	/// Number of calls issued to this connection.
	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Whether any issued call observed cancellation.
	pub fn saw_cancel(&self) -> bool {
		self.saw_cancel.load(Ordering::SeqCst)
	}

	/// Resolve every parked [`Script::Manual`] call with `reply`.
	pub fn resolve_parked(&self, reply: JsonValue) {
		for sender in self.parked.lock().drain(..) {
			let _ = sender.send(Ok(reply.clone()));
		}
	}
}

impl ServerConnection for MockConnection {
	fn call(
		&self,
		_method: &'static str,
		_params: JsonValue,
		cancel: CancellationToken,
	) -> oneshot::Receiver<CallReply> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = oneshot::channel();
		match &self.script {
			Script::Reply(value) => {
				let _ = tx.send(Ok(value.clone()));
			}
			Script::Fail { code, message } => {
				let _ = tx.send(Err(CallError::Response {
					code: *code,
					message: (*message).to_string(),
				}));
			}
			Script::Hang => {
				let saw_cancel = self.saw_cancel.clone();
				tokio::spawn(async move {
					cancel.cancelled().await;
					saw_cancel.store(true, Ordering::SeqCst);
					drop(tx);
				});
			}
			Script::Manual => {
				self.parked.lock().push(tx);
			}
		}
		rx
	}
}

/// Capabilities advertising go-to-definition support.
pub fn definition_capabilities() -> ServerCapabilities {
	ServerCapabilities {
		definition_provider: Some(OneOf::Left(true)),
		..Default::default()
	}
}

/// Capabilities advertising code-action support.
pub fn code_action_capabilities() -> ServerCapabilities {
	ServerCapabilities {
		code_action_provider: Some(lsp_types::CodeActionProviderCapability::Simple(true)),
		..Default::default()
	}
}

/// Build an LSP handle over a mock connection.
pub fn lsp_handle(
	id: u32,
	capabilities: ServerCapabilities,
	connection: &Arc<MockConnection>,
) -> ServerHandle {
	let erased: Arc<dyn ServerConnection> = connection.clone();
	ServerHandle::new(
		ServerId(id),
		format!("mock-{id}"),
		ServerProtocol::Lsp,
		capabilities,
		&erased,
	)
}

/// A location payload as a server would send it.
pub fn location_json(uri: &str, line: u32) -> JsonValue {
	serde_json::json!({
		"uri": uri,
		"range": {
			"start": { "line": line, "character": 0 },
			"end": { "line": line, "character": 1 },
		},
	})
}
