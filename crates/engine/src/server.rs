//! Server handles and the transport seam.

use std::sync::{Arc, Weak};

use lsp_types::ServerCapabilities;
use serde_json::Value as JsonValue;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::proto::{DecodeError, ServerProtocol};

/// Unique identifier for a server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerId(pub u32);

impl std::fmt::Display for ServerId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "srv#{}", self.0)
	}
}

/// Reply to one remote call.
pub type CallReply = std::result::Result<JsonValue, CallError>;

/// Per-server call failures.
///
/// These never fail a merged computation: the failing server contributes
/// an empty list and the failure is logged. Retrying is the lifecycle
/// manager's business, not the engine's.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
	/// The server answered with a protocol-level error object.
	#[error("server error {code}: {message}")]
	Response {
		/// Protocol error code.
		code: i64,
		/// Human-readable message from the server.
		message: String,
	},
	/// The call did not complete within the transport's deadline.
	#[error("request timed out")]
	Timeout,
	/// The server connection is gone (process died, channel closed).
	#[error("server disconnected")]
	Disconnected,
	/// The response payload violated the expected shape.
	#[error(transparent)]
	Malformed(#[from] DecodeError),
}

/// Transport seam for issuing one remote call.
///
/// Implementors put the request on the wire and resolve the returned
/// channel with the raw result. The cancellation token must be observed:
/// when it fires, the implementor should abort the call (e.g. send
/// `$/cancelRequest`) and may drop the sender.
pub trait ServerConnection: Send + Sync {
	/// Issue a request, returning the reply channel immediately.
	fn call(
		&self,
		method: &'static str,
		params: JsonValue,
		cancel: CancellationToken,
	) -> oneshot::Receiver<CallReply>;
}

/// Snapshot handle to one running server.
///
/// Handles are cheap clones obtained from a
/// [`ServerRegistry`](crate::ServerRegistry) at selection time. The
/// connection is held weakly: the lifecycle manager owning the server may
/// drop it mid-flight, which downgrades that server's contribution to
/// empty instead of failing the merge. The engine never mutates server
/// lifecycle state through a handle.
#[derive(Clone)]
pub struct ServerHandle {
	id: ServerId,
	name: Arc<str>,
	protocol: ServerProtocol,
	enabled: bool,
	capabilities: Arc<ServerCapabilities>,
	connection: Weak<dyn ServerConnection>,
}

impl ServerHandle {
	/// Create a handle for a running, initialized server.
	pub fn new(
		id: ServerId,
		name: impl Into<Arc<str>>,
		protocol: ServerProtocol,
		capabilities: ServerCapabilities,
		connection: &Arc<dyn ServerConnection>,
	) -> Self {
		Self {
			id,
			name: name.into(),
			protocol,
			enabled: true,
			capabilities: Arc::new(capabilities),
			connection: Arc::downgrade(connection),
		}
	}

	/// Mark the handle disabled (builder form, for registry snapshots).
	pub fn disabled(mut self) -> Self {
		self.enabled = false;
		self
	}

	/// The server's unique identifier.
	pub fn id(&self) -> ServerId {
		self.id
	}

	/// Human-readable name (usually the command name).
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Protocol family this server speaks.
	pub fn protocol(&self) -> ServerProtocol {
		self.protocol
	}

	/// Enabled flag as snapshotted by the registry.
	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Capabilities negotiated during initialization.
	pub fn capabilities(&self) -> &ServerCapabilities {
		&self.capabilities
	}

	/// Upgrade the weak connection for the duration of one call.
	pub fn connection(&self) -> Option<Arc<dyn ServerConnection>> {
		self.connection.upgrade()
	}
}

impl std::fmt::Debug for ServerHandle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServerHandle")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("protocol", &self.protocol)
			.field("enabled", &self.enabled)
			.field("connected", &(self.connection.strong_count() > 0))
			.finish_non_exhaustive()
	}
}
