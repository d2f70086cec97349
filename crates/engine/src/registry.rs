//! Server discovery seam.

use lsp_types::Uri;
use parking_lot::RwLock;

use crate::server::{ServerHandle, ServerId};

/// Source of currently-running servers for a document.
///
/// Implemented by the lifecycle manager that spawns and supervises server
/// processes; the engine receives it by handle, so tests substitute a
/// double. `servers_for` is a synchronous snapshot in stable enumeration
/// order; later lifecycle changes never retroactively affect an
/// in-flight selection.
pub trait ServerRegistry: Send + Sync {
	/// Handles for every server currently attached to `document`.
	fn servers_for(&self, document: &Uri) -> Vec<ServerHandle>;
}

/// Fixed registry serving the same handles for every document.
///
/// Covers embedders with an editor-global server set, and doubles as the
/// standard registry for tests. Routing servers per document (workspace
/// roots, language matching) belongs to the lifecycle manager.
#[derive(Default)]
pub struct StaticRegistry {
	servers: RwLock<Vec<ServerHandle>>,
}

impl StaticRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a handle; enumeration order is insertion order.
	pub fn insert(&self, handle: ServerHandle) {
		self.servers.write().push(handle);
	}

	/// Remove a handle by server id.
	pub fn remove(&self, id: ServerId) {
		self.servers.write().retain(|handle| handle.id() != id);
	}

	/// Number of registered handles.
	pub fn len(&self) -> usize {
		self.servers.read().len()
	}

	/// Whether the registry holds no handles.
	pub fn is_empty(&self) -> bool {
		self.servers.read().is_empty()
	}
}

impl ServerRegistry for StaticRegistry {
	fn servers_for(&self, _document: &Uri) -> Vec<ServerHandle> {
		self.servers.read().clone()
	}
}
