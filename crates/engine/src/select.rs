//! Applicable-server selection.

use std::sync::Arc;

use lsp_types::{ServerCapabilities, Uri};

use crate::proto::{FeatureRequest, ServerProtocol};
use crate::registry::ServerRegistry;
use crate::server::ServerHandle;

/// Filters a registry snapshot down to the servers a request applies to.
///
/// Selection is synchronous and side-effect-free: enabled servers whose
/// protocol family matches and whose capabilities pass the feature's
/// gate, in registry enumeration order. An empty selection is valid and
/// short-circuits dispatch entirely: no traffic, empty merged result.
#[derive(Clone)]
pub struct ServerSelector {
	registry: Arc<dyn ServerRegistry>,
}

impl ServerSelector {
	/// Create a selector over the given registry.
	pub fn new(registry: Arc<dyn ServerRegistry>) -> Self {
		Self { registry }
	}

	/// Servers able to answer feature `F` for `document`.
	pub fn select<F: FeatureRequest>(&self, document: &Uri) -> Vec<ServerHandle> {
		self.select_where(document, F::PROTOCOL, F::supports)
	}

	/// Servers matching an explicit protocol and capability predicate.
	pub fn select_where(
		&self,
		document: &Uri,
		protocol: ServerProtocol,
		supports: impl Fn(&ServerCapabilities) -> bool,
	) -> Vec<ServerHandle> {
		self.registry
			.servers_for(document)
			.into_iter()
			.filter(|handle| {
				handle.is_enabled()
					&& handle.protocol() == protocol
					&& supports(handle.capabilities())
			})
			.collect()
	}
}
