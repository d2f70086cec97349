//! Multi-server asynchronous feature-request engine for editor protocol
//! clients.
//!
//! For one editor operation (go-to-definition, code actions, code lenses,
//! document colors, ...) the engine selects which of the currently-running
//! language/debug servers apply, dispatches one request per server in
//! parallel, and merges the answers into a single ordered,
//! partial-failure-tolerant result. Computations are cached per
//! (document, feature kind) keyed by a trigger fingerprint, so repeated
//! and overlapping UI events reuse in-flight work, and superseded
//! computations are cancelled promptly.
//!
//! The entry point is [`FeatureHub`]. Wire transport and server process
//! lifecycle stay behind the [`ServerConnection`] and [`ServerRegistry`]
//! seams; the engine never spawns or owns server processes and holds
//! connections only weakly for the duration of a request.
//!
//! Cancellation is cooperative throughout: a [`CancelGroup`] ties the
//! fan-out of one computation together, external UI cancellation flows in
//! through [`ProgressSignal`] without touching the computation, and a
//! per-server failure is absorbed as an empty contribution rather than
//! surfacing to the caller.

/// Re-export of the protocol-facing feature definitions.
pub use chorus_proto as proto;

mod cache;
mod cancel;
mod dispatch;
mod hub;
mod merge;
mod progress;
mod registry;
mod select;
mod server;
mod slots;
mod wait;

#[cfg(test)]
mod testing;

pub use cache::{FeatureCache, MergedFuture};
pub use cancel::CancelGroup;
pub use dispatch::{CallOutcome, PendingCall, dispatch};
pub use hub::{CodeActionScope, FeatureHub, HubConfig};
pub use merge::{Cancelled, merge};
pub use progress::{NeverCancelled, ProgressSignal};
pub use registry::{ServerRegistry, StaticRegistry};
pub use select::ServerSelector;
pub use server::{CallError, CallReply, ServerConnection, ServerHandle, ServerId};
pub use slots::{LazySlots, SlotState};
pub use wait::{WaitOutcome, wait_merged};

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Terminal caller-facing errors.
///
/// Per-server failures never show up here; they are absorbed into empty
/// contributions during the merge. Cancellation is a distinct terminal
/// state ([`Cancelled`]), not an error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// A lazy slot index beyond the declared capacity was queried.
	#[error("slot index {index} out of range (capacity {capacity})")]
	SlotOutOfRange {
		/// The queried index.
		index: usize,
		/// The provider's fixed capacity.
		capacity: usize,
	},
}
