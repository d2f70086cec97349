//! Protocol-facing building blocks for the chorus feature engine.
//!
//! Each editor operation (go-to-definition, code actions, code lenses, ...)
//! is described by one [`FeatureRequest`] implementation: a wire method
//! name, a capability gate, a request builder, and a response normalizer.
//! The engine in `chorus-engine` is generic over these definitions, so a
//! new feature is a few lines of pure glue here rather than a new engine
//! path.
//!
//! Responses are normalized at this boundary. In particular the two wire
//! shapes of location-valued answers (plain locations and location links)
//! collapse into [`TargetLocation`] before any merging happens.

/// Re-export of the [`lsp_types`] dependency of this crate.
pub use lsp_types;
pub use serde_json::Value as JsonValue;

mod feature;
mod kind;
mod locations;

pub use feature::{
	CodeActions, CodeLenses, Definition, DocumentColors, FeatureRequest, Implementation, References,
};
pub use kind::{FeatureKind, ServerProtocol};
pub use locations::{TargetLocation, locations_from_goto_response};

/// Failures while normalizing a server response.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
	/// The payload did not deserialize into the expected response type.
	#[error("deserialization failed: {0}")]
	Deserialize(#[from] serde_json::Error),
	/// The payload deserialized but violated the expected shape.
	#[error("unexpected response shape: {0}")]
	Shape(&'static str),
}
