//! Feature request definitions.
//!
//! Every definition is a zero-sized type implementing [`FeatureRequest`].
//! Capability gates mirror the provider fields a server advertises during
//! initialization; decode accepts `null` as a valid "no results" answer.

use lsp_types::{
	CodeActionOrCommand, CodeActionParams, CodeLens, CodeLensParams, ColorInformation,
	DocumentColorParams, GotoDefinitionParams, GotoDefinitionResponse, Location, ReferenceParams,
	ServerCapabilities,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::locations::{TargetLocation, locations_from_goto_response};
use crate::{DecodeError, FeatureKind, ServerProtocol};

/// One editor operation expressed as a wire request.
///
/// A definition bundles the method name, the capability gate, the request
/// builder, and the response normalizer. The engine stays generic over
/// this trait; concrete features are pure glue.
pub trait FeatureRequest: Send + Sync + 'static {
	/// Request parameters, shared across all selected servers.
	type Params: Serialize + Clone + Send + Sync + 'static;
	/// One normalized result entry.
	type Item: Clone + Send + Sync + 'static;

	/// Wire method name.
	const METHOD: &'static str;
	/// Feature slot this request belongs to.
	const KIND: FeatureKind;
	/// Protocol family the request applies to.
	const PROTOCOL: ServerProtocol = ServerProtocol::Lsp;

	/// Whether a server advertising these capabilities can answer.
	fn supports(capabilities: &ServerCapabilities) -> bool;

	/// Build the request payload for one server.
	///
	/// The default serializes the shared params unchanged; definitions
	/// that need per-server payload variants override this.
	fn build(
		params: &Self::Params,
		capabilities: &ServerCapabilities,
	) -> Result<JsonValue, DecodeError> {
		let _ = capabilities;
		Ok(serde_json::to_value(params)?)
	}

	/// Normalize a raw response into result entries.
	fn decode(value: JsonValue) -> Result<Vec<Self::Item>, DecodeError>;
}

/// Decode a goto-style response (null, scalar, location list, or link list).
fn decode_goto(value: JsonValue) -> Result<Vec<TargetLocation>, DecodeError> {
	if value.is_null() {
		return Ok(Vec::new());
	}
	let response: GotoDefinitionResponse = serde_json::from_value(value)?;
	Ok(locations_from_goto_response(response))
}

/// Decode a plain nullable list response.
fn decode_list<T: DeserializeOwned>(value: JsonValue) -> Result<Vec<T>, DecodeError> {
	if value.is_null() {
		return Ok(Vec::new());
	}
	Ok(serde_json::from_value(value)?)
}

/// `textDocument/definition`.
pub struct Definition;

impl FeatureRequest for Definition {
	type Params = GotoDefinitionParams;
	type Item = TargetLocation;

	const METHOD: &'static str = "textDocument/definition";
	const KIND: FeatureKind = FeatureKind::Definition;

	fn supports(capabilities: &ServerCapabilities) -> bool {
		capabilities.definition_provider.is_some()
	}

	fn decode(value: JsonValue) -> Result<Vec<TargetLocation>, DecodeError> {
		decode_goto(value)
	}
}

/// `textDocument/implementation`.
///
/// Shares the goto params/response shape with [`Definition`], including
/// the location-vs-link response union.
pub struct Implementation;

impl FeatureRequest for Implementation {
	type Params = GotoDefinitionParams;
	type Item = TargetLocation;

	const METHOD: &'static str = "textDocument/implementation";
	const KIND: FeatureKind = FeatureKind::Implementation;

	fn supports(capabilities: &ServerCapabilities) -> bool {
		capabilities.implementation_provider.is_some()
	}

	fn decode(value: JsonValue) -> Result<Vec<TargetLocation>, DecodeError> {
		decode_goto(value)
	}
}

/// `textDocument/references`.
pub struct References;

impl FeatureRequest for References {
	type Params = ReferenceParams;
	type Item = TargetLocation;

	const METHOD: &'static str = "textDocument/references";
	const KIND: FeatureKind = FeatureKind::References;

	fn supports(capabilities: &ServerCapabilities) -> bool {
		capabilities.references_provider.is_some()
	}

	fn decode(value: JsonValue) -> Result<Vec<TargetLocation>, DecodeError> {
		let locations: Vec<Location> = decode_list(value)?;
		Ok(locations.into_iter().map(Into::into).collect())
	}
}

/// `textDocument/codeAction`.
pub struct CodeActions;

impl FeatureRequest for CodeActions {
	type Params = CodeActionParams;
	type Item = CodeActionOrCommand;

	const METHOD: &'static str = "textDocument/codeAction";
	const KIND: FeatureKind = FeatureKind::CodeAction;

	fn supports(capabilities: &ServerCapabilities) -> bool {
		capabilities.code_action_provider.is_some()
	}

	fn decode(value: JsonValue) -> Result<Vec<CodeActionOrCommand>, DecodeError> {
		let actions: Vec<CodeActionOrCommand> = decode_list(value)?;
		// Disabled actions are dropped at the boundary.
		Ok(actions
			.into_iter()
			.filter(|action| match action {
				CodeActionOrCommand::CodeAction(action) => action.disabled.is_none(),
				CodeActionOrCommand::Command(_) => true,
			})
			.collect())
	}
}

/// `textDocument/codeLens`.
pub struct CodeLenses;

impl FeatureRequest for CodeLenses {
	type Params = CodeLensParams;
	type Item = CodeLens;

	const METHOD: &'static str = "textDocument/codeLens";
	const KIND: FeatureKind = FeatureKind::CodeLens;

	fn supports(capabilities: &ServerCapabilities) -> bool {
		capabilities.code_lens_provider.is_some()
	}

	fn decode(value: JsonValue) -> Result<Vec<CodeLens>, DecodeError> {
		decode_list(value)
	}
}

/// `textDocument/documentColor`.
pub struct DocumentColors;

impl FeatureRequest for DocumentColors {
	type Params = DocumentColorParams;
	type Item = ColorInformation;

	const METHOD: &'static str = "textDocument/documentColor";
	const KIND: FeatureKind = FeatureKind::DocumentColor;

	fn supports(capabilities: &ServerCapabilities) -> bool {
		capabilities.color_provider.is_some()
	}

	fn decode(value: JsonValue) -> Result<Vec<ColorInformation>, DecodeError> {
		decode_list(value)
	}
}

#[cfg(test)]
mod tests {
	use lsp_types::{OneOf, Position, Uri};
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	#[test]
	fn test_null_response_decodes_to_empty() {
		assert!(Definition::decode(JsonValue::Null).unwrap().is_empty());
		assert!(References::decode(JsonValue::Null).unwrap().is_empty());
		assert!(CodeLenses::decode(JsonValue::Null).unwrap().is_empty());
		assert!(DocumentColors::decode(JsonValue::Null).unwrap().is_empty());
	}

	#[test]
	fn test_goto_union_shapes_normalize_to_same_location() {
		let plain = json!([{
			"uri": "file:///a.rs",
			"range": { "start": { "line": 4, "character": 0 }, "end": { "line": 4, "character": 8 } },
		}]);
		let linked = json!([{
			"targetUri": "file:///a.rs",
			"targetRange": { "start": { "line": 0, "character": 0 }, "end": { "line": 9, "character": 0 } },
			"targetSelectionRange": { "start": { "line": 4, "character": 0 }, "end": { "line": 4, "character": 8 } },
		}]);

		let from_plain = Definition::decode(plain).unwrap();
		let from_link = Definition::decode(linked).unwrap();

		assert_eq!(from_plain.len(), 1);
		assert_eq!(from_plain[0].uri, from_link[0].uri);
		assert_eq!(from_plain[0].range, from_link[0].range);
	}

	#[test]
	fn test_goto_scalar_response() {
		let scalar = json!({
			"uri": "file:///a.rs",
			"range": { "start": { "line": 1, "character": 0 }, "end": { "line": 1, "character": 3 } },
		});

		let decoded = Implementation::decode(scalar).unwrap();
		assert_eq!(decoded.len(), 1);
		assert_eq!(decoded[0].uri, "file:///a.rs".parse::<Uri>().unwrap());
	}

	#[test]
	fn test_references_decode_preserves_order() {
		let value = json!([
			{ "uri": "file:///b.rs", "range": { "start": { "line": 2, "character": 0 }, "end": { "line": 2, "character": 1 } } },
			{ "uri": "file:///a.rs", "range": { "start": { "line": 1, "character": 0 }, "end": { "line": 1, "character": 1 } } },
		]);

		let decoded = References::decode(value).unwrap();
		assert_eq!(decoded.len(), 2);
		assert_eq!(decoded[0].uri, "file:///b.rs".parse::<Uri>().unwrap());
		assert_eq!(decoded[1].uri, "file:///a.rs".parse::<Uri>().unwrap());
	}

	#[test]
	fn test_code_actions_drop_disabled() {
		let value = json!([
			{ "title": "fix it" },
			{ "title": "cannot", "disabled": { "reason": "not applicable here" } },
			{ "title": "run", "command": "test.run" },
		]);

		let decoded = CodeActions::decode(value).unwrap();
		assert_eq!(decoded.len(), 2);
	}

	#[test]
	fn test_malformed_response_is_an_error() {
		assert!(Definition::decode(json!(42)).is_err());
		assert!(CodeLenses::decode(json!({"not": "a list"})).is_err());
	}

	#[test]
	fn test_capability_gates() {
		let mut capabilities = ServerCapabilities::default();
		assert!(!Definition::supports(&capabilities));
		assert!(!CodeLenses::supports(&capabilities));

		capabilities.definition_provider = Some(OneOf::Left(true));
		assert!(Definition::supports(&capabilities));
		assert!(!Implementation::supports(&capabilities));
	}

	#[test]
	fn test_build_serializes_shared_params() {
		let params = GotoDefinitionParams {
			text_document_position_params: lsp_types::TextDocumentPositionParams {
				text_document: lsp_types::TextDocumentIdentifier {
					uri: "file:///a.rs".parse().unwrap(),
				},
				position: Position { line: 3, character: 7 },
			},
			work_done_progress_params: Default::default(),
			partial_result_params: Default::default(),
		};

		let payload = Definition::build(&params, &ServerCapabilities::default()).unwrap();
		assert_eq!(payload["position"]["line"], 3);
		assert_eq!(payload["textDocument"]["uri"], "file:///a.rs");
	}
}
