//! Engine facade tying selection, dispatch, merge, cache, and slots
//! together.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use lsp_types::{
	CodeActionContext, CodeActionOrCommand, CodeActionParams, CodeLens, CodeLensParams,
	ColorInformation, DocumentColorParams, GotoDefinitionParams, Position, Range, ReferenceContext,
	ReferenceParams, TextDocumentIdentifier, TextDocumentPositionParams, Uri,
};
use parking_lot::RwLock;
use serde::Deserialize;

use crate::cache::{FeatureCache, MergedFuture};
use crate::dispatch::dispatch;
use crate::merge::merge;
use crate::proto::{
	CodeActions, CodeLenses, Definition, DocumentColors, FeatureKind, FeatureRequest,
	Implementation, References, TargetLocation,
};
use crate::registry::ServerRegistry;
use crate::select::ServerSelector;
use crate::slots::LazySlots;

/// Engine tuning knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
	/// Number of placeholder slots per lazy code-action provider.
	#[serde(default = "default_slot_capacity")]
	pub lazy_slot_capacity: usize,
	/// Bounded-wait deadline for slot queries, in milliseconds.
	#[serde(default = "default_slot_wait_ms")]
	pub slot_wait_ms: u64,
}

/// Returns the default lazy slot capacity.
fn default_slot_capacity() -> usize {
	16
}

/// Returns the default slot wait deadline in milliseconds.
fn default_slot_wait_ms() -> u64 {
	250
}

impl Default for HubConfig {
	fn default() -> Self {
		Self {
			lazy_slot_capacity: default_slot_capacity(),
			slot_wait_ms: default_slot_wait_ms(),
		}
	}
}

impl HubConfig {
	/// Slot wait deadline as a [`Duration`].
	pub fn slot_wait(&self) -> Duration {
		Duration::from_millis(self.slot_wait_ms)
	}
}

/// Trigger fingerprint for range-scoped code action requests.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeActionScope {
	/// Document version the request was computed against.
	pub version: i32,
	/// Range the actions apply to.
	pub range: Range,
}

/// Per-document feature slots.
///
/// Fingerprints differ per feature kind: position-based features key on
/// the caret, range-scoped code actions on (version, range), and
/// whole-document features on the document version alone.
#[derive(Default)]
struct DocumentFeatures {
	definition: FeatureCache<Position, TargetLocation>,
	implementation: FeatureCache<Position, TargetLocation>,
	references: FeatureCache<(Position, bool), TargetLocation>,
	code_actions: FeatureCache<CodeActionScope, CodeActionOrCommand>,
	code_lenses: FeatureCache<i32, CodeLens>,
	document_colors: FeatureCache<i32, ColorInformation>,
}

impl DocumentFeatures {
	fn cancel_all(&self) {
		self.definition.cancel();
		self.implementation.cancel();
		self.references.cancel();
		self.code_actions.cancel();
		self.code_lenses.cancel();
		self.document_colors.cancel();
	}
}

/// Multi-server feature-request engine.
///
/// One hub serves all open documents. Every operation goes through the
/// same pipeline: compare the trigger fingerprint against the cached
/// record, cancel-and-replace when it changed, select applicable servers,
/// dispatch one call per server under a fresh cancellation group, and
/// share the merged future with every caller of the same fingerprint.
pub struct FeatureHub {
	selector: ServerSelector,
	config: HubConfig,
	documents: RwLock<HashMap<Uri, Arc<DocumentFeatures>>>,
}

impl FeatureHub {
	/// Create a hub over the given registry with default configuration.
	pub fn new(registry: Arc<dyn ServerRegistry>) -> Self {
		Self::with_config(registry, HubConfig::default())
	}

	/// Create a hub with explicit configuration.
	pub fn with_config(registry: Arc<dyn ServerRegistry>, config: HubConfig) -> Self {
		Self {
			selector: ServerSelector::new(registry),
			config,
			documents: RwLock::new(HashMap::new()),
		}
	}

	/// The hub's configuration.
	pub fn config(&self) -> &HubConfig {
		&self.config
	}

	fn document(&self, uri: &Uri) -> Arc<DocumentFeatures> {
		if let Some(existing) = self.documents.read().get(uri) {
			return existing.clone();
		}
		self.documents.write().entry(uri.clone()).or_default().clone()
	}

	/// Request definitions for the symbol at `position`.
	pub fn goto_definition(&self, uri: &Uri, position: Position) -> MergedFuture<TargetLocation> {
		let document = self.document(uri);
		let params = goto_params(uri, position);
		compute::<Definition, _>(&document.definition, &self.selector, uri, position, params)
	}

	/// Request implementations for the symbol at `position`.
	pub fn goto_implementation(
		&self,
		uri: &Uri,
		position: Position,
	) -> MergedFuture<TargetLocation> {
		let document = self.document(uri);
		let params = goto_params(uri, position);
		compute::<Implementation, _>(&document.implementation, &self.selector, uri, position, params)
	}

	/// Request references to the symbol at `position`.
	pub fn references(
		&self,
		uri: &Uri,
		position: Position,
		include_declaration: bool,
	) -> MergedFuture<TargetLocation> {
		let document = self.document(uri);
		let params = ReferenceParams {
			text_document_position: text_position(uri, position),
			work_done_progress_params: Default::default(),
			partial_result_params: Default::default(),
			context: ReferenceContext {
				include_declaration,
			},
		};
		compute::<References, _>(
			&document.references,
			&self.selector,
			uri,
			(position, include_declaration),
			params,
		)
	}

	/// Request code actions for `scope`.
	pub fn code_actions(
		&self,
		uri: &Uri,
		scope: CodeActionScope,
		context: CodeActionContext,
	) -> MergedFuture<CodeActionOrCommand> {
		let document = self.document(uri);
		let params = code_action_params(uri, &scope, context);
		compute::<CodeActions, _>(&document.code_actions, &self.selector, uri, scope, params)
	}

	/// Request code lenses for the whole document at `version`.
	pub fn code_lenses(&self, uri: &Uri, version: i32) -> MergedFuture<CodeLens> {
		let document = self.document(uri);
		let params = CodeLensParams {
			text_document: TextDocumentIdentifier { uri: uri.clone() },
			work_done_progress_params: Default::default(),
			partial_result_params: Default::default(),
		};
		compute::<CodeLenses, _>(&document.code_lenses, &self.selector, uri, version, params)
	}

	/// Request color annotations for the whole document at `version`.
	pub fn document_colors(&self, uri: &Uri, version: i32) -> MergedFuture<ColorInformation> {
		let document = self.document(uri);
		let params = DocumentColorParams {
			text_document: TextDocumentIdentifier { uri: uri.clone() },
			work_done_progress_params: Default::default(),
			partial_result_params: Default::default(),
		};
		compute::<DocumentColors, _>(
			&document.document_colors,
			&self.selector,
			uri,
			version,
			params,
		)
	}

	/// Placeholder code-action slots backed by the shared cache pipeline.
	///
	/// Construction issues no traffic; the backing computation starts on
	/// the first slot access and is shared with direct
	/// [`Self::code_actions`] calls of the same scope.
	pub fn lazy_code_actions(
		&self,
		uri: &Uri,
		scope: CodeActionScope,
		context: CodeActionContext,
	) -> LazySlots<CodeActionOrCommand> {
		let document = self.document(uri);
		let selector = self.selector.clone();
		let uri = uri.clone();
		let params = code_action_params(&uri, &scope, context);
		LazySlots::new(self.config.lazy_slot_capacity, move || {
			compute::<CodeActions, _>(&document.code_actions, &selector, &uri, scope, params)
		})
	}

	/// Cancel the live computation for one feature, if any.
	///
	/// Other feature kinds and other documents are unaffected; the next
	/// request for this feature starts fresh.
	pub fn cancel(&self, uri: &Uri, kind: FeatureKind) {
		let Some(document) = self.documents.read().get(uri).cloned() else {
			return;
		};
		match kind {
			FeatureKind::Definition => document.definition.cancel(),
			FeatureKind::Implementation => document.implementation.cancel(),
			FeatureKind::References => document.references.cancel(),
			FeatureKind::CodeAction => document.code_actions.cancel(),
			FeatureKind::CodeLens => document.code_lenses.cancel(),
			FeatureKind::DocumentColor => document.document_colors.cancel(),
		}
	}

	/// Drop all feature state for a closing document.
	///
	/// Every live computation for the document is cancelled; in-flight
	/// callers observe the cancelled terminal state.
	pub fn close_document(&self, uri: &Uri) {
		let Some(document) = self.documents.write().remove(uri) else {
			return;
		};
		tracing::debug!(uri = uri.as_str(), "document closed, cancelling live feature requests");
		document.cancel_all();
	}
}

/// Run one feature through the cache/select/dispatch/merge pipeline.
fn compute<F, K>(
	cache: &FeatureCache<K, F::Item>,
	selector: &ServerSelector,
	uri: &Uri,
	fingerprint: K,
	params: F::Params,
) -> MergedFuture<F::Item>
where
	F: FeatureRequest,
	K: PartialEq,
{
	let selector = selector.clone();
	let uri = uri.clone();
	cache.request(fingerprint, move |group| {
		let servers = selector.select::<F>(&uri);
		if servers.is_empty() {
			tracing::debug!(method = F::METHOD, uri = uri.as_str(), "no applicable servers");
			return std::future::ready(Ok(Vec::new())).boxed();
		}
		merge(dispatch::<F>(&params, &servers, group)).boxed()
	})
}

fn text_position(uri: &Uri, position: Position) -> TextDocumentPositionParams {
	TextDocumentPositionParams {
		text_document: TextDocumentIdentifier { uri: uri.clone() },
		position,
	}
}

fn goto_params(uri: &Uri, position: Position) -> GotoDefinitionParams {
	GotoDefinitionParams {
		text_document_position_params: text_position(uri, position),
		work_done_progress_params: Default::default(),
		partial_result_params: Default::default(),
	}
}

fn code_action_params(
	uri: &Uri,
	scope: &CodeActionScope,
	context: CodeActionContext,
) -> CodeActionParams {
	CodeActionParams {
		text_document: TextDocumentIdentifier { uri: uri.clone() },
		range: scope.range,
		context,
		work_done_progress_params: Default::default(),
		partial_result_params: Default::default(),
	}
}
