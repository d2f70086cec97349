//! Feature and protocol discriminants.

/// The feature slot a request belongs to.
///
/// One cached computation exists per (document, kind) pair, so two
/// requests of the same kind supersede each other while requests of
/// different kinds run independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
	/// `textDocument/definition`.
	Definition,
	/// `textDocument/implementation`.
	Implementation,
	/// `textDocument/references`.
	References,
	/// `textDocument/codeAction`.
	CodeAction,
	/// `textDocument/codeLens`.
	CodeLens,
	/// `textDocument/documentColor`.
	DocumentColor,
}

impl std::fmt::Display for FeatureKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Definition => "definition",
			Self::Implementation => "implementation",
			Self::References => "references",
			Self::CodeAction => "code-action",
			Self::CodeLens => "code-lens",
			Self::DocumentColor => "document-color",
		};
		f.write_str(name)
	}
}

/// Protocol family a server speaks.
///
/// Language servers and debug adapters share the same engine machinery;
/// feature definitions declare which family they apply to and selection
/// filters on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerProtocol {
	/// Language Server Protocol.
	Lsp,
	/// Debug Adapter Protocol.
	Dap,
}

impl std::fmt::Display for ServerProtocol {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Lsp => f.write_str("lsp"),
			Self::Dap => f.write_str("dap"),
		}
	}
}
