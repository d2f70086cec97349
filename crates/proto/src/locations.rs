//! Normalized target locations.

use lsp_types::{GotoDefinitionResponse, Location, LocationLink, Range, Uri};

/// A resolved target position in some document.
///
/// Servers answer location-valued requests in one of two wire shapes:
/// plain locations (`{uri, range}`) or links (`{targetUri, targetRange,
/// ...}`) when the client declared link support. Both collapse into this
/// shape at the transport boundary, so the merge and cache layers never
/// see the protocol variance.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetLocation {
	/// Document the target lives in.
	pub uri: Uri,
	/// Range to reveal, preferring the link's selection range when present.
	pub range: Range,
	/// Range in the source document the jump originated from (links only).
	pub origin: Option<Range>,
}

impl From<Location> for TargetLocation {
	fn from(location: Location) -> Self {
		Self {
			uri: location.uri,
			range: location.range,
			origin: None,
		}
	}
}

impl From<LocationLink> for TargetLocation {
	fn from(link: LocationLink) -> Self {
		Self {
			uri: link.target_uri,
			range: link.target_selection_range,
			origin: link.origin_selection_range,
		}
	}
}

/// Flatten a goto-style response union into normalized locations.
///
/// Response order is preserved; a scalar answer yields a single entry.
pub fn locations_from_goto_response(response: GotoDefinitionResponse) -> Vec<TargetLocation> {
	match response {
		GotoDefinitionResponse::Scalar(location) => vec![location.into()],
		GotoDefinitionResponse::Array(locations) => locations.into_iter().map(Into::into).collect(),
		GotoDefinitionResponse::Link(links) => links.into_iter().map(Into::into).collect(),
	}
}
