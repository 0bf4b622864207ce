//! Seam between the carrier-agnostic model and a carrier's wire format.
//!
//! Implementations own every carrier-specific detail of the rating payloads and keep plain
//! byte slices and [`serde_json::Value`] at the boundary so they never depend on an HTTP
//! client.

// self
use crate::{
	_prelude::*,
	rate::{NormalizedRate, RateRequest},
};

/// Maps normalized requests to a carrier's rating payload and its responses back.
pub trait RateNormalizer
where
	Self: Send + Sync,
{
	/// Builds the rating request body for `request`.
	///
	/// The mapping must be deterministic; service levels the carrier does not offer are
	/// omitted so the carrier quotes every service.
	fn to_provider_request(
		&self,
		request: &RateRequest,
	) -> Result<serde_json::Value, serde_json::Error>;

	/// Extracts the first error message embedded in a response body, if any.
	fn provider_error_message(&self, body: &[u8]) -> Option<String>;

	/// Parses a successful response body into normalized rates.
	///
	/// Embedded errors are reported before any parsing. Parsing is all-or-nothing: a single
	/// malformed entry fails the whole response.
	fn parse_provider_response(&self, body: &[u8])
	-> Result<Vec<NormalizedRate>, ResponseFailure>;
}

/// Why a successful HTTP response could not be turned into rates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResponseFailure {
	/// The carrier embedded an error list in the payload.
	Embedded {
		/// First embedded message.
		message: String,
	},
	/// The payload does not have the expected shape.
	Malformed {
		/// Index of the offending entry, when the failure is entry specific.
		index: Option<usize>,
		/// Description of the failure.
		reason: String,
	},
}
impl ResponseFailure {
	pub(crate) fn malformed(index: Option<usize>, reason: impl Into<String>) -> Self {
		Self::Malformed { index, reason: reason.into() }
	}
}
