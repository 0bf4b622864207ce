//! Carrier-agnostic rate quote.

// self
use crate::_prelude::*;

/// Currency assumed when a carrier omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// One quoted service, independent of the carrier that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRate {
	/// Human-readable service name.
	pub service_name: String,
	/// Carrier service code, when the carrier supplied one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_code: Option<String>,
	/// Total charge; never negative.
	pub amount: Decimal,
	/// ISO 4217 currency code.
	pub currency: String,
	/// Business days in transit, when known.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub estimated_days: Option<u32>,
}

/// Whether `value` has the shape of an ISO 4217 code.
pub(crate) fn is_currency_code(value: &str) -> bool {
	value.len() == 3 && value.bytes().all(|b| b.is_ascii_alphabetic())
}
