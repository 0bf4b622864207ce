//! Normalized rate request and its validation.

// self
use crate::{
	_prelude::*,
	rate::{Address, Package, ServiceLevel, service},
};

/// A single violated constraint on a [`RateRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
	/// Dotted path of the offending field, e.g. `from.postalCode`.
	pub field: String,
	/// What the field must satisfy.
	pub message: String,
}
impl FieldViolation {
	/// Creates a violation for `field`.
	pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self { field: field.into(), message: message.into() }
	}
}
impl Display for FieldViolation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {}", self.field, self.message)
	}
}

/// Carrier-agnostic rate request for one package between two addresses.
///
/// Omitting `service_level` asks the carrier for every service it offers on the lane.
/// Unknown service names in serialized input deserialize to `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
	/// Origin.
	pub from: Address,
	/// Destination.
	pub to: Address,
	/// Package to rate.
	pub package: Package,
	/// Restricts the quote to one service.
	#[serde(default, deserialize_with = "service::lenient", skip_serializing_if = "Option::is_none")]
	pub service_level: Option<ServiceLevel>,
}
impl RateRequest {
	/// Creates a request quoting every available service.
	pub fn new(from: Address, to: Address, package: Package) -> Self {
		Self { from, to, package, service_level: None }
	}

	/// Restricts the quote to `level`.
	pub fn with_service_level(mut self, level: ServiceLevel) -> Self {
		self.service_level = Some(level);

		self
	}

	/// Checks every field and returns all violations at once.
	pub fn validate(&self) -> Result<(), Vec<FieldViolation>> {
		let mut violations = Vec::new();

		self.from.collect_violations("from", &mut violations);
		self.to.collect_violations("to", &mut violations);
		self.package.collect_violations("package", &mut violations);

		if violations.is_empty() { Ok(()) } else { Err(violations) }
	}
}
