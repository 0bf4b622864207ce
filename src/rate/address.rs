//! Normalized postal address.

// self
use crate::{_prelude::*, rate::FieldViolation};

const STATE_PROVINCE_MAX_LEN: usize = 3;

/// Carrier-agnostic address; only country and postal code take part in rating.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
	/// ISO 3166-1 alpha-2 country code.
	pub country: String,
	/// Postal or ZIP code.
	pub postal_code: String,
	/// City name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub city: Option<String>,
	/// State or province code (at most three characters).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state_province_code: Option<String>,
	/// First street line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address_line1: Option<String>,
	/// Second street line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub address_line2: Option<String>,
}
impl Address {
	/// Creates an address from the two fields rating requires.
	pub fn new(country: impl Into<String>, postal_code: impl Into<String>) -> Self {
		Self {
			country: country.into(),
			postal_code: postal_code.into(),
			city: None,
			state_province_code: None,
			address_line1: None,
			address_line2: None,
		}
	}

	/// Sets the city.
	pub fn with_city(mut self, city: impl Into<String>) -> Self {
		self.city = Some(city.into());

		self
	}

	/// Sets the state or province code.
	pub fn with_state_province_code(mut self, code: impl Into<String>) -> Self {
		self.state_province_code = Some(code.into());

		self
	}

	/// Sets the street lines.
	pub fn with_lines(mut self, line1: impl Into<String>, line2: Option<String>) -> Self {
		self.address_line1 = Some(line1.into());
		self.address_line2 = line2;

		self
	}

	pub(crate) fn collect_violations(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
		if !is_country_code(&self.country) {
			out.push(FieldViolation::new(
				format!("{prefix}.country"),
				"must be a 2-letter country code",
			));
		}
		if self.postal_code.trim().is_empty() {
			out.push(FieldViolation::new(format!("{prefix}.postalCode"), "must not be empty"));
		}
		if self
			.state_province_code
			.as_deref()
			.is_some_and(|code| code.chars().count() > STATE_PROVINCE_MAX_LEN)
		{
			out.push(FieldViolation::new(
				format!("{prefix}.stateProvinceCode"),
				"must be at most 3 characters",
			));
		}
	}
}

fn is_country_code(value: &str) -> bool {
	value.len() == 2 && value.bytes().all(|b| b.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn violations(address: &Address) -> Vec<String> {
		let mut out = Vec::new();

		address.collect_violations("from", &mut out);

		out.into_iter().map(|v| v.field).collect()
	}

	#[test]
	fn accepts_minimal_address() {
		assert!(violations(&Address::new("US", "10001")).is_empty());
	}

	#[test]
	fn rejects_bad_country_and_blank_postal_code() {
		assert_eq!(violations(&Address::new("USA", "  ")), ["from.country", "from.postalCode"]);
		assert_eq!(violations(&Address::new("U1", "10001")), ["from.country"]);
	}

	#[test]
	fn rejects_long_state_code() {
		let address = Address::new("US", "10001").with_state_province_code("NYCX");

		assert_eq!(violations(&address), ["from.stateProvinceCode"]);
	}

	#[test]
	fn deserializes_camel_case_fields() {
		let address: Address =
			serde_json::from_str(r#"{"country":"CA","postalCode":"H2X 1Y4","city":"Montreal"}"#)
				.expect("Address should deserialize.");

		assert_eq!(address.postal_code, "H2X 1Y4");
		assert_eq!(address.city.as_deref(), Some("Montreal"));
		assert!(address.state_province_code.is_none());
	}
}
