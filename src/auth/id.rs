//! Validated identifiers for OAuth clients and carriers.
//!
//! A [`ClientId`] travels inside HTTP Basic credentials, so it is limited to printable ASCII
//! without `:`. A [`CarrierId`] is a short lowercase slug used in logs and lookups.

// std
use std::borrow::Borrow;
// self
use crate::_prelude::*;

/// Longest accepted OAuth client identifier.
pub const CLIENT_ID_MAX_LEN: usize = 128;
/// Longest accepted carrier slug.
pub const CARRIER_ID_MAX_LEN: usize = 32;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Which identifier failed.
		kind: &'static str,
	},
	/// The identifier contains a character its kind does not allow.
	#[error("{kind} identifier cannot contain {found:?}.")]
	InvalidCharacter {
		/// Which identifier failed.
		kind: &'static str,
		/// First rejected character.
		found: char,
	},
	/// The identifier exceeded the allowed length.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Which identifier failed.
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

/// OAuth client identifier issued by a carrier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);
impl ClientId {
	const KIND: &'static str = "Client";

	/// Validates `value` as an OAuth client identifier.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		check(Self::KIND, &value, CLIENT_ID_MAX_LEN, |c| c.is_ascii_graphic() && c != ':')?;

		Ok(Self(value))
	}
}
impl AsRef<str> for ClientId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for ClientId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ClientId({})", self.0)
	}
}
impl Display for ClientId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl From<ClientId> for String {
	fn from(value: ClientId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ClientId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

/// Lowercase slug naming a carrier, such as `ups`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CarrierId(String);
impl CarrierId {
	const KIND: &'static str = "Carrier";

	/// Validates `value` as a carrier slug of `a-z`, `0-9`, `-`, and `_`.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		check(Self::KIND, &value, CARRIER_ID_MAX_LEN, |c| {
			c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_')
		})?;

		Ok(Self(value))
	}

	/// Returns the slug.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for CarrierId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for CarrierId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "CarrierId({})", self.0)
	}
}
impl Display for CarrierId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl From<CarrierId> for String {
	fn from(value: CarrierId) -> Self {
		value.0
	}
}
impl TryFrom<String> for CarrierId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

fn check(
	kind: &'static str,
	value: &str,
	max: usize,
	allowed: impl Fn(char) -> bool,
) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) = value.chars().find(|c| !allowed(*c)) {
		return Err(IdentifierError::InvalidCharacter { kind, found });
	}
	// Every allowed character is ASCII, so bytes equal characters here.
	if value.len() > max {
		return Err(IdentifierError::TooLong { kind, max });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	#[test]
	fn client_ids_must_fit_basic_credentials() {
		assert_eq!(ClientId::new(""), Err(IdentifierError::Empty { kind: "Client" }));
		assert_eq!(
			ClientId::new("tenant:client"),
			Err(IdentifierError::InvalidCharacter { kind: "Client", found: ':' })
		);
		assert_eq!(
			ClientId::new(" client-1"),
			Err(IdentifierError::InvalidCharacter { kind: "Client", found: ' ' })
		);
		assert!(ClientId::new("cliënt").is_err());

		let client = ClientId::new("AbC.123~xyz").expect("Printable ASCII should be accepted.");

		assert_eq!(client.as_ref(), "AbC.123~xyz");
		assert_eq!(format!("{client:?}"), "ClientId(AbC.123~xyz)");
		assert_eq!(
			ClientId::new("a".repeat(CLIENT_ID_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { kind: "Client", max: CLIENT_ID_MAX_LEN })
		);
	}

	#[test]
	fn carrier_ids_are_lowercase_slugs() {
		CarrierId::new("ups").expect("Slug should be accepted.");
		CarrierId::new("fedex_ground-2").expect("Slug punctuation should be accepted.");
		CarrierId::new("a".repeat(CARRIER_ID_MAX_LEN)).expect("Exact length should succeed.");

		assert_eq!(
			CarrierId::new("UPS"),
			Err(IdentifierError::InvalidCharacter { kind: "Carrier", found: 'U' })
		);
		assert_eq!(
			CarrierId::new("a".repeat(CARRIER_ID_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { kind: "Carrier", max: CARRIER_ID_MAX_LEN })
		);
	}

	#[test]
	fn serde_enforces_validation() {
		let carrier: CarrierId =
			serde_json::from_str("\"ups\"").expect("Carrier should deserialize successfully.");

		assert_eq!(carrier.as_str(), "ups");
		assert_eq!(serde_json::to_string(&carrier).expect("Carrier should serialize."), "\"ups\"");
		assert!(serde_json::from_str::<ClientId>("\"with space\"").is_err());
	}

	#[test]
	fn carriers_can_be_looked_up_by_str() {
		let map = HashMap::from([(
			CarrierId::new("ups").expect("Carrier used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("ups"), Some(&7));
	}
}
