//! Carrier descriptor data structures.
//!
//! A descriptor names a carrier and the two endpoints the client talks to. Use
//! [`CarrierDescriptor::builder`] for custom deployments or [`CarrierDescriptor::ups`] to derive
//! the UPS endpoints from a base URL.

/// Builder API for assembling carrier descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::CarrierId};

const UPS_ID: &str = "ups";
const UPS_TOKEN_PATH: &str = "security/v1/oauth/token";
const UPS_RATING_PATH: &str = "api/rating/v1/Shop";

/// Endpoint set declared by a carrier descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierEndpoints {
	/// OAuth client-credentials token endpoint.
	pub token: Url,
	/// Rate-quote endpoint.
	pub rating: Url,
}

/// Immutable carrier descriptor consumed by the authenticator and the rate client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierDescriptor {
	/// Descriptor identifier.
	pub id: CarrierId,
	/// Endpoint definitions exposed by the carrier.
	pub endpoints: CarrierEndpoints,
}
impl CarrierDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: CarrierId) -> CarrierDescriptorBuilder {
		CarrierDescriptorBuilder::new(id)
	}

	/// Derives the UPS token and rating endpoints from `base`.
	///
	/// A trailing slash on `base` is ignored and any base path is preserved, so
	/// `https://example.com/ups/` yields `https://example.com/ups/api/rating/v1/Shop`.
	pub fn ups(base: &Url) -> Result<Self, DescriptorError> {
		Self::builder(CarrierId::new(UPS_ID)?)
			.token_endpoint(join_base(base, UPS_TOKEN_PATH)?)
			.rating_endpoint(join_base(base, UPS_RATING_PATH)?)
			.build()
	}
}

fn join_base(base: &Url, path: &'static str) -> Result<Url, DescriptorError> {
	if base.cannot_be_a_base() {
		return Err(DescriptorError::InvalidBase { url: base.to_string() });
	}

	let mut url = base.clone();

	url.set_query(None);
	url.set_fragment(None);

	let prefix = url.path().trim_end_matches('/').to_owned();

	url.set_path(&format!("{prefix}/{path}"));

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(raw: &str) -> Url {
		Url::parse(raw).expect("URL fixture should parse.")
	}

	#[test]
	fn ups_endpoints_follow_base_url() {
		let descriptor = CarrierDescriptor::ups(&url("https://onlinetools.ups.com/"))
			.expect("UPS descriptor should build.");

		assert_eq!(descriptor.id.as_str(), "ups");
		assert_eq!(
			descriptor.endpoints.token.as_str(),
			"https://onlinetools.ups.com/security/v1/oauth/token"
		);
		assert_eq!(
			descriptor.endpoints.rating.as_str(),
			"https://onlinetools.ups.com/api/rating/v1/Shop"
		);
	}

	#[test]
	fn ups_endpoints_keep_base_path() {
		let descriptor = CarrierDescriptor::ups(&url("https://gateway.example.com/ups/?debug=1"))
			.expect("UPS descriptor should build.");

		assert_eq!(
			descriptor.endpoints.rating.as_str(),
			"https://gateway.example.com/ups/api/rating/v1/Shop"
		);
	}

	#[test]
	fn ups_rejects_plain_http_outside_loopback() {
		assert!(matches!(
			CarrierDescriptor::ups(&url("http://onlinetools.ups.com")),
			Err(DescriptorError::InsecureEndpoint { endpoint: "token", .. })
		));
		CarrierDescriptor::ups(&url("http://127.0.0.1:8080"))
			.expect("Loopback HTTP should be accepted.");
		CarrierDescriptor::ups(&url("http://localhost:8080"))
			.expect("Localhost HTTP should be accepted.");
	}
}
