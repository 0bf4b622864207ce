// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::{CarrierId, IdentifierError},
	carrier::{CarrierDescriptor, CarrierEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DescriptorError {
	/// Carrier identifier is invalid.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Rating endpoint is mandatory.
	#[error("Missing rating endpoint.")]
	MissingRatingEndpoint,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry a path.
	#[error("Base URL cannot be used to derive endpoints: {url}.")]
	InvalidBase {
		/// Offending URL.
		url: String,
	},
}

/// Builder for [`CarrierDescriptor`] values.
#[derive(Debug)]
pub struct CarrierDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: CarrierId,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// Rating endpoint.
	pub rating_endpoint: Option<Url>,
}
impl CarrierDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: CarrierId) -> Self {
		Self { id, token_endpoint: None, rating_endpoint: None }
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the rating endpoint.
	pub fn rating_endpoint(mut self, url: Url) -> Self {
		self.rating_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<CarrierDescriptor, DescriptorError> {
		let token = self.token_endpoint.ok_or(DescriptorError::MissingTokenEndpoint)?;
		let rating = self.rating_endpoint.ok_or(DescriptorError::MissingRatingEndpoint)?;

		validate_endpoint("token", &token)?;
		validate_endpoint("rating", &rating)?;

		Ok(CarrierDescriptor { id: self.id, endpoints: CarrierEndpoints { token, rating } })
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), DescriptorError> {
	if is_secure_endpoint(url) {
		Ok(())
	} else {
		Err(DescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

/// HTTPS, or plain HTTP against a loopback host.
pub(crate) fn is_secure_endpoint(url: &Url) -> bool {
	match url.scheme() {
		"https" => true,
		"http" => is_loopback(url),
		_ => false,
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		None => false,
	}
}
