//! Crate-level error taxonomy shared by the authenticator, the rate client, and configuration.

// self
use crate::{_prelude::*, http::Endpoint, rate::FieldViolation};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// `Auth`, `RateLimit`, `Timeout`, `BadRequest`, and `Server` are the classified failures a
/// caller is expected to branch on (see [`Error::kind`]); `Config` and `Transport` describe
/// local setup problems and network failures that never reached a carrier response.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure other than a timeout (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Credentials were rejected, the token response was malformed, or the single retry was
	/// exhausted.
	#[error("Authentication failed: {reason}.")]
	Auth {
		/// Why authentication failed.
		reason: String,
		/// Raw provider payload, when one was received.
		payload: Option<String>,
		/// Transport failure that prevented reaching the token endpoint.
		#[source]
		source: Option<BoxError>,
	},
	/// Carrier answered with HTTP 429.
	#[error("Carrier rate limit exceeded.")]
	RateLimit {
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
		/// Raw provider payload.
		payload: Option<String>,
	},
	/// The HTTP call did not complete within its timeout.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint that timed out.
		endpoint: Endpoint,
	},
	/// The request or the carrier's response was rejected as invalid.
	#[error(transparent)]
	BadRequest(#[from] BadRequestError),
	/// Carrier answered with HTTP 5xx.
	#[error("Carrier returned a server error ({status}).")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Raw provider payload.
		payload: String,
	},
}
impl Error {
	/// Returns the classified failure kind, or `None` for local configuration and
	/// non-timeout transport failures.
	pub fn kind(&self) -> Option<FailureKind> {
		match self {
			Self::Config(_) | Self::Transport(_) => None,
			Self::Auth { .. } => Some(FailureKind::Auth),
			Self::RateLimit { .. } => Some(FailureKind::RateLimit),
			Self::Timeout { .. } => Some(FailureKind::Timeout),
			Self::BadRequest(err) => Some(FailureKind::BadRequest(err.status())),
			Self::Server { status, .. } => Some(FailureKind::ServerError(*status)),
		}
	}

	/// Raw provider payload carried for diagnostics, if any.
	pub fn payload(&self) -> Option<&str> {
		match self {
			Self::Auth { payload, .. } | Self::RateLimit { payload, .. } => payload.as_deref(),
			Self::Server { payload, .. } => Some(payload),
			Self::BadRequest(err) => err.payload(),
			Self::Config(_) | Self::Transport(_) | Self::Timeout { .. } => None,
		}
	}

	pub(crate) fn auth(reason: impl Into<String>, payload: Option<String>) -> Self {
		Self::Auth { reason: reason.into(), payload, source: None }
	}
}

/// Tagged failure kinds, decoupled from raw status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
	/// Invalid or rejected credentials.
	Auth,
	/// HTTP 429.
	RateLimit,
	/// Transport timeout on either endpoint.
	Timeout,
	/// Invalid request or response, with the HTTP status it was reported under.
	BadRequest(u16),
	/// HTTP 5xx.
	ServerError(u16),
}

/// Request or response rejections reported as [`FailureKind::BadRequest`].
#[derive(Debug, ThisError)]
pub enum BadRequestError {
	/// The normalized rate request failed validation; no network call was issued.
	#[error("Rate request is invalid: {}.", join_violations(.violations))]
	InvalidRequest {
		/// Every violated field.
		violations: Vec<FieldViolation>,
	},
	/// Carrier rejected the request (4xx) or embedded an error in its payload.
	#[error("{message}")]
	Provider {
		/// HTTP status code the rejection arrived with.
		status: u16,
		/// Provider-supplied message, or a generic one naming the status.
		message: String,
		/// Raw provider payload.
		payload: Option<String>,
	},
	/// A successful response could not be normalized.
	#[error("Malformed rating response: {reason}.")]
	MalformedResponse {
		/// HTTP status code of the response.
		status: u16,
		/// Index of the offending rated shipment, when the failure is entry specific.
		index: Option<usize>,
		/// Description of the failure.
		reason: String,
		/// Raw provider payload.
		payload: String,
	},
}
impl BadRequestError {
	const INVALID_REQUEST_STATUS: u16 = 400;

	/// Status code the rejection is reported under.
	pub fn status(&self) -> u16 {
		match self {
			Self::InvalidRequest { .. } => Self::INVALID_REQUEST_STATUS,
			Self::Provider { status, .. } | Self::MalformedResponse { status, .. } => *status,
		}
	}

	/// Raw provider payload, if one was received.
	pub fn payload(&self) -> Option<&str> {
		match self {
			Self::InvalidRequest { .. } => None,
			Self::Provider { payload, .. } => payload.as_deref(),
			Self::MalformedResponse { payload, .. } => Some(payload),
		}
	}
}

fn join_violations(violations: &[FieldViolation]) -> String {
	violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Configuration and setup failures raised before any carrier call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Carrier descriptor is invalid.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::carrier::DescriptorError),
	/// Rate request payload could not be encoded.
	#[error("Rate request payload could not be encoded.")]
	EncodePayload(#[source] serde_json::Error),
	/// One or more settings are missing or malformed.
	#[error("Invalid configuration: {}.", .issues.join("; "))]
	InvalidSettings {
		/// Human-readable description of each problem.
		issues: Vec<String>,
	},
	/// Settings could not be extracted from their sources.
	#[error("Configuration could not be extracted.")]
	Extract(#[source] Box<figment::Error>),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
impl From<figment::Error> for ConfigError {
	fn from(e: figment::Error) -> Self {
		Self::Extract(Box::new(e))
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
	/// HTTP client reported a failure it could not categorize.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Unexpected {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Client-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: Endpoint,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}
