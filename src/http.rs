//! Transport primitives shared by the token fetch and the rating call.
//!
//! [`CarrierHttpClient`] is the crate's only dependency on an HTTP stack: it hands out
//! short-lived [`AsyncHttpClient`] handles bound to a per-call timeout, and a
//! [`TransportErrorMapper`] turns the transport's own failures into [`Error`] values so a
//! timeout is classified the same way whichever client produced it.

// std
use std::ops::Deref;
// crates.io
use oauth2::http::{HeaderMap, header::RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

pub use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};

/// Carrier endpoints the client talks to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// OAuth token endpoint.
	Token,
	/// Rate-quote endpoint.
	Rating,
}
impl Endpoint {
	/// Returns a stable label suitable for messages and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Endpoint::Token => "token",
			Endpoint::Rating => "rating",
		}
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Abstraction over HTTP transports able to execute carrier calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by an
/// authenticator and any number of rate clients. Each call asks for a fresh handle carrying
/// the timeout for that call; the handle's request future must be `Send` so callers can box
/// the surrounding async blocks.
pub trait CarrierHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle bound to a single call's timeout.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle whose requests fail once `timeout` elapses.
	///
	/// The timeout covers the whole exchange, including reading the response body, and must
	/// surface as an error the paired [`TransportErrorMapper`] recognizes as a timeout.
	fn with_timeout(&self, timeout: StdDuration) -> Self::Handle;
}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted while calling `endpoint` into an [`Error`].
	///
	/// Timeouts must map to [`Error::Timeout`]; everything else normally maps to
	/// [`Error::Transport`] or [`Error::Config`].
	fn map_transport_error(&self, endpoint: Endpoint, error: HttpClientError<E>) -> Error;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Carrier endpoints answer directly, so the client built by [`ReqwestHttpClient::new`] does not
/// follow redirects. Apply the same policy to any client passed to
/// [`ReqwestHttpClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a reqwest client with redirects disabled.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl CarrierHttpClient for ReqwestHttpClient {
	type Handle = TimedHandle;
	type TransportError = ReqwestError;

	fn with_timeout(&self, timeout: StdDuration) -> Self::Handle {
		TimedHandle::new(self.0.clone(), timeout)
	}
}

#[cfg(feature = "reqwest")]
struct TimedHttpClient {
	client: ReqwestClient,
	timeout: StdDuration,
}

/// Handle returned by [`ReqwestHttpClient`] that applies a per-request timeout.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct TimedHandle(Arc<TimedHttpClient>);
#[cfg(feature = "reqwest")]
impl TimedHandle {
	fn new(client: ReqwestClient, timeout: StdDuration) -> Self {
		Self(Arc::new(TimedHttpClient { client, timeout }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for TimedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let inner = Arc::clone(&self.0);

		Box::pin(async move {
			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			*request.timeout_mut() = Some(inner.timeout);

			let response = inner.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, endpoint: Endpoint, err: HttpClientError<ReqwestError>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => TransportError::Unexpected { endpoint, message }.into(),
			_ => TransportError::Unexpected {
				endpoint,
				message: "unrecognized HTTP client failure".into(),
			}
			.into(),
		}
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: Endpoint, err: ReqwestError) -> Error {
	if err.is_timeout() {
		return Error::Timeout { endpoint };
	}
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::network(endpoint, err).into()
}

/// Sends `request` through a handle bound to `timeout`, mapping transport failures.
pub(crate) async fn dispatch<C, M>(
	http_client: &C,
	mapper: &M,
	endpoint: Endpoint,
	timeout: StdDuration,
	request: HttpRequest,
) -> Result<HttpResponse>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let handle = http_client.with_timeout(timeout);

	handle.call(request).await.map_err(|err| mapper.map_transport_error(endpoint, err))
}

/// Reads a `Retry-After` header expressed either in seconds or as an HTTP date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(i64::from(secs)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

/// Lossy UTF-8 view of a response body kept for diagnostics.
pub(crate) fn body_text(response: &HttpResponse) -> String {
	String::from_utf8_lossy(response.body()).into_owned()
}
