//! Client-credentials authenticator with an expiry-aware, single-flight token cache.
//!
//! [`Authenticator::valid_credential`] hands out the cached bearer token while it is fresh and
//! otherwise performs one `client_credentials` exchange against the carrier's token endpoint.
//! Concurrent callers that find the cache empty queue behind a single fetch guard and re-check
//! the cache once they acquire it, so a burst of requests costs one token call.
//! [`Authenticator::invalidate`] drops the cached token; the rate client uses it when the
//! rating endpoint rejects a token as stale.

mod metrics;

pub use metrics::AuthMetrics;

// crates.io
use base64::{Engine, prelude::BASE64_STANDARD};
use oauth2::http::{
	Method, Request, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, Credential, Secret, TokenCache},
	carrier::CarrierDescriptor,
	error::ConfigError,
	http::{self, CarrierHttpClient, Endpoint, HttpRequest, HttpResponse, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

/// Margin before expiry after which a cached token is treated as stale.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::seconds(60);
/// Timeout applied to each token endpoint call.
pub const TOKEN_TIMEOUT: StdDuration = StdDuration::from_secs(15);

const CLIENT_CREDENTIALS_BODY: &[u8] = b"grant_type=client_credentials";
const INVALID_CLIENT: &str = "invalid_client";

#[cfg(feature = "reqwest")]
/// Authenticator specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthenticator = Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Owns the cached credential for one OAuth client against one carrier.
///
/// Share it through an [`Arc`] between every rate client that uses the same credentials.
pub struct Authenticator<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for token endpoint calls.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before they are classified.
	pub transport_mapper: Arc<M>,
	token_endpoint: Url,
	client_id: ClientId,
	client_secret: Secret,
	refresh_buffer: Duration,
	cache: TokenCache,
	fetch_guard: AsyncMutex<()>,
	metrics: Arc<AuthMetrics>,
}
impl<C, M> Authenticator<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an authenticator that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: &CarrierDescriptor,
		client_id: ClientId,
		client_secret: impl Into<Secret>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			token_endpoint: descriptor.endpoints.token.clone(),
			client_id,
			client_secret: client_secret.into(),
			refresh_buffer: DEFAULT_REFRESH_BUFFER,
			cache: TokenCache::default(),
			fetch_guard: AsyncMutex::new(()),
			metrics: Default::default(),
		}
	}

	/// Overrides the margin kept before expiry (defaults to [`DEFAULT_REFRESH_BUFFER`]).
	pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = buffer;

		self
	}

	/// Returns the token endpoint this authenticator calls.
	pub fn token_endpoint(&self) -> &Url {
		&self.token_endpoint
	}

	/// Returns the OAuth client identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// Returns the shared fetch counters.
	pub fn metrics(&self) -> &Arc<AuthMetrics> {
		&self.metrics
	}

	/// Returns a bearer token that stays valid for at least the refresh buffer.
	///
	/// Serves the cache when possible; otherwise fetches, caches, and returns a new token.
	/// Fetch failures surface as [`Error::Auth`] or [`Error::Timeout`] and are never retried
	/// here.
	pub async fn valid_credential(&self) -> Result<Secret> {
		if let Some(token) = self.cached_token() {
			return Ok(token);
		}

		let _singleflight = self.fetch_guard.lock().await;

		if let Some(token) = self.cached_token() {
			return Ok(token);
		}

		let credential = self.fetch().await?;
		let token = credential.access_token.clone();

		self.cache.put(credential);

		Ok(token)
	}

	/// Drops the cached credential so the next [`Authenticator::valid_credential`] call fetches.
	///
	/// Idempotent and infallible.
	pub fn invalidate(&self) {
		self.cache.clear();
		self.metrics.record_invalidation();
	}

	/// Returns the cached credential, fresh or not.
	pub fn cached(&self) -> Option<Credential> {
		self.cache.snapshot()
	}

	/// Seeds the cache with an externally obtained credential.
	pub fn store(&self, credential: Credential) {
		self.cache.put(credential);
	}

	fn cached_token(&self) -> Option<Secret> {
		let credential = self.cache.fresh_at(OffsetDateTime::now_utc(), self.refresh_buffer)?;

		self.metrics.record_cache_hit();
		obs::record_flow_outcome(FlowKind::TokenFetch, FlowOutcome::CacheHit);

		Some(credential.access_token)
	}

	async fn fetch(&self) -> Result<Credential> {
		const KIND: FlowKind = FlowKind::TokenFetch;

		let span = FlowSpan::new(KIND, "client_credentials");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span.instrument(self.exchange()).await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		result
	}

	async fn exchange(&self) -> Result<Credential> {
		let request = self.token_request()?;
		let response = match http::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			Endpoint::Token,
			TOKEN_TIMEOUT,
			request,
		)
		.await
		{
			Ok(response) => response,
			Err(Error::Transport(e)) =>
				return Err(Error::Auth {
					reason: "token endpoint could not be reached".into(),
					payload: None,
					source: Some(Box::new(e)),
				}),
			Err(e) => return Err(e),
		};

		credential_from_response(&response, OffsetDateTime::now_utc())
	}

	fn token_request(&self) -> Result<HttpRequest, ConfigError> {
		let basic =
			BASE64_STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret.expose()));
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.token_endpoint.as_str())
			.header(AUTHORIZATION, format!("Basic {basic}"))
			.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
			.header(ACCEPT, "application/json")
			.body(CLIENT_CREDENTIALS_BODY.to_vec())?;

		Ok(request)
	}
}
#[cfg(feature = "reqwest")]
impl Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an authenticator that provisions its own reqwest-backed transport.
	pub fn new(
		descriptor: &CarrierDescriptor,
		client_id: ClientId,
		client_secret: impl Into<Secret>,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(
			descriptor,
			client_id,
			client_secret,
			ReqwestHttpClient::new()?,
			ReqwestTransportErrorMapper,
		))
	}
}
impl<C, M> Debug for Authenticator<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.field("refresh_buffer", &self.refresh_buffer)
			.field("cached", &self.cache.snapshot())
			.finish()
	}
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	expires_in: f64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
	error: Option<String>,
}

fn credential_from_response(response: &HttpResponse, now: OffsetDateTime) -> Result<Credential> {
	let status = response.status();
	let body = response.body();

	if status == StatusCode::UNAUTHORIZED || token_error_code(body).as_deref() == Some(INVALID_CLIENT)
	{
		return Err(Error::auth("invalid client credentials", Some(http::body_text(response))));
	}
	if status != StatusCode::OK {
		return Err(Error::auth(
			format!("token endpoint returned HTTP {}", status.as_u16()),
			Some(http::body_text(response)),
		));
	}

	let malformed = |detail: String| {
		Error::auth(format!("malformed token response ({detail})"), Some(http::body_text(response)))
	};
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let token: TokenResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|e| malformed(format!("{} at `{}`", e.inner(), e.path())))?;

	if token.access_token.is_empty() {
		return Err(malformed("empty access_token".into()));
	}
	if !(token.expires_in.is_finite() && token.expires_in >= 0.) {
		return Err(malformed("expires_in must be a non-negative number".into()));
	}

	// Saturating cast; the checked add below rejects anything past the representable range.
	let expires_in = Duration::milliseconds((token.expires_in * 1_000.) as i64);

	Credential::builder()
		.access_token(token.access_token)
		.issued_at(now)
		.expires_in(expires_in)
		.build()
		.map_err(|e| malformed(e.to_string()))
}

fn token_error_code(body: &[u8]) -> Option<String> {
	serde_json::from_slice::<TokenErrorResponse>(body).ok()?.error
}
