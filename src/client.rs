//! Rate client that drives a rating call through the authenticator with one bounded retry.
//!
//! A call validates the request, encodes the carrier payload once, and sends it with the
//! authenticator's current bearer token. A 401 from the rating endpoint is read as a stale
//! token: the cache is invalidated, a fresh token is fetched, and the same payload is sent
//! exactly once more. A second 401 means the credentials themselves are bad and surfaces as
//! [`Error::Auth`]. Every other response is classified without retrying.

// crates.io
use oauth2::http::{
	Method, Request, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{Authenticator, CarrierId, Secret},
	carrier::{CarrierDescriptor, RateNormalizer, ResponseFailure},
	error::{BadRequestError, ConfigError},
	http::{self, CarrierHttpClient, Endpoint, HttpResponse, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	rate::{NormalizedRate, RateRequest},
};
#[cfg(feature = "reqwest")]
use crate::{
	carrier::UpsNormalizer,
	config::CarrierConfig,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
};

/// Timeout applied to each rating endpoint call.
pub const RATING_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Boxed future returned by [`Carrier`] implementations.
pub type CarrierFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Rate client specialized for the crate's default reqwest transport stack.
pub type ReqwestRateClient = RateClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Carrier-agnostic quoting interface consumed by the rest of an application.
pub trait Carrier
where
	Self: Send + Sync,
{
	/// Identifier of the carrier behind this implementation.
	fn id(&self) -> &CarrierId;

	/// Quotes `request`, returning every rate or a classified failure.
	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> CarrierFuture<'a, Vec<NormalizedRate>>;
}

/// Quotes rates against one carrier using a shared [`Authenticator`].
pub struct RateClient<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for rating calls.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before they are classified.
	pub transport_mapper: Arc<M>,
	/// Token source shared with any other client using the same credentials.
	pub authenticator: Arc<Authenticator<C, M>>,
	/// Carrier endpoints.
	pub descriptor: CarrierDescriptor,
	/// Wire-format translation for the carrier.
	pub normalizer: Arc<dyn RateNormalizer>,
}
impl<C, M> RateClient<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the authenticator's transport + mapper pair.
	pub fn new(
		authenticator: Arc<Authenticator<C, M>>,
		descriptor: CarrierDescriptor,
		normalizer: Arc<dyn RateNormalizer>,
	) -> Self {
		Self {
			http_client: authenticator.http_client.clone(),
			transport_mapper: authenticator.transport_mapper.clone(),
			authenticator,
			descriptor,
			normalizer,
		}
	}

	/// Creates a client with its own transport + mapper pair.
	pub fn with_http_client(
		authenticator: Arc<Authenticator<C, M>>,
		descriptor: CarrierDescriptor,
		normalizer: Arc<dyn RateNormalizer>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			authenticator,
			descriptor,
			normalizer,
		}
	}

	/// Quotes `request`.
	///
	/// Invalid requests fail with [`BadRequestError::InvalidRequest`] before any network call.
	/// The token fetch and the rating call run sequentially; a rating 401 triggers exactly
	/// one invalidate, refetch, and resend.
	pub async fn get_rates(&self, request: &RateRequest) -> Result<Vec<NormalizedRate>> {
		const KIND: FlowKind = FlowKind::RateQuote;

		let span = FlowSpan::new(KIND, "get_rates");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.quote(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn quote(&self, request: &RateRequest) -> Result<Vec<NormalizedRate>> {
		request.validate().map_err(|violations| BadRequestError::InvalidRequest { violations })?;

		let payload =
			self.normalizer.to_provider_request(request).map_err(ConfigError::EncodePayload)?;
		let body = serde_json::to_vec(&payload).map_err(ConfigError::EncodePayload)?;
		let token = self.authenticator.valid_credential().await?;
		let mut response = self.send(&token, &body).await?;

		if response.status() == StatusCode::UNAUTHORIZED {
			obs::record_flow_outcome(FlowKind::RateQuote, FlowOutcome::Retry);
			self.authenticator.invalidate();

			let token = self.authenticator.valid_credential().await?;

			response = self.send(&token, &body).await?;

			if response.status() == StatusCode::UNAUTHORIZED {
				return Err(Error::auth(
					"carrier rejected a freshly issued token",
					Some(http::body_text(&response)),
				));
			}
		}

		classify_response(self.normalizer.as_ref(), &response)
	}

	async fn send(&self, token: &Secret, body: &[u8]) -> Result<HttpResponse> {
		let request = Request::builder()
			.method(Method::POST)
			.uri(self.descriptor.endpoints.rating.as_str())
			.header(AUTHORIZATION, format!("Bearer {}", token.expose()))
			.header(CONTENT_TYPE, "application/json")
			.header(ACCEPT, "application/json")
			.body(body.to_vec())
			.map_err(ConfigError::from)?;

		http::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			Endpoint::Rating,
			RATING_TIMEOUT,
			request,
		)
		.await
	}
}
#[cfg(feature = "reqwest")]
impl RateClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Wires the reqwest transport, the UPS descriptor, and the UPS normalizer from `config`.
	pub fn from_config(config: &CarrierConfig) -> Result<Self> {
		let descriptor = CarrierDescriptor::ups(&config.base_url).map_err(ConfigError::from)?;
		let authenticator = Authenticator::new(
			&descriptor,
			config.client_id.clone(),
			config.client_secret.clone(),
		)?;

		Ok(Self::new(Arc::new(authenticator), descriptor, Arc::new(UpsNormalizer)))
	}
}
impl<C, M> Carrier for RateClient<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn id(&self) -> &CarrierId {
		&self.descriptor.id
	}

	fn get_rates<'a>(&'a self, request: &'a RateRequest) -> CarrierFuture<'a, Vec<NormalizedRate>> {
		Box::pin(RateClient::get_rates(self, request))
	}
}
impl<C, M> Debug for RateClient<C, M>
where
	C: ?Sized + CarrierHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateClient")
			.field("descriptor", &self.descriptor)
			.field("authenticator", &self.authenticator)
			.finish()
	}
}

/// Classifies a rating response that is not a stale-token 401.
fn classify_response(
	normalizer: &dyn RateNormalizer,
	response: &HttpResponse,
) -> Result<Vec<NormalizedRate>> {
	let status = response.status();
	let code = status.as_u16();
	let body = response.body();

	if status == StatusCode::TOO_MANY_REQUESTS {
		return Err(Error::RateLimit {
			retry_after: http::parse_retry_after(response.headers()),
			payload: Some(http::body_text(response)),
		});
	}
	if code >= 500 {
		return Err(Error::Server { status: code, payload: http::body_text(response) });
	}
	if status != StatusCode::OK {
		let message = normalizer
			.provider_error_message(body)
			.unwrap_or_else(|| format!("Carrier returned HTTP {code}"));

		return Err(BadRequestError::Provider {
			status: code,
			message,
			payload: Some(http::body_text(response)),
		}
		.into());
	}

	normalizer.parse_provider_response(body).map_err(|failure| {
		let payload = http::body_text(response);

		Error::from(match failure {
			// Embedded errors report as 400 whatever status carried them.
			ResponseFailure::Embedded { message } => BadRequestError::Provider {
				status: StatusCode::BAD_REQUEST.as_u16(),
				message,
				payload: Some(payload),
			},
			ResponseFailure::Malformed { index, reason } =>
				BadRequestError::MalformedResponse { status: code, index, reason, payload },
		})
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{HeaderValue, header::RETRY_AFTER};
	// self
	use super::*;
	use crate::{carrier::UpsNormalizer, error::FailureKind};

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() = StatusCode::from_u16(status).expect("Status fixture should be valid.");

		response
	}

	fn classify(response: &HttpResponse) -> Result<Vec<NormalizedRate>> {
		classify_response(&UpsNormalizer, response)
	}

	#[test]
	fn rate_limit_carries_retry_after() {
		let mut limited = response(429, "slow down");

		limited.headers_mut().insert(RETRY_AFTER, HeaderValue::from_static("30"));

		match classify(&limited).expect_err("429 should fail.") {
			Error::RateLimit { retry_after, payload } => {
				assert_eq!(retry_after, Some(Duration::seconds(30)));
				assert_eq!(payload.as_deref(), Some("slow down"));
			},
			other => panic!("Expected a rate limit error, got {other:?}."),
		}
	}

	#[test]
	fn server_errors_keep_status() {
		let err = classify(&response(503, "maintenance")).expect_err("503 should fail.");

		assert_eq!(err.kind(), Some(FailureKind::ServerError(503)));
		assert_eq!(err.payload(), Some("maintenance"));
	}

	#[test]
	fn client_errors_use_first_provider_message() {
		let err = classify(&response(
			400,
			r#"{"response":{"errors":[{"code":"111100","message":"Invalid service"}]}}"#,
		))
		.expect_err("400 should fail.");

		assert_eq!(err.kind(), Some(FailureKind::BadRequest(400)));
		assert_eq!(err.to_string(), "Invalid service");

		let err = classify(&response(404, "<html/>")).expect_err("404 should fail.");

		assert_eq!(err.to_string(), "Carrier returned HTTP 404");

		let err = classify(&response(204, "")).expect_err("204 should fail.");

		assert_eq!(err.kind(), Some(FailureKind::BadRequest(204)));
	}

	#[test]
	fn embedded_errors_in_success_are_bad_requests() {
		let err = classify(&response(200, r#"{"response":{"errors":[{"message":"No rates"}]}}"#))
			.expect_err("Embedded errors should fail.");

		assert_eq!(err.kind(), Some(FailureKind::BadRequest(400)));
		assert_eq!(err.to_string(), "No rates");
		assert_eq!(err.payload(), Some(r#"{"response":{"errors":[{"message":"No rates"}]}}"#));
	}

	#[test]
	fn malformed_success_reports_index() {
		let err = classify(&response(
			200,
			r#"{"RateResponse":{"RatedShipment":[{"TotalCharges":{"MonetaryValue":"-1"}}]}}"#,
		))
		.expect_err("Negative charges should fail.");

		match err {
			Error::BadRequest(BadRequestError::MalformedResponse { index, status, .. }) => {
				assert_eq!(index, Some(0));
				assert_eq!(status, 200);
			},
			other => panic!("Expected a malformed response error, got {other:?}."),
		}
	}

	#[test]
	fn clean_success_parses() {
		let rates = classify(&response(
			200,
			r#"{"RateResponse":{"RatedShipment":[{"Service":{"Code":"03"},"TotalCharges":{"MonetaryValue":"12.34"}}]}}"#,
		))
		.expect("Clean response should parse.");

		assert_eq!(rates.len(), 1);
		assert_eq!(rates[0].service_name, "UPS Ground");
		assert_eq!(rates[0].amount, Decimal::new(1234, 2));
	}
}
