//! Shared fixtures for integration tests: a scripted transport that answers token and rating
//! calls from per-endpoint queues and records every request it sees.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, future::Future, pin::Pin, sync::Arc, time::Duration};
// crates.io
use carrier_rates::{
	auth::{Authenticator, ClientId},
	carrier::{CarrierDescriptor, UpsNormalizer},
	client::RateClient,
	error::{Error, TransportError},
	http::{
		AsyncHttpClient, CarrierHttpClient, Endpoint, HttpClientError, HttpRequest, HttpResponse,
		TransportErrorMapper,
	},
	rate::{Address, Dimensions, Package, RateRequest, Weight},
	url::Url,
};
use oauth2::http::{StatusCode, header::AUTHORIZATION};
use parking_lot::Mutex;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const BASIC_AUTHORIZATION: &str = "Basic dGVzdC1jbGllbnQ6dGVzdC1zZWNyZXQ=";

pub type ScriptedAuthenticator = Authenticator<ScriptedHttpClient, ScriptedErrorMapper>;
pub type ScriptedRateClient = RateClient<ScriptedHttpClient, ScriptedErrorMapper>;

/// Failures the scripted transport can raise instead of answering.
#[derive(Debug, thiserror::Error)]
pub enum ScriptedTransportError {
	#[error("Scripted timeout.")]
	Timeout,
	#[error("Scripted connection refusal.")]
	Refused,
}

/// One scripted answer.
#[derive(Clone, Debug)]
pub enum Scripted {
	Respond { status: u16, headers: Vec<(&'static str, String)>, body: String },
	Timeout,
	Refused,
}
impl Scripted {
	pub fn status(status: u16, body: impl Into<String>) -> Self {
		Self::Respond { status, headers: Vec::new(), body: body.into() }
	}

	pub fn token(access_token: &str, expires_in: u64) -> Self {
		Self::status(
			200,
			format!(
				r#"{{"access_token":"{access_token}","token_type":"Bearer","expires_in":{expires_in}}}"#
			),
		)
	}

	pub fn rates() -> Self {
		Self::status(200, sample_rates_body())
	}

	pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
		if let Self::Respond { headers, .. } = &mut self {
			headers.push((name, value.into()));
		}

		self
	}
}

/// Request observed by the scripted transport.
#[derive(Clone, Debug)]
pub struct RecordedCall {
	pub endpoint: Endpoint,
	pub authorization: Option<String>,
	pub timeout: Duration,
	pub body: Vec<u8>,
}

#[derive(Debug, Default)]
struct Script {
	token: VecDeque<Scripted>,
	rating: VecDeque<Scripted>,
	calls: Vec<RecordedCall>,
}

/// Transport that replays scripted answers per endpoint.
#[derive(Clone, Debug, Default)]
pub struct ScriptedHttpClient(Arc<Mutex<Script>>);
impl ScriptedHttpClient {
	pub fn new(
		token: impl IntoIterator<Item = Scripted>,
		rating: impl IntoIterator<Item = Scripted>,
	) -> Self {
		let script = Script {
			token: token.into_iter().collect(),
			rating: rating.into_iter().collect(),
			calls: Vec::new(),
		};

		Self(Arc::new(Mutex::new(script)))
	}

	pub fn calls(&self) -> Vec<RecordedCall> {
		self.0.lock().calls.clone()
	}

	pub fn calls_to(&self, endpoint: Endpoint) -> Vec<RecordedCall> {
		self.calls().into_iter().filter(|call| call.endpoint == endpoint).collect()
	}

	pub fn token_calls(&self) -> usize {
		self.calls_to(Endpoint::Token).len()
	}

	pub fn rating_calls(&self) -> usize {
		self.calls_to(Endpoint::Rating).len()
	}

	fn answer(&self, timeout: Duration, request: &HttpRequest) -> Scripted {
		let endpoint = if request.uri().path().ends_with("/oauth/token") {
			Endpoint::Token
		} else {
			Endpoint::Rating
		};
		let mut script = self.0.lock();

		script.calls.push(RecordedCall {
			endpoint,
			authorization: request
				.headers()
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(ToOwned::to_owned),
			timeout,
			body: request.body().clone(),
		});

		let queue = match endpoint {
			Endpoint::Token => &mut script.token,
			Endpoint::Rating => &mut script.rating,
		};

		queue.pop_front().unwrap_or_else(|| panic!("Unexpected {endpoint} call; script is empty."))
	}
}
impl CarrierHttpClient for ScriptedHttpClient {
	type Handle = ScriptedHandle;
	type TransportError = ScriptedTransportError;

	fn with_timeout(&self, timeout: Duration) -> Self::Handle {
		ScriptedHandle { client: self.clone(), timeout }
	}
}

pub struct ScriptedHandle {
	client: ScriptedHttpClient,
	timeout: Duration,
}
impl<'c> AsyncHttpClient<'c> for ScriptedHandle {
	type Error = HttpClientError<ScriptedTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let outcome = match self.client.answer(self.timeout, &request) {
			Scripted::Respond { status, headers, body } => {
				let mut response = HttpResponse::new(body.into_bytes());

				*response.status_mut() =
					StatusCode::from_u16(status).expect("Scripted status should be valid.");

				for (name, value) in headers {
					response
						.headers_mut()
						.insert(name, value.parse().expect("Scripted header should be valid."));
				}

				Ok(response)
			},
			Scripted::Timeout =>
				Err(HttpClientError::Reqwest(Box::new(ScriptedTransportError::Timeout))),
			Scripted::Refused =>
				Err(HttpClientError::Reqwest(Box::new(ScriptedTransportError::Refused))),
		};

		Box::pin(async move { outcome })
	}
}

/// Maps scripted timeouts to [`Error::Timeout`] and everything else to transport failures.
#[derive(Clone, Debug, Default)]
pub struct ScriptedErrorMapper;
impl TransportErrorMapper<ScriptedTransportError> for ScriptedErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		error: HttpClientError<ScriptedTransportError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) => match *inner {
				ScriptedTransportError::Timeout => Error::Timeout { endpoint },
				refused => TransportError::network(endpoint, refused).into(),
			},
			other => TransportError::Unexpected { endpoint, message: other.to_string() }.into(),
		}
	}
}

pub fn descriptor() -> CarrierDescriptor {
	let base = Url::parse("https://carrier.test").expect("Base URL fixture should parse.");

	CarrierDescriptor::ups(&base).expect("UPS descriptor fixture should build.")
}

pub fn client_id() -> ClientId {
	ClientId::new(CLIENT_ID).expect("Client identifier fixture should be valid.")
}

/// Builds a rate client and its authenticator on top of `http`.
pub fn scripted_client(
	http: &ScriptedHttpClient,
) -> (ScriptedRateClient, Arc<ScriptedAuthenticator>) {
	let descriptor = descriptor();
	let authenticator = Arc::new(Authenticator::with_http_client(
		&descriptor,
		client_id(),
		CLIENT_SECRET,
		http.clone(),
		ScriptedErrorMapper,
	));
	let client = RateClient::new(authenticator.clone(), descriptor, Arc::new(UpsNormalizer));

	(client, authenticator)
}

pub fn rate_request() -> RateRequest {
	RateRequest::new(
		Address::new("US", "10001"),
		Address::new("US", "90210"),
		Package::new(Weight::pounds(5.)).with_dimensions(Dimensions::inches(10., 8., 6.)),
	)
}

pub fn sample_rates_body() -> String {
	serde_json::json!({
		"RateResponse": {
			"RatedShipment": [
				{
					"Service": { "Code": "03" },
					"TotalCharges": { "MonetaryValue": "15.50" },
					"GuaranteedDelivery": { "BusinessDaysInTransit": "5" }
				},
				{
					"Service": { "Code": "01", "Name": "UPS Next Day Air" },
					"TotalCharges": { "MonetaryValue": "48.25", "CurrencyCode": "USD" },
					"GuaranteedDelivery": { "BusinessDaysInTransit": "1" }
				}
			]
		}
	})
	.to_string()
}
