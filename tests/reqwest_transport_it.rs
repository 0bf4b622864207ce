#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use carrier_rates::{
	auth::{Authenticator, Credential, ReqwestAuthenticator},
	carrier::{CarrierDescriptor, UpsNormalizer},
	client::{RateClient, ReqwestRateClient},
	config::CarrierConfig,
	error::FailureKind,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	url::Url,
};
use common::*;

const TOKEN_PATH: &str = "/security/v1/oauth/token";
const RATING_PATH: &str = "/api/rating/v1/Shop";

fn build_client(server: &MockServer) -> (ReqwestRateClient, Arc<ReqwestAuthenticator>) {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
	let descriptor = CarrierDescriptor::ups(&base).expect("Loopback descriptor should build.");
	let authenticator = Arc::new(
		Authenticator::new(&descriptor, client_id(), CLIENT_SECRET)
			.expect("Reqwest authenticator should build."),
	);
	let client = RateClient::new(authenticator.clone(), descriptor, Arc::new(UpsNormalizer));

	(client, authenticator)
}

#[tokio::test]
async fn token_and_rating_requests_carry_expected_headers() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.header("authorization", BASIC_AUTHORIZATION)
				.header("content-type", "application/x-www-form-urlencoded")
				.header("accept", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"mock-token","token_type":"Bearer","expires_in":3600}"#);
		})
		.await;
	let rating_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(RATING_PATH)
				.header("authorization", "Bearer mock-token")
				.header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body(sample_rates_body());
		})
		.await;
	let rates = client.get_rates(&rate_request()).await.expect("Quote should succeed.");

	assert_eq!(rates.len(), 2);
	assert_eq!(rates[1].service_name, "UPS Next Day Air");

	token_mock.assert_calls_async(1).await;
	rating_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_quotes_share_one_token_fetch() {
	let server = MockServer::start_async().await;
	let (client, authenticator) = build_client(&server);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"shared-token","expires_in":900}"#);
		})
		.await;
	let rating_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(RATING_PATH).header("authorization", "Bearer shared-token");
			then.status(200).header("content-type", "application/json").body(sample_rates_body());
		})
		.await;
	let request = rate_request();
	let (first, second, third) = tokio::join!(
		client.get_rates(&request),
		client.get_rates(&request),
		client.get_rates(&request),
	);

	first.expect("First concurrent quote should succeed.");
	second.expect("Second concurrent quote should succeed.");
	third.expect("Third concurrent quote should succeed.");

	token_mock.assert_calls_async(1).await;
	rating_mock.assert_calls_async(3).await;

	assert_eq!(authenticator.metrics().attempts(), 1);
}

#[tokio::test]
async fn stale_token_is_replaced_over_http() {
	let server = MockServer::start_async().await;
	let (client, authenticator) = build_client(&server);
	let stale = Credential::builder()
		.access_token("stale-token")
		.issued_at(OffsetDateTime::now_utc())
		.expires_in(Duration::hours(1))
		.build()
		.expect("Stale credential fixture should build.");

	authenticator.store(stale);

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"fresh-token","expires_in":3600}"#);
		})
		.await;
	let stale_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(RATING_PATH).header("authorization", "Bearer stale-token");
			then.status(401).body(r#"{"response":{"errors":[{"message":"Invalid token"}]}}"#);
		})
		.await;
	let fresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(RATING_PATH).header("authorization", "Bearer fresh-token");
			then.status(200).header("content-type", "application/json").body(sample_rates_body());
		})
		.await;
	let rates = client.get_rates(&rate_request()).await.expect("Retried quote should succeed.");

	assert_eq!(rates.len(), 2);

	token_mock.assert_calls_async(1).await;
	stale_mock.assert_calls_async(1).await;
	fresh_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn server_errors_are_not_retried() {
	let server = MockServer::start_async().await;
	let (client, _) = build_client(&server);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).body(r#"{"access_token":"token","expires_in":3600}"#);
		})
		.await;
	let rating_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(RATING_PATH);
			then.status(503).body("maintenance");
		})
		.await;
	let err = client.get_rates(&rate_request()).await.expect_err("503 should fail.");

	assert_eq!(err.kind(), Some(FailureKind::ServerError(503)));
	assert_eq!(err.payload(), Some("maintenance"));

	token_mock.assert_calls_async(1).await;
	rating_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unreachable_token_endpoint_is_auth() {
	let base = Url::parse("http://127.0.0.1:9").expect("Discard port URL should parse.");
	let descriptor = CarrierDescriptor::ups(&base).expect("Loopback descriptor should build.");
	let authenticator = Authenticator::<ReqwestHttpClient, ReqwestTransportErrorMapper>::new(
		&descriptor,
		client_id(),
		CLIENT_SECRET,
	)
	.expect("Reqwest authenticator should build.");
	let err = authenticator.valid_credential().await.expect_err("Closed port should fail.");

	assert_eq!(err.kind(), Some(FailureKind::Auth));
}

#[tokio::test]
async fn from_config_targets_configured_base_url() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ups/security/v1/oauth/token");
			then.status(200).body(r#"{"access_token":"config-token","expires_in":3600}"#);
		})
		.await;
	let rating_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/ups/api/rating/v1/Shop");
			then.status(200).body(sample_rates_body());
		})
		.await;
	let base = Url::parse(&server.url("/ups/")).expect("Mock server URL should parse.");
	let config = CarrierConfig::new(base, client_id(), CLIENT_SECRET);
	let client = RateClient::from_config(&config).expect("Client should build from config.");

	client.get_rates(&rate_request()).await.expect("Configured quote should succeed.");

	token_mock.assert_calls_async(1).await;
	rating_mock.assert_calls_async(1).await;
}
