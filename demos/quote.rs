//! Quotes rates against a stubbed UPS deployment with the default reqwest transport.
//!
//! Client credentials come from `UPS_CLIENT_ID`/`UPS_CLIENT_SECRET` when set; the base URL
//! always points at the local mock server. Run with `RUST_LOG=carrier_rates=debug` to see the
//! flow spans and outcomes.

// crates.io
use color_eyre::Result;
use figment::Figment;
use httpmock::prelude::*;
use tracing_subscriber::EnvFilter;
// self
use carrier_rates::{
	client::RateClient,
	config::{CarrierConfig, CarrierEnv},
	rate::{Address, Dimensions, Package, RateRequest, Weight},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/security/v1/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"access_token":"demo-access","token_type":"Bearer","expires_in":14399}"#);
		})
		.await;
	let rating_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/rating/v1/Shop").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body(
				r#"{"RateResponse":{"RatedShipment":[
					{"Service":{"Code":"03"},"TotalCharges":{"MonetaryValue":"14.82","CurrencyCode":"USD"},
					 "GuaranteedDelivery":{"BusinessDaysInTransit":"4"}},
					{"Service":{"Code":"02"},"TotalCharges":{"MonetaryValue":"31.07","CurrencyCode":"USD"},
					 "GuaranteedDelivery":{"BusinessDaysInTransit":"2"}},
					{"Service":{"Code":"01"},"TotalCharges":{"MonetaryValue":"58.40","CurrencyCode":"USD"},
					 "GuaranteedDelivery":{"BusinessDaysInTransit":"1"}}
				]}}"#,
			);
		})
		.await;
	let figment = Figment::new()
		.merge(("client_id", "demo-client"))
		.merge(("client_secret", "demo-secret"))
		.merge(CarrierEnv::new())
		.merge(("base_url", server.base_url()));
	let config = CarrierConfig::from_figment(figment)?;
	let client = RateClient::from_config(&config)?;
	let request = RateRequest::new(
		Address::new("US", "30301")
			.with_lines("55 Trinity Ave SW", None)
			.with_city("Atlanta")
			.with_state_province_code("GA"),
		Address::new("US", "94105").with_city("San Francisco").with_state_province_code("CA"),
		Package::new(Weight::pounds(4.5)).with_dimensions(Dimensions::inches(12., 9., 4.)),
	);

	for round in 1..=2 {
		let rates = client.get_rates(&request).await?;

		println!("Round {round}:");

		for rate in rates {
			let days = rate.estimated_days.map_or_else(|| "?".into(), |days| days.to_string());

			println!("  {:<24} {:>8} {} ({days} days)", rate.service_name, rate.amount, rate.currency);
		}
	}

	// The second round reuses the cached token.
	token_mock.assert_calls_async(1).await;
	rating_mock.assert_calls_async(2).await;

	Ok(())
}
