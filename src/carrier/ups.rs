//! UPS Rating API normalizer.

mod wire;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	carrier::{RateNormalizer, ResponseFailure},
	rate::{DEFAULT_CURRENCY, NormalizedRate, RateRequest, ServiceLevel, normalized},
};

const UNKNOWN_SERVICE: &str = "Unknown";
const EMBEDDED_FALLBACK: &str = "Carrier reported an error";

/// UPS service codes with their display names.
const SERVICES: [(ServiceLevel, &str, &str); 6] = [
	(ServiceLevel::Ground, "03", "UPS Ground"),
	(ServiceLevel::ThreeDaySelect, "12", "UPS 3 Day Select"),
	(ServiceLevel::SecondDayAir, "02", "UPS 2nd Day Air"),
	(ServiceLevel::NextDayAirSaver, "13", "UPS Next Day Air Saver"),
	(ServiceLevel::NextDayAir, "01", "UPS Next Day Air"),
	(ServiceLevel::NextDayAirEarly, "14", "UPS Next Day Air Early"),
];

/// Returns the UPS service code for `level`.
pub fn service_code(level: ServiceLevel) -> &'static str {
	match level {
		ServiceLevel::Ground => "03",
		ServiceLevel::ThreeDaySelect => "12",
		ServiceLevel::SecondDayAir => "02",
		ServiceLevel::NextDayAirSaver => "13",
		ServiceLevel::NextDayAir => "01",
		ServiceLevel::NextDayAirEarly => "14",
	}
}

/// Returns the service level a UPS service code stands for.
pub fn service_level(code: &str) -> Option<ServiceLevel> {
	SERVICES.iter().find(|(_, c, _)| *c == code).map(|(level, ..)| *level)
}

/// Returns the UPS display name for a service code.
pub fn service_name(code: &str) -> Option<&'static str> {
	SERVICES.iter().find(|(_, c, _)| *c == code).map(|(.., name)| *name)
}

/// [`RateNormalizer`] for the UPS Rating API `Shop` request option.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpsNormalizer;
impl RateNormalizer for UpsNormalizer {
	fn to_provider_request(&self, request: &RateRequest) -> Result<Value, serde_json::Error> {
		serde_json::to_value(wire::RateEnvelope::from(request))
	}

	fn provider_error_message(&self, body: &[u8]) -> Option<String> {
		let envelope = serde_json::from_slice::<wire::ErrorEnvelope>(body).ok()?;

		envelope.first_message()
	}

	fn parse_provider_response(&self, body: &[u8]) -> Result<Vec<NormalizedRate>, ResponseFailure> {
		let value = serde_json::from_slice::<Value>(body)
			.map_err(|_| ResponseFailure::malformed(None, "body is not valid JSON"))?;

		if !value.is_object() {
			return Err(ResponseFailure::malformed(None, "body is not a JSON object"));
		}
		if let Ok(envelope) = wire::ErrorEnvelope::deserialize(&value)
			&& envelope.has_errors()
		{
			let message = envelope.first_message().unwrap_or_else(|| EMBEDDED_FALLBACK.into());

			return Err(ResponseFailure::Embedded { message });
		}

		let shipments = value
			.get("RateResponse")
			.and_then(|response| response.get("RatedShipment"))
			.and_then(Value::as_array)
			.ok_or_else(|| ResponseFailure::malformed(None, "missing or invalid RatedShipment"))?;

		shipments
			.iter()
			.enumerate()
			.map(|(index, shipment)| normalize_shipment(index, shipment))
			.collect()
	}
}

fn normalize_shipment(index: usize, raw: &Value) -> Result<NormalizedRate, ResponseFailure> {
	let malformed = |what: &str| {
		ResponseFailure::malformed(Some(index), format!("invalid {what} at index {index}"))
	};
	let shipment = wire::RatedShipment::deserialize(raw).map_err(|_| malformed("RatedShipment"))?;
	let charges = shipment.total_charges.unwrap_or_default();
	let amount =
		charges.monetary_value.as_ref().and_then(parse_amount).ok_or_else(|| malformed("TotalCharges"))?;
	let currency = match charges.currency_code {
		None => DEFAULT_CURRENCY.to_owned(),
		Some(Value::String(code)) if normalized::is_currency_code(&code) => code.to_ascii_uppercase(),
		Some(_) => return Err(malformed("currency")),
	};
	let estimated_days = match shipment.guaranteed_delivery.and_then(|d| d.business_days_in_transit) {
		None => None,
		Some(days) => Some(parse_days(&days).ok_or_else(|| malformed("BusinessDaysInTransit"))?),
	};
	let service = shipment.service.unwrap_or_default();
	let code = service.code.filter(|code| !code.is_empty());
	let name = service
		.name
		.filter(|name| !name.is_empty())
		.or_else(|| code.as_deref().and_then(service_name).map(ToOwned::to_owned))
		.or_else(|| code.clone())
		.unwrap_or_else(|| UNKNOWN_SERVICE.into());

	Ok(NormalizedRate { service_name: name, service_code: code, amount, currency, estimated_days })
}

fn parse_amount(value: &Value) -> Option<Decimal> {
	let text = match value {
		Value::String(text) => text.trim().to_owned(),
		Value::Number(number) => number.to_string(),
		_ => return None,
	};
	let amount = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)).ok()?;

	(!amount.is_sign_negative() || amount.is_zero()).then_some(amount)
}

fn parse_days(value: &Value) -> Option<u32> {
	match value {
		Value::Number(number) => number.as_u64().and_then(|days| u32::try_from(days).ok()),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}
