// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	carrier::ups,
	rate::{Address, DimensionUnit, RateRequest, WeightUnit},
};

const PACKAGING_CUSTOMER_SUPPLIED: &str = "02";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RateEnvelope<'a> {
	rate_request: RateRequestBody<'a>,
}
impl<'a> From<&'a RateRequest> for RateEnvelope<'a> {
	fn from(request: &'a RateRequest) -> Self {
		let package = &request.package;
		let dimensions = package.dimensions.map(|d| WireDimensions {
			length: d.length,
			width: d.width,
			height: d.height,
			unit: CodeRef {
				code: match d.unit {
					DimensionUnit::In => "IN",
					DimensionUnit::Cm => "CM",
				},
			},
		});
		let weight = WireWeight {
			weight: package.weight.value,
			unit: CodeRef {
				code: match package.weight.unit {
					WeightUnit::Lb => "LBS",
					WeightUnit::Kg => "KGS",
				},
			},
		};
		let shipment = Shipment {
			ship_from: Party::from(&request.from),
			ship_to: Party::from(&request.to),
			package: WirePackage {
				packaging: CodeRef { code: PACKAGING_CUSTOMER_SUPPLIED },
				dimensions,
				package_weight: weight,
			},
			service: request.service_level.map(|level| CodeRef { code: ups::service_code(level) }),
		};

		Self { rate_request: RateRequestBody { shipment } }
	}
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct RateRequestBody<'a> {
	shipment: Shipment<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Shipment<'a> {
	ship_from: Party<'a>,
	ship_to: Party<'a>,
	package: WirePackage,
	#[serde(skip_serializing_if = "Option::is_none")]
	service: Option<CodeRef>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Party<'a> {
	address: WireAddress<'a>,
}
impl<'a> From<&'a Address> for Party<'a> {
	fn from(address: &'a Address) -> Self {
		let address_line = [&address.address_line1, &address.address_line2]
			.into_iter()
			.filter_map(|line| line.as_deref())
			.collect();

		Self {
			address: WireAddress {
				country_code: &address.country,
				postal_code: &address.postal_code,
				city: address.city.as_deref(),
				state_province_code: address.state_province_code.as_deref(),
				address_line,
			},
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireAddress<'a> {
	country_code: &'a str,
	postal_code: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	city: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	state_province_code: Option<&'a str>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	address_line: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WirePackage {
	packaging: CodeRef,
	#[serde(skip_serializing_if = "Option::is_none")]
	dimensions: Option<WireDimensions>,
	package_weight: WireWeight,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireDimensions {
	length: f64,
	width: f64,
	height: f64,
	unit: CodeRef,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireWeight {
	weight: f64,
	unit: CodeRef,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CodeRef {
	code: &'static str,
}

/// `{"response":{"errors":[...]}}` error list.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorEnvelope {
	#[serde(default)]
	response: Option<ErrorList>,
}
impl ErrorEnvelope {
	pub(super) fn has_errors(&self) -> bool {
		self.response.as_ref().is_some_and(|list| !list.errors.is_empty())
	}

	pub(super) fn first_message(&self) -> Option<String> {
		self.response
			.as_ref()?
			.errors
			.first()?
			.message
			.as_ref()
			.and_then(Value::as_str)
			.filter(|message| !message.is_empty())
			.map(ToOwned::to_owned)
	}
}

#[derive(Debug, Default, Deserialize)]
struct ErrorList {
	#[serde(default)]
	errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
	#[serde(default)]
	message: Option<Value>,
}

/// One `RatedShipment` entry; leaves stay loose so each field is checked by the normalizer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct RatedShipment {
	#[serde(default)]
	pub(super) service: Option<ServiceRef>,
	#[serde(default)]
	pub(super) total_charges: Option<Charges>,
	#[serde(default)]
	pub(super) guaranteed_delivery: Option<Delivery>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct ServiceRef {
	#[serde(default)]
	pub(super) code: Option<String>,
	#[serde(default)]
	pub(super) name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct Charges {
	#[serde(default)]
	pub(super) monetary_value: Option<Value>,
	#[serde(default)]
	pub(super) currency_code: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct Delivery {
	#[serde(default)]
	pub(super) business_days_in_transit: Option<Value>,
}
