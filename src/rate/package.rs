//! Package weight and dimensions.

// self
use crate::{_prelude::*, rate::FieldViolation};

/// Weight units accepted by the normalized model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
	/// Pounds.
	Lb,
	/// Kilograms.
	Kg,
}

/// Length units accepted by the normalized model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
	/// Inches.
	In,
	/// Centimeters.
	Cm,
}

/// Package weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weight {
	/// Magnitude; must be positive.
	pub value: f64,
	/// Unit of `value`.
	pub unit: WeightUnit,
}
impl Weight {
	/// Weight in pounds.
	pub fn pounds(value: f64) -> Self {
		Self { value, unit: WeightUnit::Lb }
	}

	/// Weight in kilograms.
	pub fn kilograms(value: f64) -> Self {
		Self { value, unit: WeightUnit::Kg }
	}
}

/// Package outer dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
	/// Length; must be positive.
	pub length: f64,
	/// Width; must be positive.
	pub width: f64,
	/// Height; must be positive.
	pub height: f64,
	/// Unit shared by all three sides.
	pub unit: DimensionUnit,
}
impl Dimensions {
	/// Dimensions in inches.
	pub fn inches(length: f64, width: f64, height: f64) -> Self {
		Self { length, width, height, unit: DimensionUnit::In }
	}

	/// Dimensions in centimeters.
	pub fn centimeters(length: f64, width: f64, height: f64) -> Self {
		Self { length, width, height, unit: DimensionUnit::Cm }
	}
}

/// A single package to rate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Package {
	/// Package weight.
	pub weight: Weight,
	/// Optional outer dimensions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<Dimensions>,
}
impl Package {
	/// Creates a package without dimensions.
	pub fn new(weight: Weight) -> Self {
		Self { weight, dimensions: None }
	}

	/// Attaches outer dimensions.
	pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
		self.dimensions = Some(dimensions);

		self
	}

	pub(crate) fn collect_violations(&self, prefix: &str, out: &mut Vec<FieldViolation>) {
		check_positive(out, format!("{prefix}.weight.value"), self.weight.value);

		if let Some(dimensions) = &self.dimensions {
			let sides = [
				("length", dimensions.length),
				("width", dimensions.width),
				("height", dimensions.height),
			];

			for (side, value) in sides {
				check_positive(out, format!("{prefix}.dimensions.{side}"), value);
			}
		}
	}
}

fn check_positive(out: &mut Vec<FieldViolation>, field: String, value: f64) {
	if !(value.is_finite() && value > 0.0) {
		out.push(FieldViolation::new(field, "must be greater than zero"));
	}
}
