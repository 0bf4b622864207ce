//! Normalized service levels.

// crates.io
use serde::{Deserializer, Serializer, de::Error as _};
// self
use crate::_prelude::*;

/// Carrier-agnostic service levels, ordered from slowest to fastest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServiceLevel {
	/// Ground delivery.
	Ground,
	/// Three business days.
	ThreeDaySelect,
	/// Second business day.
	SecondDayAir,
	/// Next business day, end of day.
	NextDayAirSaver,
	/// Next business day.
	NextDayAir,
	/// Next business day, early morning.
	NextDayAirEarly,
}
impl ServiceLevel {
	/// Every known level.
	pub const ALL: [Self; 6] = [
		Self::Ground,
		Self::ThreeDaySelect,
		Self::SecondDayAir,
		Self::NextDayAirSaver,
		Self::NextDayAir,
		Self::NextDayAirEarly,
	];

	/// Stable identifier used in serialized requests.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Ground => "Ground",
			Self::ThreeDaySelect => "3DaySelect",
			Self::SecondDayAir => "2ndDayAir",
			Self::NextDayAirSaver => "NextDayAirSaver",
			Self::NextDayAir => "NextDayAir",
			Self::NextDayAirEarly => "NextDayAirEarly",
		}
	}
}
impl Display for ServiceLevel {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ServiceLevel {
	type Err = ServiceLevelError;

	/// Accepts the stable identifier as well as carrier display names such as
	/// `UPS 2nd Day Air`; whitespace and case are ignored.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let compact = s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
		let compact = match compact.get(..3) {
			Some(prefix) if prefix.eq_ignore_ascii_case("ups") => &compact[3..],
			_ => compact.as_str(),
		};

		Self::ALL
			.into_iter()
			.find(|level| level.as_str().eq_ignore_ascii_case(compact))
			.ok_or_else(|| ServiceLevelError::Unknown(s.to_owned()))
	}
}
impl Serialize for ServiceLevel {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for ServiceLevel {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(D::Error::custom)
	}
}

/// Service level parsing failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ServiceLevelError {
	/// The name matches no known level.
	#[error("Unknown service level: {0}.")]
	Unknown(String),
}

/// Deserializes an optional service level, treating unknown names as absent.
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<Option<ServiceLevel>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	Ok(raw.and_then(|name| name.parse().ok()))
}
