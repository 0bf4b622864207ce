//! Carrier connection settings loaded with `figment`.

// crates.io
use figment::{
	Figment, Metadata, Profile, Provider,
	providers::Env,
	value::{Dict, Map, Value},
};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, Secret},
	carrier::descriptor::builder,
	error::ConfigError,
};

/// Environment variable prefix read by [`CarrierConfig::from_env`].
pub const ENV_PREFIX: &str = "UPS_";

const KEYS: [&str; 3] = ["base_url", "client_id", "client_secret"];

/// Base URL, OAuth client identifier, and client secret for one carrier account.
#[derive(Clone, Debug)]
pub struct CarrierConfig {
	/// Absolute base URL both endpoints are derived from; `https` unless the host is loopback.
	pub base_url: Url,
	/// OAuth client identifier.
	pub client_id: ClientId,
	/// OAuth client secret.
	pub client_secret: Secret,
}
impl CarrierConfig {
	/// Creates a configuration from already validated parts.
	pub fn new(base_url: Url, client_id: ClientId, client_secret: impl Into<Secret>) -> Self {
		Self { base_url, client_id, client_secret: client_secret.into() }
	}

	/// Loads `UPS_BASE_URL`, `UPS_CLIENT_ID`, and `UPS_CLIENT_SECRET` from the environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_figment(Figment::from(CarrierEnv::new()))
	}

	/// Loads the `base_url`, `client_id`, and `client_secret` keys from `figment`.
	///
	/// Every missing, empty, or malformed value is reported in a single
	/// [`ConfigError::InvalidSettings`].
	pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
		let raw: RawCarrierConfig = figment.extract()?;

		raw.validate()
	}
}

/// Figment provider over the `UPS_`-prefixed environment that keeps every value as text.
///
/// [`Env`] parses values such as `00123` or `1.50` into numbers; credentials must reach the
/// carrier exactly as written.
#[derive(Debug)]
pub struct CarrierEnv(Env);
impl CarrierEnv {
	/// Reads the three carrier keys under [`ENV_PREFIX`].
	pub fn new() -> Self {
		Self(Env::prefixed(ENV_PREFIX).only(&KEYS))
	}
}
impl Default for CarrierEnv {
	fn default() -> Self {
		Self::new()
	}
}
impl Provider for CarrierEnv {
	fn metadata(&self) -> Metadata {
		Metadata::named(format!("`{ENV_PREFIX}` environment variable(s)"))
	}

	fn data(&self) -> figment::Result<Map<Profile, Dict>> {
		let dict = self
			.0
			.iter()
			.map(|(key, value)| (key.as_str().to_owned(), Value::from(value)))
			.collect();

		Ok(Profile::Default.collect(dict))
	}
}

#[derive(Debug, Default, Deserialize)]
struct RawCarrierConfig {
	#[serde(default)]
	base_url: Option<String>,
	#[serde(default)]
	client_id: Option<String>,
	#[serde(default)]
	client_secret: Option<String>,
}
impl RawCarrierConfig {
	fn validate(self) -> Result<CarrierConfig, ConfigError> {
		let mut issues = Vec::new();
		let base_url = match non_empty(self.base_url) {
			None => {
				issues.push(missing("base_url"));

				None
			},
			Some(raw) => match Url::parse(&raw) {
				Ok(url) if !url.has_host() || !matches!(url.scheme(), "http" | "https") => {
					issues.push(format!("{} must be an absolute http or https URL", key("base_url")));

					None
				},
				Ok(url) if !builder::is_secure_endpoint(&url) => {
					issues.push(format!(
						"{} must use https unless the host is loopback",
						key("base_url")
					));

					None
				},
				Ok(url) => Some(url),
				Err(e) => {
					issues.push(format!("{} is not a valid URL ({e})", key("base_url")));

					None
				},
			},
		};
		let client_id = match non_empty(self.client_id) {
			None => {
				issues.push(missing("client_id"));

				None
			},
			Some(raw) => ClientId::new(raw)
				.map_err(|e| issues.push(format!("{} is invalid ({e})", key("client_id"))))
				.ok(),
		};
		let client_secret = non_empty(self.client_secret).map(Secret::new);

		if client_secret.is_none() {
			issues.push(missing("client_secret"));
		}

		match (base_url, client_id, client_secret) {
			(Some(base_url), Some(client_id), Some(client_secret)) if issues.is_empty() =>
				Ok(CarrierConfig { base_url, client_id, client_secret }),
			_ => Err(ConfigError::InvalidSettings { issues }),
		}
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.map(|text| text.trim().to_owned()).filter(|text| !text.is_empty())
}

fn key(name: &str) -> String {
	format!("{name} ({ENV_PREFIX}{})", name.to_ascii_uppercase())
}

fn missing(name: &str) -> String {
	format!("{} is required", key(name))
}
