use std::env;
use std::str::FromStr;

use rand::{Rng, distr::Alphanumeric};

/// Longest accepted session lifetime, one year
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

#[derive(Clone, Debug)]
pub struct Config {
	pub server_host: String,
	pub server_port: u16,
	pub database_url: String,
	pub max_pool_size: u32,
	pub session_secret: String,
	pub session_ttl_hours: i64,
	pub rate_per_hour: i64,
	pub currency: String,
	pub seed_slots: i64,
	pub admin_name: String,
	pub admin_email: String,
	pub admin_password: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			server_host: "0.0.0.0".to_string(),
			server_port: 8080,
			database_url: "sqlite://parking.db".to_string(),
			max_pool_size: 5,
			session_secret: random_secret(),
			session_ttl_hours: 24,
			rate_per_hour: 20,
			currency: "₹".to_string(),
			seed_slots: 20,
			admin_name: "Admin".to_string(),
			admin_email: "admin@example.com".to_string(),
			admin_password: "admin123".to_string(),
		}
	}
}

impl Config {
	pub fn from_env() -> Result<Self, ConfigError> {
		// Load .env file if it exists
		let _ = dotenvy::dotenv();

		let defaults = Self::default();

		let session_secret = match env::var("SESSION_SECRET") {
			Ok(secret) if !secret.is_empty() => secret,
			_ => {
				tracing::warn!("SESSION_SECRET not set, sessions will not survive a restart");
				defaults.session_secret
			}
		};

		Ok(Self {
			server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
			server_port: env::var("SERVER_PORT")
				.unwrap_or_else(|_| defaults.server_port.to_string())
				.parse()
				.map_err(|_| ConfigError::InvalidPort)?,
			database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
			max_pool_size: parse_var("MAX_POOL_SIZE", defaults.max_pool_size)?,
			session_secret,
			session_ttl_hours: session_ttl_hours(parse_var(
				"SESSION_TTL_HOURS",
				defaults.session_ttl_hours,
			)?)?,
			rate_per_hour: parse_var("RATE_PER_HOUR", defaults.rate_per_hour)?,
			currency: env::var("CURRENCY").unwrap_or(defaults.currency),
			seed_slots: parse_var("SEED_SLOTS", defaults.seed_slots)?,
			admin_name: env::var("ADMIN_NAME").unwrap_or(defaults.admin_name),
			admin_email: env::var("ADMIN_EMAIL")
				.map(|email| email.trim().to_lowercase())
				.unwrap_or(defaults.admin_email),
			admin_password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
		})
	}

	pub fn server_addr(&self) -> String {
		format!("{}:{}", self.server_host, self.server_port)
	}
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
	match env::var(name) {
		Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber(name)),
		Err(_) => Ok(default),
	}
}

fn session_ttl_hours(hours: i64) -> Result<i64, ConfigError> {
	if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
		Ok(hours)
	} else {
		Err(ConfigError::InvalidSessionTtl(hours))
	}
}

fn random_secret() -> String {
	rand::rng()
		.sample_iter(&Alphanumeric)
		.take(48)
		.map(char::from)
		.collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid port number")]
	InvalidPort,
	#[error("{0} must be a number")]
	InvalidNumber(&'static str),
	#[error("SESSION_TTL_HOURS must be between 1 and {max}, got {0}", max = MAX_SESSION_TTL_HOURS)]
	InvalidSessionTtl(i64),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_seed_values() {
		let config = Config::default();
		assert_eq!(config.seed_slots, 20);
		assert_eq!(config.rate_per_hour, 20);
		assert_eq!(config.admin_email, "admin@example.com");
		assert_eq!(config.server_addr(), "0.0.0.0:8080");
	}

	#[test]
	fn session_ttl_must_be_in_range() {
		assert_eq!(session_ttl_hours(24).unwrap(), 24);
		assert_eq!(
			session_ttl_hours(MAX_SESSION_TTL_HOURS).unwrap(),
			MAX_SESSION_TTL_HOURS
		);
		assert!(matches!(session_ttl_hours(0), Err(ConfigError::InvalidSessionTtl(0))));
		assert!(matches!(
			session_ttl_hours(i64::MAX),
			Err(ConfigError::InvalidSessionTtl(i64::MAX))
		));
	}

	#[test]
	fn random_secrets_differ() {
		let first = Config::default().session_secret;
		let second = Config::default().session_secret;
		assert_eq!(first.len(), 48);
		assert_ne!(first, second);
	}
}
