//! Connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`ConnectionConfig::call_timeout_ms`].
pub const ENV_CALL_TIMEOUT_MS: &str = "CDP_CALL_TIMEOUT_MS";
/// Environment variable overriding [`ConnectionConfig::outbound_capacity`].
pub const ENV_OUTBOUND_CAPACITY: &str = "CDP_OUTBOUND_CAPACITY";
/// Environment variable overriding [`ConnectionConfig::sweep_interval_ms`].
pub const ENV_SWEEP_INTERVAL_MS: &str = "CDP_SWEEP_INTERVAL_MS";

const DEFAULT_CALL_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_OUTBOUND_CAPACITY: usize = 256;
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5_000;

/// Tunables for one target connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionConfig {
	/// Deadline applied to each phase (send, receive) of every call.
	pub call_timeout_ms: u64,
	/// Outbound queue depth. A full queue makes callers wait in the send phase.
	pub outbound_capacity: usize,
	/// How often abandoned reply slots are swept from the correlation table.
	pub sweep_interval_ms: u64,
}

impl Default for ConnectionConfig {
	fn default() -> Self {
		Self {
			call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
			outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
			sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
		}
	}
}

impl ConnectionConfig {
	/// Defaults overridden by any `CDP_*` environment variables that are set.
	pub fn from_env() -> Result<Self> {
		Self::default().merge_env(|key| std::env::var(key).ok())
	}

	fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		if let Some(raw) = lookup(ENV_CALL_TIMEOUT_MS) {
			self.call_timeout_ms = parse_var(ENV_CALL_TIMEOUT_MS, &raw)?;
		}
		if let Some(raw) = lookup(ENV_OUTBOUND_CAPACITY) {
			self.outbound_capacity = parse_var(ENV_OUTBOUND_CAPACITY, &raw)?;
		}
		if let Some(raw) = lookup(ENV_SWEEP_INTERVAL_MS) {
			self.sweep_interval_ms = parse_var(ENV_SWEEP_INTERVAL_MS, &raw)?;
		}
		self.validate()?;
		Ok(self)
	}

	pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
		self.call_timeout_ms = whole_millis(timeout);
		self
	}

	pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
		self.outbound_capacity = capacity;
		self
	}

	pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
		self.sweep_interval_ms = whole_millis(interval);
		self
	}

	pub fn call_timeout(&self) -> Duration {
		Duration::from_millis(self.call_timeout_ms)
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_millis(self.sweep_interval_ms)
	}

	/// Rejects values tokio cannot work with (zero-capacity channels, zero
	/// intervals) and a zero deadline, which would fail every call.
	pub fn validate(&self) -> Result<()> {
		if self.call_timeout_ms == 0 {
			return Err(Error::Config("callTimeoutMs must be at least 1".into()));
		}
		if self.outbound_capacity == 0 {
			return Err(Error::Config("outboundCapacity must be at least 1".into()));
		}
		if self.sweep_interval_ms == 0 {
			return Err(Error::Config("sweepIntervalMs must be at least 1".into()));
		}
		Ok(())
	}
}

/// Milliseconds in `duration`, rounding any non-zero sub-millisecond value up
/// to 1 and saturating at `u64::MAX`.
fn whole_millis(duration: Duration) -> u64 {
	if duration.is_zero() {
		return 0;
	}
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
	T::Err: std::fmt::Display,
{
	raw.trim()
		.parse()
		.map_err(|e| Error::Config(format!("{key}={raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	#[test]
	fn defaults() {
		let config = ConnectionConfig::default();
		assert_eq!(config.call_timeout(), Duration::from_secs(120));
		assert_eq!(config.outbound_capacity, 256);
		assert_eq!(config.sweep_interval(), Duration::from_secs(5));
	}

	#[test]
	fn deserializes_partial_camel_case() {
		let config: ConnectionConfig = serde_json::from_str(r#"{"callTimeoutMs": 2000}"#).unwrap();
		assert_eq!(config.call_timeout(), Duration::from_secs(2));
		assert_eq!(config.outbound_capacity, 256);
	}

	#[test]
	fn env_overrides() {
		let vars: HashMap<&str, &str> = [(ENV_CALL_TIMEOUT_MS, "250"), (ENV_OUTBOUND_CAPACITY, " 8 ")].into();
		let config = ConnectionConfig::default()
			.merge_env(|key| vars.get(key).map(|v| v.to_string()))
			.unwrap();
		assert_eq!(config.call_timeout(), Duration::from_millis(250));
		assert_eq!(config.outbound_capacity, 8);
		assert_eq!(config.sweep_interval_ms, DEFAULT_SWEEP_INTERVAL_MS);
	}

	#[test]
	fn env_rejects_garbage() {
		let err = ConnectionConfig::default()
			.merge_env(|key| (key == ENV_CALL_TIMEOUT_MS).then(|| "soon".to_string()))
			.unwrap_err();
		assert!(err.to_string().contains(ENV_CALL_TIMEOUT_MS), "got: {err}");
	}

	#[test]
	fn durations_round_to_whole_millis() {
		let config = ConnectionConfig::default()
			.with_call_timeout(Duration::from_micros(300))
			.with_sweep_interval(Duration::from_micros(1_500));
		assert_eq!(config.call_timeout_ms, 1);
		assert_eq!(config.sweep_interval_ms, 1);
		assert!(config.validate().is_ok());

		let config = ConnectionConfig::default().with_call_timeout(Duration::MAX);
		assert_eq!(config.call_timeout_ms, u64::MAX);
	}

	#[test]
	fn zero_values_are_invalid() {
		let config = ConnectionConfig::default().with_outbound_capacity(0);
		assert!(matches!(config.validate(), Err(Error::Config(_))));

		let config = ConnectionConfig::default().with_call_timeout(Duration::ZERO);
		assert!(matches!(config.validate(), Err(Error::Config(_))));
	}
}
