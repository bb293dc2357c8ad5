//! Runtime knobs read from the environment: poll cadence per kind and HTTP timeout.

use std::time::Duration;

use crate::api::Kind;

pub const DEFAULT_DEVICES_MS: u64 = 5_000;
pub const DEFAULT_ALERTS_MS: u64 = 5_000;
pub const DEFAULT_BLOCKED_MS: u64 = 5_000;
pub const DEFAULT_TRAFFIC_MS: u64 = 4_000;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 3_000;

// Zero or unparsable values fall back to the default
fn env_ms(var: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(var)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub devices: Duration,
    pub alerts: Duration,
    pub blocked: Duration,
    pub traffic: Duration,
}

impl PollConfig {
    pub fn from_env() -> Self {
        Self {
            devices: env_ms("LANWATCH_DEVICES_INTERVAL_MS", DEFAULT_DEVICES_MS),
            alerts: env_ms("LANWATCH_ALERTS_INTERVAL_MS", DEFAULT_ALERTS_MS),
            blocked: env_ms("LANWATCH_BLOCKED_INTERVAL_MS", DEFAULT_BLOCKED_MS),
            traffic: env_ms("LANWATCH_TRAFFIC_INTERVAL_MS", DEFAULT_TRAFFIC_MS),
        }
    }

    pub fn interval(&self, kind: Kind) -> Duration {
        match kind {
            Kind::Devices => self.devices,
            Kind::Alerts => self.alerts,
            Kind::Blocked => self.blocked,
            Kind::Traffic => self.traffic,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            devices: Duration::from_millis(DEFAULT_DEVICES_MS),
            alerts: Duration::from_millis(DEFAULT_ALERTS_MS),
            blocked: Duration::from_millis(DEFAULT_BLOCKED_MS),
            traffic: Duration::from_millis(DEFAULT_TRAFFIC_MS),
        }
    }
}

pub fn http_timeout() -> Duration {
    env_ms("LANWATCH_HTTP_TIMEOUT_MS", DEFAULT_HTTP_TIMEOUT_MS)
}
