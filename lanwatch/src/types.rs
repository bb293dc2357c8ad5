//! Types that mirror the backend's JSON schema, plus the pure classification helpers
//! the panels use to pick labels and colors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shown wherever the backend left a field out.
pub const PLACEHOLDER: &str = "n/a";

/// Hardware address used as the stable key for devices and blocked hosts.
/// Always stored uppercase so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MacAddr(String);

impl MacAddr {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().replace('-', ":").to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Ok(MacAddr::new(&s))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Device {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac: Option<MacAddr>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Device {
    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status.as_deref())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Alert {
    #[serde(default, alias = "attack")]
    pub attack_type: Option<String>,
    #[serde(default, alias = "sourceIp")]
    pub source_ip: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Alert {
    pub fn severity_class(&self) -> SeverityClass {
        SeverityClass::of(self.severity.as_deref())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct BlockedHost {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac: Option<MacAddr>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub blocked_at: Option<String>,
}

/// Counter block shown in the header.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default, alias = "at_risk", alias = "risk")]
    pub at_risk: u64,
    #[serde(default)]
    pub blocked: u64,
}

impl Aggregate {
    /// Counts derived from a device list when the server sends none.
    pub fn from_devices(devices: &[Device]) -> Self {
        let count = |c: StatusClass| devices.iter().filter(|d| d.status_class() == c).count() as u64;
        Self {
            total: devices.len() as u64,
            active: count(StatusClass::Active),
            at_risk: count(StatusClass::Risk),
            blocked: count(StatusClass::Blocked),
        }
    }
}

/// `GET /entities/{kind}` envelope.
#[derive(Debug, Deserialize, Clone)]
pub struct EntityList<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub aggregate: Option<Aggregate>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct Bandwidth {
    #[serde(default)]
    pub upload_kbps: f64,
    #[serde(default)]
    pub download_kbps: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct Packets {
    #[serde(default)]
    pub per_second: u64,
}

/// Protocol mix in percent; the three shares sum to 100 when any traffic was seen.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProtocolMix {
    #[serde(default, rename = "TCP")]
    pub tcp: u8,
    #[serde(default, rename = "UDP")]
    pub udp: u8,
    #[serde(default, rename = "ICMP")]
    pub icmp: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct TrafficSample {
    #[serde(default)]
    pub bandwidth: Bandwidth,
    #[serde(default)]
    pub packets: Packets,
    #[serde(default)]
    pub protocols: ProtocolMix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationAction {
    Block,
    Unblock,
}

impl MutationAction {
    pub fn verb(self) -> &'static str {
        match self {
            MutationAction::Block => "Block",
            MutationAction::Unblock => "Unblock",
        }
    }
}

/// `POST /entities/mutate` body.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct MutateRequest {
    pub key: MacAddr,
    pub action: MutationAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Active,
    Idle,
    Risk,
    Blocked,
    Unknown,
}

impl StatusClass {
    pub fn of(status: Option<&str>) -> Self {
        match status.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("active") => StatusClass::Active,
            Some("idle") => StatusClass::Idle,
            Some("risk") => StatusClass::Risk,
            Some("blocked") => StatusClass::Blocked,
            _ => StatusClass::Unknown,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            StatusClass::Active => "active",
            StatusClass::Idle => "idle",
            StatusClass::Risk => "risk",
            StatusClass::Blocked => "blocked",
            StatusClass::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityClass {
    Low,
    Medium,
    High,
    Unknown,
}

impl SeverityClass {
    pub fn of(severity: Option<&str>) -> Self {
        match severity.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("low") => SeverityClass::Low,
            Some("medium") => SeverityClass::Medium,
            Some("high") => SeverityClass::High,
            _ => SeverityClass::Unknown,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            SeverityClass::Low => "low",
            SeverityClass::Medium => "medium",
            SeverityClass::High => "high",
            SeverityClass::Unknown => "unknown",
        }
    }
}

/// Field text or the placeholder; blank strings count as missing.
pub fn or_placeholder(v: Option<&str>) -> &str {
    match v {
        Some(s) if !s.trim().is_empty() => s,
        _ => PLACEHOLDER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_is_normalized() {
        assert_eq!(MacAddr::new(" 00-1a-2b-3c-4d-99 ").as_str(), "00:1A:2B:3C:4D:99");
        assert_eq!(MacAddr::new("00:1a:2b:3c:4d:99"), MacAddr::new("00:1A:2B:3C:4D:99"));
    }

    #[test]
    fn status_and_severity_classes() {
        assert_eq!(StatusClass::of(Some("Idle")).tag(), "idle");
        assert_eq!(StatusClass::of(Some("RISK")), StatusClass::Risk);
        assert_eq!(StatusClass::of(Some("rebooting")), StatusClass::Unknown);
        assert_eq!(StatusClass::of(None), StatusClass::Unknown);
        assert_eq!(SeverityClass::of(Some("High")), SeverityClass::High);
        assert_eq!(SeverityClass::of(None).tag(), "unknown");
    }

    #[test]
    fn placeholder_for_missing_and_blank() {
        assert_eq!(or_placeholder(None), PLACEHOLDER);
        assert_eq!(or_placeholder(Some("  ")), PLACEHOLDER);
        assert_eq!(or_placeholder(Some("10.0.0.1")), "10.0.0.1");
    }

    #[test]
    fn alert_accepts_both_field_spellings() {
        let a: Alert = serde_json::from_str(
            r#"{"attack":"Port Scanning","sourceIp":"172.16.0.12","severity":"Low"}"#,
        )
        .unwrap();
        assert_eq!(a.attack_type.as_deref(), Some("Port Scanning"));
        assert_eq!(a.source_ip.as_deref(), Some("172.16.0.12"));
        let b: Alert = serde_json::from_str(
            r#"{"attack_type":"Possible Network Scan","source_ip":"Network-wide"}"#,
        )
        .unwrap();
        assert_eq!(b.severity_class(), SeverityClass::Unknown);
    }

    #[test]
    fn aggregate_accepts_risk_alias_and_derives() {
        let a: Aggregate =
            serde_json::from_str(r#"{"total":4,"active":2,"risk":1,"blocked":2}"#).unwrap();
        assert_eq!(a.at_risk, 1);
        let devices = vec![
            Device { status: Some("Active".into()), ..Default::default() },
            Device { status: Some("Risk".into()), ..Default::default() },
            Device { status: None, ..Default::default() },
        ];
        let d = Aggregate::from_devices(&devices);
        assert_eq!((d.total, d.active, d.at_risk, d.blocked), (3, 1, 1, 0));
    }

    #[test]
    fn mutate_request_wire_shape() {
        let req = MutateRequest {
            key: MacAddr::new("00:1a:2b:3c:4d:99"),
            action: MutationAction::Unblock,
            reason: None,
        };
        let js = serde_json::to_value(&req).unwrap();
        assert_eq!(js, serde_json::json!({"key":"00:1A:2B:3C:4D:99","action":"unblock"}));
    }
}
