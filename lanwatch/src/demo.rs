//! Offline demo data: a seeded inventory that also backs the graceful fallback,
//! and an in-memory source that random-walks traffic and honors block/unblock.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::api::{DataSource, Kind, Payload};
use crate::error::{Result, SyncError};
use crate::types::{
    Ack, Alert, Bandwidth, BlockedHost, Device, MacAddr, MutateRequest, MutationAction, Packets,
    ProtocolMix, TrafficSample,
};

fn device(name: &str, ip: &str, mac: &str, status: &str) -> Device {
    Device {
        name: Some(name.into()),
        ip: Some(ip.into()),
        mac: Some(MacAddr::new(mac)),
        status: Some(status.into()),
    }
}

fn alert(attack: &str, source_ip: &str, time: &str, severity: &str) -> Alert {
    Alert {
        attack_type: Some(attack.into()),
        source_ip: Some(source_ip.into()),
        time: Some(time.into()),
        severity: Some(severity.into()),
        message: None,
    }
}

fn blocked(ip: &str, mac: &str) -> BlockedHost {
    BlockedHost {
        ip: Some(ip.into()),
        mac: Some(MacAddr::new(mac)),
        reason: Some("Manual admin action".into()),
        blocked_at: None,
    }
}

pub fn seed_devices() -> Vec<Device> {
    vec![
        device("Faculty-PC-01", "192.168.1.10", "00:1A:2B:3C:4D:11", "Active"),
        device("Lab-Switch-03", "192.168.1.14", "00:1A:2B:3C:4D:22", "Idle"),
        device("Unknown-Device", "192.168.1.66", "00:1A:2B:3C:4D:99", "Risk"),
        device("Admin-Laptop", "192.168.1.7", "00:1A:2B:3C:4D:44", "Active"),
    ]
}

pub fn seed_alerts() -> Vec<Alert> {
    vec![
        alert("Port Scanning", "172.16.0.12", "10:14 AM", "Low"),
        alert("ARP Spoofing", "172.16.0.39", "10:19 AM", "Medium"),
        alert("DDoS Attempt", "203.10.88.4", "10:31 AM", "High"),
    ]
}

pub fn seed_blocked() -> Vec<BlockedHost> {
    vec![
        blocked("192.168.1.66", "00:1A:2B:3C:4D:99"),
        blocked("192.168.1.72", "00:1A:2B:3C:4D:88"),
    ]
}

pub fn seed_traffic() -> TrafficSample {
    TrafficSample {
        bandwidth: Bandwidth {
            upload_kbps: 120.0,
            download_kbps: 420.0,
        },
        packets: Packets { per_second: 1200 },
        protocols: ProtocolMix {
            tcp: 65,
            udp: 25,
            icmp: 10,
        },
    }
}

/// The fixed seed for one kind, used when the backend was never reachable.
pub fn seed(kind: Kind) -> Payload {
    match kind {
        Kind::Devices => Payload::Devices {
            items: seed_devices(),
            aggregate: None,
        },
        Kind::Alerts => Payload::Alerts(seed_alerts()),
        Kind::Blocked => Payload::Blocked(seed_blocked()),
        Kind::Traffic => Payload::Traffic(seed_traffic()),
    }
}

/// One random-walk step: bandwidth and packet rate drift with floors, protocol
/// shares are redrawn and kept summing to 100.
pub fn step_traffic<R: Rng>(prev: &TrafficSample, rng: &mut R) -> TrafficSample {
    let download = (prev.bandwidth.download_kbps + rng.random_range(-50.0..=50.0)).max(200.0);
    let upload = (prev.bandwidth.upload_kbps + rng.random_range(-20.0..=20.0)).max(40.0);
    let pps = (prev.packets.per_second as i64 + rng.random_range(-150..=150)).max(600) as u64;

    let udp: u8 = rng.random_range(20..=40);
    let tcp: u8 = rng.random_range(55..=75);
    let icmp = 100u8.saturating_sub(tcp + udp).max(5);
    let tcp = 100 - udp - icmp;

    TrafficSample {
        bandwidth: Bandwidth {
            upload_kbps: (upload * 100.0).round() / 100.0,
            download_kbps: (download * 100.0).round() / 100.0,
        },
        packets: Packets { per_second: pps },
        protocols: ProtocolMix { tcp, udp, icmp },
    }
}

struct DemoState {
    devices: Vec<Device>,
    alerts: Vec<Alert>,
    blocked: Vec<BlockedHost>,
    // devices hidden while blocked, restored on unblock
    parked: BTreeMap<MacAddr, Device>,
    traffic: TrafficSample,
    rng: StdRng,
}

/// In-memory stand-in for the backend.
pub struct DemoSource {
    state: Mutex<DemoState>,
}

impl DemoSource {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Mutex::new(DemoState {
                devices: seed_devices(),
                alerts: seed_alerts(),
                blocked: seed_blocked(),
                parked: BTreeMap::new(),
                traffic: seed_traffic(),
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataSource for DemoSource {
    async fn fetch(&self, kind: Kind) -> Result<Payload> {
        let mut st = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(match kind {
            Kind::Devices => Payload::Devices {
                items: st.devices.clone(),
                aggregate: None,
            },
            Kind::Alerts => Payload::Alerts(st.alerts.clone()),
            Kind::Blocked => Payload::Blocked(st.blocked.clone()),
            Kind::Traffic => {
                let st = &mut *st;
                st.traffic = step_traffic(&st.traffic, &mut st.rng);
                Payload::Traffic(st.traffic)
            }
        })
    }

    async fn mutate(&self, req: &MutateRequest) -> Result<Ack> {
        let mut st = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let key = &req.key;
        match req.action {
            MutationAction::Block => {
                if st.blocked.iter().any(|b| b.mac.as_ref() == Some(key)) {
                    return Ok(Ack {
                        status: "already_blocked".into(),
                        message: "Device already blocked.".into(),
                    });
                }
                let pos = st.devices.iter().position(|d| d.mac.as_ref() == Some(key));
                let dev = pos.map(|i| st.devices.remove(i));
                st.blocked.push(BlockedHost {
                    ip: dev.as_ref().and_then(|d| d.ip.clone()),
                    mac: Some(key.clone()),
                    reason: Some(req.reason.clone().unwrap_or_else(|| "Manual admin action".into())),
                    blocked_at: Some(chrono::Utc::now().to_rfc3339()),
                });
                if let Some(d) = dev {
                    st.parked.insert(key.clone(), d);
                }
                Ok(Ack {
                    status: "blocked".into(),
                    message: "Device added to logical block list.".into(),
                })
            }
            MutationAction::Unblock => {
                let Some(pos) = st.blocked.iter().position(|b| b.mac.as_ref() == Some(key)) else {
                    return Err(SyncError::Mutation(format!("{key} is not blocked")));
                };
                st.blocked.remove(pos);
                if let Some(d) = st.parked.remove(key) {
                    st.devices.push(d);
                }
                Ok(Ack {
                    status: "unblocked".into(),
                    message: "Device removed from logical block list.".into(),
                })
            }
        }
    }
}
