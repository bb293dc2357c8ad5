//! View synchronization: per-kind view state, the poll schedule, and the
//! sequence-token bookkeeping that decides which fetch results get applied.
//!
//! The synchronizer does no I/O. The app loop asks it which kinds are due,
//! hands the resulting tickets to the poller, and feeds every result back
//! through [`Synchronizer::apply`]. A result is applied only when its token is
//! the latest one issued for its kind and the synchronizer is still live.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::api::{Kind, Payload};
use crate::config::PollConfig;
use crate::demo;
use crate::error::{Result, SyncError};
use crate::history::TrafficHistory;
use crate::mutation::{MutationOutcome, AFFECTED_KINDS};
use crate::types::{Aggregate, Alert, BlockedHost, Device, TrafficSample};

pub type Token = u64;

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: Kind,
    pub token: Token,
}

/// Where the data currently on screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    Live,
    Demo,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Live => "live",
            Origin::Demo => "demo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState<T> {
    /// No snapshot has arrived yet.
    #[default]
    Loading,
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(v) => Some(v),
            ViewState::Loading => None,
        }
    }
}

pub trait Rows {
    fn row_count(&self) -> usize;
}

impl<T> Rows for Vec<T> {
    fn row_count(&self) -> usize {
        self.len()
    }
}

impl Rows for TrafficSample {
    fn row_count(&self) -> usize {
        1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub items: Vec<Device>,
    pub aggregate: Aggregate,
    /// False when the counters were derived locally.
    pub server_aggregate: bool,
}

impl DeviceSnapshot {
    pub fn new(items: Vec<Device>, aggregate: Option<Aggregate>) -> Self {
        match aggregate {
            Some(a) => Self {
                items,
                aggregate: a,
                server_aggregate: true,
            },
            None => Self {
                aggregate: Aggregate::from_devices(&items),
                items,
                server_aggregate: false,
            },
        }
    }
}

impl Rows for DeviceSnapshot {
    fn row_count(&self) -> usize {
        self.items.len()
    }
}

/// What a panel should show right now.
#[derive(Debug, PartialEq)]
pub enum Display<'a, T> {
    Loading,
    Empty,
    Populated(&'a T),
    Error { error: &'a SyncError, retained: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel<T> {
    pub view: ViewState<T>,
    /// Set by a failed poll, cleared by the next applied snapshot.
    pub fault: Option<SyncError>,
    pub origin: Origin,
    pub updated_at: Option<DateTime<Local>>,
    live_seen: bool,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            view: ViewState::Loading,
            fault: None,
            origin: Origin::Live,
            updated_at: None,
            live_seen: false,
        }
    }
}

impl<T: Rows> Panel<T> {
    pub fn display(&self) -> Display<'_, T> {
        if let Some(error) = self.fault.as_ref() {
            let retained = self.view.ready().map(Rows::row_count).unwrap_or(0);
            return Display::Error { error, retained };
        }
        match &self.view {
            ViewState::Loading => Display::Loading,
            ViewState::Ready(v) if v.row_count() == 0 => Display::Empty,
            ViewState::Ready(v) => Display::Populated(v),
        }
    }
}

impl<T> Panel<T> {
    fn replace(&mut self, v: T, origin: Origin) {
        self.view = ViewState::Ready(v);
        self.fault = None;
        self.origin = origin;
        self.updated_at = Some(Local::now());
        if origin == Origin::Live {
            self.live_seen = true;
        }
    }

    /// True once a snapshot from the real backend has been applied.
    pub fn live_seen(&self) -> bool {
        self.live_seen
    }
}

/// Everything the renderer reads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    pub devices: Panel<DeviceSnapshot>,
    pub alerts: Panel<Vec<Alert>>,
    pub blocked: Panel<Vec<BlockedHost>>,
    pub traffic: Panel<TrafficSample>,
    pub history: TrafficHistory,
}

impl Dashboard {
    pub fn apply_payload(&mut self, payload: Payload, origin: Origin) {
        match payload {
            Payload::Devices { items, aggregate } => {
                self.devices.replace(DeviceSnapshot::new(items, aggregate), origin)
            }
            Payload::Alerts(items) => self.alerts.replace(items, origin),
            Payload::Blocked(items) => self.blocked.replace(items, origin),
            Payload::Traffic(sample) => {
                self.history.push(&sample);
                self.traffic.replace(sample, origin);
            }
        }
    }

    fn set_fault(&mut self, kind: Kind, e: SyncError) {
        match kind {
            Kind::Devices => self.devices.fault = Some(e),
            Kind::Alerts => self.alerts.fault = Some(e),
            Kind::Blocked => self.blocked.fault = Some(e),
            Kind::Traffic => self.traffic.fault = Some(e),
        }
    }

    fn panel_state(&self, kind: Kind) -> (bool, Origin, bool) {
        match kind {
            Kind::Devices => (self.devices.live_seen, self.devices.origin, self.devices.view.ready().is_some()),
            Kind::Alerts => (self.alerts.live_seen, self.alerts.origin, self.alerts.view.ready().is_some()),
            Kind::Blocked => (self.blocked.live_seen, self.blocked.origin, self.blocked.view.ready().is_some()),
            Kind::Traffic => (self.traffic.live_seen, self.traffic.origin, self.traffic.view.ready().is_some()),
        }
    }

    /// Aggregate from the current device snapshot, if any.
    pub fn aggregate(&self) -> Option<Aggregate> {
        self.devices.view.ready().map(|s| s.aggregate)
    }
}

#[derive(Debug, Clone)]
struct Tracker {
    interval: Duration,
    last_tick: Option<Instant>,
    issued: Token,
    in_flight: Option<Token>,
}

impl Tracker {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
            issued: 0,
            in_flight: None,
        }
    }

    fn due(&self, now: Instant) -> bool {
        self.last_tick
            .map_or(true, |t| now.saturating_duration_since(t) >= self.interval)
    }

    fn issue(&mut self) -> Token {
        self.issued += 1;
        self.in_flight = Some(self.issued);
        self.issued
    }
}

/// How [`Synchronizer::apply`] disposed of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// A newer token was issued after this one.
    Stale,
    /// The view is gone; nothing may be applied.
    TornDown,
    /// Poll failed; the view is unchanged and the fault indicator is raised.
    Failed,
    /// Poll failed before any live data arrived; demo data was seeded (or,
    /// for traffic, advanced one step) instead.
    FellBack,
}

pub struct Synchronizer {
    trackers: BTreeMap<Kind, Tracker>,
    dashboard: Dashboard,
    fallback: bool,
    torn_down: bool,
    // drives the fallback traffic walk
    rng: StdRng,
}

impl Synchronizer {
    pub fn new(cfg: &PollConfig, fallback: bool) -> Self {
        let trackers = Kind::ALL
            .iter()
            .map(|&k| (k, Tracker::new(cfg.interval(k))))
            .collect();
        Self {
            trackers,
            dashboard: Dashboard::default(),
            fallback,
            torn_down: false,
            rng: StdRng::seed_from_u64(rand::random()),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn in_flight(&self, kind: Kind) -> Option<Token> {
        self.trackers.get(&kind).and_then(|t| t.in_flight)
    }

    /// Tickets for every kind whose interval elapsed. Kinds that never polled
    /// are due immediately. A tick that lands while the previous request is
    /// still outstanding is dropped.
    pub fn due(&mut self, now: Instant) -> Vec<Ticket> {
        if self.torn_down {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (&kind, t) in self.trackers.iter_mut() {
            if !t.due(now) {
                continue;
            }
            t.last_tick = Some(now);
            if let Some(token) = t.in_flight {
                debug!(kind = kind.label(), token, "tick skipped: request in flight");
                continue;
            }
            out.push(Ticket {
                kind,
                token: t.issue(),
            });
        }
        out
    }

    /// On-demand poll. Supersedes any outstanding request for the kind.
    pub fn force(&mut self, kind: Kind, now: Instant) -> Option<Ticket> {
        if self.torn_down {
            return None;
        }
        let t = self.trackers.get_mut(&kind)?;
        if let Some(old) = t.in_flight {
            debug!(kind = kind.label(), old, "superseding in-flight request");
        }
        t.last_tick = Some(now);
        Some(Ticket {
            kind,
            token: t.issue(),
        })
    }

    pub fn force_all(&mut self, kinds: &[Kind], now: Instant) -> Vec<Ticket> {
        kinds.iter().filter_map(|&k| self.force(k, now)).collect()
    }

    pub fn apply(&mut self, ticket: Ticket, outcome: Result<Payload>, origin: Origin) -> Applied {
        if self.torn_down {
            return Applied::TornDown;
        }
        let Some(t) = self.trackers.get_mut(&ticket.kind) else {
            return Applied::Stale;
        };
        if ticket.token != t.issued {
            debug!(
                kind = ticket.kind.label(),
                token = ticket.token,
                latest = t.issued,
                "discarding stale response"
            );
            return Applied::Stale;
        }
        t.in_flight = None;

        let outcome = outcome.and_then(|p| {
            if p.kind() == ticket.kind {
                Ok(p)
            } else {
                Err(SyncError::Parse(format!(
                    "expected {} payload, got {}",
                    ticket.kind.label(),
                    p.kind().label()
                )))
            }
        });

        match outcome {
            Ok(payload) => {
                debug!(kind = ticket.kind.label(), token = ticket.token, "snapshot applied");
                self.dashboard.apply_payload(payload, origin);
                Applied::Applied
            }
            Err(e) => self.on_failure(ticket.kind, e),
        }
    }

    fn on_failure(&mut self, kind: Kind, e: SyncError) -> Applied {
        let (live_seen, origin, has_view) = self.dashboard.panel_state(kind);
        if self.fallback && !live_seen {
            if !has_view {
                info!(kind = kind.label(), error = %e, "backend unreachable, showing demo data");
                self.dashboard.apply_payload(demo::seed(kind), Origin::Demo);
                return Applied::FellBack;
            }
            if origin == Origin::Demo {
                debug!(kind = kind.label(), error = %e, "still on demo data");
                // Charts keep moving while the backend stays away
                if kind == Kind::Traffic {
                    if let Some(prev) = self.dashboard.traffic.view.ready().copied() {
                        let next = demo::step_traffic(&prev, &mut self.rng);
                        self.dashboard.apply_payload(Payload::Traffic(next), Origin::Demo);
                        return Applied::FellBack;
                    }
                }
                return Applied::Failed;
            }
        }
        warn!(kind = kind.label(), error = %e, "poll failed");
        self.dashboard.set_fault(kind, e);
        Applied::Failed
    }

    /// Re-poll tickets owed after a mutation settles: one forced poll of every
    /// affected kind on Ack, nothing on decline or failure.
    pub fn after_mutation(
        &mut self,
        outcome: &Result<MutationOutcome>,
        now: Instant,
    ) -> Vec<Ticket> {
        match outcome {
            Ok(MutationOutcome::Acked(_)) => self.force_all(&AFFECTED_KINDS, now),
            Ok(MutationOutcome::Declined) | Err(_) => Vec::new(),
        }
    }

    /// Stop accepting results. Idempotent.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            info!("view torn down, polling stopped");
        }
        self.torn_down = true;
        for t in self.trackers.values_mut() {
            t.in_flight = None;
        }
    }
}
