//! Small utilities to manage bounded history buffers for the traffic charts.

use std::collections::VecDeque;

use crate::types::TrafficSample;

pub const HISTORY_CAP: usize = 600;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

// Rolling download/upload/pps series plus their peaks
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficHistory {
    pub rx: VecDeque<u64>,
    pub tx: VecDeque<u64>,
    pub pps: VecDeque<u64>,
    pub rx_peak: u64,
    pub tx_peak: u64,
    pub pps_peak: u64,
    cap: usize,
}

impl TrafficHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            rx: VecDeque::with_capacity(cap),
            tx: VecDeque::with_capacity(cap),
            pps: VecDeque::with_capacity(cap),
            rx_peak: 0,
            tx_peak: 0,
            pps_peak: 0,
            cap,
        }
    }

    pub fn push(&mut self, s: &TrafficSample) {
        let rx = s.bandwidth.download_kbps.max(0.0).round() as u64;
        let tx = s.bandwidth.upload_kbps.max(0.0).round() as u64;
        let pps = s.packets.per_second;
        push_capped(&mut self.rx, rx, self.cap);
        push_capped(&mut self.tx, tx, self.cap);
        push_capped(&mut self.pps, pps, self.cap);
        self.rx_peak = self.rx_peak.max(rx);
        self.tx_peak = self.tx_peak.max(tx);
        self.pps_peak = self.pps_peak.max(pps);
    }
}

impl Default for TrafficHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAP)
    }
}
