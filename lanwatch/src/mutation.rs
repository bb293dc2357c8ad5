//! Confirmation-gated block/unblock.
//!
//! A [`PendingMutation`] captures the target's MAC when the operator picks a
//! row, so later re-renders cannot shift the action onto another host. Nothing
//! reaches the backend until the operator confirms.

use crate::api::{DataSource, Kind};
use crate::error::Result;
use crate::types::{or_placeholder, Ack, BlockedHost, Device, MacAddr, MutateRequest, MutationAction};

/// Kinds re-polled after an acknowledged mutation.
pub const AFFECTED_KINDS: [Kind; 2] = [Kind::Devices, Kind::Blocked];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub key: MacAddr,
    pub action: MutationAction,
    /// Human-readable target, e.g. "Lab-Switch-03 (192.168.1.14)".
    pub label: String,
}

impl PendingMutation {
    /// `None` when the device has no MAC to key the request on.
    pub fn block(d: &Device) -> Option<Self> {
        let key = d.mac.clone()?;
        Some(Self {
            label: format!(
                "{} ({})",
                or_placeholder(d.name.as_deref()),
                or_placeholder(d.ip.as_deref())
            ),
            key,
            action: MutationAction::Block,
        })
    }

    pub fn unblock(b: &BlockedHost) -> Option<Self> {
        let key = b.mac.clone()?;
        Some(Self {
            label: or_placeholder(b.ip.as_deref()).to_string(),
            key,
            action: MutationAction::Unblock,
        })
    }

    pub fn prompt(&self) -> String {
        format!("{} {} [{}]?", self.action.verb(), self.label, self.key)
    }

    pub fn request(&self) -> MutateRequest {
        MutateRequest {
            key: self.key.clone(),
            action: self.action,
            reason: match self.action {
                MutationAction::Block => Some("Manual admin action".into()),
                MutationAction::Unblock => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Operator said no; the backend was not contacted.
    Declined,
    Acked(Ack),
}

pub async fn request_mutation(
    source: &dyn DataSource,
    pending: &PendingMutation,
    confirmed: bool,
) -> Result<MutationOutcome> {
    if !confirmed {
        return Ok(MutationOutcome::Declined);
    }
    let ack = source.mutate(&pending.request()).await?;
    Ok(MutationOutcome::Acked(ack))
}
