//! Runs fetches and mutations as tasks and funnels their results back to the
//! app loop over a channel. Applying results is the synchronizer's job.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::{DataSource, Kind, Payload};
use crate::error::Result;
use crate::mutation::{request_mutation, MutationOutcome, PendingMutation};
use crate::sync::{Origin, Ticket};

#[derive(Debug)]
pub enum Update {
    Polled {
        ticket: Ticket,
        outcome: Result<Payload>,
    },
    Mutated {
        pending: PendingMutation,
        outcome: Result<MutationOutcome>,
    },
}

pub struct Poller {
    source: Arc<dyn DataSource>,
    origin: Origin,
    tx: UnboundedSender<Update>,
    tasks: HashMap<Kind, JoinHandle<()>>,
    mutations: Vec<JoinHandle<()>>,
}

impl Poller {
    pub fn new(source: Arc<dyn DataSource>, origin: Origin) -> (Self, UnboundedReceiver<Update>) {
        let (tx, rx) = unbounded_channel();
        (
            Self {
                source,
                origin,
                tx,
                tasks: HashMap::new(),
                mutations: Vec::new(),
            },
            rx,
        )
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Spawn the fetch for `ticket`, aborting an older fetch of the same kind.
    pub fn dispatch(&mut self, ticket: Ticket) {
        if let Some(old) = self.tasks.remove(&ticket.kind) {
            if !old.is_finished() {
                old.abort();
            }
        }
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        debug!(kind = ticket.kind.label(), token = ticket.token, "poll issued");
        let handle = tokio::spawn(async move {
            let outcome = source.fetch(ticket.kind).await;
            // Receiver gone means the app already quit
            let _ = tx.send(Update::Polled { ticket, outcome });
        });
        self.tasks.insert(ticket.kind, handle);
    }

    pub fn dispatch_mutation(&mut self, pending: PendingMutation, confirmed: bool) {
        self.mutations.retain(|h| !h.is_finished());
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        info!(key = %pending.key, action = ?pending.action, confirmed, "mutation requested");
        self.mutations.push(tokio::spawn(async move {
            let outcome = request_mutation(source.as_ref(), &pending, confirmed).await;
            let _ = tx.send(Update::Mutated { pending, outcome });
        }));
    }

    /// Abort everything outstanding.
    pub fn shutdown(&mut self) {
        for (_, h) in self.tasks.drain() {
            h.abort();
        }
        for h in self.mutations.drain(..) {
            h.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
