//! App state and main loop: input handling, dispatching polls, applying results, and drawing.
//!
//! Key and update handling return [`Effect`]s instead of touching the poller
//! directly, so the loop is the only place that spawns work.

use std::{
    future::Future,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::api::{DataSource, Kind};
use crate::config::PollConfig;
use crate::mutation::{MutationOutcome, PendingMutation};
use crate::poller::{Poller, Update};
use crate::sync::{Origin, Synchronizer, Ticket};
use crate::types::MacAddr;
use crate::ui::{self, Focus, Modal, UiState};

/// Work the loop must start on behalf of a key press or a settled update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Poll(Ticket),
    Mutate {
        pending: PendingMutation,
        confirmed: bool,
    },
}

pub struct App {
    sync: Synchronizer,
    pub ui: UiState,
    should_quit: bool,
    // Loop pacing; polls run on their own intervals
    frame: Duration,
}

impl App {
    pub fn new(cfg: &PollConfig, fallback: bool, source_label: impl Into<String>) -> Self {
        Self {
            sync: Synchronizer::new(cfg, fallback),
            ui: UiState {
                source: source_label.into(),
                ..UiState::default()
            },
            should_quit: false,
            frame: Duration::from_millis(100),
        }
    }

    pub fn sync(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Scheduled polls for this instant.
    pub fn due(&mut self, now: Instant) -> Vec<Effect> {
        self.sync.due(now).into_iter().map(Effect::Poll).collect()
    }

    pub fn handle_key(&mut self, k: KeyEvent, now: Instant) -> Vec<Effect> {
        if k.kind != KeyEventKind::Press {
            return Vec::new();
        }

        if let Some(modal) = self.ui.modal.take() {
            return match modal {
                Modal::Confirm(pending) => match k.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                        self.ui.status = Some(format!("{}...", pending.prompt().trim_end_matches('?')));
                        vec![Effect::Mutate {
                            pending,
                            confirmed: true,
                        }]
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => vec![Effect::Mutate {
                        pending,
                        confirmed: false,
                    }],
                    _ => {
                        self.ui.modal = Some(Modal::Confirm(pending));
                        Vec::new()
                    }
                },
                // Any key dismisses a notice
                Modal::Notice { .. } => Vec::new(),
            };
        }

        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.ui.focus = match self.ui.focus {
                    Focus::Devices => Focus::Blocked,
                    Focus::Blocked => Focus::Devices,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home => self.set_selection(0),
            KeyCode::End => self.set_selection(usize::MAX),
            KeyCode::Char('b') => self.pick_block(),
            KeyCode::Char('u') => self.pick_unblock(),
            KeyCode::Char('r') => {
                self.ui.status = Some("refreshing...".into());
                return self
                    .sync
                    .force_all(&Kind::ALL, now)
                    .into_iter()
                    .map(Effect::Poll)
                    .collect();
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn handle_update(&mut self, u: Update, origin: Origin, now: Instant) -> Vec<Effect> {
        match u {
            Update::Polled { ticket, outcome } => {
                let device_key = self.selected_device_key();
                let blocked_key = self.selected_blocked_key();
                self.sync.apply(ticket, outcome, origin);
                self.reanchor(device_key, blocked_key);
                Vec::new()
            }
            Update::Mutated { pending, outcome } => {
                let tickets = self.sync.after_mutation(&outcome, now);
                let verb = pending.action.verb();
                match &outcome {
                    Ok(MutationOutcome::Declined) => {
                        self.ui.status = Some(format!("{verb} of {} cancelled", pending.label));
                    }
                    Ok(MutationOutcome::Acked(ack)) => {
                        info!(key = %pending.key, status = %ack.status, "mutation acknowledged");
                        let mut msg = format!("{verb} {}: {}", pending.key, ack.status);
                        if !ack.message.is_empty() {
                            msg.push_str(&format!(" ({})", ack.message));
                        }
                        self.ui.status = Some(msg);
                    }
                    Err(e) => {
                        warn!(key = %pending.key, error = %e, "mutation failed");
                        self.ui.status = None;
                        self.ui.modal = Some(Modal::Notice {
                            title: format!("{verb} failed"),
                            body: e.to_string(),
                        });
                    }
                }
                tickets.into_iter().map(Effect::Poll).collect()
            }
        }
    }

    fn row_count(&self, focus: Focus) -> usize {
        let dash = self.sync.dashboard();
        match focus {
            Focus::Devices => dash.devices.view.ready().map(|s| s.items.len()),
            Focus::Blocked => dash.blocked.view.ready().map(Vec::len),
        }
        .unwrap_or(0)
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.ui.focus {
            Focus::Devices => &mut self.ui.device_sel,
            Focus::Blocked => &mut self.ui.blocked_sel,
        }
    }

    fn set_selection(&mut self, idx: usize) {
        let last = self.row_count(self.ui.focus).saturating_sub(1);
        *self.selection_mut() = idx.min(last);
    }

    fn move_selection(&mut self, delta: isize) {
        let cur = *self.selection_mut();
        self.set_selection(cur.saturating_add_signed(delta));
    }

    fn selected_device_key(&self) -> Option<MacAddr> {
        let snap = self.sync.dashboard().devices.view.ready()?;
        snap.items.get(self.ui.device_sel)?.mac.clone()
    }

    fn selected_blocked_key(&self) -> Option<MacAddr> {
        let list = self.sync.dashboard().blocked.view.ready()?;
        list.get(self.ui.blocked_sel)?.mac.clone()
    }

    /// Keep the cursor on the same host when rows shift; clamp otherwise.
    fn reanchor(&mut self, device_key: Option<MacAddr>, blocked_key: Option<MacAddr>) {
        let dash = self.sync.dashboard();
        if let (Some(key), Some(snap)) = (device_key, dash.devices.view.ready()) {
            if let Some(i) = snap.items.iter().position(|d| d.mac.as_ref() == Some(&key)) {
                self.ui.device_sel = i;
            }
        }
        if let (Some(key), Some(list)) = (blocked_key, dash.blocked.view.ready()) {
            if let Some(i) = list.iter().position(|b| b.mac.as_ref() == Some(&key)) {
                self.ui.blocked_sel = i;
            }
        }
        self.ui.device_sel = self
            .ui
            .device_sel
            .min(self.row_count(Focus::Devices).saturating_sub(1));
        self.ui.blocked_sel = self
            .ui
            .blocked_sel
            .min(self.row_count(Focus::Blocked).saturating_sub(1));
    }

    fn pick_block(&mut self) {
        let picked = self
            .sync
            .dashboard()
            .devices
            .view
            .ready()
            .and_then(|s| s.items.get(self.ui.device_sel))
            .map(PendingMutation::block);
        self.gate(picked, "device");
    }

    fn pick_unblock(&mut self) {
        let picked = self
            .sync
            .dashboard()
            .blocked
            .view
            .ready()
            .and_then(|l| l.get(self.ui.blocked_sel))
            .map(PendingMutation::unblock);
        self.gate(picked, "blocked host");
    }

    fn gate(&mut self, picked: Option<Option<PendingMutation>>, noun: &str) {
        match picked {
            None => self.ui.status = Some(format!("no {noun} selected")),
            Some(None) => self.ui.status = Some(format!("selected {noun} has no MAC address")),
            Some(Some(p)) => {
                self.ui.status = None;
                self.ui.modal = Some(Modal::Confirm(p));
            }
        }
    }

    pub async fn run(&mut self, source: Arc<dyn DataSource>, origin: Origin) -> anyhow::Result<()> {
        let (mut poller, mut rx) = Poller::new(source, origin);

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, &mut poller, &mut rx).await;

        self.sync.teardown();
        poller.shutdown();

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    fn perform(poller: &mut Poller, effects: Vec<Effect>) {
        for e in effects {
            match e {
                Effect::Poll(t) => poller.dispatch(t),
                Effect::Mutate { pending, confirmed } => poller.dispatch_mutation(pending, confirmed),
            }
        }
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        poller: &mut Poller,
        rx: &mut UnboundedReceiver<Update>,
    ) -> anyhow::Result<()> {
        // Raw mode swallows the keyboard's Ctrl-C; this catches SIGINT from elsewhere
        let mut interrupt = Box::pin(tokio::signal::ctrl_c());
        let mut armed = true;
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    let effects = self.handle_key(k, Instant::now());
                    Self::perform(poller, effects);
                }
            }
            if self.should_quit {
                break;
            }

            let effects = self.due(Instant::now());
            Self::perform(poller, effects);

            while let Ok(u) = rx.try_recv() {
                let effects = self.handle_update(u, poller.origin(), Instant::now());
                Self::perform(poller, effects);
            }

            terminal.draw(|f| ui::draw_dashboard(f, self.sync.dashboard(), &self.ui))?;

            self.wait_frame(&mut interrupt, &mut armed).await;
        }
        Ok(())
    }

    /// Sleep one frame, or stop early when `interrupt` fires. A fired interrupt
    /// ends the loop through the normal teardown path.
    async fn wait_frame<F>(&mut self, interrupt: &mut F, armed: &mut bool)
    where
        F: Future<Output = io::Result<()>> + Unpin,
    {
        tokio::select! {
            _ = sleep(self.frame) => {}
            res = &mut *interrupt, if *armed => {
                *armed = false;
                match res {
                    Ok(()) => {
                        info!("interrupted, shutting down");
                        self.should_quit = true;
                    }
                    Err(e) => warn!(error = %e, "cannot listen for interrupts"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Payload;
    use crate::demo;
    use crate::types::Ack;

    fn press(c: KeyCode) -> KeyEvent {
        KeyEvent::new(c, KeyModifiers::NONE)
    }

    fn loaded_app() -> App {
        let mut app = App::new(&PollConfig::default(), false, "test");
        let now = Instant::now();
        for e in app.due(now) {
            let Effect::Poll(ticket) = e else { continue };
            let outcome = Ok(demo::seed(ticket.kind));
            app.handle_update(Update::Polled { ticket, outcome }, Origin::Live, now);
        }
        app
    }

    #[test]
    fn block_key_opens_gate_for_selected_device() {
        let mut app = loaded_app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::Down), now);
        assert!(app.handle_key(press(KeyCode::Char('b')), now).is_empty());
        let Some(Modal::Confirm(p)) = app.ui.modal.clone() else {
            panic!("expected confirm modal");
        };
        assert_eq!(p.key.as_str(), "00:1A:2B:3C:4D:22");

        let effects = app.handle_key(press(KeyCode::Char('n')), now);
        assert_eq!(
            effects,
            vec![Effect::Mutate {
                pending: p,
                confirmed: false
            }]
        );
        assert!(app.ui.modal.is_none());
    }

    #[test]
    fn ack_repolls_affected_kinds_once() {
        let mut app = loaded_app();
        let now = Instant::now();
        let pending = PendingMutation::unblock(&demo::seed_blocked()[0]).unwrap();
        let effects = app.handle_update(
            Update::Mutated {
                pending,
                outcome: Ok(MutationOutcome::Acked(Ack {
                    status: "unblocked".into(),
                    message: String::new(),
                })),
            },
            Origin::Live,
            now,
        );
        let kinds: Vec<Kind> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Poll(t) => Some(t.kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![Kind::Devices, Kind::Blocked]);
    }

    #[test]
    fn selection_clamps_to_rows() {
        let mut app = loaded_app();
        let now = Instant::now();
        app.handle_key(press(KeyCode::End), now);
        assert_eq!(app.ui.device_sel, demo::seed_devices().len() - 1);
        app.handle_key(press(KeyCode::Down), now);
        assert_eq!(app.ui.device_sel, demo::seed_devices().len() - 1);

        // A shorter list pulls the cursor back in range
        let t = app.sync.force(Kind::Devices, now).unwrap();
        app.handle_update(
            Update::Polled {
                ticket: t,
                outcome: Ok(Payload::Devices {
                    items: demo::seed_devices().into_iter().take(1).collect(),
                    aggregate: None,
                }),
            },
            Origin::Live,
            now,
        );
        assert_eq!(app.ui.device_sel, 0);
    }

    #[tokio::test]
    async fn interrupt_ends_loop_via_quit_flag() {
        let mut app = App::new(&PollConfig::default(), false, "test");
        let mut armed = true;
        let mut failed = std::future::ready(Err(io::Error::other("no signal support")));
        app.wait_frame(&mut failed, &mut armed).await;
        assert!(!app.should_quit());
        assert!(!armed);

        let mut armed = true;
        let mut fired = std::future::ready(Ok(()));
        app.wait_frame(&mut fired, &mut armed).await;
        assert!(app.should_quit());
    }

    #[test]
    fn quit_keys() {
        let mut app = App::new(&PollConfig::default(), false, "test");
        app.handle_key(press(KeyCode::Char('q')), Instant::now());
        assert!(app.should_quit());
    }
}
