//! Dashboard rendering against ratatui's TestBackend.
use lanwatch::api::Payload;
use lanwatch::demo;
use lanwatch::error::SyncError;
use lanwatch::mutation::PendingMutation;
use lanwatch::sync::{Dashboard, Display, Origin, Synchronizer};
use lanwatch::types::{Device, MacAddr, StatusClass};
use lanwatch::ui::devices::device_rows;
use lanwatch::ui::header::{header_counts, LiveStatus};
use lanwatch::ui::{draw_dashboard, Modal, UiState};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

fn render(dash: &Dashboard, ui: &UiState) -> Buffer {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal.draw(|f| draw_dashboard(f, dash, ui)).unwrap();
    terminal.backend().buffer().clone()
}

fn text(buf: &Buffer) -> String {
    let mut out = String::new();
    for row in buf.content.chunks(buf.area.width as usize) {
        for cell in row {
            out.push_str(cell.symbol());
        }
        out.push('\n');
    }
    out
}

fn seeded() -> Dashboard {
    let mut dash = Dashboard::default();
    for kind in lanwatch::api::Kind::ALL {
        dash.apply_payload(demo::seed(kind), Origin::Live);
    }
    dash
}

fn ui() -> UiState {
    UiState {
        source: "http://127.0.0.1:8000/api/".into(),
        ..UiState::default()
    }
}

#[test]
fn rendering_same_state_twice_is_identical() {
    let dash = seeded();
    let ui = ui();
    assert_eq!(render(&dash, &ui), render(&dash, &ui));
}

#[test]
fn loading_and_empty_states_are_labelled() {
    let dash = Dashboard::default();
    let screen = text(&render(&dash, &ui()));
    assert!(screen.contains("loading devices..."), "{screen}");
    assert!(screen.contains("Connecting..."));

    let mut dash = Dashboard::default();
    dash.apply_payload(
        Payload::Devices {
            items: vec![],
            aggregate: None,
        },
        Origin::Live,
    );
    dash.apply_payload(Payload::Blocked(vec![]), Origin::Live);
    let screen = text(&render(&dash, &ui()));
    assert!(screen.contains("no devices"), "{screen}");
    assert!(screen.contains("no blocked hosts"), "{screen}");
}

#[test]
fn single_idle_device_end_to_end() {
    let mut dash = Dashboard::default();
    dash.apply_payload(
        Payload::Devices {
            items: vec![Device {
                name: Some("Lab-Switch-03".into()),
                ip: Some("192.168.1.14".into()),
                mac: Some(MacAddr::new("00-1a-2b-3c-4d-22")),
                status: Some("Idle".into()),
            }],
            aggregate: None,
        },
        Origin::Live,
    );

    let snap = dash.devices.view.ready().unwrap();
    let rows = device_rows(snap);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].class, StatusClass::Idle);
    assert_eq!(rows[0].class.tag(), "idle");
    assert_eq!(rows[0].mac, "00:1A:2B:3C:4D:22");

    let agg = dash.aggregate().unwrap();
    assert_eq!((agg.total, agg.active, agg.at_risk), (1, 0, 0));
    assert_eq!(LiveStatus::of(&dash), LiveStatus::Secure);

    let screen = text(&render(&dash, &ui()));
    assert!(screen.contains("Lab-Switch-03"), "{screen}");
    assert!(screen.contains("Devices (1)"));
    assert!(screen.contains("Network Secure"));
}

#[test]
fn header_takes_blocked_count_from_list_when_derived() {
    let dash = seeded();
    let agg = header_counts(&dash).unwrap();
    assert_eq!(agg.total, 4);
    assert_eq!(agg.at_risk, 1);
    assert_eq!(agg.blocked, 2);
    assert_eq!(LiveStatus::of(&dash), LiveStatus::ThreatDetected);
}

#[test]
fn failed_poll_shows_error_with_retained_rows() {
    let mut sync = Synchronizer::new(&Default::default(), false);
    let now = std::time::Instant::now();
    let t = sync.force(lanwatch::api::Kind::Devices, now).unwrap();
    sync.apply(t, Ok(demo::seed(lanwatch::api::Kind::Devices)), Origin::Live);
    let t = sync.force(lanwatch::api::Kind::Devices, now).unwrap();
    sync.apply(t, Err(SyncError::Network("timeout".into())), Origin::Live);

    assert!(matches!(
        sync.dashboard().devices.display(),
        Display::Error { retained: 4, .. }
    ));
    let screen = text(&render(sync.dashboard(), &ui()));
    assert!(screen.contains("fetch failed: network error: timeout"), "{screen}");
    assert!(screen.contains("Data Sync Error"));
}

#[test]
fn confirm_modal_names_target() {
    let dash = seeded();
    let pending = PendingMutation::block(&demo::seed_devices()[2]).unwrap();
    let ui = UiState {
        modal: Some(Modal::Confirm(pending)),
        ..ui()
    };
    let screen = text(&render(&dash, &ui));
    assert!(screen.contains("Confirm block"), "{screen}");
    assert!(screen.contains("Unknown-Device"));
    assert!(screen.contains("00:1A:2B:3C:4D:99"));
}
