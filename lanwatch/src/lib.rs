//! Library surface for the lanwatch TUI: data model, backend client, view
//! synchronization and rendering. The binary in `main.rs` wires these together.

pub mod api;
pub mod app;
pub mod config;
pub mod demo;
pub mod error;
pub mod history;
pub mod logging;
pub mod mutation;
pub mod poller;
pub mod profiles;
pub mod sync;
pub mod types;
pub mod ui;
