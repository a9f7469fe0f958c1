//! Sakura Stage — an interactive Kyoto speak-challenge widget.
//!
//! Two cooperating components driven by the egui frame loop:
//!
//! * [`field`] — the falling-petal particle field: a fixed-size collection
//!   advanced one physics step per frame, with in-place recycling and an
//!   egui renderer.
//! * [`speech`] — the voice-interaction state machine: a simulated counter
//!   conversation backed by optional speech-to-text / text-to-speech
//!   capabilities, with deterministic fallbacks when they are absent.
//!
//! [`app::StageApp`] hosts both; [`config`] provides TOML-persisted
//! settings.  `main.rs` only does the wiring.

pub mod app;
pub mod config;
pub mod field;
pub mod speech;
