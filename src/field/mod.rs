//! Petal field simulator.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                 PetalField                      │
//! │                                                │
//! │  ┌──────────┐   tick()    ┌──────────────┐     │
//! │  │ Vec<Petal>│──────────▶│ physics +    │     │
//! │  │ fixed size│            │ in-place     │     │
//! │  └──────────┘            │ recycling    │     │
//! │        │                 └──────────────┘     │
//! │        │ petals()                             │
//! │        ▼                                      │
//! │  render::paint_field()  (egui Painter)        │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The host calls [`PetalField::tick`] once per animation frame, then
//! [`render::paint_field`] with the frame's painter.  There is no internal
//! scheduler — frame cadence belongs to the host.

pub mod field;
pub mod petal;
pub mod render;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use field::{FieldCounts, FieldError, PetalField};
pub use petal::{Petal, PetalKind};
pub use render::{hsl_color, paint_field};
