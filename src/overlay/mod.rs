//! # Dots overlay - the coordinate-overlay rendering engine
//!
//! Turns AI-supplied spatial instructions into time-bounded glow-dot
//! highlights on a full-viewport surface.
//!
//! ```text
//!        RenderRequest
//!             │
//!      ┌──────┴───────┐
//!      ▼              ▼
//!   coords          shapes          (normalize dots, decompose boxes)
//!      └──────┬───────┘
//!             ▼
//!         renderer                  (glow-cluster rasterization)
//!             ▼
//!        sequencer                  (frame playback, generation token,
//!             ▼                      timed auto-clear)
//!          Surface
//! ```
//!
//! All geometry is authored on a fixed 1920x1080 logical canvas and
//! projected onto the physical surface at draw time, so agent-facing
//! coordinates never depend on the real viewport or pixel density.

mod color;
mod coords;
mod renderer;
mod sequencer;
mod shapes;
mod surface;

pub use color::Color;
pub use coords::{map_coordinate, normalize_dots, NormalizedDot, LOGICAL_HEIGHT, LOGICAL_WIDTH};
pub use renderer::{draw_dots, DEFAULT_COLOR};
pub use sequencer::Overlay;
pub use shapes::boxes_to_dots;
pub use surface::Surface;

pub(crate) use coords::num_or;
