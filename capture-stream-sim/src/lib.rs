//! # capture-stream-sim
//!
//! Simulated host backend for capture-stream-core.
//!
//! Provides:
//! - `SimulatedHost`: `CaptureHost` over a scripted device catalog
//! - `SimulatedTrack`: `MediaTrack` whose host notifications can be fired on demand
//! - `SimDevice`: catalog entries with camera capabilities
//! - `PermissionPolicy`: prompt / granted / denied capture permission
//!
//! ## Usage
//! ```ignore
//! use capture_stream_core::{StreamConfig, StreamController};
//! use capture_stream_sim::SimulatedHost;
//!
//! let host = SimulatedHost::default();
//! let controller = StreamController::new(host.clone(), StreamConfig::default())?;
//! let handle = controller.start().await?;
//! host.issued_tracks()[0].fire_ended();
//! controller.dispatch_track_events();
//! ```

pub mod devices;
pub mod host;
pub mod permissions;
pub mod track;

pub use devices::{default_catalog, SimDevice};
pub use host::SimulatedHost;
pub use permissions::PermissionPolicy;
pub use track::SimulatedTrack;
