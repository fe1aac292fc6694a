//! Trailmap: GPS track recording and review.
//!
//! The crate has three cores:
//!
//! - [`map`]: keeps a stateful rendering surface in step with host view
//!   state under Locked or Free view ownership, and owns the track
//!   polyline and marker overlays drawn on it.
//! - [`tracking`]: records a live position stream into a local buffer and
//!   fans each fix out to remote sinks through [`dispatch`] without
//!   letting the network stall recording.
//! - [`analytics`]: distance, duration, speed and elevation over an
//!   ordered point sequence.
//!
//! Around them sit the [`service`] client for the remote data service,
//! the [`config`] file and [`logging`] setup.

pub mod analytics;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod map;
pub mod model;
pub mod service;
pub mod tracking;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
