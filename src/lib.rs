//! Multi-person pose assembly from part confidence maps and part affinity fields.
//!
//! Bottom-up pose networks (like the OpenPose family) output one confidence map per body part and
//! a pair of *part affinity field* (PAF) channels per limb type. This crate turns those dense maps
//! into a list of per-person skeletons:
//!
//! 1. [`peaks`] finds candidate locations for every body part.
//! 2. [`candidate`] assigns frame-wide ids to those candidates.
//! 3. [`connection`] scores candidate pairs for every limb type by sampling the PAF along the
//!    segment between them.
//! 4. [`assembly`] greedily stitches the scored connections into [`assembly::Skeleton`]s.
//!
//! [`pipeline::PoseEstimator`] runs all of these steps for one frame of [`output::NetOutput`].
//!
//! # Coordinates
//!
//! All maps are indexed as `[y, x]` (row-major, like `ndarray` and the network's NCHW output).
//! Candidate locations are integer pixel coordinates with X pointing right and Y pointing down.
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: additional log filters, applied on top of the defaults set by [`init_logger!`].

use log::LevelFilter;

pub mod assembly;
pub mod candidate;
pub mod config;
pub mod connection;
pub mod image;
pub mod iter;
pub mod num;
pub mod output;
pub mod palette;
pub mod peaks;
pub mod pipeline;
pub mod resolution;
pub mod timer;
pub mod topology;

#[cfg(test)]
mod test;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this crate will log at *trace*
/// level. Otherwise, they will log at *debug* level. `RUST_LOG` is applied on top of that.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
