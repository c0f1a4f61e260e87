//! Testing utilities for MarsPlay
//!
//! A synthetic host that records every camera and screen call, plus
//! synthetic JPEG data, for offline testing without hardware.

pub mod synthetic_data;
pub mod synthetic_host;

pub use synthetic_data::{synthetic_jpeg, synthetic_rgb};
pub use synthetic_host::{CameraCall, HostObserver, Journal, SyntheticHost};
