//! MarsPlay: camera preview and still capture pipeline
//!
//! The crate drives one capture screen: it checks device preconditions and
//! permissions, opens the camera, runs the live preview on a host surface,
//! captures stills to `<Pictures>/MarsPlay/IMG_<timestamp>.jpg` and hands a
//! thumbnail back to the screen.
//!
//! The host (camera service, display, storage, permission dialogs) is reached
//! through the traits in [`platform`]. [`testing::SyntheticHost`] implements
//! them in memory; the `native` feature adds a webcam host.
//!
//! # Usage
//! ```rust,no_run
//! use marsplay::config::MarsPlayConfig;
//! use marsplay::orchestrator::ScreenController;
//! use marsplay::testing::SyntheticHost;
//! use marsplay::types::SurfaceHandle;
//!
//! # async fn run() -> Result<(), marsplay::CameraError> {
//! let host = SyntheticHost::new(std::env::temp_dir());
//! let mut screen = ScreenController::new(host, MarsPlayConfig::default());
//! screen.on_visible();
//! screen.on_surface_created(SurfaceHandle(1));
//! let outcome = screen.capture().await?;
//! println!("saved to {:?}", outcome.saved_path());
//! screen.on_hidden();
//! # Ok(())
//! # }
//! ```
pub mod camera;
pub mod capture;
pub mod config;
pub mod constants;
pub mod errors;
pub mod orchestrator;
pub mod permissions;
pub mod platform;
pub mod storage;
pub mod surface;
pub mod thumbnail;
pub mod types;

// Testing utilities - synthetic host and data for offline testing
pub mod testing;

// Re-exports for convenience
pub use camera::{CameraSession, PendingCapture};
pub use capture::{CaptureOutcome, CapturePipeline};
pub use config::MarsPlayConfig;
pub use errors::CameraError;
pub use orchestrator::{ScreenController, ScreenState};
pub use platform::{CameraDevice, CameraProvider, DeviceServices, Host, ScreenHost};
pub use storage::{MediaDirectory, MediaType};
pub use surface::{PreviewOutcome, PreviewSurface, SurfaceBinding};
pub use types::{CameraParameters, CapturedImage, Size, SurfaceHandle};

/// Initialize logging for the camera pipeline
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "marsplay=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}
