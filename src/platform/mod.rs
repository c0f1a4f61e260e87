//! Host services the capture screen runs on.
//!
//! Every call here is made from the host's single UI thread; none of the
//! traits require `Send`.

use crate::errors::CameraError;
use crate::permissions::{Permission, PermissionStatus};
use crate::surface::PreviewSurface;
use crate::thumbnail::Thumbnail;
use crate::types::{CameraParameters, Size, SurfaceHandle};
use std::path::PathBuf;
use tokio::sync::oneshot;

#[cfg(feature = "native")]
pub mod native;

/// One-shot sink for the encoded bytes of a still capture.
pub type PictureCallback = oneshot::Sender<Vec<u8>>;

/// Exclusive handle to an opened camera device
pub trait CameraDevice {
    fn parameters(&self) -> Result<CameraParameters, CameraError>;

    /// Apply all parameters in a single call.
    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError>;

    fn set_display_orientation(&mut self, degrees: u32) -> Result<(), CameraError>;

    /// Bind (or with `None`, unbind) the preview render target.
    fn set_preview_display(&mut self, surface: Option<SurfaceHandle>) -> Result<(), CameraError>;

    fn start_preview(&mut self) -> Result<(), CameraError>;

    fn stop_preview(&mut self) -> Result<(), CameraError>;

    /// Request one still picture. The device invokes `callback` at most once.
    fn take_picture(&mut self, callback: PictureCallback) -> Result<(), CameraError>;

    /// Give the device back to the system.
    fn release(&mut self);
}

/// Source of camera devices
pub trait CameraProvider {
    fn open_default(&mut self) -> Result<Box<dyn CameraDevice>, CameraError>;
}

/// Device capabilities, geometry, storage and permissions
pub trait DeviceServices {
    fn has_camera(&self) -> bool;

    fn is_storage_mounted(&self) -> bool;

    fn display_size(&self) -> Size;

    /// Public pictures directory the media folder is created in.
    fn pictures_directory(&self) -> PathBuf;

    fn permission_status(&self, permission: Permission) -> PermissionStatus;

    /// Ask for all `permissions` at once. The answer arrives later through
    /// the screen's permission-result callback with the same `request_code`.
    fn request_permissions(&mut self, permissions: &[Permission], request_code: i32);
}

/// The visible screen: view hierarchy and user-facing feedback
pub trait ScreenHost {
    fn attach_preview(&mut self, surface: &PreviewSurface);

    fn detach_preview(&mut self);

    fn show_message(&mut self, message: &str);

    fn show_thumbnail(&mut self, thumbnail: &Thumbnail);

    /// Close the screen for good.
    fn finish(&mut self);
}

/// Everything the screen controller needs from the host.
pub trait Host: CameraProvider + DeviceServices + ScreenHost {}

impl<T: CameraProvider + DeviceServices + ScreenHost> Host for T {}
