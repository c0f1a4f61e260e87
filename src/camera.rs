//! Exclusive camera session: parameters, preview stream, still capture.

use crate::config::CameraConfig;
use crate::constants::PREVIEW_LOG_TARGET;
use crate::errors::CameraError;
use crate::platform::{CameraDevice, CameraProvider};
use crate::types::{CameraParameters, CapturedImage, PictureFormat, Size, SurfaceHandle};
use tokio::sync::oneshot;
use uuid::Uuid;

/// One opened camera device.
///
/// Released exactly once, either through [`CameraSession::release`] or on drop.
pub struct CameraSession {
    device: Box<dyn CameraDevice>,
    picture_width: u32,
    picture_height: u32,
    display_rotation: u32,
    surface: Option<SurfaceHandle>,
    previewing: bool,
    released: bool,
}

impl CameraSession {
    /// Acquire the default camera.
    ///
    /// Returns `None` when the host refuses the device; the refusal is logged.
    pub fn open(provider: &mut dyn CameraProvider, config: &CameraConfig) -> Option<Self> {
        match provider.open_default() {
            Ok(device) => {
                log::info!(
                    target: PREVIEW_LOG_TARGET,
                    "Camera opened ({}x{} pictures)",
                    config.picture_size[0],
                    config.picture_size[1]
                );
                Some(Self {
                    device,
                    picture_width: config.picture_size[0],
                    picture_height: config.picture_size[1],
                    display_rotation: config.display_rotation,
                    surface: None,
                    previewing: false,
                    released: false,
                })
            }
            Err(e) => {
                log::error!(target: PREVIEW_LOG_TARGET, "Failed to open camera: {}", e);
                None
            }
        }
    }

    /// Merge the session's picture settings into the device parameters and
    /// apply them in one call. Returns what was applied.
    pub fn configure(&mut self, quality: u8) -> Result<CameraParameters, CameraError> {
        let mut params = self.device.parameters()?;
        params.picture_size = Size::new(self.picture_width, self.picture_height);
        params.picture_format = PictureFormat::Jpeg;
        params.jpeg_quality = quality;
        // focus_mode is left alone: auto stays auto, anything else is device-chosen.
        self.device.set_parameters(&params)?;
        log::debug!(
            target: PREVIEW_LOG_TARGET,
            "Applied parameters: {}x{} jpeg q={} focus={}",
            params.picture_size.width,
            params.picture_size.height,
            params.jpeg_quality,
            params.focus_mode.as_str()
        );
        Ok(params)
    }

    pub fn parameters(&self) -> Result<CameraParameters, CameraError> {
        self.device.parameters()
    }

    pub fn default_width(&self) -> u32 {
        self.picture_width
    }

    pub fn default_height(&self) -> u32 {
        self.picture_height
    }

    /// Takes effect on the next [`CameraSession::configure`].
    pub fn set_default_width(&mut self, width: u32) {
        self.picture_width = width;
    }

    /// Takes effect on the next [`CameraSession::configure`].
    pub fn set_default_height(&mut self, height: u32) {
        self.picture_height = height;
    }

    pub fn preview_width(&self) -> Result<u32, CameraError> {
        Ok(self.device.parameters()?.preview_size.width)
    }

    pub fn preview_height(&self) -> Result<u32, CameraError> {
        Ok(self.device.parameters()?.preview_size.height)
    }

    pub fn display_rotation(&self) -> u32 {
        self.display_rotation
    }

    pub fn apply_display_orientation(&mut self) -> Result<(), CameraError> {
        self.device.set_display_orientation(self.display_rotation)
    }

    pub fn bind_surface(&mut self, surface: SurfaceHandle) -> Result<(), CameraError> {
        self.device.set_preview_display(Some(surface))?;
        self.surface = Some(surface);
        Ok(())
    }

    pub fn unbind_surface(&mut self) -> Result<(), CameraError> {
        if self.surface.take().is_some() {
            self.device.set_preview_display(None)?;
        }
        Ok(())
    }

    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.surface
    }

    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    /// Start the preview stream. No-op when already running.
    pub fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.previewing {
            return Ok(());
        }
        if self.surface.is_none() {
            return Err(CameraError::PreviewError(
                "no preview surface bound".to_string(),
            ));
        }
        self.device.start_preview()?;
        self.previewing = true;
        Ok(())
    }

    /// Stop the preview stream. No-op when not running.
    pub fn stop_preview(&mut self) -> Result<(), CameraError> {
        if !self.previewing {
            return Ok(());
        }
        self.device.stop_preview()?;
        self.previewing = false;
        Ok(())
    }

    /// Issue a one-shot still capture.
    pub fn capture(&mut self) -> Result<PendingCapture, CameraError> {
        if !self.previewing {
            return Err(CameraError::CaptureError(
                "preview is not running".to_string(),
            ));
        }
        let (tx, rx) = oneshot::channel();
        self.device.take_picture(tx)?;
        let id = Uuid::new_v4();
        log::debug!(target: PREVIEW_LOG_TARGET, "Capture {} requested", id);
        Ok(PendingCapture { id, receiver: rx })
    }

    /// Stop preview, unbind the surface and give the device back.
    pub fn release(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.stop_preview() {
            log::warn!(target: PREVIEW_LOG_TARGET, "Error stopping preview on release: {}", e);
        }
        if let Err(e) = self.unbind_surface() {
            log::warn!(target: PREVIEW_LOG_TARGET, "Error detaching surface on release: {}", e);
        }
        self.device.release();
        self.released = true;
        log::info!(target: PREVIEW_LOG_TARGET, "Camera released");
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A still capture that the device has accepted but not yet delivered
#[derive(Debug)]
pub struct PendingCapture {
    id: Uuid,
    receiver: oneshot::Receiver<Vec<u8>>,
}

impl PendingCapture {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Resolve with the delivered bytes. Fails if the device dropped the
    /// callback without invoking it.
    pub async fn wait(self) -> Result<CapturedImage, CameraError> {
        let data = self.receiver.await.map_err(|_| {
            CameraError::CaptureError("camera dropped the picture callback".to_string())
        })?;
        Ok(CapturedImage::new(self.id, data))
    }
}
