//! Webcam host built on nokhwa.
//!
//! There is no window here: the "surface" is the open capture stream, and
//! user-facing messages go to the log and stderr.

use crate::errors::CameraError;
use crate::permissions::{probe_camera_access, Permission, PermissionStatus};
use crate::platform::{CameraDevice, CameraProvider, DeviceServices, PictureCallback, ScreenHost};
use crate::surface::PreviewSurface;
use crate::thumbnail::Thumbnail;
use crate::types::{CameraParameters, FocusMode, PictureFormat, Size, SurfaceHandle};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GenericImageView};
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};
use std::path::PathBuf;

/// Host backed by the first local webcam
pub struct NativeHost {
    pictures_dir: PathBuf,
    display: Size,
    finished: bool,
}

impl NativeHost {
    pub fn new(pictures_dir: PathBuf) -> Self {
        Self {
            pictures_dir,
            display: Size::new(1280, 720),
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl CameraProvider for NativeHost {
    fn open_default(&mut self) -> Result<Box<dyn CameraDevice>, CameraError> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let camera = Camera::new(CameraIndex::Index(0), requested).map_err(|e| {
            CameraError::InitializationError(format!("Failed to initialize camera: {}", e))
        })?;

        let resolution = camera.resolution();
        let params = CameraParameters {
            picture_size: Size::new(resolution.width(), resolution.height()),
            preview_size: Size::new(resolution.width(), resolution.height()),
            picture_format: PictureFormat::Jpeg,
            jpeg_quality: 95,
            focus_mode: FocusMode::Auto,
        };
        log::info!(
            "Opened {} at {}x{}",
            camera.info().human_name(),
            resolution.width(),
            resolution.height()
        );

        Ok(Box::new(NativeCamera {
            camera,
            params,
            surface: None,
        }))
    }
}

impl DeviceServices for NativeHost {
    fn has_camera(&self) -> bool {
        query(ApiBackend::Auto)
            .map(|cameras| !cameras.is_empty())
            .unwrap_or(false)
    }

    fn is_storage_mounted(&self) -> bool {
        self.pictures_dir.is_dir()
    }

    fn display_size(&self) -> Size {
        self.display
    }

    fn pictures_directory(&self) -> PathBuf {
        self.pictures_dir.clone()
    }

    fn permission_status(&self, permission: Permission) -> PermissionStatus {
        match permission {
            Permission::Camera => probe_camera_access().status,
            Permission::WriteExternalStorage => {
                let writable = std::fs::metadata(&self.pictures_dir)
                    .map(|m| !m.permissions().readonly())
                    .unwrap_or(false);
                if writable {
                    PermissionStatus::Granted
                } else {
                    PermissionStatus::Denied
                }
            }
        }
    }

    fn request_permissions(&mut self, permissions: &[Permission], request_code: i32) {
        // Desktop permissions cannot be granted from inside the process.
        let info = probe_camera_access();
        if info.can_request {
            log::warn!(
                "Permission request {} for {:?} needs user action: {}",
                request_code,
                permissions,
                info.message
            );
        } else {
            log::info!(
                "Permission request {} for {:?}: {}",
                request_code,
                permissions,
                info.message
            );
        }
    }
}

impl ScreenHost for NativeHost {
    fn attach_preview(&mut self, surface: &PreviewSurface) {
        log::info!(
            "Preview attached ({}x{})",
            surface.size().width,
            surface.size().height
        );
    }

    fn detach_preview(&mut self) {
        log::info!("Preview detached");
    }

    fn show_message(&mut self, message: &str) {
        log::warn!("{}", message);
        eprintln!("{}", message);
    }

    fn show_thumbnail(&mut self, thumbnail: &Thumbnail) {
        match &thumbnail.image {
            Some(image) => {
                let (width, height) = image.dimensions();
                log::info!(
                    "Thumbnail {}x{} for {}",
                    width,
                    height,
                    thumbnail.path.display()
                );
            }
            None => log::info!("Saved {}", thumbnail.path.display()),
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

struct NativeCamera {
    camera: Camera,
    params: CameraParameters,
    surface: Option<SurfaceHandle>,
}

impl CameraDevice for NativeCamera {
    fn parameters(&self) -> Result<CameraParameters, CameraError> {
        Ok(self.params.clone())
    }

    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError> {
        let size = params.picture_size;
        if size != self.params.picture_size {
            if let Err(e) = self
                .camera
                .set_resolution(Resolution::new(size.width, size.height))
            {
                // Not every webcam offers the requested still size.
                log::warn!("Keeping camera resolution, {}x{} rejected: {}", size.width, size.height, e);
            }
        }
        self.params = params.clone();
        Ok(())
    }

    fn set_display_orientation(&mut self, degrees: u32) -> Result<(), CameraError> {
        log::debug!("Display orientation {} ignored by webcam host", degrees);
        Ok(())
    }

    fn set_preview_display(&mut self, surface: Option<SurfaceHandle>) -> Result<(), CameraError> {
        self.surface = surface;
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.surface.is_none() {
            return Err(CameraError::PreviewError("no preview display set".to_string()));
        }
        self.camera
            .open_stream()
            .map_err(|e| CameraError::PreviewError(format!("Failed to start stream: {}", e)))
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        if !self.camera.is_stream_open() {
            return Ok(());
        }
        self.camera
            .stop_stream()
            .map_err(|e| CameraError::PreviewError(format!("Failed to stop stream: {}", e)))
    }

    fn take_picture(&mut self, callback: PictureCallback) -> Result<(), CameraError> {
        let frame = self
            .camera
            .frame()
            .map_err(|e| CameraError::CaptureError(format!("Failed to capture frame: {}", e)))?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureError(format!("Failed to decode frame: {}", e)))?;
        let (width, height) = (decoded.width(), decoded.height());
        let rgb = decoded.into_raw();

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.params.jpeg_quality.clamp(1, 100))
            .encode(&rgb, width, height, ExtendedColorType::Rgb8)?;

        let _ = callback.send(jpeg);
        Ok(())
    }

    fn release(&mut self) {
        if let Err(e) = self.stop_preview() {
            log::warn!("Error stopping stream on release: {}", e);
        }
    }
}
