//! Preview surface and the lifecycle callbacks that drive the preview stream.
//!
//! Failures on this path never propagate: each callback logs the fault and
//! reports it as a [`PreviewOutcome`] so the caller can decide what to do.

use crate::camera::CameraSession;
use crate::constants::PREVIEW_LOG_TARGET;
use crate::errors::CameraError;
use crate::types::{Size, SurfaceHandle};

/// The drawable target the preview stream renders into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSurface {
    handle: Option<SurfaceHandle>,
    size: Size,
    format: Option<i32>,
}

impl PreviewSurface {
    /// A detached surface laid out at `size`
    pub fn sized(size: Size) -> Self {
        Self {
            handle: None,
            size,
            format: None,
        }
    }

    pub fn handle(&self) -> Option<SurfaceHandle> {
        self.handle
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn format(&self) -> Option<i32> {
        self.format
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }
}

/// Result of a best-effort preview (re)start
#[derive(Debug)]
pub enum PreviewOutcome {
    /// The preview stream is running on the surface.
    Started,
    /// Nothing was done; there is no surface to render into.
    NoSurface,
    /// The host rejected one of the calls.
    HostFault(CameraError),
}

impl PreviewOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, PreviewOutcome::Started)
    }
}

/// Binds one [`PreviewSurface`] to the camera session
#[derive(Debug)]
pub struct SurfaceBinding {
    surface: PreviewSurface,
}

impl SurfaceBinding {
    pub fn new(surface: PreviewSurface) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &PreviewSurface {
        &self.surface
    }

    /// The host created the surface: render into it and start the preview.
    ///
    /// A preview still running from an earlier surface is stopped first so the
    /// device restarts on the new one.
    pub fn surface_created(
        &mut self,
        handle: SurfaceHandle,
        session: &mut CameraSession,
    ) -> PreviewOutcome {
        self.surface.handle = Some(handle);
        log::debug!(target: PREVIEW_LOG_TARGET, "Surface {:?} created", handle);

        let result = session
            .stop_preview()
            .and_then(|_| session.bind_surface(handle))
            .and_then(|_| session.start_preview());
        match result {
            Ok(()) => PreviewOutcome::Started,
            Err(e) => {
                log::warn!(target: PREVIEW_LOG_TARGET, "Error setting camera preview: {}", e);
                PreviewOutcome::HostFault(e)
            }
        }
    }

    /// The host resized or reformatted the surface: restart the preview on it.
    ///
    /// `handle` is `None` when the host reports a change for a surface that no
    /// longer exists; nothing reaches the camera in that case.
    pub fn surface_changed(
        &mut self,
        handle: Option<SurfaceHandle>,
        format: i32,
        width: u32,
        height: u32,
        session: &mut CameraSession,
    ) -> PreviewOutcome {
        let Some(handle) = handle else {
            log::debug!(target: PREVIEW_LOG_TARGET, "Surface change without a surface, ignoring");
            return PreviewOutcome::NoSurface;
        };

        self.surface.handle = Some(handle);
        self.surface.size = Size::new(width, height);
        self.surface.format = Some(format);

        match restart_preview(handle, session) {
            Ok(()) => {
                log::debug!(
                    target: PREVIEW_LOG_TARGET,
                    "Preview restarted on {}x{} surface (format {})",
                    width,
                    height,
                    format
                );
                PreviewOutcome::Started
            }
            Err(e) => {
                log::warn!(target: PREVIEW_LOG_TARGET, "Error starting camera preview: {}", e);
                PreviewOutcome::HostFault(e)
            }
        }
    }

    /// The host destroyed the surface.
    ///
    /// Only the handle is dropped here; stopping the preview and releasing
    /// the camera happen in the screen's teardown.
    pub fn surface_destroyed(&mut self) {
        log::debug!(target: PREVIEW_LOG_TARGET, "Surface {:?} destroyed", self.surface.handle);
        self.surface.handle = None;
    }
}

fn restart_preview(handle: SurfaceHandle, session: &mut CameraSession) -> Result<(), CameraError> {
    session.stop_preview()?;
    session.apply_display_orientation()?;
    session.bind_surface(handle)?;
    session.start_preview()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::testing::{CameraCall, SyntheticHost};

    fn setup() -> (SyntheticHost, CameraSession, SurfaceBinding) {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        let session = CameraSession::open(&mut host, &CameraConfig::default()).unwrap();
        let binding = SurfaceBinding::new(PreviewSurface::sized(Size::new(1080, 1920)));
        (host, session, binding)
    }

    #[test]
    fn test_created_starts_preview() {
        let (host, mut session, mut binding) = setup();
        let outcome = binding.surface_created(SurfaceHandle(3), &mut session);
        assert!(outcome.is_started());
        assert!(session.is_previewing());
        assert!(binding.surface().is_live());
        assert_eq!(
            host.journal().camera_calls(),
            vec![
                CameraCall::SetPreviewDisplay(Some(SurfaceHandle(3))),
                CameraCall::StartPreview
            ]
        );
    }

    #[test]
    fn test_changed_without_surface_is_noop() {
        let (host, mut session, mut binding) = setup();
        let outcome = binding.surface_changed(None, 4, 640, 480, &mut session);
        assert!(matches!(outcome, PreviewOutcome::NoSurface));
        assert!(host.journal().camera_calls().is_empty());
        assert_eq!(binding.surface().size(), Size::new(1080, 1920));
    }

    #[test]
    fn test_changed_restarts_with_rotation() {
        let (host, mut session, mut binding) = setup();
        binding.surface_created(SurfaceHandle(3), &mut session);
        let outcome = binding.surface_changed(Some(SurfaceHandle(3)), 4, 720, 1280, &mut session);
        assert!(outcome.is_started());
        assert_eq!(binding.surface().size(), Size::new(720, 1280));
        assert_eq!(binding.surface().format(), Some(4));

        let calls = host.journal().camera_calls();
        assert_eq!(
            calls[2..],
            [
                CameraCall::StopPreview,
                CameraCall::SetDisplayOrientation(90),
                CameraCall::SetPreviewDisplay(Some(SurfaceHandle(3))),
                CameraCall::StartPreview
            ]
        );
    }

    #[test]
    fn test_host_fault_is_reported_not_raised() {
        let (host, mut session, mut binding) = setup();
        host.fail_preview_start(true);
        let outcome = binding.surface_created(SurfaceHandle(3), &mut session);
        assert!(matches!(outcome, PreviewOutcome::HostFault(_)));
        assert!(!session.is_previewing());
    }

    #[test]
    fn test_recreated_surface_restarts_device_preview() {
        let (host, mut session, mut binding) = setup();
        binding.surface_created(SurfaceHandle(3), &mut session);
        binding.surface_destroyed();
        let before = host.journal().camera_calls().len();

        let outcome = binding.surface_created(SurfaceHandle(4), &mut session);
        assert!(outcome.is_started());
        assert!(session.is_previewing());
        assert_eq!(session.surface(), Some(SurfaceHandle(4)));
        assert_eq!(
            host.journal().camera_calls()[before..],
            [
                CameraCall::StopPreview,
                CameraCall::SetPreviewDisplay(Some(SurfaceHandle(4))),
                CameraCall::StartPreview
            ]
        );
    }

    #[test]
    fn test_destroyed_keeps_camera_untouched() {
        let (host, mut session, mut binding) = setup();
        binding.surface_created(SurfaceHandle(3), &mut session);
        let before = host.journal().camera_calls().len();
        binding.surface_destroyed();
        assert!(!binding.surface().is_live());
        assert_eq!(host.journal().camera_calls().len(), before);
        assert_eq!(host.journal().release_count(), 0);
    }
}
