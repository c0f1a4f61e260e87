//! Screen controller: preconditions, permissions, camera acquisition and
//! teardown across the screen's visible/hidden lifecycle.

use crate::camera::CameraSession;
use crate::capture::{CaptureOutcome, CapturePipeline};
use crate::config::MarsPlayConfig;
use crate::constants::{
    CAMERA_UNAVAILABLE_MESSAGE, NO_CAMERA_FOUND_MESSAGE, NO_STORAGE_MESSAGE,
    PERMISSION_REQUEST_CODE, PERMISSION_REQUIRED_MESSAGE, SCREEN_LOG_TARGET,
};
use crate::errors::CameraError;
use crate::permissions::{count_denials, PermissionStatus, REQUIRED_PERMISSIONS};
use crate::platform::Host;
use crate::storage::MediaDirectory;
use crate::surface::{PreviewOutcome, PreviewSurface, SurfaceBinding};
use crate::types::SurfaceHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ScreenState {
    Hidden,
    CheckingPreconditions,
    AwaitingPermission,
    PreviewActive,
}

/// Owns the camera session and the preview surface for one screen instance.
///
/// Teardown always runs in the same order: stop preview, detach the surface,
/// release the session.
pub struct ScreenController<H: Host> {
    host: H,
    config: MarsPlayConfig,
    state: ScreenState,
    session: Option<CameraSession>,
    binding: Option<SurfaceBinding>,
    pipeline: CapturePipeline,
    finished: bool,
}

impl<H: Host> ScreenController<H> {
    pub fn new(host: H, config: MarsPlayConfig) -> Self {
        let pictures_dir = config
            .storage
            .pictures_directory
            .clone()
            .unwrap_or_else(|| host.pictures_directory());
        let media = MediaDirectory::new(pictures_dir, &config.storage.media_folder);

        Self {
            host,
            config,
            state: ScreenState::Hidden,
            session: None,
            binding: None,
            pipeline: CapturePipeline::new(media),
            finished: false,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn session(&self) -> Option<&CameraSession> {
        self.session.as_ref()
    }

    pub fn surface(&self) -> Option<&PreviewSurface> {
        self.binding.as_ref().map(SurfaceBinding::surface)
    }

    pub fn media_directory(&self) -> &MediaDirectory {
        self.pipeline.media_directory()
    }

    /// Width over height of the host display; 0.0 for a degenerate display.
    pub fn display_aspect_ratio(&self) -> f32 {
        self.host.display_size().aspect_ratio()
    }

    /// Whether the screen closed itself (permission refused).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The screen became visible.
    pub fn on_visible(&mut self) {
        match self.state {
            ScreenState::Hidden => {}
            ScreenState::AwaitingPermission => {
                log::debug!(target: SCREEN_LOG_TARGET, "Visible while a permission request is pending");
                return;
            }
            other => {
                log::debug!(target: SCREEN_LOG_TARGET, "Already visible ({:?})", other);
                return;
            }
        }
        if self.finished {
            return;
        }

        self.state = ScreenState::CheckingPreconditions;

        if !self.host.has_camera() {
            self.fail_setup(NO_CAMERA_FOUND_MESSAGE);
            return;
        }
        if !self.host.is_storage_mounted() {
            self.fail_setup(NO_STORAGE_MESSAGE);
            return;
        }

        let missing: Vec<_> = REQUIRED_PERMISSIONS
            .iter()
            .copied()
            .filter(|p| !self.host.permission_status(*p).is_granted())
            .collect();

        if missing.is_empty() {
            self.set_up_camera_preview();
        } else {
            log::info!(target: SCREEN_LOG_TARGET, "Requesting permissions, missing: {:?}", missing);
            self.host
                .request_permissions(&REQUIRED_PERMISSIONS, PERMISSION_REQUEST_CODE);
            self.state = ScreenState::AwaitingPermission;
        }
    }

    /// Result of a permission request. One status per requested permission.
    pub fn on_permissions_result(&mut self, request_code: i32, results: &[PermissionStatus]) {
        log::debug!(target: SCREEN_LOG_TARGET, "on permission result called");
        if request_code != PERMISSION_REQUEST_CODE {
            return;
        }
        if self.state != ScreenState::AwaitingPermission {
            log::warn!(
                target: SCREEN_LOG_TARGET,
                "Permission result while {:?}, ignoring",
                self.state
            );
            return;
        }

        let denials = count_denials(results);
        if denials == 0 {
            self.set_up_camera_preview();
        } else {
            log::warn!(target: SCREEN_LOG_TARGET, "{} permission(s) denied", denials);
            self.host.show_message(PERMISSION_REQUIRED_MESSAGE);
            self.state = ScreenState::Hidden;
            self.finished = true;
            self.host.finish();
        }
    }

    pub fn on_surface_created(&mut self, handle: SurfaceHandle) -> PreviewOutcome {
        match (self.binding.as_mut(), self.session.as_mut()) {
            (Some(binding), Some(session)) => binding.surface_created(handle, session),
            _ => PreviewOutcome::NoSurface,
        }
    }

    pub fn on_surface_changed(
        &mut self,
        handle: Option<SurfaceHandle>,
        format: i32,
        width: u32,
        height: u32,
    ) -> PreviewOutcome {
        match (self.binding.as_mut(), self.session.as_mut()) {
            (Some(binding), Some(session)) => {
                binding.surface_changed(handle, format, width, height, session)
            }
            _ => PreviewOutcome::NoSurface,
        }
    }

    pub fn on_surface_destroyed(&mut self) {
        if let Some(binding) = self.binding.as_mut() {
            binding.surface_destroyed();
        }
    }

    /// Take a still picture, persist it and return to live preview.
    pub async fn capture(&mut self) -> Result<CaptureOutcome, CameraError> {
        if self.state != ScreenState::PreviewActive {
            return Err(CameraError::CaptureError(format!(
                "cannot capture while {:?}",
                self.state
            )));
        }
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| CameraError::CaptureError("no camera session".to_string()))?;

        let image = session.capture()?.wait().await?;
        Ok(self.pipeline.handle(image, session, &mut self.host))
    }

    /// The screen is no longer visible: tear down everything it holds.
    pub fn on_hidden(&mut self) {
        self.teardown();
        // The permission dialog itself hides the screen; keep waiting for its answer.
        if self.state != ScreenState::AwaitingPermission {
            self.state = ScreenState::Hidden;
        }
    }

    fn set_up_camera_preview(&mut self) {
        let Some(mut session) = CameraSession::open(&mut self.host, &self.config.camera) else {
            self.fail_setup(CAMERA_UNAVAILABLE_MESSAGE);
            return;
        };

        if let Err(e) = session.configure(self.config.camera.jpeg_quality) {
            log::warn!(target: SCREEN_LOG_TARGET, "Could not apply camera settings: {}", e);
        }

        let display = self.host.display_size();
        log::debug!(
            target: SCREEN_LOG_TARGET,
            "Display {}x{} (aspect {:.3})",
            display.width,
            display.height,
            display.aspect_ratio()
        );
        let surface = PreviewSurface::sized(display);
        self.host.attach_preview(&surface);
        self.binding = Some(SurfaceBinding::new(surface));
        self.session = Some(session);
        self.state = ScreenState::PreviewActive;
        log::info!(target: SCREEN_LOG_TARGET, "Camera preview set up");
    }

    fn fail_setup(&mut self, message: &str) {
        log::warn!(target: SCREEN_LOG_TARGET, "{}", message);
        self.host.show_message(message);
        self.state = ScreenState::Hidden;
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if let Err(e) = session.stop_preview() {
                log::warn!(target: SCREEN_LOG_TARGET, "Error stopping preview: {}", e);
            }
        }
        if self.binding.take().is_some() {
            self.host.detach_preview();
        }
        if let Some(session) = self.session.take() {
            session.release();
        }
    }
}

impl<H: Host> Drop for ScreenController<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Permission;
    use crate::testing::{CameraCall, SyntheticHost};
    use crate::types::Size;

    fn controller(host: SyntheticHost) -> ScreenController<SyntheticHost> {
        ScreenController::new(host, MarsPlayConfig::default())
    }

    #[test]
    fn test_display_aspect_ratio() {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        host.set_display_size(Size::new(1920, 1080));
        let screen = controller(host);
        assert!((screen.display_aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_camera_shows_message() {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        host.set_has_camera(false);
        let mut screen = controller(host);
        screen.on_visible();

        assert_eq!(screen.state(), ScreenState::Hidden);
        assert!(screen.session().is_none());
        assert_eq!(screen.host().journal().messages, vec![NO_CAMERA_FOUND_MESSAGE]);
        assert_eq!(screen.host().journal().opened, 0);
    }

    #[test]
    fn test_missing_storage_shows_message() {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        host.set_storage_mounted(false);
        let mut screen = controller(host);
        screen.on_visible();

        assert_eq!(screen.state(), ScreenState::Hidden);
        assert_eq!(screen.host().journal().messages, vec![NO_STORAGE_MESSAGE]);
    }

    #[test]
    fn test_requests_all_permissions_in_one_batch() {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        host.set_permission(Permission::WriteExternalStorage, PermissionStatus::NotDetermined);
        let mut screen = controller(host);
        screen.on_visible();

        assert_eq!(screen.state(), ScreenState::AwaitingPermission);
        assert_eq!(
            screen.host().journal().permission_requests,
            vec![(REQUIRED_PERMISSIONS.to_vec(), PERMISSION_REQUEST_CODE)]
        );
        assert!(screen.session().is_none());
    }

    #[test]
    fn test_granted_result_opens_camera() {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        host.set_permission(Permission::Camera, PermissionStatus::NotDetermined);
        let mut screen = controller(host);
        screen.on_visible();
        screen.on_hidden();
        assert_eq!(screen.state(), ScreenState::AwaitingPermission);

        screen.on_permissions_result(
            PERMISSION_REQUEST_CODE,
            &[PermissionStatus::Granted, PermissionStatus::Granted],
        );
        assert_eq!(screen.state(), ScreenState::PreviewActive);
        assert!(screen.session().is_some());

        screen.on_visible();
        assert_eq!(screen.host().journal().opened, 1);
    }

    #[test]
    fn test_foreign_request_code_is_ignored() {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        host.set_permission(Permission::Camera, PermissionStatus::Denied);
        let mut screen = controller(host);
        screen.on_visible();
        screen.on_permissions_result(7, &[PermissionStatus::Denied]);
        assert_eq!(screen.state(), ScreenState::AwaitingPermission);
        assert!(!screen.is_finished());
    }

    #[test]
    fn test_refused_camera_is_terminal_for_attempt() {
        let host = SyntheticHost::new(std::env::temp_dir());
        host.refuse_camera_open();
        let mut screen = controller(host);
        screen.on_visible();

        assert_eq!(screen.state(), ScreenState::Hidden);
        assert!(screen.session().is_none());
        assert!(screen.surface().is_none());
        assert_eq!(screen.host().journal().messages, vec![CAMERA_UNAVAILABLE_MESSAGE]);
    }

    #[test]
    fn test_surface_sized_to_display() {
        let mut host = SyntheticHost::new(std::env::temp_dir());
        host.set_display_size(crate::types::Size::new(720, 1280));
        let mut screen = controller(host);
        screen.on_visible();
        assert_eq!(
            screen.host().journal().attached,
            vec![crate::types::Size::new(720, 1280)]
        );
    }

    #[test]
    fn test_teardown_order() {
        let mut screen = controller(SyntheticHost::new(std::env::temp_dir()));
        screen.on_visible();
        screen.on_surface_created(SurfaceHandle(9));
        screen.on_hidden();

        let calls = screen.host().journal().camera_calls();
        assert_eq!(
            calls[calls.len() - 3..],
            [
                CameraCall::StopPreview,
                CameraCall::SetPreviewDisplay(None),
                CameraCall::Release
            ]
        );
        assert_eq!(screen.host().journal().detached, 1);
        assert_eq!(screen.state(), ScreenState::Hidden);
    }

    #[tokio::test]
    async fn test_capture_requires_active_preview() {
        let mut screen = controller(SyntheticHost::new(std::env::temp_dir()));
        assert!(screen.capture().await.is_err());
    }
}
