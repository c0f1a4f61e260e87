//! In-memory host that behaves like a phone with one back camera.

use crate::errors::CameraError;
use crate::permissions::{Permission, PermissionStatus};
use crate::platform::{CameraDevice, CameraProvider, DeviceServices, PictureCallback, ScreenHost};
use crate::surface::PreviewSurface;
use crate::testing::synthetic_jpeg;
use crate::thumbnail::Thumbnail;
use crate::types::{CameraParameters, FocusMode, PictureFormat, Size, SurfaceHandle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One call that reached the synthetic camera device
#[derive(Debug, Clone, PartialEq)]
pub enum CameraCall {
    SetParameters(CameraParameters),
    SetDisplayOrientation(u32),
    SetPreviewDisplay(Option<SurfaceHandle>),
    StartPreview,
    StopPreview,
    TakePicture,
    Release,
}

/// Everything the host observed, in order
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Vec<CameraCall>,
    pub opened: usize,
    pub messages: Vec<String>,
    pub permission_requests: Vec<(Vec<Permission>, i32)>,
    pub attached: Vec<Size>,
    pub detached: usize,
    pub thumbnails: Vec<PathBuf>,
    pub finished: bool,
}

impl Journal {
    pub fn camera_calls(&self) -> Vec<CameraCall> {
        self.calls.clone()
    }

    pub fn count(&self, call: &CameraCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn release_count(&self) -> usize {
        self.count(&CameraCall::Release)
    }
}

#[derive(Debug)]
struct SyntheticState {
    journal: Journal,
    refuse_open: bool,
    fail_preview_start: bool,
    drop_callbacks: bool,
    focus_mode: FocusMode,
    pictures_taken: u64,
}

/// Read-only view of a [`SyntheticHost`]'s journal
#[derive(Clone)]
pub struct HostObserver {
    state: Arc<Mutex<SyntheticState>>,
}

impl HostObserver {
    pub fn journal(&self) -> Journal {
        self.state.lock().expect("lock poisoned").journal.clone()
    }
}

/// Synthetic host for tests and demos
pub struct SyntheticHost {
    state: Arc<Mutex<SyntheticState>>,
    pictures_dir: PathBuf,
    display: Size,
    has_camera: bool,
    storage_mounted: bool,
    permissions: HashMap<Permission, PermissionStatus>,
}

impl SyntheticHost {
    /// Camera present, storage mounted, 1080x1920 display, all permissions granted.
    pub fn new(pictures_dir: impl AsRef<Path>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SyntheticState {
                journal: Journal::default(),
                refuse_open: false,
                fail_preview_start: false,
                drop_callbacks: false,
                focus_mode: FocusMode::Auto,
                pictures_taken: 0,
            })),
            pictures_dir: pictures_dir.as_ref().to_path_buf(),
            display: Size::new(1080, 1920),
            has_camera: true,
            storage_mounted: true,
            permissions: HashMap::from([
                (Permission::Camera, PermissionStatus::Granted),
                (Permission::WriteExternalStorage, PermissionStatus::Granted),
            ]),
        }
    }

    /// Snapshot of everything recorded so far
    pub fn journal(&self) -> Journal {
        self.lock().journal.clone()
    }

    /// A handle that can read the journal after the host has been moved away.
    pub fn observer(&self) -> HostObserver {
        HostObserver {
            state: self.state.clone(),
        }
    }

    pub fn set_has_camera(&mut self, present: bool) {
        self.has_camera = present;
    }

    pub fn set_storage_mounted(&mut self, mounted: bool) {
        self.storage_mounted = mounted;
    }

    pub fn set_display_size(&mut self, size: Size) {
        self.display = size;
    }

    pub fn set_permission(&mut self, permission: Permission, status: PermissionStatus) {
        self.permissions.insert(permission, status);
    }

    pub fn refuse_camera_open(&self) {
        self.lock().refuse_open = true;
    }

    pub fn fail_preview_start(&self, fail: bool) {
        self.lock().fail_preview_start = fail;
    }

    /// Accept picture requests but never deliver them.
    pub fn drop_picture_callbacks(&self) {
        self.lock().drop_callbacks = true;
    }

    /// Focus mode the camera reports when opened.
    pub fn set_focus_mode(&self, mode: FocusMode) {
        self.lock().focus_mode = mode;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SyntheticState> {
        self.state.lock().expect("lock poisoned")
    }
}

impl CameraProvider for SyntheticHost {
    fn open_default(&mut self) -> Result<Box<dyn CameraDevice>, CameraError> {
        let mut state = self.lock();
        if state.refuse_open || !self.has_camera {
            return Err(CameraError::InitializationError(
                "Fail to connect to camera service".to_string(),
            ));
        }
        state.journal.opened += 1;
        let params = CameraParameters {
            picture_size: Size::new(640, 480),
            preview_size: Size::new(1920, 1080),
            picture_format: PictureFormat::Nv21,
            jpeg_quality: 85,
            focus_mode: state.focus_mode,
        };
        drop(state);

        Ok(Box::new(SyntheticCamera {
            state: self.state.clone(),
            params,
        }))
    }
}

impl DeviceServices for SyntheticHost {
    fn has_camera(&self) -> bool {
        self.has_camera
    }

    fn is_storage_mounted(&self) -> bool {
        self.storage_mounted
    }

    fn display_size(&self) -> Size {
        self.display
    }

    fn pictures_directory(&self) -> PathBuf {
        self.pictures_dir.clone()
    }

    fn permission_status(&self, permission: Permission) -> PermissionStatus {
        self.permissions
            .get(&permission)
            .copied()
            .unwrap_or(PermissionStatus::NotDetermined)
    }

    fn request_permissions(&mut self, permissions: &[Permission], request_code: i32) {
        self.lock()
            .journal
            .permission_requests
            .push((permissions.to_vec(), request_code));
    }
}

impl ScreenHost for SyntheticHost {
    fn attach_preview(&mut self, surface: &PreviewSurface) {
        self.lock().journal.attached.push(surface.size());
    }

    fn detach_preview(&mut self) {
        self.lock().journal.detached += 1;
    }

    fn show_message(&mut self, message: &str) {
        self.lock().journal.messages.push(message.to_string());
    }

    fn show_thumbnail(&mut self, thumbnail: &Thumbnail) {
        self.lock().journal.thumbnails.push(thumbnail.path.clone());
    }

    fn finish(&mut self) {
        self.lock().journal.finished = true;
    }
}

struct SyntheticCamera {
    state: Arc<Mutex<SyntheticState>>,
    params: CameraParameters,
}

impl SyntheticCamera {
    fn record(&self, call: CameraCall) {
        self.state.lock().expect("lock poisoned").journal.calls.push(call);
    }
}

impl CameraDevice for SyntheticCamera {
    fn parameters(&self) -> Result<CameraParameters, CameraError> {
        Ok(self.params.clone())
    }

    fn set_parameters(&mut self, params: &CameraParameters) -> Result<(), CameraError> {
        self.record(CameraCall::SetParameters(params.clone()));
        self.params = params.clone();
        Ok(())
    }

    fn set_display_orientation(&mut self, degrees: u32) -> Result<(), CameraError> {
        self.record(CameraCall::SetDisplayOrientation(degrees));
        Ok(())
    }

    fn set_preview_display(&mut self, surface: Option<SurfaceHandle>) -> Result<(), CameraError> {
        self.record(CameraCall::SetPreviewDisplay(surface));
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        if self.state.lock().expect("lock poisoned").fail_preview_start {
            return Err(CameraError::PreviewError("startPreview failed".to_string()));
        }
        self.record(CameraCall::StartPreview);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.record(CameraCall::StopPreview);
        Ok(())
    }

    fn take_picture(&mut self, callback: PictureCallback) -> Result<(), CameraError> {
        self.record(CameraCall::TakePicture);
        let (drop_callbacks, seed) = {
            let mut state = self.state.lock().expect("lock poisoned");
            state.pictures_taken += 1;
            (state.drop_callbacks, state.pictures_taken)
        };
        if drop_callbacks {
            return Ok(());
        }

        let size = self.params.picture_size;
        let jpeg = synthetic_jpeg(size.width, size.height, self.params.jpeg_quality, seed);
        // The receiver may already be gone; that capture is simply lost.
        let _ = callback.send(jpeg);
        Ok(())
    }

    fn release(&mut self) {
        self.record(CameraCall::Release);
    }
}
