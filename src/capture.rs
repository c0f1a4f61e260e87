//! Persisting a still capture and returning the session to live preview.

use crate::camera::CameraSession;
use crate::constants::{MEDIA_TYPE_IMAGE, PREVIEW_LOG_TARGET};
use crate::errors::CameraError;
use crate::platform::ScreenHost;
use crate::storage::MediaDirectory;
use crate::surface::PreviewOutcome;
use crate::thumbnail::Thumbnail;
use crate::types::CapturedImage;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What happened to one captured image
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Written to `path`, thumbnail shown, preview restarted (or not, see `preview`).
    Saved {
        path: PathBuf,
        preview: PreviewOutcome,
    },
    /// The media directory could not be created; nothing was written.
    StorageUnavailable,
    /// The file could not be created or written.
    WriteFailed(CameraError),
}

impl CaptureOutcome {
    pub fn saved_path(&self) -> Option<&Path> {
        match self {
            CaptureOutcome::Saved { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapturePipeline {
    media: MediaDirectory,
}

impl CapturePipeline {
    pub fn new(media: MediaDirectory) -> Self {
        Self { media }
    }

    pub fn media_directory(&self) -> &MediaDirectory {
        &self.media
    }

    /// Write `image` to a fresh file, show its thumbnail and restart the preview.
    ///
    /// On storage or write failure nothing is shown and the preview is left as it was.
    pub fn handle(
        &self,
        image: CapturedImage,
        session: &mut CameraSession,
        screen: &mut dyn ScreenHost,
    ) -> CaptureOutcome {
        let Some(path) = self.media.output_media_file(MEDIA_TYPE_IMAGE) else {
            log::error!(
                target: PREVIEW_LOG_TARGET,
                "Error creating media file, check storage permissions"
            );
            return CaptureOutcome::StorageUnavailable;
        };

        if let Err(e) = write_image(&path, &image) {
            log::error!(target: PREVIEW_LOG_TARGET, "Error writing {}: {}", path.display(), e);
            return CaptureOutcome::WriteFailed(e);
        }
        log::info!(
            target: PREVIEW_LOG_TARGET,
            "Saved capture {} ({} bytes) to {}",
            image.id,
            image.len(),
            path.display()
        );

        screen.show_thumbnail(&Thumbnail::for_file(&path));

        let preview = match session.stop_preview().and_then(|_| session.start_preview()) {
            Ok(()) => PreviewOutcome::Started,
            Err(e) => {
                log::warn!(target: PREVIEW_LOG_TARGET, "Error restarting preview: {}", e);
                PreviewOutcome::HostFault(e)
            }
        };

        CaptureOutcome::Saved { path, preview }
    }
}

fn write_image(path: &Path, image: &CapturedImage) -> Result<(), CameraError> {
    let mut file = File::create(path)?;
    file.write_all(&image.data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::testing::{synthetic_jpeg, CameraCall, SyntheticHost};
    use crate::types::SurfaceHandle;
    use uuid::Uuid;

    fn live_session(host: &mut SyntheticHost) -> CameraSession {
        let mut session = CameraSession::open(host, &CameraConfig::default()).unwrap();
        session.bind_surface(SurfaceHandle(1)).unwrap();
        session.start_preview().unwrap();
        session
    }

    #[test]
    fn test_saves_shows_and_restarts() {
        let pictures = tempfile::tempdir().unwrap();
        let mut host = SyntheticHost::new(pictures.path());
        let mut session = live_session(&mut host);
        let pipeline = CapturePipeline::new(MediaDirectory::new(pictures.path(), "MarsPlay"));

        let bytes = synthetic_jpeg(64, 48, 90, 1);
        let outcome = pipeline.handle(
            CapturedImage::new(Uuid::new_v4(), bytes.clone()),
            &mut session,
            &mut host,
        );

        let path = outcome.saved_path().unwrap().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("IMG_") && name.ends_with(".jpg"));

        let journal = host.journal();
        assert_eq!(journal.thumbnails.len(), 1);
        assert_eq!(journal.thumbnails[0], path);
        let calls = journal.camera_calls();
        assert_eq!(
            calls[calls.len() - 2..],
            [CameraCall::StopPreview, CameraCall::StartPreview]
        );
        assert!(session.is_previewing());
    }

    #[test]
    fn test_storage_failure_skips_everything() {
        let pictures = tempfile::tempdir().unwrap();
        let blocker = pictures.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();

        let mut host = SyntheticHost::new(pictures.path());
        let mut session = live_session(&mut host);
        let calls_before = host.journal().camera_calls().len();
        let pipeline = CapturePipeline::new(MediaDirectory::new(&blocker, "MarsPlay"));

        let outcome = pipeline.handle(
            CapturedImage::new(Uuid::new_v4(), vec![1, 2, 3]),
            &mut session,
            &mut host,
        );

        assert!(matches!(outcome, CaptureOutcome::StorageUnavailable));
        assert!(host.journal().thumbnails.is_empty());
        assert_eq!(host.journal().camera_calls().len(), calls_before);
    }
}
