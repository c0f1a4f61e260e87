//! Process-wide constants: log targets, media types, compiled-in camera defaults.

/// Log target for surface and preview events.
pub const PREVIEW_LOG_TARGET: &str = "marsplay::preview";

/// Log target for screen lifecycle and permission events.
pub const SCREEN_LOG_TARGET: &str = "marsplay::screen";

/// Media-type tag for still images.
pub const MEDIA_TYPE_IMAGE: i32 = 1;

/// Media-type tag for video clips.
pub const MEDIA_TYPE_VIDEO: i32 = 2;

/// Folder created under the pictures directory for every capture.
pub const MEDIA_DIRECTORY_NAME: &str = "MarsPlay";

/// `strftime` pattern for the timestamp part of a media file name.
pub const MEDIA_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const DEFAULT_PICTURE_WIDTH: u32 = 1280;
pub const DEFAULT_PICTURE_HEIGHT: u32 = 720;
pub const DEFAULT_JPEG_QUALITY: u8 = 100;

/// Preview rotation applied on every surface change.
pub const DISPLAY_ROTATION_DEGREES: u32 = 90;

/// Request code attached to the batched permission request.
pub const PERMISSION_REQUEST_CODE: i32 = 101;

/// Bounding box used when decoding a capture for the thumbnail view.
pub const THUMBNAIL_MAX_WIDTH: u32 = 1024;
pub const THUMBNAIL_MAX_HEIGHT: u32 = 1024;

pub const NO_CAMERA_FOUND_MESSAGE: &str = "No camera found on this device";
pub const NO_STORAGE_MESSAGE: &str = "No external storage available";
pub const CAMERA_UNAVAILABLE_MESSAGE: &str = "Camera is in use or unavailable";
pub const PERMISSION_REQUIRED_MESSAGE: &str =
    "Camera and storage permissions are required to take pictures";
