use bytes::Bytes;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height; 0.0 for a degenerate size
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// Opaque handle to a host drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

/// Output encoding of still pictures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PictureFormat {
    Jpeg,
    Nv21,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusMode {
    Auto,
    ContinuousPicture,
    ContinuousVideo,
    Fixed,
    Infinity,
    Macro,
}

impl FocusMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusMode::Auto => "auto",
            FocusMode::ContinuousPicture => "continuous-picture",
            FocusMode::ContinuousVideo => "continuous-video",
            FocusMode::Fixed => "fixed",
            FocusMode::Infinity => "infinity",
            FocusMode::Macro => "macro",
        }
    }
}

/// Capture parameters as read from and written to a camera device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    pub picture_size: Size,
    pub preview_size: Size,
    pub picture_format: PictureFormat,
    pub jpeg_quality: u8,
    pub focus_mode: FocusMode,
}

/// Encoded bytes delivered by one still capture
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub id: Uuid,
    pub data: Bytes,
    pub captured_at: DateTime<Local>,
}

impl CapturedImage {
    pub fn new(id: Uuid, data: Vec<u8>) -> Self {
        Self {
            id,
            data: Bytes::from(data),
            captured_at: Local::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
