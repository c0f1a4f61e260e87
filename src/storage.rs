//! Output file naming under the media directory.

use crate::constants::{MEDIA_TIMESTAMP_FORMAT, MEDIA_TYPE_IMAGE, MEDIA_TYPE_VIDEO};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Map a media-type tag; unknown tags have no media type.
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            MEDIA_TYPE_IMAGE => Some(MediaType::Image),
            MEDIA_TYPE_VIDEO => Some(MediaType::Video),
            _ => None,
        }
    }

    pub fn tag(self) -> i32 {
        match self {
            MediaType::Image => MEDIA_TYPE_IMAGE,
            MediaType::Video => MEDIA_TYPE_VIDEO,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            MediaType::Image => "IMG",
            MediaType::Video => "VID",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Image => "jpg",
            MediaType::Video => "mp4",
        }
    }
}

/// Public pictures directory of the current user, falling back to home, then `.`
pub fn default_pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `{PREFIX}_{yyyyMMdd_HHmmss}.{ext}`
pub fn media_file_name(media_type: MediaType, at: NaiveDateTime) -> String {
    format!(
        "{}_{}.{}",
        media_type.prefix(),
        at.format(MEDIA_TIMESTAMP_FORMAT),
        media_type.extension()
    )
}

/// The folder every capture lands in: `<pictures>/<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDirectory {
    path: PathBuf,
}

impl MediaDirectory {
    pub fn new(pictures_dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            path: pictures_dir.as_ref().join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory if needed. `None` if it cannot be created.
    pub fn ensure(&self) -> Option<&Path> {
        if self.path.is_dir() {
            return Some(&self.path);
        }
        match fs::create_dir_all(&self.path) {
            Ok(()) => Some(&self.path),
            Err(e) => {
                log::warn!("failed to create directory {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Path for a new capture of the media type `tag`, stamped with the
    /// current local time.
    ///
    /// Two captures in the same second get the same name.
    pub fn output_media_file(&self, tag: i32) -> Option<PathBuf> {
        self.output_media_file_at(tag, Local::now().naive_local())
    }

    pub fn output_media_file_at(&self, tag: i32, at: NaiveDateTime) -> Option<PathBuf> {
        let dir = self.ensure()?;
        let media_type = MediaType::from_tag(tag)?;
        Some(dir.join(media_file_name(media_type, at)))
    }
}
