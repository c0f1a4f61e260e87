/// Permission status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PermissionStatus {
    /// Permission granted
    Granted,
    /// Permission denied
    Denied,
    /// Permission not determined (user hasn't been asked yet)
    NotDetermined,
    /// Permission restricted (parental controls, etc)
    Restricted,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NotDetermined => write!(f, "not_determined"),
            PermissionStatus::Restricted => write!(f, "restricted"),
        }
    }
}

/// Runtime permissions the capture screen depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Permission {
    Camera,
    WriteExternalStorage,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Camera => "android.permission.CAMERA",
            Permission::WriteExternalStorage => "android.permission.WRITE_EXTERNAL_STORAGE",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested together, in this order, as one batch.
pub const REQUIRED_PERMISSIONS: [Permission; 2] =
    [Permission::Camera, Permission::WriteExternalStorage];

/// Number of results in a permission callback that are not grants
pub fn count_denials(results: &[PermissionStatus]) -> usize {
    results.iter().filter(|status| !status.is_granted()).count()
}

/// Detailed permission information
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PermissionInfo {
    pub status: PermissionStatus,
    pub message: String,
    pub can_request: bool,
}

/// Probe access to the local video devices.
///
/// Used by the native host; on Linux this inspects `/dev/video*` and the
/// caller's group membership.
pub fn probe_camera_access() -> PermissionInfo {
    #[cfg(target_os = "linux")]
    {
        probe_camera_access_linux()
    }

    #[cfg(not(target_os = "linux"))]
    {
        // Other desktops gate camera access when the device is opened.
        PermissionInfo {
            status: PermissionStatus::Granted,
            message: "Camera access is checked by the operating system on open".to_string(),
            can_request: false,
        }
    }
}

#[cfg(target_os = "linux")]
fn probe_camera_access_linux() -> PermissionInfo {
    use std::fs;
    use std::path::Path;

    let video_devices: Vec<_> = (0..10)
        .map(|i| format!("/dev/video{}", i))
        .filter(|path| Path::new(path).exists())
        .collect();

    let Some(first_device) = video_devices.first() else {
        return PermissionInfo {
            status: PermissionStatus::NotDetermined,
            message: "No video devices found at /dev/video*".to_string(),
            can_request: false,
        };
    };

    match fs::metadata(first_device) {
        Ok(_) if linux_video_group_member() => PermissionInfo {
            status: PermissionStatus::Granted,
            message: format!(
                "Camera access granted (user in video group, {} found)",
                first_device
            ),
            can_request: false,
        },
        Ok(_) => PermissionInfo {
            status: PermissionStatus::Denied,
            message: format!(
                "Camera device {} exists but user not in video group - run: sudo usermod -a -G video $USER",
                first_device
            ),
            can_request: true,
        },
        Err(e) => PermissionInfo {
            status: PermissionStatus::Denied,
            message: format!("Cannot access {}: {}", first_device, e),
            can_request: true,
        },
    }
}

#[cfg(target_os = "linux")]
fn linux_video_group_member() -> bool {
    use std::process::Command;

    Command::new("groups")
        .output()
        .ok()
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|groups| groups.contains("video") || groups.contains("plugdev"))
        .unwrap_or(false)
}
