use crate::domain::ports::MountProbe;
use std::fs;
use std::path::{Path, PathBuf};

/// Mount detection against the live system: device IDs first, then the
/// kernel mount table on Linux.
#[derive(Debug, Clone)]
pub struct SystemMountProbe {
    mount_table: Option<PathBuf>,
}

impl SystemMountProbe {
    pub fn new() -> Self {
        let mount_table = if cfg!(target_os = "linux") {
            Some(PathBuf::from("/proc/self/mounts"))
        } else {
            None
        };
        Self { mount_table }
    }

    /// Uses only the device check.
    pub fn device_only() -> Self {
        Self { mount_table: None }
    }

    pub fn with_mount_table(path: impl Into<PathBuf>) -> Self {
        Self {
            mount_table: Some(path.into()),
        }
    }

    fn listed_in_mount_table(&self, path: &Path) -> bool {
        let Some(table) = &self.mount_table else {
            return false;
        };

        let content = match fs::read_to_string(table) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Cannot read mount table {}: {}", table.display(), e);
                return false;
            }
        };

        let target = normalize(path);
        let listed = mount_points(&content).any(|mount_point| normalize(Path::new(&mount_point)) == target);
        listed
    }
}

impl Default for SystemMountProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MountProbe for SystemMountProbe {
    fn is_mount_active(&self, path: &Path) -> bool {
        // symlink_metadata 確保符號連結本身不被視為掛載點
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("Mount path {} is not accessible: {}", path.display(), e);
                return false;
            }
        };

        if metadata.file_type().is_symlink() {
            return false;
        }

        is_device_boundary(path, &metadata) || self.listed_in_mount_table(path)
    }
}

#[cfg(unix)]
fn is_device_boundary(path: &Path, metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;

    let parent = match fs::metadata(path.join("..")) {
        Ok(parent) => parent,
        Err(_) => return false,
    };

    // Different device IDs indicate a mount point; same inode means filesystem root
    metadata.dev() != parent.dev() || metadata.ino() == parent.ino()
}

#[cfg(not(unix))]
fn is_device_boundary(path: &Path, _metadata: &fs::Metadata) -> bool {
    path.parent().is_none()
}

/// Mount points from a `/proc/mounts`-style table, octal escapes decoded.
pub fn mount_points(table: &str) -> impl Iterator<Item = String> + '_ {
    table
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(unescape_mount_field)
}

fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_escape(&bytes[i + 1..i + 4]) {
            let value = (bytes[i + 1] - b'0') * 64 + (bytes[i + 2] - b'0') * 8 + (bytes[i + 3] - b'0');
            out.push(value);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits.len() == 3 && digits[0] <= b'3' && digits.iter().all(|d| (b'0'..=b'7').contains(d))
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
