//! Where the remote source lives: a network mount, a local disk, or unknown.
//!
//! Purely informational. Logged at run start and recorded in the [`RunSummary`](crate::RunSummary);
//! the pipeline does not change behaviour based on it.

use log::debug;
use serde::Serialize;
use std::path::Path;
use sysinfo::{Disk, Disks};

pub mod network;

use network::{is_network_fs, is_network_mount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceLocation {
    /// Network filesystem (nfs, smb/cifs, afp, webdav) or UNC path.
    Network { fs_type: String },
    Local { fs_type: String },
    Unknown,
}

impl SourceLocation {
    pub fn is_network(&self) -> bool {
        matches!(self, SourceLocation::Network { .. })
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::Network { fs_type } => write!(f, "network ({fs_type})"),
            SourceLocation::Local { fs_type } => write!(f, "local ({fs_type})"),
            SourceLocation::Unknown => write!(f, "unknown"),
        }
    }
}

/// Detect where `path` lives. UNC paths are network without a mount lookup.
pub fn detect_source_location(path: &Path) -> SourceLocation {
    let path_str = path.to_string_lossy();
    if is_network_mount(&path_str) {
        debug!("UNC path: {}", path.display());
        return SourceLocation::Network {
            fs_type: "unc".to_string(),
        };
    }

    let disks = Disks::new_with_refreshed_list();
    debug!("Available disks:");
    for d in disks.iter() {
        debug!(
            "  mount={}, fs={}",
            d.mount_point().display(),
            d.file_system().to_string_lossy(),
        );
    }

    match mount_for_path(&disks, &path_str) {
        Some(disk) => resolve_location(path, disk),
        None => {
            debug!("No disk found for path: {}", path.display());
            SourceLocation::Unknown
        }
    }
}

/// Longest mount point that prefixes `path_str`. Backslashes are normalised for Windows mounts.
fn mount_for_path<'a>(disks: &'a Disks, path_str: &str) -> Option<&'a Disk> {
    let normalized = path_str.replace('\\', "/");
    disks
        .iter()
        .filter(|d| {
            let mount = d.mount_point().to_string_lossy().replace('\\', "/");
            normalized.starts_with(&mount)
        })
        .max_by_key(|d| d.mount_point().to_string_lossy().len())
}

fn resolve_location(path: &Path, disk: &Disk) -> SourceLocation {
    let fs_type = disk.file_system().to_string_lossy().to_string();
    let mount_point = disk.mount_point().to_string_lossy();
    debug!(
        "Disk detection: path={}, mount={}, fs_type={}",
        path.display(),
        mount_point,
        fs_type
    );
    if is_network_fs(&fs_type) || is_network_mount(&mount_point) {
        SourceLocation::Network { fs_type }
    } else {
        SourceLocation::Local { fs_type }
    }
}
