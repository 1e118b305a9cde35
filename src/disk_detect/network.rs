/// Check if filesystem type indicates network storage
#[inline]
pub fn is_network_fs(fs_type: &str) -> bool {
    let fs = fs_type.to_lowercase();
    ["nfs", "smb", "cifs", "afp", "webdav", "9p", "sshfs"]
        .iter()
        .any(|n| fs.contains(n))
}

/// Check if a mount point or path is a UNC share (`\\host\share` or `//host/share`)
#[inline]
pub fn is_network_mount(mount: &str) -> bool {
    mount.starts_with("\\\\") || mount.starts_with("//")
}
