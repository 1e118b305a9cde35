//! Path, naming and tuning utilities

use log::debug;
use std::path::{Component, Path, PathBuf};

use crate::error::MigrateError;
use crate::utils::config::PipelineDefaults;

/// Lower-cased extension without the dot.
pub fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True if `ext` (no dot) is in `set`, case-insensitively.
pub fn extension_in(ext: &str, set: &[String]) -> bool {
    set.iter()
        .any(|s| s.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            // Linux
            ".directory" => true,
            // macOS resource fork files start with ._
            _ => name.starts_with("._"),
        }
    } else {
        false
    }
}

/// Final output path: `dest_dir/<stem>.<target_ext>`.
pub fn output_path_for(source: &Path, dest_dir: &Path, target_ext: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .unwrap_or_else(|| source.as_os_str())
        .to_string_lossy();
    dest_dir.join(format!("{stem}.{}", target_ext.trim_start_matches('.')))
}

/// In-flight copy path: `<name>.part` next to `dst`.
pub fn partial_copy_path(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    dst.with_file_name(format!("{name}.{}", PipelineDefaults::PARTIAL_SUFFIX))
}

/// In-flight encoder output for `input`: `<stem>.<input ext>.part.<ext>` next to `dst`.
/// Keeps the real extension last so the encoder can infer the container from it. Inputs sharing
/// a stem still get distinct partial files.
pub fn partial_output_path(input: &Path, dst: &Path) -> PathBuf {
    let stem = dst
        .file_stem()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let middle = match input.extension() {
        Some(src_ext) => format!(
            "{}.{}",
            src_ext.to_string_lossy(),
            PipelineDefaults::PARTIAL_SUFFIX
        ),
        None => PipelineDefaults::PARTIAL_SUFFIX.to_string(),
    };
    match dst.extension() {
        Some(ext) => dst.with_file_name(format!("{stem}.{middle}.{}", ext.to_string_lossy())),
        None => dst.with_file_name(format!("{stem}.{middle}")),
    }
}

/// Create `path` and its parents.
pub fn ensure_dir(path: &Path) -> Result<(), MigrateError> {
    std::fs::create_dir_all(path)
        .map_err(|e| MigrateError::io(format!("create directory {}", path.display()), e))
}

/// A batch label must name exactly one directory under the roots.
pub fn validate_label(label: &str) -> Result<(), MigrateError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(MigrateError::invalid_config("batch label is empty"));
    }
    let mut components = Path::new(trimmed).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !trimmed.contains(['/', '\\']) => Ok(()),
        _ => Err(MigrateError::invalid_config(format!(
            "batch label must be a single directory name, got {trimmed:?}"
        ))),
    }
}

/// Physical cores, falling back to logical parallelism, then 1.
pub fn physical_cpu_workers() -> usize {
    let n = sysinfo::System::physical_core_count()
        .filter(|&n| n > 0)
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1);
    debug!("CPU workers from core count: {}", n);
    n
}
