//! Load `transmirror.toml` (CLI only). The library takes a fully built [`MigrateOpts`] instead.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::MigrateOpts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: SettingsSection,
}

/// `[settings]` table. Every key is optional; absent keys keep the default.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsSection {
    pub source_root: Option<PathBuf>,
    pub dest_root: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub encoder: Option<PathBuf>,
    pub codec: Option<String>,
    pub bitrate: Option<String>,
    pub target_extension: Option<String>,
    pub pass_through_extensions: Option<Vec<String>>,
    pub convertible_extensions: Option<Vec<String>>,
    pub io_workers: Option<usize>,
    pub cpu_workers: Option<usize>,
    pub block_size: Option<usize>,
    pub progress_interval: Option<usize>,
    pub copy_buffer_size: Option<usize>,
    pub progress_bar: Option<bool>,
}

/// Load the config at `explicit`, or `transmirror.toml` in `cwd` if present.
/// Returns None if the file is missing, unreadable or malformed (the latter two are warned about).
pub fn load_config_file(explicit: Option<&Path>, cwd: &Path) -> Option<ConfigFile> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = cwd.join(PackagePaths::get().config_filename());
            if !p.is_file() {
                return None;
            }
            p
        }
    };
    let s = std::fs::read_to_string(&path)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()?;
    log::debug!("Loaded config from {}", path.display());
    parse_config(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_config(s: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $field:ident) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$field = v;
        }
    };
    ($section:expr, $opts:expr, $field:ident => $($target:ident).+) => {
        if let Some(v) = $section.$field.clone() {
            $opts.$($target).+ = v;
        }
    };
}

/// Apply file settings to opts (only fields present in the file). Call before applying CLI flags.
/// Roots are handled by the caller since they seed [`MigrateOpts::new`].
pub fn apply_file_to_opts(file: &ConfigFile, opts: &mut MigrateOpts) {
    let s = &file.settings;
    if let Some(ref p) = s.temp_dir {
        opts.temp_dir = Some(p.clone());
    }
    if let Some(n) = s.cpu_workers {
        opts.cpu_workers = Some(n);
    }
    apply_file_opt!(s, opts, encoder => encoder.bin);
    apply_file_opt!(s, opts, codec => encoder.codec);
    apply_file_opt!(s, opts, bitrate => encoder.bitrate);
    apply_file_opt!(s, opts, target_extension);
    apply_file_opt!(s, opts, pass_through_extensions);
    apply_file_opt!(s, opts, convertible_extensions);
    apply_file_opt!(s, opts, io_workers);
    apply_file_opt!(s, opts, block_size);
    apply_file_opt!(s, opts, progress_interval);
    apply_file_opt!(s, opts, copy_buffer_size);
    apply_file_opt!(s, opts, progress_bar);
}
