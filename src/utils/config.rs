//! Application configuration constants.
//! Defaults and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!("{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// CLI config file looked up in the working directory when `--config` is not given.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Pipeline ----

/// Block, pool and progress defaults for the copy/convert pipeline.
pub struct PipelineDefaults;

impl PipelineDefaults {
    /// Files per block. Bounds how many staged files can sit in the temp dir at once.
    pub const BLOCK_SIZE: usize = 500;
    /// Concurrent remote copies. Oversubscribed on purpose: copy workers mostly wait on the network.
    pub const IO_WORKERS: usize = 10;
    /// Emit a progress line every this many resolved files.
    pub const PROGRESS_INTERVAL: usize = 10;
    /// Read/write buffer per copy (bytes). 8 MiB.
    pub const COPY_BUFFER_SIZE: usize = 8 * 1024 * 1024;
    /// Name of the staging directory under the destination root.
    pub const TEMP_DIR_NAME: &'static str = "temp";
    /// Suffix for in-flight copies; renamed away on success.
    pub const PARTIAL_SUFFIX: &'static str = "part";
}

// ---- Formats ----

/// Extension sets used by the source classifier.
pub struct FormatDefaults;

impl FormatDefaults {
    /// Container every output ends up in.
    pub const TARGET_EXTENSION: &'static str = "mp3";
    /// Already in the target format: copied verbatim.
    pub const PASS_THROUGH: &'static [&'static str] = &["mp3"];
    /// Legacy/raw formats that need the encoder.
    pub const CONVERTIBLE: &'static [&'static str] = &["wav", "gsm"];
}

// ---- Encoder ----

/// Fixed encoder invocation.
pub struct EncoderDefaults;

impl EncoderDefaults {
    pub const BIN: &'static str = "ffmpeg";
    pub const CODEC: &'static str = "libmp3lame";
    pub const BITRATE: &'static str = "64k";
    pub const LOG_LEVEL: &'static str = "error";
}

// ---- File descriptors ----

/// Descriptors held open by one copy worker (source + destination).
pub const FDS_PER_COPY: usize = 2;
