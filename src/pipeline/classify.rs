//! Source classifier: one pass over a remote directory, no recursion.

use log::{debug, warn};
use std::path::Path;
use walkdir::WalkDir;

use crate::engine::tools::{extension_in, extension_lower, is_os_hidden_file};
use crate::error::MigrateError;
use crate::{Classified, FormatTag, MigrateOpts, SourceFile};

/// Tag a path by extension.
pub fn format_tag(path: &Path, opts: &MigrateOpts) -> FormatTag {
    match extension_lower(path) {
        Some(ext) if extension_in(&ext, &opts.pass_through_extensions) => FormatTag::PassThrough,
        Some(ext) if extension_in(&ext, &opts.convertible_extensions) => FormatTag::Convertible,
        _ => FormatTag::Ignored,
    }
}

/// List `dir` and split its non-empty regular files into pass-through and convertible sets.
///
/// Fails with [`MigrateError::MissingSource`] when `dir` does not exist. Entries that cannot be
/// stat'ed are skipped with a warning.
pub fn classify_source(dir: &Path, opts: &MigrateOpts) -> Result<Classified, MigrateError> {
    if !dir.is_dir() {
        return Err(MigrateError::MissingSource {
            path: dir.to_path_buf(),
        });
    }

    let mut out = Classified::default();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                if err.depth() == 0 {
                    return Err(MigrateError::io(
                        format!("list {}", dir.display()),
                        err.into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                    ));
                }
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() || is_os_hidden_file(entry.path()) {
            continue;
        }
        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(err) => {
                warn!("Skipping {}: {}", entry.path().display(), err);
                continue;
            }
        };
        if size == 0 {
            out.empty += 1;
            continue;
        }
        let tag = format_tag(entry.path(), opts);
        let file = SourceFile {
            path: entry.into_path(),
            size,
            tag,
        };
        match tag {
            FormatTag::PassThrough => out.pass_through.push(file),
            FormatTag::Convertible => out.convertible.push(file),
            FormatTag::Ignored => out.ignored += 1,
        }
    }

    debug!(
        "Classified {}: {} pass-through, {} convertible, {} ignored, {} empty",
        dir.display(),
        out.pass_through.len(),
        out.convertible.len(),
        out.ignored,
        out.empty
    );
    Ok(out)
}
