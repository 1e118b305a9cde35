//! Remote copy stage: whole-file copies on the I/O pool, failures isolated per file.

use log::{debug, warn};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::SourceFile;
use crate::engine::pool::WorkerPool;
use crate::engine::tools::{ensure_dir, partial_copy_path};
use crate::error::{FileError, FileOutcome, MigrateError};

/// What a copy call produced. `copied` holds destination paths, not source paths.
#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: Vec<PathBuf>,
    pub failures: Vec<FileError>,
}

/// Copy `src` to `dst` through a fixed buffer, replacing any existing `dst`.
///
/// Bytes go to `<dst>.part` first and are renamed into place once complete; on error the
/// partial file is removed and `dst` is left as it was.
pub fn copy_file(src: &Path, dst: &Path, buffer_size: usize) -> FileOutcome {
    let partial = partial_copy_path(dst);
    let to_err = |source: std::io::Error| FileError::Copy {
        path: src.to_path_buf(),
        source,
    };
    let result = write_partial(src, &partial, buffer_size)
        .and_then(|()| std::fs::rename(&partial, dst));
    match result {
        Ok(()) => Ok(dst.to_path_buf()),
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(to_err(e))
        }
    }
}

fn write_partial(src: &Path, partial: &Path, buffer_size: usize) -> std::io::Result<()> {
    let mut reader = File::open(src)?;
    let mut writer = File::create(partial)?;
    let mut buffer = vec![0u8; buffer_size.max(1)];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
    }
    writer.flush()
}

/// Copy every file in `files` into `dest_dir` on `pool`.
///
/// `dest_dir` (with parents) is created before the first copy; failing that is fatal. Each
/// per-file failure is logged and returned in the report without affecting other copies.
/// `on_done` runs once per file on the calling thread.
pub fn copy_remote_files<P, C>(
    pool: &P,
    files: &[SourceFile],
    dest_dir: &Path,
    buffer_size: usize,
    mut on_done: C,
) -> Result<CopyReport, MigrateError>
where
    P: WorkerPool,
    C: FnMut(&FileOutcome),
{
    ensure_dir(dest_dir)?;
    if files.is_empty() {
        return Ok(CopyReport::default());
    }

    let jobs: Vec<&SourceFile> = files.iter().collect();
    let results = pool.execute(
        jobs,
        |file| copy_file(&file.path, &dest_dir.join(file.file_name()), buffer_size),
        |outcome| {
            if let Err(e) = outcome {
                warn!("{}", e);
            }
            on_done(outcome)
        },
    );

    let mut report = CopyReport::default();
    for r in results {
        match r {
            Ok(dst) => report.copied.push(dst),
            Err(e) => report.failures.push(e),
        }
    }
    debug!(
        "Copied {}/{} into {}",
        report.copied.len(),
        files.len(),
        dest_dir.display()
    );
    Ok(report)
}
