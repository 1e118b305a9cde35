//! Block scheduler: fixed-size blocks, strictly one after another.
//!
//! Convertible blocks go stage → convert → reclaim before the next block starts staging, which is
//! what keeps the temp directory at no more than one block of files. Pass-through files skip
//! staging and are copied straight to the destination; blocking there only paces progress output.

use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::engine::progress::percent;
use crate::engine::tools::output_path_for;
use crate::error::{FileError, MigrateError};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::copy::copy_remote_files;
use crate::pipeline::reclaim::reclaim_staged;
use crate::{BlockSummary, FailureRecord, FormatTag, RunSummary, SourceFile};

/// Contiguous blocks of at most `block_size` files.
pub fn blocks(files: &[SourceFile], block_size: usize) -> std::slice::Chunks<'_, SourceFile> {
    files.chunks(block_size.max(1))
}

/// Number of blocks `len` files split into.
pub fn block_count(len: usize, block_size: usize) -> usize {
    len.div_ceil(block_size.max(1))
}

/// Output path to the source that first claimed it, across the whole convertible phase.
type OutputClaims = HashMap<PathBuf, PathBuf>;

/// Split `block` into files that own their output path and files whose output is already
/// claimed by an earlier convertible file. Same-stem inputs never reach the encoder together.
fn claim_outputs(
    block: &[SourceFile],
    claims: &mut OutputClaims,
    dest_dir: &Path,
    target_extension: &str,
) -> (Vec<SourceFile>, Vec<FileError>) {
    let mut accepted = Vec::with_capacity(block.len());
    let mut collisions = Vec::new();
    for file in block {
        let output = output_path_for(&file.path, dest_dir, target_extension);
        match claims.get(&output) {
            Some(first) => collisions.push(FileError::OutputCollision {
                path: file.path.clone(),
                output,
                claimed_by: first.clone(),
            }),
            None => {
                claims.insert(output, file.path.clone());
                accepted.push(file.clone());
            }
        }
    }
    (accepted, collisions)
}

fn record_failures(summary: &mut RunSummary, failures: &[FileError]) {
    summary
        .failures
        .extend(failures.iter().map(FailureRecord::from));
}

impl PipelineContext<'_> {
    /// Copy pass-through files directly into the destination.
    pub fn run_pass_through(
        &self,
        files: &[SourceFile],
        summary: &mut RunSummary,
    ) -> Result<(), MigrateError> {
        if files.is_empty() {
            return Ok(());
        }
        info!("Copying {} pass-through files...", files.len());
        for (i, block) in blocks(files, self.opts.block_size).enumerate() {
            let report = copy_remote_files(
                &self.io_pool,
                block,
                &self.dest_dir,
                self.opts.copy_buffer_size,
                |_| {
                    self.reporter.advance();
                },
            )?;
            summary.copied += report.copied.len();
            record_failures(summary, &report.failures);
            summary.blocks.push(BlockSummary {
                index: i + 1,
                tag: Some(FormatTag::PassThrough),
                files: block.len(),
                staged: 0,
                succeeded: report.copied.len(),
                failed: report.failures.len(),
                reclaim_failures: 0,
            });
        }
        info!("Pass-through copied: {}/{}", summary.copied, files.len());
        Ok(())
    }

    /// Stage, convert and reclaim convertible files block by block.
    pub fn run_convertible(
        &self,
        files: &[SourceFile],
        summary: &mut RunSummary,
    ) -> Result<(), MigrateError> {
        if files.is_empty() {
            return Ok(());
        }
        let count = block_count(files.len(), self.opts.block_size);
        info!("Converting {} files in {} blocks", files.len(), count);
        let mut claims = OutputClaims::new();
        for (i, block) in blocks(files, self.opts.block_size).enumerate() {
            let block_summary =
                self.run_convertible_block(i + 1, count, block, &mut claims, summary)?;
            summary.blocks.push(block_summary);
        }
        Ok(())
    }

    fn run_convertible_block(
        &self,
        index: usize,
        count: usize,
        block: &[SourceFile],
        claims: &mut OutputClaims,
        summary: &mut RunSummary,
    ) -> Result<BlockSummary, MigrateError> {
        let (Some(pool), Some(transcoder)) = (self.cpu_pool.as_ref(), self.transcoder.as_ref())
        else {
            return Err(MigrateError::invalid_config(
                "convertible files present but no encoder was set up",
            ));
        };
        info!("Block {}/{} -> {} files", index, count, block.len());

        // Collisions are resolved here and never staged.
        let (accepted, collisions) =
            claim_outputs(block, claims, &self.dest_dir, &transcoder.target_extension);
        for e in &collisions {
            warn!("{}", e);
            self.reporter.advance();
        }
        record_failures(summary, &collisions);

        // Staging failures are terminal for that file, so they count as resolved now.
        let staging = copy_remote_files(
            &self.io_pool,
            &accepted,
            &self.temp_dir,
            self.opts.copy_buffer_size,
            |outcome| {
                if outcome.is_err() {
                    self.reporter.advance();
                }
            },
        )?;
        record_failures(summary, &staging.failures);

        let converted = transcoder.convert_all(pool, &staging.copied, &self.dest_dir, |_| {
            self.reporter.advance();
        });
        // Reclamation depends only on what was staged, and runs even if the convert stage bailed.
        let reclaim_failures = reclaim_staged(&staging.copied);
        record_failures(summary, &reclaim_failures);
        let converted = converted?;

        summary.converted += converted.converted.len();
        record_failures(summary, &converted.failures);

        let (done, total) = self.reporter.counter().snapshot();
        info!(
            "Block {}/{} complete: {} converted, {} failed. Total: {}/{} ({}%)",
            index,
            count,
            converted.converted.len(),
            collisions.len() + staging.failures.len() + converted.failures.len(),
            done,
            total,
            percent(done, total)
        );

        Ok(BlockSummary {
            index,
            tag: Some(FormatTag::Convertible),
            files: block.len(),
            staged: staging.copied.len(),
            succeeded: converted.converted.len(),
            failed: collisions.len() + staging.failures.len() + converted.failures.len(),
            reclaim_failures: reclaim_failures.len(),
        })
    }
}
