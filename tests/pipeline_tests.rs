//! Pipeline tests: classifier, copy stage, reclaimer and whole-batch runs against a stand-in encoder.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use transmirror::engine::IoPool;
use transmirror::pipeline::{
    PipelineContext, classify_source, copy_file, copy_remote_files, reclaim_staged,
};
use transmirror::{
    FileError, FormatTag, MigrateError, MigrateOpts, RunSummary, SourceFile, Stage, migrate_batch,
};

fn write_bytes(path: &Path, len: usize) {
    let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
    fs::write(path, data).unwrap();
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(rd) => rd
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

fn source_file(path: PathBuf) -> SourceFile {
    let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(1);
    SourceFile {
        path,
        size,
        tag: FormatTag::PassThrough,
    }
}

// --- classifier ---

#[test]
fn test_classify_partitions_and_drops_empty() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path();
    write_bytes(&src.join("a.mp3"), 100);
    write_bytes(&src.join("b.MP3"), 200);
    write_bytes(&src.join("c.mp3"), 0);
    write_bytes(&src.join("d.wav"), 50);
    write_bytes(&src.join("e.GSM"), 50);
    write_bytes(&src.join("notes.txt"), 10);
    write_bytes(&src.join(".DS_Store"), 10);
    fs::create_dir(src.join("sub")).unwrap();
    write_bytes(&src.join("sub/nested.wav"), 10);

    let c = classify_source(src, &MigrateOpts::new(src, "/unused")).unwrap();
    let pass: Vec<_> = c.pass_through.iter().map(|f| f.path.clone()).collect();
    let conv: Vec<_> = c.convertible.iter().map(|f| f.path.clone()).collect();
    assert_eq!(pass, vec![src.join("a.mp3"), src.join("b.MP3")]);
    assert_eq!(conv, vec![src.join("d.wav"), src.join("e.GSM")]);
    assert_eq!(c.empty, 1);
    assert_eq!(c.ignored, 1);
    assert_eq!(c.total(), 4);
    assert!(c.pass_through.iter().all(|f| f.size > 0));
    assert!(c.convertible.iter().all(|f| f.tag == FormatTag::Convertible));
}

#[test]
fn test_classify_missing_dir() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope");
    let err = classify_source(&missing, &MigrateOpts::new(tmp.path(), "/unused")).unwrap_err();
    assert!(matches!(err, MigrateError::MissingSource { ref path } if path == &missing));
}

#[test]
fn test_classify_empty_dir() {
    let tmp = TempDir::new().unwrap();
    let c = classify_source(tmp.path(), &MigrateOpts::new(tmp.path(), "/unused")).unwrap();
    assert!(c.is_empty());
}

// --- copy stage ---

#[test]
fn test_copy_file_overwrites_existing() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("a.mp3");
    let dst = tmp.path().join("out.mp3");
    write_bytes(&src, 4096);
    fs::write(&dst, b"stale contents that are longer than nothing").unwrap();

    let out = copy_file(&src, &dst, 1000).unwrap();
    assert_eq!(out, dst);
    assert_eq!(fs::read(&src).unwrap(), fs::read(&dst).unwrap());
    assert!(!tmp.path().join("out.mp3.part").exists());
}

#[test]
fn test_copy_file_failure_leaves_no_partial() {
    let tmp = TempDir::new().unwrap();
    let dst = tmp.path().join("out.mp3");
    let err = copy_file(&tmp.path().join("missing.mp3"), &dst, 1024).unwrap_err();
    assert!(matches!(err, FileError::Copy { .. }));
    assert_eq!(err.stage(), Stage::Copy);
    assert!(!dst.exists());
    assert!(names_in(tmp.path()).is_empty());
}

#[test]
fn test_copy_remote_files_isolates_failures() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir(&src).unwrap();
    for name in ["1.mp3", "2.mp3", "3.mp3"] {
        write_bytes(&src.join(name), 300);
    }
    let mut files: Vec<SourceFile> = ["1.mp3", "2.mp3", "3.mp3"]
        .iter()
        .map(|n| source_file(src.join(n)))
        .collect();
    files.push(source_file(src.join("gone.mp3")));

    let dest = tmp.path().join("deep/nested/dest");
    let mut seen = 0;
    let report = copy_remote_files(&IoPool::new(2), &files, &dest, 64, |_| seen += 1).unwrap();

    assert_eq!(seen, 4);
    assert_eq!(report.copied.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path(), &src.join("gone.mp3"));
    assert!(report.copied.iter().all(|p| p.starts_with(&dest)));
    assert_eq!(names_in(&dest), vec!["1.mp3", "2.mp3", "3.mp3"]);
    assert_eq!(
        fs::read(src.join("2.mp3")).unwrap(),
        fs::read(dest.join("2.mp3")).unwrap()
    );
}

#[test]
fn test_copy_remote_files_creates_dest_even_when_empty() {
    let tmp = TempDir::new().unwrap();
    let dest = tmp.path().join("made");
    let report = copy_remote_files(&IoPool::new(2), &[], &dest, 64, |_| {}).unwrap();
    assert!(report.copied.is_empty());
    assert!(dest.is_dir());
}

// --- reclaimer ---

#[test]
fn test_reclaim_removes_all_and_tolerates_missing() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.wav");
    let b = tmp.path().join("b.wav");
    write_bytes(&a, 10);
    write_bytes(&b, 10);
    let failures = reclaim_staged(&[a, b, tmp.path().join("already-gone.wav")]);
    assert!(failures.is_empty());
    assert!(names_in(tmp.path()).is_empty());
}

#[test]
fn test_reclaim_reports_undeletable_entry() {
    let tmp = TempDir::new().unwrap();
    let dir_in_the_way = tmp.path().join("x.wav");
    fs::create_dir(&dir_in_the_way).unwrap();
    let ok = tmp.path().join("y.wav");
    write_bytes(&ok, 10);

    let failures = reclaim_staged(&[dir_in_the_way.clone(), ok.clone()]);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].stage(), Stage::Reclaim);
    assert_eq!(failures[0].path(), &dir_in_the_way);
    assert!(!ok.exists());
}

// --- whole batch ---

struct Layout {
    _tmp: TempDir,
    root: PathBuf,
}

impl Layout {
    fn new(label: &str) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        fs::create_dir_all(root.join("remote").join(label)).unwrap();
        Self { _tmp: tmp, root }
    }

    fn source(&self, label: &str) -> PathBuf {
        self.root.join("remote").join(label)
    }

    fn dest(&self, label: &str) -> PathBuf {
        self.root.join("local").join(label)
    }

    fn stage(&self) -> PathBuf {
        self.root.join("stage")
    }

    fn opts(&self, encoder: &Path) -> MigrateOpts {
        let mut o = MigrateOpts::new(self.root.join("remote"), self.root.join("local"));
        o.temp_dir = Some(self.stage());
        o.encoder.bin = encoder.to_path_buf();
        o.io_workers = 4;
        o.cpu_workers = Some(2);
        o
    }
}

#[test]
fn test_missing_source_aborts_without_side_effects() {
    let tmp = TempDir::new().unwrap();
    let opts = MigrateOpts::new(tmp.path().join("remote"), tmp.path().join("local"));
    let err = migrate_batch("09", &opts).unwrap_err();
    assert!(matches!(err, MigrateError::MissingSource { .. }));
    assert!(!tmp.path().join("local").exists());
}

#[test]
fn test_bad_label_rejected() {
    let tmp = TempDir::new().unwrap();
    let opts = MigrateOpts::new(tmp.path().join("remote"), tmp.path().join("local"));
    let err = migrate_batch("../etc", &opts).unwrap_err();
    assert!(matches!(err, MigrateError::InvalidConfig { .. }));
}

#[test]
fn test_missing_encoder_aborts_before_copying() {
    let layout = Layout::new("01");
    write_bytes(&layout.source("01").join("a.mp3"), 100);
    write_bytes(&layout.source("01").join("b.wav"), 100);
    let opts = layout.opts(Path::new("/definitely/not/an/encoder"));

    let err = migrate_batch("01", &opts).unwrap_err();
    assert!(matches!(err, MigrateError::EncoderNotFound { .. }));
    assert!(!layout.dest("01").exists());
}

#[test]
fn test_pass_through_only_needs_no_encoder() {
    let layout = Layout::new("02");
    write_bytes(&layout.source("02").join("a.mp3"), 100);
    write_bytes(&layout.source("02").join("b.mp3"), 200);
    let opts = layout.opts(Path::new("/definitely/not/an/encoder"));

    let summary = migrate_batch("02", &opts).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.copied, 2);
    assert_eq!(summary.converted, 0);
    assert_eq!(names_in(&layout.dest("02")), vec!["a.mp3", "b.mp3"]);
    assert!(!layout.stage().exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let layout = Layout::new("03");
    write_bytes(&layout.source("03").join("a.mp3"), 100);
    write_bytes(&layout.source("03").join("b.wav"), 100);
    let mut opts = layout.opts(Path::new("/definitely/not/an/encoder"));
    opts.dry_run = true;

    let summary = migrate_batch("03", &opts).unwrap();
    assert!(summary.dry_run);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 0);
    assert!(!layout.root.join("local").exists());
}

#[test]
fn test_empty_batch_is_not_an_error() {
    let layout = Layout::new("04");
    write_bytes(&layout.source("04").join("empty.mp3"), 0);
    let summary = migrate_batch("04", &layout.opts(Path::new("ffmpeg"))).unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.empty, 1);
}

#[cfg(unix)]
mod with_encoder {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::OnceLock;

    /// Stand-in for ffmpeg: copies `-i <in>` to the last argument, fails for inputs named `*bad*`,
    /// writes inputs named `*slow*` twice with a pause in between, and appends the number of
    /// staged files it can see to `<stage dir>.log`.
    const FAKE_ENCODER: &str = r#"#!/bin/sh
in=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    *) out="$1"; shift ;;
  esac
done
stage_dir=$(dirname "$in")
ls -1 "$stage_dir" | wc -l >> "$stage_dir.log"
case "$(basename "$in")" in
  *bad*) echo "simulated encoder failure" >&2; exit 1 ;;
  *slow*) cat "$in" > "$out"; sleep 0.3; cat "$in" >> "$out"; exit 0 ;;
esac
cp "$in" "$out"
"#;

    static ENCODER: OnceLock<(TempDir, PathBuf)> = OnceLock::new();

    /// Written once per test binary, before any test here spawns a process.
    fn fake_encoder() -> &'static Path {
        &ENCODER
            .get_or_init(|| {
                let dir = TempDir::new().unwrap();
                let path = dir.path().join("fake-ffmpeg");
                fs::write(&path, FAKE_ENCODER).unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
                (dir, path)
            })
            .1
    }

    fn staged_counts(stage: &Path) -> Vec<usize> {
        let log = stage.with_extension("log");
        fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(|l| l.trim().parse().unwrap())
            .collect()
    }

    #[test]
    fn test_mixed_batch_reaches_full_progress() {
        let encoder = fake_encoder();
        let layout = Layout::new("01");
        let src = layout.source("01");
        write_bytes(&src.join("a.mp3"), 100);
        write_bytes(&src.join("b.mp3"), 200);
        write_bytes(&src.join("c.mp3"), 0);
        write_bytes(&src.join("d.wav"), 300);
        write_bytes(&src.join("e.wav"), 400);

        let summary = migrate_batch("01", &layout.opts(encoder)).unwrap();

        assert_eq!(summary.total, 4);
        assert_eq!(summary.completed, 4);
        assert_eq!(summary.copied, 2);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.empty, 1);
        let dest = layout.dest("01");
        assert_eq!(names_in(&dest), vec!["a.mp3", "b.mp3", "d.mp3", "e.mp3"]);
        assert_eq!(fs::read(src.join("b.mp3")).unwrap(), fs::read(dest.join("b.mp3")).unwrap());
        assert_eq!(fs::read(src.join("e.wav")).unwrap(), fs::read(dest.join("e.mp3")).unwrap());
        assert!(names_in(&layout.stage()).is_empty());
    }

    #[test]
    fn test_encoder_failure_is_isolated_and_reclaimed() {
        let encoder = fake_encoder();
        let layout = Layout::new("02");
        let src = layout.source("02");
        for name in ["a.wav", "bad.wav", "c.wav"] {
            write_bytes(&src.join(name), 100);
        }
        let mut opts = layout.opts(encoder);
        opts.block_size = 2;

        let summary = migrate_batch("02", &opts).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed(), 1);
        let failure = &summary.failures[0];
        assert_eq!(failure.stage, Stage::Convert);
        assert!(failure.path.ends_with("bad.wav"));
        assert!(failure.message.contains("simulated encoder failure"));
        assert_eq!(names_in(&layout.dest("02")), vec!["a.mp3", "c.mp3"]);
        assert!(names_in(&layout.stage()).is_empty());
        assert_eq!(summary.blocks.len(), 2);
        assert_eq!(summary.blocks[0].staged, 2);
    }

    #[test]
    fn test_staging_never_exceeds_block_size() {
        let encoder = fake_encoder();
        let layout = Layout::new("03");
        let src = layout.source("03");
        for i in 0..7 {
            write_bytes(&src.join(format!("{i:02}.wav")), 64);
        }
        let mut opts = layout.opts(encoder);
        opts.block_size = 3;

        let summary = migrate_batch("03", &opts).unwrap();

        assert_eq!(summary.converted, 7);
        assert_eq!(summary.blocks.len(), 3);
        let counts = staged_counts(&layout.stage());
        assert_eq!(counts.len(), 7);
        assert!(counts.iter().all(|&n| n >= 1 && n <= 3), "{counts:?}");
        assert!(names_in(&layout.stage()).is_empty());
    }

    #[test]
    fn test_rerun_overwrites_without_accumulating() {
        let encoder = fake_encoder();
        let layout = Layout::new("04");
        let src = layout.source("04");
        write_bytes(&src.join("a.mp3"), 100);
        write_bytes(&src.join("b.gsm"), 100);
        let opts = layout.opts(encoder);

        migrate_batch("04", &opts).unwrap();
        let first = names_in(&layout.dest("04"));
        write_bytes(&src.join("a.mp3"), 150);
        let summary = migrate_batch("04", &opts).unwrap();

        assert_eq!(summary.completed, 2);
        assert_eq!(names_in(&layout.dest("04")), first);
        assert_eq!(fs::read(layout.dest("04").join("a.mp3")).unwrap().len(), 150);
    }

    #[test]
    fn test_same_stem_inputs_never_share_an_output() {
        let encoder = fake_encoder();
        let layout = Layout::new("05");
        let src = layout.source("05");
        write_bytes(&src.join("ok.wav"), 64);
        write_bytes(&src.join("slow.gsm"), 100);
        write_bytes(&src.join("slow.wav"), 300);
        let mut opts = layout.opts(encoder);
        opts.cpu_workers = Some(2);

        let summary = migrate_batch("05", &opts).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed(), 1);
        let failure = &summary.failures[0];
        assert_eq!(failure.stage, Stage::Convert);
        assert!(failure.path.ends_with("slow.wav"));
        assert!(failure.message.contains("slow.gsm"));

        let dest = layout.dest("05");
        assert_eq!(names_in(&dest), vec!["ok.mp3", "slow.mp3"]);
        let gsm = fs::read(src.join("slow.gsm")).unwrap();
        assert_eq!(fs::read(dest.join("slow.mp3")).unwrap(), [gsm.clone(), gsm].concat());
        assert_eq!(staged_counts(&layout.stage()).len(), 2);
        assert!(names_in(&layout.stage()).is_empty());
    }

    #[test]
    fn test_collision_detected_across_blocks() {
        let encoder = fake_encoder();
        let layout = Layout::new("07");
        let src = layout.source("07");
        write_bytes(&src.join("a.gsm"), 10);
        write_bytes(&src.join("a.wav"), 20);
        let mut opts = layout.opts(encoder);
        opts.block_size = 1;

        let summary = migrate_batch("07", &opts).unwrap();

        assert_eq!(summary.completed, 2);
        assert_eq!(summary.converted, 1);
        assert_eq!(summary.blocks[1].failed, 1);
        assert_eq!(summary.blocks[1].staged, 0);
        assert_eq!(
            fs::read(layout.dest("07").join("a.mp3")).unwrap(),
            fs::read(src.join("a.gsm")).unwrap()
        );
    }

    #[test]
    fn test_staging_failure_resolves_file_without_transcoding() {
        let encoder = fake_encoder();
        let layout = Layout::new("06");
        let src = layout.source("06");
        write_bytes(&src.join("ok.wav"), 128);
        let files = vec![
            SourceFile {
                path: src.join("gone.wav"),
                size: 64,
                tag: FormatTag::Convertible,
            },
            SourceFile {
                path: src.join("ok.wav"),
                size: 128,
                tag: FormatTag::Convertible,
            },
        ];
        let opts = layout.opts(encoder);
        let dest = layout.dest("06");
        let ctx = PipelineContext::new(&opts, dest.clone(), files.len(), true).unwrap();
        let mut summary = RunSummary::new("06", &src, &dest);

        ctx.run_convertible(&files, &mut summary).unwrap();

        assert_eq!(ctx.reporter.counter().snapshot(), (2, 2));
        assert_eq!(summary.converted, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].stage, Stage::Copy);
        assert!(summary.failures[0].path.ends_with("gone.wav"));
        assert_eq!(names_in(&dest), vec!["ok.mp3"]);
        // Only the staged file reached the encoder.
        assert_eq!(staged_counts(&layout.stage()), vec![1]);
        assert!(names_in(&layout.stage()).is_empty());
    }
}
