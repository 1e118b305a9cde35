//! Progress tracking: an atomic counter any worker may bump, and a reporter that only reads it.

use kdam::{Animation, Bar, BarExt};
use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Files resolved (success or logged failure) out of the discovered total.
/// Cloning shares the same count. Reset by building a new one per run.
#[derive(Clone, Debug)]
pub struct ProgressCounter {
    completed: Arc<AtomicUsize>,
    total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total,
        }
    }

    /// Count one more resolved file and return the new value. Saturates at `total`.
    pub fn increment(&self) -> usize {
        let total = self.total;
        match self
            .completed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < total).then_some(n + 1)
            }) {
            Ok(prev) => prev + 1,
            Err(at_cap) => at_cap,
        }
    }

    /// `(completed, total)`.
    pub fn snapshot(&self) -> (usize, usize) {
        (self.completed.load(Ordering::Acquire), self.total)
    }
}

/// Percentage with one decimal, 100.0 for an empty run.
pub fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (completed as f64 / total as f64 * 1000.0).round() / 10.0
}

/// True when a progress line is due for `completed`.
pub fn should_report(completed: usize, total: usize, interval: usize) -> bool {
    completed == total || (interval > 0 && completed > 0 && completed.is_multiple_of(interval))
}

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a progress bar for a known total
pub fn create_progress_bar(total: usize, desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic,
        unit = " files"
    )))
}

/// Update progress bar if available.
/// Uses try_lock to avoid blocking; a skipped update is caught up by the next one.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update_to(n);
    }
}

/// Reads a [`ProgressCounter`] and reports it: a log line every `interval` files (and at the end),
/// or a terminal bar when one is enabled.
pub struct ProgressReporter {
    counter: ProgressCounter,
    interval: usize,
    bar: Option<ProgressBar>,
    last_reported: AtomicUsize,
}

impl ProgressReporter {
    pub fn new(counter: ProgressCounter, interval: usize, with_bar: bool) -> Self {
        let (_, total) = counter.snapshot();
        let bar = (with_bar && total > 0).then(|| create_progress_bar(total, "Migrating"));
        Self {
            counter,
            interval,
            bar,
            last_reported: AtomicUsize::new(0),
        }
    }

    pub fn counter(&self) -> &ProgressCounter {
        &self.counter
    }

    /// Check the counter and emit if a report is due. Returns true if something was emitted.
    pub fn observe(&self) -> bool {
        let (completed, total) = self.counter.snapshot();
        if let Some(bar) = &self.bar {
            update_progress_bar(bar, completed);
            return true;
        }
        if !should_report(completed, total, self.interval) {
            return false;
        }
        // Never print the same count twice (several observers may see one value).
        if self.last_reported.swap(completed, Ordering::AcqRel) == completed {
            return false;
        }
        info!(
            "{}/{} processed ({}%)",
            completed,
            total,
            percent(completed, total)
        );
        true
    }

    /// Bump the counter and report.
    pub fn advance(&self) -> usize {
        let n = self.counter.increment();
        self.observe();
        n
    }

    /// Close out the bar so following log lines start on a fresh line.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar
            && let Ok(mut bar) = bar.lock()
        {
            let _ = bar.refresh();
            eprintln!();
        }
    }
}
