//! Bounded worker pools.
//!
//! Two pools behind one trait: [`IoPool`] for blocking remote I/O (scoped threads fed from a
//! crossbeam channel, sized well above the core count) and [`CpuPool`] for encoder jobs (a
//! dedicated rayon pool sized to the physical cores, where every job runs its own encoder process).
//!
//! Results stream back to the calling thread in completion order; `on_done` runs there, so it can
//! log and update progress without synchronising with the workers.

use crossbeam_channel::unbounded;
use log::debug;
use std::thread;

use crate::error::MigrateError;

pub trait WorkerPool {
    /// Upper bound on jobs running at once.
    fn workers(&self) -> usize;

    /// Run `work` over every job, at most [`Self::workers`] at a time. Blocks until all are done.
    /// `on_done` is called on the calling thread once per result, in completion order.
    /// Results are returned in completion order too.
    fn execute<T, R, F, C>(&self, jobs: Vec<T>, work: F, on_done: C) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        C: FnMut(&R);
}

/// Thread-per-worker pool for I/O-bound jobs.
#[derive(Clone, Debug)]
pub struct IoPool {
    workers: usize,
}

impl IoPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl WorkerPool for IoPool {
    fn workers(&self) -> usize {
        self.workers
    }

    fn execute<T, R, F, C>(&self, jobs: Vec<T>, work: F, mut on_done: C) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        C: FnMut(&R),
    {
        let job_count = jobs.len();
        if job_count == 0 {
            return Vec::new();
        }
        let (job_tx, job_rx) = unbounded::<T>();
        let (result_tx, result_rx) = unbounded::<R>();
        for job in jobs {
            // Receiver is alive in this scope; send cannot fail.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let spawned = self.workers.min(job_count);
        debug!("I/O pool: {} jobs on {} workers", job_count, spawned);
        let work = &work;
        thread::scope(|s| {
            for _ in 0..spawned {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move || {
                    while let Ok(job) = job_rx.recv() {
                        if result_tx.send(work(job)).is_err() {
                            break;
                        }
                    }
                });
            }
            // Dropping the last sender closes the channel once every worker exits.
            drop(result_tx);

            let mut results = Vec::with_capacity(job_count);
            while let Ok(r) = result_rx.recv() {
                on_done(&r);
                results.push(r);
            }
            results
        })
    }
}

/// Rayon-backed pool for CPU-bound jobs. Built once per run and reused across blocks.
pub struct CpuPool {
    pool: rayon::ThreadPool,
}

impl CpuPool {
    pub fn new(workers: usize) -> Result<Self, MigrateError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("{}-encode-{i}", env!("CARGO_PKG_NAME")))
            .build()?;
        Ok(Self { pool })
    }
}

impl WorkerPool for CpuPool {
    fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn execute<T, R, F, C>(&self, jobs: Vec<T>, work: F, mut on_done: C) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        C: FnMut(&R),
    {
        let job_count = jobs.len();
        if job_count == 0 {
            return Vec::new();
        }
        debug!("CPU pool: {} jobs on {} workers", job_count, self.workers());
        let (result_tx, result_rx) = unbounded::<R>();
        let work = &work;
        // in_place_scope runs this closure on the calling thread, so draining results here does
        // not occupy a pool worker.
        self.pool.in_place_scope(|s| {
            for job in jobs {
                let result_tx = result_tx.clone();
                s.spawn(move |_| {
                    let _ = result_tx.send(work(job));
                });
            }
            drop(result_tx);

            let mut results = Vec::with_capacity(job_count);
            while let Ok(r) = result_rx.recv() {
                on_done(&r);
                results.push(r);
            }
            results
        })
    }
}
