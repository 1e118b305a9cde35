//! File descriptor limit detection for capping concurrent copies (Unix).

use log::debug;

use crate::utils::config::FDS_PER_COPY;

/// Fraction of the process FD limit to use (leave headroom for the encoder children and logging).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Max concurrent copies that stay under ~80% of the FD limit. `None` when there is no limit.
pub fn max_copies_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    Some((usable / FDS_PER_COPY).max(1))
}

/// Cap a requested I/O worker count by the FD limit.
pub fn cap_io_workers(requested: usize) -> usize {
    match max_copies_by_fd_limit() {
        Some(cap) if cap < requested => {
            debug!("Capping I/O workers {} -> {} (FD limit ~80%)", requested, cap);
            cap
        }
        _ => requested,
    }
}
