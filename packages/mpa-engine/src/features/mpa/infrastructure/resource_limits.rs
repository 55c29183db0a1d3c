/*
 * Resource Limits
 *
 * A background thread that watches the wall-clock and process CPU time of
 * the current partition run and raises a temporary interrupt on the
 * worker's ShutdownNotifier once a limit is exceeded.
 *
 * At most one checker is active: the controller cancels the previous one
 * before starting the next. Cancelling joins the thread.
 */

use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{MpaError, Result};
use crate::features::mpa::ports::PartitionBudgeting;
use crate::shared::interrupt::ShutdownNotifier;

/// CPU time consumed by this process so far
#[cfg(unix)]
pub fn process_cpu_time() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: clock_gettime() only writes into `ts`, which we own, and
    // CLOCK_PROCESS_CPUTIME_ID is a valid clock on every supported unix.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_PROCESS_CPUTIME_ID, &mut ts) };
    if rc != 0 {
        return None;
    }
    Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

#[cfg(not(unix))]
pub fn process_cpu_time() -> Option<Duration> {
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLimit {
    WallTime { start: Instant, limit: Duration },
    ProcessCpuTime { start: Duration, limit: Duration },
}

impl ResourceLimit {
    pub fn wall_time_from_now_on(limit: Duration) -> Self {
        ResourceLimit::WallTime {
            start: Instant::now(),
            limit,
        }
    }

    /// # Errors
    /// `MpaError::ResourceLimit` if the platform cannot measure process CPU time.
    pub fn cpu_time_from_now_on(limit: Duration) -> Result<Self> {
        let start = process_cpu_time().ok_or_else(|| {
            MpaError::ResourceLimit("process CPU time is not available on this platform".into())
        })?;
        Ok(ResourceLimit::ProcessCpuTime { start, limit })
    }

    /// Limits for the first batch of a partitioning of `size` properties
    pub fn for_partition(budgeting: &dyn PartitionBudgeting, size: usize) -> Result<Vec<Self>> {
        let mut limits = Vec::new();
        if let Some(cpu) = budgeting.cpu_time_limit(size) {
            limits.push(Self::cpu_time_from_now_on(cpu)?);
        }
        if let Some(wall) = budgeting.wall_time_limit(size) {
            limits.push(Self::wall_time_from_now_on(wall));
        }
        Ok(limits)
    }

    pub fn used(&self) -> Duration {
        match self {
            ResourceLimit::WallTime { start, .. } => start.elapsed(),
            ResourceLimit::ProcessCpuTime { start, .. } => process_cpu_time()
                .map(|now| now.saturating_sub(*start))
                .unwrap_or_default(),
        }
    }

    pub fn limit(&self) -> Duration {
        match self {
            ResourceLimit::WallTime { limit, .. } | ResourceLimit::ProcessCpuTime { limit, .. } => {
                *limit
            }
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.used() >= self.limit()
    }
}

impl fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceLimit::WallTime { limit, .. } => write!(f, "wall time limit of {:?}", limit),
            ResourceLimit::ProcessCpuTime { limit, .. } => {
                write!(f, "CPU time limit of {:?}", limit)
            }
        }
    }
}

#[derive(Debug)]
pub struct ResourceLimitChecker {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ResourceLimitChecker {
    /// Checker that watches nothing
    pub fn inactive() -> Self {
        Self {
            stop: None,
            thread: None,
        }
    }

    /// Start watching `limits`, polling every `interval`
    ///
    /// # Errors
    /// `MpaError::ResourceLimit` if the watcher thread cannot be spawned.
    pub fn start(
        limits: Vec<ResourceLimit>,
        notifier: ShutdownNotifier,
        interval: Duration,
    ) -> Result<Self> {
        if limits.is_empty() {
            return Ok(Self::inactive());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let thread = thread::Builder::new()
            .name("mpa-resource-limits".to_string())
            .spawn(move || watch(stop_rx, limits, notifier, interval))
            .map_err(|e| MpaError::ResourceLimit(format!("failed to start checker: {}", e)))?;

        Ok(Self {
            stop: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Stop watching and wait for the thread to exit
    pub fn cancel(&mut self) {
        // dropping the sender disconnects the channel
        self.stop.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("resource limit checker panicked");
            }
        }
    }
}

impl Drop for ResourceLimitChecker {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn watch(
    stop: mpsc::Receiver<()>,
    limits: Vec<ResourceLimit>,
    notifier: ShutdownNotifier,
    interval: Duration,
) {
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if let Some(limit) = limits.iter().find(|l| l.is_exceeded()) {
                    warn!(used = ?limit.used(), "{} exceeded", limit);
                    notifier.request_temporary(limit.to_string());
                    return;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                debug!("resource limit checker cancelled");
                return;
            }
        }
    }
}
