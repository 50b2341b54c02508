//! Worker-pool execution of a task region.
//!
//! Lanes travel through a crossbeam job queue shared by a scoped pool
//! of workers. A worker takes a lane, runs one dependency sweep, and
//! either reports the lane done, re-queues it (something reported
//! incomplete), or aborts the region (a task faulted). Re-queueing
//! rather than spinning keeps a waiting lane from pinning a worker, so
//! a pool smaller than the lane count still makes progress.
//!
//! A lane that keeps reporting incomplete is bounded by
//! [`ExecOptions::max_attempts`]; exhausting the budget is a stall and
//! aborts the region like a fault would.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::ExecError;
use crate::graph::{TaskList, TaskRegion, Work};

/// Execution knobs for a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecOptions {
    /// Worker threads; `None` uses the machine's available parallelism.
    /// Never more workers than lanes.
    pub workers: Option<usize>,
    /// Sweep attempts a single lane may consume before the region is
    /// declared stalled.
    pub max_attempts: u64,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            workers: None,
            max_attempts: 100_000,
        }
    }
}

impl ExecOptions {
    /// The worker count actually used for `lanes` lanes.
    pub fn resolved_worker_count(&self, lanes: usize) -> usize {
        let hw = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        self.workers.unwrap_or(hw).clamp(1, lanes.max(1))
    }
}

/// Counters from one region execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionMetrics {
    /// Lanes in the region.
    pub lanes: usize,
    /// Total sweep attempts across all lanes (equals `lanes` when
    /// nothing reported incomplete).
    pub attempts: u64,
    /// Total task executions, retries included.
    pub tasks_run: u64,
}

struct LaneJob<W, C> {
    index: usize,
    list: TaskList<W>,
    ctx: C,
    attempts: u64,
    tasks_run: u64,
}

enum Msg<W, C> {
    Job(LaneJob<W, C>),
    Shutdown,
}

struct LaneDone {
    attempts: u64,
    tasks_run: u64,
    outcome: Result<(), ExecError>,
}

impl<W> TaskRegion<W> {
    /// Drive every lane to completion, pairing lane `n` with `ctxs[n]`.
    ///
    /// Returns once every task in every lane completed, or with the
    /// first failure after the remaining lanes have been abandoned. The
    /// caller sequences regions; returning `Ok` is the barrier.
    ///
    /// # Errors
    ///
    /// [`ExecError::TaskFailed`] for the first fault observed,
    /// [`ExecError::Stalled`] if a lane exhausts its attempt budget,
    /// [`ExecError::LaneCountMismatch`] if `ctxs` is the wrong length.
    pub fn execute<C>(self, opts: &ExecOptions, ctxs: Vec<C>) -> Result<RegionMetrics, ExecError>
    where
        W: Work<C>,
        C: Send,
    {
        let lanes = self.into_lanes();
        if lanes.len() != ctxs.len() {
            return Err(ExecError::LaneCountMismatch {
                lanes: lanes.len(),
                ctxs: ctxs.len(),
            });
        }
        let nlanes = lanes.len();
        if nlanes == 0 {
            return Ok(RegionMetrics::default());
        }

        let workers = opts.resolved_worker_count(nlanes);
        let max_attempts = opts.max_attempts;
        let abort = AtomicBool::new(false);
        let (job_tx, job_rx) = unbounded::<Msg<W, C>>();
        let (done_tx, done_rx) = unbounded::<LaneDone>();

        for (index, (list, ctx)) in lanes.into_iter().zip(ctxs).enumerate() {
            let _ = job_tx.send(Msg::Job(LaneJob {
                index,
                list,
                ctx,
                attempts: 0,
                tasks_run: 0,
            }));
        }

        let mut metrics = RegionMetrics {
            lanes: nlanes,
            ..RegionMetrics::default()
        };
        let mut failed: Option<ExecError> = None;
        let mut stalled: Option<ExecError> = None;
        let mut aborted: Option<ExecError> = None;

        thread::scope(|s| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let job_tx = job_tx.clone();
                let done_tx = done_tx.clone();
                let abort = &abort;
                s.spawn(move || worker_loop(job_rx, job_tx, done_tx, abort, max_attempts));
            }

            // One completion report per lane, whatever its outcome.
            for _ in 0..nlanes {
                let Ok(done) = done_rx.recv() else { break };
                metrics.attempts += done.attempts;
                metrics.tasks_run += done.tasks_run;
                match done.outcome {
                    Ok(()) => {}
                    Err(e @ ExecError::TaskFailed { .. }) => {
                        failed.get_or_insert(e);
                    }
                    Err(e @ ExecError::Stalled { .. }) => {
                        stalled.get_or_insert(e);
                    }
                    Err(e) => {
                        aborted.get_or_insert(e);
                    }
                }
            }
            for _ in 0..workers {
                let _ = job_tx.send(Msg::Shutdown);
            }
        });

        match failed.or(stalled).or(aborted) {
            Some(e) => Err(e),
            None => Ok(metrics),
        }
    }
}

fn worker_loop<W, C>(
    job_rx: Receiver<Msg<W, C>>,
    job_tx: Sender<Msg<W, C>>,
    done_tx: Sender<LaneDone>,
    abort: &AtomicBool,
    max_attempts: u64,
) where
    W: Work<C>,
{
    while let Ok(msg) = job_rx.recv() {
        let mut job = match msg {
            Msg::Job(job) => job,
            Msg::Shutdown => break,
        };
        job.attempts += 1;
        match job.list.advance(&mut job.ctx) {
            Err(e) => {
                abort.store(true, Ordering::Relaxed);
                let _ = done_tx.send(LaneDone {
                    attempts: job.attempts,
                    tasks_run: job.tasks_run,
                    outcome: Err(ExecError::TaskFailed {
                        lane: job.index,
                        task: e.task,
                        label: e.label,
                        fault: e.fault,
                    }),
                });
            }
            Ok(ran) => {
                job.tasks_run += ran as u64;
                if job.list.is_complete() {
                    let _ = done_tx.send(LaneDone {
                        attempts: job.attempts,
                        tasks_run: job.tasks_run,
                        outcome: Ok(()),
                    });
                } else if abort.load(Ordering::Relaxed) {
                    let _ = done_tx.send(LaneDone {
                        attempts: job.attempts,
                        tasks_run: job.tasks_run,
                        outcome: Err(ExecError::Aborted { lane: job.index }),
                    });
                } else if job.attempts >= max_attempts {
                    abort.store(true, Ordering::Relaxed);
                    let _ = done_tx.send(LaneDone {
                        attempts: job.attempts,
                        tasks_run: job.tasks_run,
                        outcome: Err(ExecError::Stalled {
                            lane: job.index,
                            attempts: job.attempts,
                        }),
                    });
                } else {
                    // Hand the lane back instead of spinning on it.
                    thread::yield_now();
                    let _ = job_tx.send(Msg::Job(job));
                }
            }
        }
    }
}
