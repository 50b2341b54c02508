//! Task lists, regions, and collections.

use std::ops::BitOr;

use spate_core::TaskFault;

use crate::error::GraphError;

/// Outcome of one task execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task finished; dependents become eligible.
    Complete,
    /// The task is waiting on something external; run it again later.
    /// Dependents stay blocked.
    Incomplete,
}

/// List-local task handle.
///
/// Valid only within the list that issued it. Handles compose with `|`
/// into dependency sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u8);

impl TaskId {
    /// Position of the task in its list.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn bit(self) -> u64 {
        1 << self.0
    }
}

/// Set of intra-list dependencies as a bitmask over task handles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepSet(u64);

impl DepSet {
    /// The empty set: a root task.
    pub const NONE: DepSet = DepSet(0);

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn is_subset_of(self, done: u64) -> bool {
        self.0 & !done == 0
    }

    fn highest_bit(self) -> Option<u32> {
        (self.0 != 0).then(|| 63 - self.0.leading_zeros())
    }
}

impl From<TaskId> for DepSet {
    fn from(id: TaskId) -> Self {
        DepSet(id.bit())
    }
}

impl BitOr for TaskId {
    type Output = DepSet;
    fn bitor(self, rhs: TaskId) -> DepSet {
        DepSet(self.bit() | rhs.bit())
    }
}

impl BitOr<TaskId> for DepSet {
    type Output = DepSet;
    fn bitor(self, rhs: TaskId) -> DepSet {
        DepSet(self.0 | rhs.bit())
    }
}

impl BitOr for DepSet {
    type Output = DepSet;
    fn bitor(self, rhs: DepSet) -> DepSet {
        DepSet(self.0 | rhs.0)
    }
}

/// A unit of work dispatched against a lane context.
///
/// Implementors are data-only tagged unions; `run` matches on the
/// variant exhaustively. No closures: the full set of task kinds is
/// visible in one `enum`.
pub trait Work<C>: Send {
    /// Stable name for diagnostics and metrics.
    fn label(&self) -> &'static str;

    /// Execute against the lane context.
    ///
    /// # Errors
    ///
    /// A returned fault is final: the executor never retries it and
    /// aborts the region.
    fn run(&self, ctx: &mut C) -> Result<TaskStatus, TaskFault>;
}

/// One scheduled task: its work item plus intra-list dependencies.
#[derive(Clone, Debug)]
struct Task<W> {
    work: W,
    deps: DepSet,
    done: bool,
}

/// A task failure observed during a sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepError {
    /// The failed task.
    pub task: TaskId,
    /// Its label.
    pub label: &'static str,
    /// The fault it returned.
    pub fault: TaskFault,
}

/// An ordered list of tasks with intra-list dependencies: one lane of a
/// region.
///
/// At most 64 tasks per list (the bitmask width); the stage graphs
/// built by the driver use about a dozen.
#[derive(Clone, Debug, Default)]
pub struct TaskList<W> {
    tasks: Vec<Task<W>>,
    done_mask: u64,
}

impl<W> TaskList<W> {
    /// An empty list.
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            done_mask: 0,
        }
    }

    /// Append a task depending on `deps`.
    ///
    /// # Errors
    ///
    /// `ListFull` past 64 tasks; `UnknownDependency` if `deps` names a
    /// handle this list never issued.
    pub fn add(&mut self, deps: impl Into<DepSet>, work: W) -> Result<TaskId, GraphError> {
        let deps = deps.into();
        if self.tasks.len() >= 64 {
            return Err(GraphError::ListFull);
        }
        if let Some(bit) = deps.highest_bit() {
            if bit as usize >= self.tasks.len() {
                return Err(GraphError::UnknownDependency {
                    dep: TaskId(bit as u8),
                });
            }
        }
        let id = TaskId(self.tasks.len() as u8);
        self.tasks.push(Task {
            work,
            deps,
            done: false,
        });
        Ok(id)
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the list has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether every task has completed.
    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.done)
    }

    /// Run every currently-eligible task once.
    ///
    /// A task is eligible when it is not done and all its dependencies
    /// are. Tasks completed earlier in the same sweep unblock their
    /// dependents within that sweep, so a dependency chain drains in a
    /// single call when nothing reports incomplete. Returns the number
    /// of tasks that ran.
    ///
    /// # Errors
    ///
    /// The first fault a task returns, with the list untouched past it.
    pub fn advance<C>(&mut self, ctx: &mut C) -> Result<usize, SweepError>
    where
        W: Work<C>,
    {
        let mut ran = 0;
        for (n, task) in self.tasks.iter_mut().enumerate() {
            if task.done || !task.deps.is_subset_of(self.done_mask) {
                continue;
            }
            ran += 1;
            match task.work.run(ctx) {
                Ok(TaskStatus::Complete) => {
                    task.done = true;
                    self.done_mask |= 1 << n;
                }
                Ok(TaskStatus::Incomplete) => {}
                Err(fault) => {
                    return Err(SweepError {
                        task: TaskId(n as u8),
                        label: task.work.label(),
                        fault,
                    });
                }
            }
        }
        Ok(ran)
    }
}

/// Lanes that may run concurrently.
///
/// Every lane must finish before the region is done; the executor in
/// [`crate::exec`] drives them with a worker pool.
#[derive(Clone, Debug, Default)]
pub struct TaskRegion<W> {
    lanes: Vec<TaskList<W>>,
}

impl<W> TaskRegion<W> {
    /// An empty region.
    pub fn new() -> Self {
        Self { lanes: Vec::new() }
    }

    /// Append a lane.
    pub fn add_lane(&mut self, lane: TaskList<W>) {
        self.lanes.push(lane);
    }

    /// Number of lanes.
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub(crate) fn into_lanes(self) -> Vec<TaskList<W>> {
        self.lanes
    }
}

/// Ordered regions with barrier semantics: region `n + 1` starts only
/// after every task of region `n` completed.
#[derive(Clone, Debug, Default)]
pub struct TaskCollection<W> {
    regions: Vec<TaskRegion<W>>,
}

impl<W> TaskCollection<W> {
    /// An empty collection.
    pub fn new() -> Self {
        Self {
            regions: Vec::new(),
        }
    }

    /// Append a region after all existing ones.
    pub fn add_region(&mut self, region: TaskRegion<W>) {
        self.regions.push(region);
    }

    /// Number of regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Consume the collection in execution order. The caller owns the
    /// barrier: it must drive each region to completion before building
    /// contexts for the next.
    pub fn into_regions(self) -> impl Iterator<Item = TaskRegion<W>> {
        self.regions.into_iter()
    }
}
