//! Deferred execution: tasks and step-ordered schedules

use crate::backend::{Backend, Descriptor, OpRequest};
use crate::error::Result;

/// One validated operation, ready to run.
///
/// A task owns its request, and through it shared ownership of every operand
/// container, so a queued task stays runnable even after the caller drops its
/// own container clones.
#[derive(Clone, Debug)]
pub struct ScheduleTask<B: Backend> {
    request: OpRequest<B>,
    desc: Descriptor,
}

impl<B: Backend> ScheduleTask<B> {
    pub(crate) fn new(request: OpRequest<B>) -> Self {
        Self {
            request,
            desc: Descriptor::new(),
        }
    }

    /// Attach an execution descriptor
    pub fn with_desc(mut self, desc: Descriptor) -> Self {
        self.desc = desc;
        self
    }

    /// Operation name of the underlying request
    pub fn name(&self) -> &'static str {
        self.request.name()
    }

    /// Execution descriptor
    pub fn desc(&self) -> &Descriptor {
        &self.desc
    }

    /// Run the task to completion on its backend.
    ///
    /// On failure the request's output container is left untouched.
    pub fn execute(&self) -> Result<()> {
        let ctx = self.request.context();
        let status = ctx.backend().dispatch(&self.request);
        log::trace!(
            "task {} ({}) on {}: {:?}",
            self.request.name(),
            self.desc.label.as_deref().unwrap_or("unlabelled"),
            ctx.backend().name(),
            status
        );
        status.ok_or_err()
    }
}

/// An ordered sequence of steps, each step a group of tasks.
///
/// Steps run strictly in order. Tasks inside one step have no ordering
/// guarantee between each other, so they must not write a container another
/// task in the same step touches.
#[derive(Clone, Debug)]
pub struct Schedule<B: Backend> {
    steps: Vec<Vec<ScheduleTask<B>>>,
}

impl<B: Backend> Default for Schedule<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Schedule<B> {
    /// Create an empty schedule
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append one task as its own step
    pub fn step_task(&mut self, task: ScheduleTask<B>) -> &mut Self {
        self.steps.push(vec![task]);
        self
    }

    /// Append a group of tasks as one step
    pub fn step_tasks(&mut self, tasks: Vec<ScheduleTask<B>>) -> &mut Self {
        self.steps.push(tasks);
        self
    }

    /// Number of steps
    pub fn n_steps(&self) -> usize {
        self.steps.len()
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// Steps already completed keep their effects; the failing task's own
    /// output is untouched.
    pub fn submit(&self) -> Result<()> {
        for (i, step) in self.steps.iter().enumerate() {
            for task in step {
                task.execute().map_err(|e| {
                    log::debug!("schedule step {i} task {} failed: {e}", task.name());
                    e
                })?;
            }
        }
        Ok(())
    }
}
