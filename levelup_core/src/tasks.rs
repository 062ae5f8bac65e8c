//! Daily task list with XP rewards.

use crate::{DailyTask, Error, Result, Stats};
use uuid::Uuid;

/// Goal label attached to every new task
pub const DEFAULT_GOAL: &str = "Daily Quest";

/// Outcome of toggling a task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskToggle {
    pub completed: bool,
    pub xp_awarded: u32,
}

/// Operations over the persisted task list (newest first)
pub struct TaskList<'a> {
    tasks: &'a mut Vec<DailyTask>,
    xp_per_task: u32,
}

impl<'a> TaskList<'a> {
    pub fn new(tasks: &'a mut Vec<DailyTask>, xp_per_task: u32) -> Self {
        Self { tasks, xp_per_task }
    }

    pub fn tasks(&self) -> &[DailyTask] {
        self.tasks
    }

    pub fn add(&mut self, title: &str) -> Result<&DailyTask> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Other("Task title cannot be empty".into()));
        }

        self.tasks.insert(
            0,
            DailyTask {
                id: Uuid::new_v4(),
                title: title.to_string(),
                goal: DEFAULT_GOAL.to_string(),
                completed: false,
            },
        );
        tracing::debug!("Added task '{}'", title);
        Ok(&self.tasks[0])
    }

    /// Flip completion; XP is only awarded when a task becomes completed
    pub fn toggle(&mut self, index: usize, stats: &mut Stats) -> Result<TaskToggle> {
        let xp_per_task = self.xp_per_task;
        let task = self.get_mut(index)?;
        task.completed = !task.completed;

        let xp_awarded = if task.completed { xp_per_task } else { 0 };
        if xp_awarded > 0 {
            *stats = stats.apply_xp(xp_awarded);
            tracing::info!("Task '{}' completed (+{} XP)", task.title, xp_awarded);
        }

        Ok(TaskToggle {
            completed: task.completed,
            xp_awarded,
        })
    }

    pub fn remove(&mut self, index: usize) -> Result<DailyTask> {
        self.get_mut(index)?;
        Ok(self.tasks.remove(index))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut DailyTask> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or_else(|| Error::Other(format!("No task #{} (have {})", index + 1, len)))
    }
}
