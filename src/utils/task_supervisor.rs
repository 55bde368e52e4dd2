use std::collections::HashMap;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::error::{Error, Result};

/// Tracks the engine's long-lived background loops and reports any that
/// terminated on their own. The loops never return under normal operation,
/// so a finished handle always means a failure.
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
        }
    }

    /// Spawn a background loop and register it under a stable name.
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!(task = %name, "spawned background task");
        self.tasks.insert(name, handle);
        self
    }

    /// Report loops that exited since the last check. Dead handles are
    /// dropped from tracking so a failure is reported once.
    pub async fn check_health(&mut self) -> Result<()> {
        let dead: Vec<String> = self
            .tasks
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if dead.is_empty() {
            return Ok(());
        }

        for name in &dead {
            error!(task = %name, "background task terminated unexpectedly");
            self.tasks.remove(name);
        }

        Err(Error::TaskFailure(format!(
            "tasks terminated unexpectedly: {:?}",
            dead
        )))
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every tracked loop.
    pub async fn shutdown_all(&mut self) {
        info!(count = self.tasks.len(), "shutting down background tasks");

        for (name, handle) in self.tasks.drain() {
            handle.abort();
            info!(task = %name, "aborted task");
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
