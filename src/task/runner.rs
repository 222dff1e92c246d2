//! Background execution of tasks.
//!
//! Each submission gets its own OS thread; there is no pool and no bound on
//! how many run at once. A burst of submissions therefore means a burst of
//! threads. Tasks cannot be cancelled and have no internal timeout, so a
//! hung transfer or playbook ties up its thread until it returns.
//!
//! Submission is synchronous only up to the point where the `running`
//! record is on disk; everything after that happens on the task thread.

use super::{Task, TaskStore};
use crate::catalog::{self, Catalog, ResolvedAction};
use crate::config::Config;
use crate::error::{DepotError, Result};
use crate::executor::{ActionExecutor, AnsiblePlaybook, CommandExecutor, HttpExecutor};
use crate::request::{ArtifactSpec, Mode, PlaybookSpec};
use chrono::Utc;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

/// A submitted task.
///
/// Dropping the handle detaches the task; it keeps running to completion.
#[derive(Debug)]
pub struct TaskHandle {
    id: String,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Block until the task thread exits.
    pub fn wait(self) -> Result<()> {
        self.join.join().map_err(|_| {
            DepotError::ActionError(format!("task {} thread terminated abnormally", self.id))
        })
    }
}

/// Owns the lifecycle of every task it starts.
#[derive(Clone)]
pub struct TaskRunner {
    catalog_path: PathBuf,
    roles_dir: PathBuf,
    store: TaskStore,
    actions: Arc<dyn ActionExecutor>,
    commands: Arc<dyn CommandExecutor>,
}

impl TaskRunner {
    pub fn new(
        config: &Config,
        store: TaskStore,
        actions: Arc<dyn ActionExecutor>,
        commands: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            catalog_path: config.catalog_path.clone(),
            roles_dir: config.roles_dir.clone(),
            store,
            actions,
            commands,
        }
    }

    /// Runner wired to the default HTTP and playbook executors.
    pub fn from_config(config: &Config) -> Result<Self> {
        let actions = HttpExecutor::new(config.download_timeout_secs)?;
        let commands = AnsiblePlaybook::new(config.playbook_command.clone(), config.roles_dir.clone());
        Ok(Self::new(
            config,
            TaskStore::new(config),
            Arc::new(actions),
            Arc::new(commands),
        ))
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Load the catalog as it is right now.
    pub fn load_catalog(&self) -> Result<Catalog> {
        Catalog::load(&self.catalog_path)
    }

    /// Check `spec` against the current catalog without starting anything.
    ///
    /// Returns the list of unsupported descriptors; empty means the request
    /// would be accepted.
    pub fn check(&self, spec: &ArtifactSpec) -> Result<Vec<String>> {
        let catalog = self.load_catalog()?;
        Ok(catalog::validate(&catalog, spec))
    }

    /// Validate `spec` and, if every entry is supported, start a task for it.
    pub fn submit(&self, spec: ArtifactSpec) -> Result<TaskHandle> {
        let unsupported = self.check(&spec)?;
        if !unsupported.is_empty() {
            return Err(DepotError::ValidationError(unsupported));
        }
        self.submit_unchecked(spec)
    }

    /// Start a task for `spec` without pre-flight validation.
    ///
    /// Used for specs derived from the catalog itself.
    pub fn submit_unchecked(&self, spec: ArtifactSpec) -> Result<TaskHandle> {
        let runner = self.clone();
        self.spawn(move |task| runner.run_artifacts(task, spec))
    }

    /// Start a playbook task.
    ///
    /// The inventory file is written before the task exists and is deleted
    /// when the task thread finishes with it, whatever the outcome.
    pub fn submit_playbook(&self, spec: PlaybookSpec) -> Result<TaskHandle> {
        let inventory = spec.inventory.write_temp()?;
        let runner = self.clone();
        self.spawn(move |task| runner.run_playbook(task, spec, inventory))
    }

    /// Persist a `running` record, then hand the task to a new thread.
    fn spawn<F>(&self, job: F) -> Result<TaskHandle>
    where
        F: FnOnce(&Task) -> Result<()> + Send + 'static,
    {
        let task = Task::started(Task::new_id(), Utc::now());
        self.store.put(&task)?;
        info!(task_id = %task.id, "task started");

        let id = task.id.clone();
        let store = self.store.clone();
        let join = thread::Builder::new()
            .name(format!("task-{}", &id[..8.min(id.len())]))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| job(&task)))
                    .unwrap_or_else(|payload| {
                        Err(DepotError::ActionError(format!(
                            "task panicked: {}",
                            panic_message(payload.as_ref())
                        )))
                    });
                finish(&store, task, result);
            })
            .map_err(|e| {
                DepotError::ActionError(format!("failed to spawn task thread: {}", e))
            });

        match join {
            Ok(join) => Ok(TaskHandle { id, join }),
            Err(e) => {
                // The record says running; make it terminal so nobody polls forever.
                let mut orphan = Task::started(id, Utc::now());
                if let Some(existing) = self.store.get(&orphan.id).ok().flatten() {
                    orphan = existing;
                }
                finish(&self.store, orphan, Err(DepotError::ActionError(e.to_string())));
                Err(e)
            }
        }
    }

    fn run_artifacts(&self, task: &Task, spec: ArtifactSpec) -> Result<()> {
        let catalog = self.load_catalog()?;
        let actions = catalog::resolve(&catalog, &spec);
        info!(task_id = %task.id, actions = actions.len(), mode = %spec.mode, "resolved request");

        // The first failure stops the rest. Earlier
        // side effects are not rolled back.
        for action in &actions {
            self.execute(action)?;
        }
        Ok(())
    }

    fn execute(&self, action: &ResolvedAction) -> Result<()> {
        let dest = action.destination(&self.roles_dir);
        debug!(
            tool = %action.tool,
            arch = %action.arch,
            version = %action.version,
            mode = %action.mode,
            path = %dest.display(),
            "executing action"
        );
        match action.mode {
            Mode::Fetch => self.actions.fetch(&action.url, &dest, action.overwrite),
            Mode::Remove => self.actions.remove(&dest),
        }
    }

    fn run_playbook(&self, task: &Task, spec: PlaybookSpec, inventory: NamedTempFile) -> Result<()> {
        let workdir = self.store.task_dir(&task.id).join("runner");
        let outcome = self.commands.run(
            &spec.playbook,
            inventory.path(),
            &spec.extra_vars,
            &workdir,
        );

        if let Err(e) = inventory.close() {
            warn!(task_id = %task.id, error = %e, "failed to delete inventory file");
        }

        let outcome = outcome?;
        debug!(task_id = %task.id, output = %outcome.output, "playbook output");
        if outcome.is_success() {
            return Ok(());
        }
        Err(DepotError::ActionError(match outcome.exit_code {
            Some(code) => format!("playbook exited with code {}", code),
            None => "playbook terminated by signal".to_string(),
        }))
    }
}

/// Record the terminal state. Store errors are logged, never propagated.
fn finish(store: &TaskStore, mut task: Task, result: Result<()>) {
    let now = Utc::now();
    let transition = match &result {
        Ok(()) => task.complete(now),
        Err(e) => task.fail(e.to_string(), now),
    };
    if let Err(e) = transition {
        error!(task_id = %task.id, error = %e, "refusing status regression");
        return;
    }

    match &result {
        Ok(()) => info!(task_id = %task.id, "task completed"),
        Err(e) => warn!(task_id = %task.id, error = %e, "task failed"),
    }

    if let Err(e) = store.put(&task) {
        error!(task_id = %task.id, error = %e, "failed to persist terminal task status");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
