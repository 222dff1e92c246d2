use crate::config::Config;
use crate::error::{DepotError, Result};
use crate::executor::{ActionExecutor, CommandExecutor, CommandOutcome};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Config whose every path lives under `root`.
pub(crate) fn test_config(root: &Path) -> Config {
    Config {
        tasks_dir: root.join("tasks"),
        catalog_path: root.join("meta.yml"),
        roles_dir: root.join("roles"),
        default_playbook: root.join("playbooks/playbook.yml"),
        ..Config::default()
    }
}

pub(crate) fn write_catalog(config: &Config, yaml: &str) {
    std::fs::write(&config.catalog_path, yaml).unwrap();
}

/// One call observed by [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Fetch {
        url: String,
        dest: PathBuf,
        overwrite: bool,
    },
    Remove {
        dest: PathBuf,
    },
}

/// Records calls instead of touching the network or disk.
///
/// Fetches whose URL contains `fail_on` return an error carrying `message`.
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    pub calls: Mutex<Vec<Call>>,
    pub fail_on: Option<(String, String)>,
}

impl RecordingExecutor {
    pub(crate) fn failing(url_fragment: &str, message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some((url_fragment.to_string(), message.to_string())),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ActionExecutor for RecordingExecutor {
    fn fetch(&self, url: &str, dest: &Path, overwrite: bool) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Fetch {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            overwrite,
        });
        match &self.fail_on {
            Some((fragment, message)) if url.contains(fragment.as_str()) => {
                Err(DepotError::ActionError(message.clone()))
            }
            _ => Ok(()),
        }
    }

    fn remove(&self, dest: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Remove {
            dest: dest.to_path_buf(),
        });
        Ok(())
    }
}

/// Scripted playbook runner.
///
/// Captures the inventory text it was handed and whether the inventory file
/// existed during the run.
#[derive(Debug)]
pub(crate) enum ScriptedCommand {
    Exit(i32),
    Error(String),
    Panic,
}

#[derive(Debug)]
pub(crate) struct RecordingCommands {
    pub script: ScriptedCommand,
    pub seen: Mutex<Vec<(PathBuf, String)>>,
}

impl RecordingCommands {
    pub(crate) fn new(script: ScriptedCommand) -> Self {
        Self {
            script,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<(PathBuf, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl CommandExecutor for RecordingCommands {
    fn run(
        &self,
        _playbook: &Path,
        inventory: &Path,
        _extra_vars: &Map<String, Value>,
        _workdir: &Path,
    ) -> Result<CommandOutcome> {
        let text = std::fs::read_to_string(inventory).unwrap_or_default();
        self.seen
            .lock()
            .unwrap()
            .push((inventory.to_path_buf(), text));

        match &self.script {
            ScriptedCommand::Exit(code) => Ok(CommandOutcome {
                exit_code: Some(*code),
                output: String::new(),
            }),
            ScriptedCommand::Error(message) => Err(DepotError::ActionError(message.clone())),
            ScriptedCommand::Panic => panic!("runner exploded"),
        }
    }
}
