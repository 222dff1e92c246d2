//! Playbook execution.
//!
//! The runner hands over a playbook, a generated inventory file, and extra
//! variables, and gets back a success flag plus whatever the tool printed.
//! Nothing else about the run is interpreted.

use crate::error::{DepotError, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

/// Outcome of one playbook run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code of the process (None if killed by a signal).
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr.
    pub output: String,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a playbook against an inventory.
pub trait CommandExecutor: Send + Sync {
    /// Run `playbook` against `inventory`.
    ///
    /// `workdir` belongs to the task and may receive logs; it is deleted with
    /// the task record. An `Err` means the run could not happen at all, while
    /// a failed run is an `Ok` outcome with a non-zero exit code.
    fn run(
        &self,
        playbook: &Path,
        inventory: &Path,
        extra_vars: &Map<String, Value>,
        workdir: &Path,
    ) -> Result<CommandOutcome>;
}

/// Invokes `ansible-playbook` (or whatever `command` names).
///
/// `ANSIBLE_ROLES_PATH` points at `roles_dir`, where fetched artifacts are
/// staged, so roles can pick them up from `<role>/release/...`.
#[derive(Debug, Clone)]
pub struct AnsiblePlaybook {
    command: String,
    roles_dir: PathBuf,
}

impl AnsiblePlaybook {
    /// `command` is split with shell quoting rules; its first word is the program.
    pub fn new(command: impl Into<String>, roles_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            roles_dir: roles_dir.into(),
        }
    }

    /// `roles_dir` made absolute, since the child runs in the playbook's directory.
    fn roles_path(&self) -> PathBuf {
        if self.roles_dir.is_absolute() {
            return self.roles_dir.clone();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&self.roles_dir))
            .unwrap_or_else(|_| self.roles_dir.clone())
    }

    fn build_args(
        &self,
        playbook: &Path,
        inventory: &Path,
        extra_vars: &Map<String, Value>,
    ) -> Result<Vec<String>> {
        let mut args = shell_words::split(&self.command).map_err(|e| {
            DepotError::UserError(format!(
                "failed to parse playbook command '{}': {}",
                self.command, e
            ))
        })?;

        if args.is_empty() {
            return Err(DepotError::UserError(format!(
                "playbook command is empty after parsing: '{}'",
                self.command
            )));
        }

        args.push("-i".to_string());
        args.push(inventory.display().to_string());
        args.push(playbook.display().to_string());
        if !extra_vars.is_empty() {
            let vars = serde_json::to_string(extra_vars).map_err(|e| {
                DepotError::UserError(format!("failed to encode extra_vars: {}", e))
            })?;
            args.push("--extra-vars".to_string());
            args.push(vars);
        }

        Ok(args)
    }
}

impl CommandExecutor for AnsiblePlaybook {
    fn run(
        &self,
        playbook: &Path,
        inventory: &Path,
        extra_vars: &Map<String, Value>,
        workdir: &Path,
    ) -> Result<CommandOutcome> {
        let args = self.build_args(playbook, inventory, extra_vars)?;

        std::fs::create_dir_all(workdir).map_err(|e| {
            DepotError::ActionError(format!(
                "failed to create runner directory '{}': {}",
                workdir.display(),
                e
            ))
        })?;

        let mut command = Command::new(&args[0]);
        command
            .args(&args[1..])
            .stdin(Stdio::null())
            .env("ANSIBLE_ROLES_PATH", self.roles_path());
        if let Some(dir) = playbook.parent() {
            command.current_dir(dir);
        }

        debug!(command = %args.join(" "), "spawning playbook");
        let started = Instant::now();
        let output = command.output().map_err(|e| {
            DepotError::ActionError(format!(
                "failed to execute '{}': {} (is it installed and in PATH?)",
                args[0], e
            ))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Log write failures do not change the outcome.
        let _ = std::fs::write(workdir.join("stdout.log"), stdout.as_bytes());
        let _ = std::fs::write(workdir.join("stderr.log"), stderr.as_bytes());

        let outcome = CommandOutcome {
            exit_code: output.status.code(),
            output: format!("{}{}", stdout, stderr),
        };
        info!(
            playbook = %playbook.display(),
            exit_code = ?outcome.exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "playbook finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn build_args_appends_inventory_playbook_and_vars() {
        let runner = AnsiblePlaybook::new("ansible-playbook --diff", "roles");
        let mut vars = Map::new();
        vars.insert("k8s_version".to_string(), json!("1.30"));

        let args = runner
            .build_args(Path::new("/p/site.yml"), Path::new("/tmp/inv.ini"), &vars)
            .unwrap();

        assert_eq!(
            args,
            vec![
                "ansible-playbook",
                "--diff",
                "-i",
                "/tmp/inv.ini",
                "/p/site.yml",
                "--extra-vars",
                r#"{"k8s_version":"1.30"}"#,
            ]
        );
    }

    #[test]
    fn build_args_omits_empty_extra_vars() {
        let runner = AnsiblePlaybook::new("ansible-playbook", "roles");
        let args = runner
            .build_args(Path::new("site.yml"), Path::new("inv.ini"), &Map::new())
            .unwrap();
        assert!(!args.contains(&"--extra-vars".to_string()));
    }

    #[test]
    fn unbalanced_quotes_are_rejected() {
        let runner = AnsiblePlaybook::new("ansible-playbook \"--diff", "roles");
        assert!(
            runner
                .build_args(Path::new("a"), Path::new("b"), &Map::new())
                .is_err()
        );
    }

    #[cfg(unix)]
    #[test]
    fn run_captures_exit_code_and_output() {
        let temp = TempDir::new().unwrap();
        let playbook = temp.path().join("site.yml");
        std::fs::write(&playbook, "- hosts: all\n").unwrap();
        let inventory = temp.path().join("inv.ini");
        std::fs::write(&inventory, "[servers]\n").unwrap();
        let workdir = temp.path().join("runner");

        // echo prints its arguments
        let outcome = AnsiblePlaybook::new("echo", temp.path().join("roles"))
            .run(&playbook, &inventory, &Map::new(), &workdir)
            .unwrap();

        assert!(outcome.is_success());
        assert!(outcome.output.contains("inv.ini"));
        assert!(workdir.join("stdout.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn run_reports_nonzero_exit_as_outcome() {
        let temp = TempDir::new().unwrap();
        let playbook = temp.path().join("site.yml");
        std::fs::write(&playbook, "").unwrap();

        let outcome = AnsiblePlaybook::new("false", "roles")
            .run(&playbook, &temp.path().join("inv.ini"), &Map::new(), &temp.path().join("w"))
            .unwrap();

        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code, Some(1));
    }

    #[test]
    fn missing_program_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = AnsiblePlaybook::new("definitely-not-a-real-program-depot", "roles")
            .run(
                &temp.path().join("site.yml"),
                &temp.path().join("inv.ini"),
                &Map::new(),
                &temp.path().join("w"),
            )
            .unwrap_err();
        assert!(err.to_string().contains("failed to execute"));
    }
}
