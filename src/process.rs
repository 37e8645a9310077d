//! Centralized command execution with captured output.
//!
//! Recipe steps are opaque shell command lines run through `sh -c`; the
//! orchestrator does not sanitize or sandbox them. A non-zero exit is an
//! ordinary [`CommandResult`], never an `Err` — the only error this module
//! produces is [`BuildError::Launch`] when the process cannot be spawned.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::BuildError;

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status of the command.
    pub status: ExitStatus,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get the exit code, or -1 if terminated by signal.
    pub fn code(&self) -> i32 {
        self.status.code().unwrap_or(-1)
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Builder for configuring command execution.
pub struct Cmd {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: Option<BTreeMap<String, String>>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
            current_dir: None,
            env: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Replace the child's environment with the given map.
    ///
    /// Without this the child inherits the ambient environment unchanged.
    pub fn env_map(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env = Some(env.clone());
        self
    }

    /// Run the command and capture output.
    pub fn run(self) -> Result<CommandResult, BuildError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        if let Some(ref env) = self.env {
            cmd.env_clear();
            cmd.envs(env);
        }

        let display = self.display();
        let output = cmd.output().map_err(|e| BuildError::Launch {
            command: display,
            reason: e.to_string(),
        })?;

        Ok(CommandResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn display(&self) -> String {
        // `sh -c <script>` reads better as just the script.
        if self.program == "sh" && self.args.len() == 2 && self.args[0] == "-c" {
            self.args[1].clone()
        } else {
            let mut s = self.program.clone();
            for arg in &self.args {
                s.push(' ');
                s.push_str(arg);
            }
            s
        }
    }
}

/// Run a shell command in the ambient environment.
pub fn shell(command: &str) -> Result<CommandResult, BuildError> {
    Cmd::new("sh").arg("-c").arg(command).run()
}

/// Run a shell command in a specific directory.
pub fn shell_in(command: &str, dir: &Path) -> Result<CommandResult, BuildError> {
    Cmd::new("sh").arg("-c").arg(command).dir(dir).run()
}

/// Run a shell command with a replaced environment, the form used for
/// package recipe steps.
pub fn shell_with_env(
    command: &str,
    dir: &Path,
    env: &BTreeMap<String, String>,
) -> Result<CommandResult, BuildError> {
    Cmd::new("sh")
        .arg("-c")
        .arg(command)
        .dir(dir)
        .env_map(env)
        .run()
}
