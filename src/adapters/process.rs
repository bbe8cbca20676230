//! External program invocation
//!
//! Every collaborator adapter runs its tool through [`ToolCommand`], which
//! captures exit status and output and keeps secret arguments out of logs.

use crate::config::SecretString;
use crate::domain::{Result, ShuttleError};
use secrecy::ExposeSecret;
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Longest diagnostic excerpt carried into an error message
const MAX_DIAGNOSTIC_CHARS: usize = 2_000;

#[derive(Debug, Clone)]
enum Arg {
    Plain(String),
    Secret(SecretString),
}

/// Captured result of a finished child process
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code, `None` when killed by a signal
    pub status_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status 0
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// Text explaining a failure: stderr when present, otherwise stdout
    pub fn diagnostics(&self) -> String {
        let text = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        let mut excerpt: String = text.chars().take(MAX_DIAGNOSTIC_CHARS).collect();
        if text.chars().count() > MAX_DIAGNOSTIC_CHARS {
            excerpt.push_str("...");
        }
        if excerpt.is_empty() {
            match self.status_code {
                Some(code) => format!("exited with status {code}"),
                None => "terminated by signal".to_string(),
            }
        } else {
            excerpt
        }
    }
}

/// Builder for one invocation of an external program
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<Arg>,
    env: Vec<(String, SecretString)>,
}

impl ToolCommand {
    /// Starts a command for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Appends a plain argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    /// Appends several plain arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|a| Arg::Plain(a.into())));
        self
    }

    /// Appends an argument that is masked in [`ToolCommand::display`]
    pub fn secret_arg(mut self, value: &SecretString) -> Self {
        self.args.push(Arg::Secret(value.clone()));
        self
    }

    /// Sets an environment variable on the child only
    pub fn secret_env(mut self, key: impl Into<String>, value: &SecretString) -> Self {
        self.env.push((key.into(), value.clone()));
        self
    }

    /// Program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command line with secrets masked, for logs
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for arg in &self.args {
            match arg {
                Arg::Plain(s) if s.contains(char::is_whitespace) || s.is_empty() => {
                    parts.push(format!("{s:?}"))
                }
                Arg::Plain(s) => parts.push(s.clone()),
                Arg::Secret(_) => parts.push("***".to_string()),
            }
        }
        parts.join(" ")
    }

    fn build(&self) -> Command {
        let mut command = Command::new(&self.program);
        for arg in &self.args {
            match arg {
                Arg::Plain(s) => command.arg(s),
                Arg::Secret(s) => command.arg(expose(s)),
            };
        }
        for (key, value) in &self.env {
            command.env(key, expose(value));
        }
        command.stdin(Stdio::null()).kill_on_drop(true);
        command
    }

    fn launch_error(&self, err: std::io::Error) -> ShuttleError {
        if err.kind() == std::io::ErrorKind::NotFound {
            ShuttleError::Process(format!(
                "'{}' was not found; install it or set its path under [tools]",
                self.program
            ))
        } else {
            ShuttleError::Process(format!("Failed to run '{}': {}", self.program, err))
        }
    }

    /// Runs the command to completion and captures its output
    ///
    /// A non-zero exit status is not an error here; callers classify it.
    ///
    /// # Errors
    ///
    /// Returns [`ShuttleError::Process`] if the program cannot be started.
    pub async fn run(&self) -> Result<ProcessOutput> {
        tracing::debug!(command = %self.display(), "Running external command");

        let mut command = self.build();
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        let output = command.output().await.map_err(|e| self.launch_error(e))?;

        let result = ProcessOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            program = %self.program,
            status = ?result.status_code,
            "External command finished"
        );
        Ok(result)
    }

    /// Starts the command without waiting for it
    ///
    /// The child inherits stdout/stderr so that interactive instructions
    /// (such as a device-code prompt) reach the operator. It is killed when
    /// the returned handle is dropped.
    pub fn spawn(&self) -> Result<Child> {
        tracing::debug!(command = %self.display(), "Spawning external command");
        let mut command = self.build();
        command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        command.spawn().map_err(|e| self.launch_error(e))
    }
}

fn expose(secret: &SecretString) -> &str {
    secret.expose_secret().as_ref()
}
