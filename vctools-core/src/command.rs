//! External program actions with streamed output.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tracing::{info, warn};

use crate::error::TaskError;
use crate::task::{Action, ActionResult};

/// An external program invocation usable as a task action.
///
/// Output is forwarded line by line while the program runs; the action
/// completes when the process exits.
#[derive(Debug, Clone)]
pub struct Command {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

/// Captured result of [`Command::output`].
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn spawn(&self, capture_stdout: bool) -> Result<Child, TaskError> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }

        tracing::debug!(command = %self, capture_stdout, "spawning");

        cmd.spawn()
            .map_err(|e| TaskError::message(format!("Failed to spawn `{}`: {}", self, e)))
    }

    /// Runs the program, streaming stderr and collecting stdout.
    pub async fn output(&self) -> Result<CommandOutput, TaskError> {
        let mut child = self.spawn(true)?;
        let stderr_task = self.forward_stderr(&mut child)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TaskError::message("Failed to capture stdout"))?;
        let mut collected = String::new();
        let streamed = for_each_line(stdout, |line| {
            collected.push_str(&line);
            collected.push('\n');
        })
        .await;

        let status = child.wait().await?;
        let _ = stderr_task.await;
        streamed?;

        Ok(CommandOutput {
            code: status.code(),
            success: status.success(),
            stdout: collected,
        })
    }

    fn forward_stderr(
        &self,
        child: &mut Child,
    ) -> Result<tokio::task::JoinHandle<()>, TaskError> {
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TaskError::message("Failed to capture stderr"))?;
        let program = self.program.clone();

        Ok(tokio::spawn(async move {
            let _ = for_each_line(stderr, |line| {
                if !line.trim().is_empty() {
                    warn!("[{}] {}", program, line);
                }
            })
            .await;
        }))
    }

    fn exit_error(&self, code: Option<i32>) -> TaskError {
        TaskError::Exit {
            command: self.to_string(),
            code,
        }
    }
}

#[async_trait]
impl Action for Command {
    async fn run(&self) -> ActionResult {
        let mut child = self.spawn(false)?;
        let stderr_task = self.forward_stderr(&mut child)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TaskError::message("Failed to capture stdout"))?;
        let streamed = for_each_line(stdout, |line| {
            if !line.trim().is_empty() {
                info!("[{}] {}", self.program, line);
            }
        })
        .await;

        let status = child.wait().await?;
        let _ = stderr_task.await;
        streamed?;

        if status.success() {
            Ok(())
        } else {
            Err(self.exit_error(status.code()))
        }
    }
}

/// Feeds each line of `reader` to `f`, decoding invalid UTF-8 lossily.
async fn for_each_line<R, F>(reader: R, mut f: F) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        f(line.trim_end_matches(['\n', '\r']).to_string());
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
