//! Child process execution with bounded reads

use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::command::Invocation;
use crate::domain::types::ProcessOutput;
use crate::error::{Error, Result, TimeoutStage};

const READ_CHUNK: usize = 8 * 1024;

/// Time bounds applied to every invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Longest a single read on stdout or stderr may wait for data
    pub read_timeout: Duration,
    /// Ceiling for reading both streams and waiting for exit
    pub execution_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(20),
            execution_timeout: Duration::from_secs(30),
        }
    }
}

/// Runs a resolved invocation to completion.
///
/// A non-zero exit is a normal [`ProcessOutput`]; only spawn/IO failures and
/// timeouts are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation, limits: &Limits) -> Result<ProcessOutput>;
}

/// Spawns the program directly with `tokio::process`, no shell involved
#[derive(Debug, Default, Clone)]
pub struct TokioProcessRunner;

enum Failure {
    Io(io::Error),
    ReadTimeout,
    ExecutionTimeout,
}

/// SIGKILLs the child's process group unless disarmed.
///
/// The child leads its own group, so this also reaches anything it started
/// (e.g. `docker` under `sudo`). Runs on drop, which covers the request
/// future being cancelled.
struct GroupKill {
    pgid: Option<u32>,
    armed: bool,
}

impl GroupKill {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }

    fn kill(&mut self) {
        if !std::mem::replace(&mut self.armed, false) {
            return;
        }

        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            use nix::errno::Errno;
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            match killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
            }
        }
    }
}

impl Drop for GroupKill {
    fn drop(&mut self) {
        self.kill();
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation, limits: &Limits) -> Result<ProcessOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| Error::ExecutionFailed {
            action: invocation.action.clone(),
            message: e.to_string(),
        })?;
        // Group id equals the leader's pid
        let mut group = GroupKill::new(child.id());

        debug!(
            "Spawned {} (pid {:?}) for action {}",
            invocation.program,
            child.id(),
            invocation.action
        );

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let read_timeout = limits.read_timeout;

        let collect = async {
            let (stdout, stderr) = tokio::try_join!(
                drain(stdout, read_timeout),
                drain(stderr, read_timeout)
            )?;
            let status = child.wait().await.map_err(Failure::Io)?;
            Ok::<_, Failure>((stdout, stderr, status))
        };
        let outcome = timeout(limits.execution_timeout, collect).await;

        let failure = match outcome {
            Ok(Ok((stdout, stderr, status))) => {
                group.disarm();
                return Ok(ProcessOutput {
                    exit_code: status.code().unwrap_or(-1),
                    stdout,
                    stderr,
                });
            }
            Ok(Err(failure)) => failure,
            Err(_) => Failure::ExecutionTimeout,
        };

        // Signal the group while the leader is still unreaped
        group.kill();
        if let Err(e) = child.kill().await {
            warn!(
                "Failed to kill process for action {}: {}",
                invocation.action, e
            );
        }

        Err(match failure {
            Failure::Io(e) => Error::ExecutionFailed {
                action: invocation.action.clone(),
                message: e.to_string(),
            },
            Failure::ReadTimeout => Error::Timeout {
                action: invocation.action.clone(),
                stage: TimeoutStage::Read,
                limit: limits.read_timeout,
            },
            Failure::ExecutionTimeout => Error::Timeout {
                action: invocation.action.clone(),
                stage: TimeoutStage::Execution,
                limit: limits.execution_timeout,
            },
        })
    }
}

/// Read a pipe to EOF, giving up when a single read stalls past `idle`
async fn drain<R>(reader: Option<R>, idle: Duration) -> std::result::Result<String, Failure>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(String::new());
    };

    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match timeout(idle, reader.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => buf.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => return Err(Failure::Io(e)),
            Err(_) => return Err(Failure::ReadTimeout),
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
