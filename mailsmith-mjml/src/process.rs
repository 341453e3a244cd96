//! External process execution.

use crate::error::{MjmlError, Result};
use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{debug, trace};

/// Output limit for the external `mjml` binary.
pub const EXTERNAL_MAX_BUFFER: usize = 500 * 1024;

/// Output limit for companion data scripts.
pub const COMPANION_MAX_BUFFER: usize = 512 * 512 * 1024;

/// How much stderr is kept for error messages.
const STDERR_EXCERPT: usize = 4 * 1024;

/// A program to run with an argument list, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program path or name resolved through `PATH`
    pub program: PathBuf,
    /// Arguments passed verbatim
    pub args: Vec<OsString>,
    /// Text piped to standard input; stdin is closed when absent
    pub stdin: Option<String>,
    /// Maximum number of stdout bytes accepted
    pub max_buffer: usize,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            max_buffer: EXTERNAL_MAX_BUFFER,
        }
    }

    /// Add one argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Add several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Pipe `input` to the program's standard input
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn max_buffer(mut self, bytes: usize) -> Self {
        self.max_buffer = bytes;
        self
    }

    /// Whether `arg` appears among the arguments
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

/// Runs external programs and captures their standard output.
///
/// A non-zero exit, a spawn failure, or output beyond
/// [`Invocation::max_buffer`] is an error.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: Invocation) -> Result<String>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: Invocation) -> Result<String> {
        let program = invocation.program_name();
        debug!(
            program = %program,
            args = ?invocation.args,
            piped = invocation.stdin.is_some(),
            "Running process"
        );

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(if invocation.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| MjmlError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Feed stdin concurrently so a chatty child cannot deadlock on a full pipe.
        let writer = match (child.stdin.take(), invocation.stdin) {
            (Some(mut pipe), Some(input)) => Some(tokio::spawn(async move {
                pipe.write_all(input.as_bytes()).await?;
                pipe.shutdown().await
            })),
            _ => None,
        };

        let stderr_reader = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf).await;
                buf
            })
        });

        let stdout = child.stdout.take();
        let stdout = collect_stdout(&mut child, stdout, &program, invocation.max_buffer).await?;

        let status = child.wait().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => trace!(program = %program, error = %e, "Child closed stdin early"),
                Err(e) => trace!(program = %program, error = %e, "Stdin writer aborted"),
            }
        }

        let stderr = match stderr_reader {
            Some(handle) => handle.await.unwrap_or_default(),
            None => Vec::new(),
        };

        if !status.success() {
            let excerpt = &stderr[..stderr.len().min(STDERR_EXCERPT)];
            return Err(MjmlError::ProcessFailed {
                program,
                status: status.code(),
                stderr: String::from_utf8_lossy(excerpt).trim().to_string(),
            });
        }

        debug!(program = %program, bytes = stdout.len(), "Process finished");
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// Read at most `limit` bytes of stdout. The child is killed when reading
/// fails or the limit is exceeded.
async fn collect_stdout<R>(
    child: &mut Child,
    pipe: Option<R>,
    program: &str,
    limit: usize,
) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut stdout = Vec::new();
    let Some(pipe) = pipe else {
        return Ok(stdout);
    };

    let err = match pipe.take(limit as u64 + 1).read_to_end(&mut stdout).await {
        Ok(_) if stdout.len() <= limit => return Ok(stdout),
        Ok(_) => MjmlError::OutputTooLarge {
            program: program.to_string(),
            limit,
        },
        Err(e) => MjmlError::Io(e),
    };

    let _ = child.kill().await;
    Err(err)
}
