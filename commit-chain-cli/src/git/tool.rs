//! Runner for external binaries (git, dot)
//!
//! Every process the crate spawns goes through [`ExternalTool`]:
//! 1. Spawn with piped stdout/stderr (and stdin when input is supplied)
//! 2. Drain both pipes on reader threads, feed stdin on a writer thread
//! 3. Wait, optionally with a timeout that kills the child
//! 4. Map spawn failures, non-zero exits and timeouts onto [`ChainError`]

use crate::error::{ChainError, ChainResult};
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Process exit code (-1 when killed by a signal)
    pub code: i32,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// An external binary plus the limits it runs under
#[derive(Debug, Clone)]
pub struct ExternalTool {
    program: String,
    timeout_secs: u64,
}

impl ExternalTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout_secs: 0,
        }
    }

    /// Kill the process after `secs` seconds (0 = no timeout)
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run to completion and return the output whatever the exit status.
    pub fn run(&self, args: &[&str], cwd: Option<&Path>) -> ChainResult<ToolOutput> {
        self.run_inner(args, cwd, None)
    }

    /// Run and fail with [`ChainError::ToolFailed`] on a non-zero exit.
    pub fn run_checked(&self, args: &[&str], cwd: Option<&Path>) -> ChainResult<String> {
        let output = self.run(args, cwd)?;
        if !output.success() {
            return Err(ChainError::tool_failed(&self.program, output.code, &output.stderr));
        }
        Ok(output.stdout)
    }

    /// Like [`run_checked`](Self::run_checked), feeding `input` on stdin.
    pub fn run_with_stdin(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        input: &[u8],
    ) -> ChainResult<String> {
        let output = self.run_inner(args, cwd, Some(input))?;
        if !output.success() {
            return Err(ChainError::tool_failed(&self.program, output.code, &output.stderr));
        }
        Ok(output.stdout)
    }

    /// Check that the binary can be executed (`<program> --version`)
    pub fn is_installed(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn run_inner(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        input: Option<&[u8]>,
    ) -> ChainResult<ToolOutput> {
        debug!("Running {} {:?}", self.program, args);

        let mut command = Command::new(&self.program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        command.stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ChainError::ToolNotFound {
                    tool: self.program.clone(),
                });
            }
            Err(e) => return Err(ChainError::Io(e)),
        };

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let feeder = match (input, child.stdin.take()) {
            (Some(bytes), Some(stdin)) => Some(feed(stdin, bytes.to_vec())),
            _ => None,
        };

        let code = if self.timeout_secs > 0 {
            wait_with_timeout(&mut child, &self.program, self.timeout_secs)?
        } else {
            child.wait()?.code().unwrap_or(-1)
        };

        // The child is reaped by now, so the feeder has finished or hit a closed pipe
        if let Some(Err(e)) = feeder.and_then(|h| h.join().ok()) {
            // A child that exits early closes its end; its exit status explains why
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(ChainError::Io(e));
            }
        }

        Ok(ToolOutput {
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
            code,
        })
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn feed<W: Write + Send + 'static>(mut stdin: W, bytes: Vec<u8>) -> JoinHandle<std::io::Result<()>> {
    thread::spawn(move || stdin.write_all(&bytes))
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Poll for completion with small sleep intervals
fn wait_with_timeout(child: &mut Child, tool: &str, timeout_secs: u64) -> ChainResult<i32> {
    let start = Instant::now();
    let timeout = Duration::from_secs(timeout_secs);

    loop {
        match child.try_wait()? {
            Some(status) => return Ok(status.code().unwrap_or(-1)),
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!("{} timed out after {}s", tool, timeout_secs);
                    return Err(ChainError::ToolTimeout {
                        tool: tool.to_string(),
                        secs: timeout_secs,
                    });
                }
                thread::sleep(Duration::from_millis(20));
            }
        }
    }
}
