//! PhantomJS executor implementation.
//!
//! Launches the browser with the script on standard input and collects
//! everything it prints.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use domshot::PhantomJsExecutor;
//!
//! // `phantomjs` from PATH, reading the program from /dev/stdin
//! let executor = PhantomJsExecutor::with_defaults();
//!
//! // Custom binary with a hard time limit
//! let executor = PhantomJsExecutor::new("/opt/phantomjs/bin/phantomjs")
//!     .timeout(Duration::from_secs(30));
//! ```

use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::ScriptExecutor;
use crate::config::{RenderConfig, DEFAULT_EXECUTABLE, STDIN_SCRIPT_ARG};
use crate::error::{DomshotError, Result};

/// How often a running process is checked when a timeout is set.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Executor that runs PhantomJS (or a compatible binary) as a child process.
///
/// # Thread Safety
///
/// Holds only immutable settings and can be shared across threads.
#[derive(Debug, Clone)]
pub struct PhantomJsExecutor {
    executable: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl PhantomJsExecutor {
    /// Executor for a specific binary, reading the script from `/dev/stdin`.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: vec![STDIN_SCRIPT_ARG.to_string()],
            timeout: None,
        }
    }

    /// `phantomjs` from `PATH`.
    pub fn with_defaults() -> Self {
        log::debug!("Creating PhantomJsExecutor with default executable");
        Self::new(DEFAULT_EXECUTABLE)
    }

    /// Executable, arguments and timeout taken from `config`.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            args: config.args.clone(),
            timeout: config.timeout,
        }
    }

    /// Replace the command line arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Kill the process if it has not exited after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path or name of the executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.executable)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                log::error!("❌ Failed to launch {}: {}", self.executable.display(), e);
                if e.kind() == ErrorKind::NotFound {
                    DomshotError::Launch(format!(
                        "{} not found (is it installed and on PATH?): {}",
                        self.executable.display(),
                        e
                    ))
                } else {
                    DomshotError::Launch(format!("{}: {}", self.executable.display(), e))
                }
            })
    }
}

impl Default for PhantomJsExecutor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ScriptExecutor for PhantomJsExecutor {
    /// Run the script and return stdout followed by stderr.
    ///
    /// The two streams always meet at a line break, so a final stdout line
    /// without a newline is never joined to the first stderr line.
    ///
    /// The exit status is logged but not interpreted.
    fn execute(&self, script: &str, output_path: &Path) -> Result<String> {
        let started = Instant::now();
        log::debug!(
            "Launching {} ({} byte script, output {})",
            self.executable.display(),
            script.len(),
            output_path.display()
        );

        let mut child = self.spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DomshotError::Launch("stdin was not captured".to_string()))?;
        let writer = spawn_writer(stdin, script.as_bytes().to_vec());
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match self.timeout {
            Some(timeout) => wait_with_timeout(&mut child, timeout)?,
            None => child
                .wait()
                .map_err(|e| DomshotError::Launch(format!("failed to wait for process: {}", e)))?,
        };

        match join(writer) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                log::debug!("Process closed stdin before reading the whole script");
            }
            Err(e) => {
                return Err(DomshotError::Launch(format!("failed to write script: {}", e)));
            }
        }

        let output = merge_streams(collect(stdout)?, &collect(stderr)?);

        log::debug!(
            "Process exited with {} after {:?} ({} bytes of output)",
            status,
            started.elapsed(),
            output.len()
        );

        Ok(output)
    }
}

fn spawn_writer<W: Write + Send + 'static>(mut pipe: W, bytes: Vec<u8>) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || {
        pipe.write_all(&bytes)?;
        pipe.flush()
        // pipe dropped here, closing the child's stdin
    })
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe thread panicked")))
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<String> {
    let bytes = join(handle)
        .map_err(|e| DomshotError::Launch(format!("failed to read process output: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Append `stderr` to `stdout`, starting it on a fresh line.
fn merge_streams(mut stdout: String, stderr: &str) -> String {
    if !stdout.is_empty() && !stderr.is_empty() && !stdout.ends_with('\n') {
        stdout.push('\n');
    }
    stdout.push_str(stderr);
    stdout
}

/// Poll until the child exits, killing it once `timeout` has passed.
///
/// On timeout the pipe threads are left to finish on their own; a
/// grandchild holding the pipes open must not block the caller.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if Instant::now() >= deadline => {
                log::warn!("Headless browser exceeded {:?}, killing it", timeout);
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill headless browser: {}", e);
                }
                let _ = child.wait();
                return Err(DomshotError::Timeout(timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                return Err(DomshotError::Launch(format!("failed to poll process: {}", e)));
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
