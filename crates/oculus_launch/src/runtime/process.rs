//! Managed process abstraction

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Process status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Not started yet
    Pending,
    /// Running
    Running,
    /// Exited with an optional exit code
    Stopped(Option<i32>),
    /// Failed to spawn
    Failed,
}

impl ProcessStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessStatus::Running)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, ProcessStatus::Stopped(_) | ProcessStatus::Failed)
    }
}

/// Event emitted by a managed process
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started { pid: u32 },
    Output { line: String, is_stderr: bool },
    Exited { code: Option<i32> },
    Failed { error: String },
}

/// Resolved spawn configuration for one directive
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Node instance name, used as the event key and in log lines
    pub name: String,
    /// Full path of the executable
    pub command: PathBuf,
    /// Command line arguments
    pub args: Vec<String>,
}

/// A spawned child process with piped output and graceful shutdown
pub struct ManagedProcess {
    pub config: ProcessConfig,
    pub status: ProcessStatus,
    pub pid: Option<u32>,
    pub started_at: Option<Instant>,
    child: Option<Child>,
    event_tx: mpsc::UnboundedSender<(String, ProcessEvent)>,
}

impl ManagedProcess {
    pub fn new(config: ProcessConfig, event_tx: mpsc::UnboundedSender<(String, ProcessEvent)>) -> Self {
        Self {
            config,
            status: ProcessStatus::Pending,
            pid: None,
            started_at: None,
            child: None,
            event_tx,
        }
    }

    /// Spawn the process with piped stdout/stderr
    pub fn start(&mut self) -> Result<(), ProcessError> {
        if self.status.is_running() {
            return Err(ProcessError::AlreadyRunning(self.config.name.clone()));
        }

        log::info!(
            "[{}] Starting: {} {}",
            self.config.name,
            self.config.command.display(),
            self.config.args.join(" ")
        );

        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.status = ProcessStatus::Failed;
                let error = format!("Failed to spawn process: {}", e);
                let _ = self.event_tx.send((
                    self.config.name.clone(),
                    ProcessEvent::Failed { error },
                ));
                return Err(ProcessError::SpawnFailed {
                    name: self.config.name.clone(),
                    source: e,
                });
            }
        };

        let pid = child.id().unwrap_or(0);
        self.pid = Some(pid);
        self.status = ProcessStatus::Running;
        self.started_at = Some(Instant::now());

        let _ = self
            .event_tx
            .send((self.config.name.clone(), ProcessEvent::Started { pid }));

        if let Some(stdout) = child.stdout.take() {
            self.forward_output(stdout, false);
        }
        if let Some(stderr) = child.stderr.take() {
            self.forward_output(stderr, true);
        }

        self.child = Some(child);
        Ok(())
    }

    /// Forward an output stream line-by-line as events
    fn forward_output(&self, stream: impl AsyncRead + Unpin + Send + 'static, is_stderr: bool) {
        let name = self.config.name.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = tx.send((name.clone(), ProcessEvent::Output { line, is_stderr }));
            }
        });
    }

    /// Stop the process: SIGTERM, then SIGKILL after the timeout
    pub async fn stop(&mut self, timeout: Duration) -> Result<(), ProcessError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        log::info!("[{}] Stopping process...", self.config.name);

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.pid {
                let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = child.kill().await;
        }

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let code = status.code();
                self.status = ProcessStatus::Stopped(code);
                let _ = self
                    .event_tx
                    .send((self.config.name.clone(), ProcessEvent::Exited { code }));
            }
            Ok(Err(e)) => {
                log::error!("[{}] Error waiting for process: {}", self.config.name, e);
                self.status = ProcessStatus::Stopped(None);
            }
            Err(_) => {
                log::warn!(
                    "[{}] Process did not exit gracefully, forcing kill",
                    self.config.name
                );

                #[cfg(unix)]
                {
                    use nix::sys::signal::{kill, Signal};
                    use nix::unistd::Pid;

                    if let Some(pid) = self.pid {
                        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
                    }
                }

                self.status = ProcessStatus::Stopped(None);
                let _ = self
                    .event_tx
                    .send((self.config.name.clone(), ProcessEvent::Exited { code: None }));
            }
        }

        self.pid = None;
        Ok(())
    }

    /// Poll the child for exit without blocking
    pub fn check_status(&mut self) -> ProcessStatus {
        if let Some(child) = &mut self.child {
            match child.try_wait() {
                Ok(Some(status)) => {
                    let code = status.code();
                    self.status = ProcessStatus::Stopped(code);
                    self.pid = None;
                    self.child = None;
                    let _ = self
                        .event_tx
                        .send((self.config.name.clone(), ProcessEvent::Exited { code }));
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!(
                        "[{}] Error checking process status: {}",
                        self.config.name,
                        e
                    );
                }
            }
        }

        self.status
    }

    pub fn uptime(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }
}

/// Errors that can occur with managed processes
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Process '{0}' is already running")]
    AlreadyRunning(String),

    #[error("Failed to spawn process '{name}': {source}")]
    SpawnFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
