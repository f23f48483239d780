//! Launch executor - spawns directives in order and supervises them

use crate::composer::{LaunchDescription, OutputSink, ProcessDirective};
use crate::registry::{LocateError, PackageLocator};
use crate::runtime::process::{ManagedProcess, ProcessConfig, ProcessError, ProcessEvent};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Launch executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Graceful shutdown timeout per process
    pub shutdown_timeout: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Translate a directive into its node command line
///
/// Follows the ROS 2 node CLI contract: the instance name and namespace are
/// bound with `-r __node:=` / `-r __ns:=`, parameter files with
/// `--params-file`, and topic remappings with `-r from:=to`.
pub fn node_args(directive: &ProcessDirective) -> Vec<String> {
    let mut args = vec![
        "--ros-args".to_string(),
        "-r".to_string(),
        format!("__node:={}", directive.name),
    ];

    if let Some(ns) = &directive.namespace {
        args.push("-r".to_string());
        args.push(format!("__ns:=/{}", ns.trim_start_matches('/')));
    }

    for path in &directive.parameters {
        args.push("--params-file".to_string());
        args.push(path.display().to_string());
    }

    for remap in &directive.remappings {
        args.push("-r".to_string());
        args.push(format!("{}:={}", remap.from, remap.to));
    }

    args
}

/// Spawns the directives of a launch description in list order, forwards
/// their output, and shuts them down in reverse order.
pub struct Executor {
    config: ExecutorConfig,
    processes: Vec<ManagedProcess>,
    sinks: HashMap<String, OutputSink>,
    event_rx: mpsc::UnboundedReceiver<(String, ProcessEvent)>,
}

/// Launch plan for dry-run mode
#[derive(Debug)]
pub struct LaunchPlan {
    pub nodes: Vec<LaunchPlanNode>,
}

/// A node in the launch plan with its fully resolved command
#[derive(Debug)]
pub struct LaunchPlanNode {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
}

impl Executor {
    /// Create an executor, resolving every directive's executable up front
    ///
    /// Resolution failures abort before anything is spawned.
    pub fn new(
        description: &LaunchDescription,
        locator: &dyn PackageLocator,
        config: ExecutorConfig,
    ) -> Result<Self, ExecutorError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut processes = Vec::with_capacity(description.len());
        let mut sinks = HashMap::new();

        for directive in description.iter() {
            let command = locator
                .resolve_executable(&directive.package, &directive.executable)
                .map_err(|source| ExecutorError::ExecutableResolution {
                    node: directive.name.clone(),
                    source,
                })?;

            let process_config = ProcessConfig {
                name: directive.name.clone(),
                command,
                args: node_args(directive),
            };

            sinks.insert(directive.name.clone(), directive.output);
            processes.push(ManagedProcess::new(process_config, event_tx.clone()));
        }

        Ok(Self {
            config,
            processes,
            sinks,
            event_rx,
        })
    }

    /// Generate a launch plan (for dry-run mode)
    pub fn plan(&self) -> LaunchPlan {
        LaunchPlan {
            nodes: self
                .processes
                .iter()
                .map(|p| LaunchPlanNode {
                    name: p.config.name.clone(),
                    command: p.config.command.clone(),
                    args: p.config.args.clone(),
                })
                .collect(),
        }
    }

    /// Spawn all processes in list order
    pub fn launch(&mut self, shutdown_rx: &watch::Receiver<()>) -> Result<(), ExecutorError> {
        log::info!("Launching {} nodes...", self.processes.len());

        for process in &mut self.processes {
            if shutdown_rx.has_changed().unwrap_or(false) {
                log::info!("Shutdown requested, aborting launch");
                break;
            }

            let name = process.config.name.clone();
            process
                .start()
                .map_err(|source| ExecutorError::ProcessFailed { node: name, source })?;
        }

        Ok(())
    }

    /// Wait until all processes exit or the shutdown signal fires
    pub async fn wait(&mut self, mut shutdown_rx: watch::Receiver<()>) {
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    log::info!("Shutdown signal received");
                    break;
                }

                event = self.event_rx.recv() => {
                    if let Some((name, event)) = event {
                        match event {
                            ProcessEvent::Output { line, is_stderr } => {
                                match self.sinks.get(&name).copied().unwrap_or_default() {
                                    OutputSink::Screen if is_stderr => {
                                        log::warn!("[{}] {}", name, line)
                                    }
                                    OutputSink::Screen => log::info!("[{}] {}", name, line),
                                    OutputSink::Log => log::debug!("[{}] {}", name, line),
                                }
                            }
                            ProcessEvent::Started { pid } => {
                                log::info!("[{}] Process started with PID: {}", name, pid);
                            }
                            ProcessEvent::Exited { code } => {
                                log::info!("[{}] Process exited with code: {:?}", name, code);
                            }
                            ProcessEvent::Failed { error } => {
                                log::error!("[{}] Process failed: {}", name, error);
                            }
                        }
                    }
                }

                _ = tokio::time::sleep(Duration::from_secs(1)) => {
                    let all_stopped = self
                        .processes
                        .iter_mut()
                        .all(|p| !p.check_status().is_running());
                    if all_stopped {
                        log::info!("All processes have stopped");
                        break;
                    }
                }
            }
        }
    }

    /// Stop all processes in reverse launch order
    pub async fn shutdown(&mut self) {
        log::info!("Shutting down all processes...");

        for process in self.processes.iter_mut().rev() {
            if process.status.is_running() {
                if let Err(e) = process.stop(self.config.shutdown_timeout).await {
                    log::error!("[{}] Error stopping process: {}", process.config.name, e);
                }
            }
        }

        log::info!("All processes shut down");
    }
}

/// Errors that can occur in the executor
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("Failed to resolve executable for node '{node}': {source}")]
    ExecutableResolution {
        node: String,
        #[source]
        source: LocateError,
    },

    #[error("Process failed for node '{node}': {source}")]
    ProcessFailed {
        node: String,
        #[source]
        source: ProcessError,
    },
}

impl std::fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Launch Plan")?;
        writeln!(f, "===========")?;

        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "  {}. {}", i + 1, node.name)?;
            writeln!(
                f,
                "     Command: {} {}",
                node.command.display(),
                node.args.join(" ")
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::default_description;
    use crate::registry::PackageLocator;

    /// Fake locator mapping every executable to a fixed command
    struct FakeLocator {
        command: PathBuf,
    }

    impl PackageLocator for FakeLocator {
        fn resolve_share_dir(&self, package: &str) -> Result<PathBuf, LocateError> {
            Ok(PathBuf::from("/opt/install/share").join(package))
        }

        fn resolve_executable(
            &self,
            _package: &str,
            _executable: &str,
        ) -> Result<PathBuf, LocateError> {
            Ok(self.command.clone())
        }
    }

    struct EmptyLocator;

    impl PackageLocator for EmptyLocator {
        fn resolve_share_dir(&self, package: &str) -> Result<PathBuf, LocateError> {
            Err(LocateError::PackageNotFound {
                package: package.to_string(),
                searched: Vec::new(),
            })
        }

        fn resolve_executable(
            &self,
            package: &str,
            executable: &str,
        ) -> Result<PathBuf, LocateError> {
            Err(LocateError::ExecutableNotFound {
                package: package.to_string(),
                executable: executable.to_string(),
                searched: Vec::new(),
            })
        }
    }

    #[test]
    fn test_node_args_for_sonar_directive() {
        let locator = FakeLocator {
            command: PathBuf::from("/bin/true"),
        };
        let description = default_description(&locator).unwrap();
        let args = node_args(&description.directives()[0]);

        assert_eq!(
            args,
            vec![
                "--ros-args",
                "-r",
                "__node:=oculus_sonar",
                "-r",
                "__ns:=/sonar",
                "--params-file",
                "/opt/install/share/oculus_ros2/cfg/default.yaml",
                "-r",
                "status:=status",
                "-r",
                "ping:=ping",
                "-r",
                "temperature:=temperature",
                "-r",
                "pressure:=pressure",
            ]
        );
    }

    #[test]
    fn test_node_args_for_bare_directive() {
        let directive = ProcessDirective::new("rqt_gui", "rqt_gui");
        assert_eq!(node_args(&directive), vec!["--ros-args", "-r", "__node:=rqt_gui"]);
    }

    #[test]
    fn test_executor_resolution_failure() {
        let description = default_description(&FakeLocator {
            command: PathBuf::from("/bin/true"),
        })
        .unwrap();

        let result = Executor::new(&description, &EmptyLocator, ExecutorConfig::default());
        assert!(matches!(
            result,
            Err(ExecutorError::ExecutableResolution { .. })
        ));
    }

    #[test]
    fn test_plan_lists_nodes_in_order() {
        let locator = FakeLocator {
            command: PathBuf::from("/bin/true"),
        };
        let description = default_description(&locator).unwrap();
        let executor = Executor::new(&description, &locator, ExecutorConfig::default()).unwrap();

        let plan = executor.plan();
        let names: Vec<_> = plan.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["oculus_sonar", "rqt_gui", "rqt_reconfigure"]);

        let rendered = plan.to_string();
        assert!(rendered.contains("Command: /bin/true --ros-args -r __node:=oculus_sonar"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_and_wait_until_exit() {
        let locator = FakeLocator {
            command: PathBuf::from("/bin/true"),
        };
        let mut description = LaunchDescription::new();
        description.add(ProcessDirective::new("pkg", "short_lived"));

        let mut executor =
            Executor::new(&description, &locator, ExecutorConfig::default()).unwrap();

        let (_shutdown_tx, shutdown_rx) = watch::channel(());
        executor.launch(&shutdown_rx).unwrap();

        // /bin/true exits immediately; wait() returns once it is reaped
        tokio::time::timeout(Duration::from_secs(10), executor.wait(shutdown_rx))
            .await
            .expect("processes should exit");

        executor.shutdown().await;
    }
}
