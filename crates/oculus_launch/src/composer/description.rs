//! Launch description data model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A topic name binding from the name a node uses internally to the name
/// it is wired to at runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remapping {
    pub from: String,
    pub to: String,
}

impl Remapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Where a spawned process's output lines are routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSink {
    /// Forward to the console at info/warn level
    #[default]
    Screen,
    /// Forward at debug level only
    Log,
}

/// A single process-start directive
///
/// Built once at description-build time and immutable afterwards; consumed
/// exactly once by the executor that spawns the corresponding OS process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDirective {
    /// Package the executable is installed under
    pub package: String,

    /// Executable name within the package
    pub executable: String,

    /// Node instance name
    pub name: String,

    /// Namespace prefix scoping the node's topic names
    #[serde(default)]
    pub namespace: Option<String>,

    /// Parameter files loaded by the node at startup (handed over opaquely,
    /// never parsed here)
    #[serde(default)]
    pub parameters: Vec<PathBuf>,

    /// Topic remappings, order preserved
    #[serde(default)]
    pub remappings: Vec<Remapping>,

    /// Output sink selector
    #[serde(default)]
    pub output: OutputSink,
}

impl ProcessDirective {
    /// Create a directive for an executable; the instance name defaults to
    /// the executable name until overridden with [`name`](Self::name)
    pub fn new(package: impl Into<String>, executable: impl Into<String>) -> Self {
        let executable = executable.into();
        Self {
            package: package.into(),
            name: executable.clone(),
            executable,
            namespace: None,
            parameters: Vec::new(),
            remappings: Vec::new(),
            output: OutputSink::Screen,
        }
    }

    /// Set the node instance name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Append a parameter file
    pub fn parameters_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.parameters.push(path.into());
        self
    }

    /// Append a topic remapping
    pub fn remap(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.remappings.push(Remapping::new(from, to));
        self
    }

    /// Set the output sink
    pub fn output(mut self, output: OutputSink) -> Self {
        self.output = output;
        self
    }
}

/// An ordered sequence of process-start directives
///
/// Insertion order is significant: the executor spawns directives in list
/// order and shuts them down in reverse. Append-only during construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaunchDescription {
    directives: Vec<ProcessDirective>,
}

impl LaunchDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a directive
    pub fn add(&mut self, directive: ProcessDirective) {
        self.directives.push(directive);
    }

    pub fn directives(&self) -> &[ProcessDirective] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessDirective> {
        self.directives.iter()
    }
}

impl IntoIterator for LaunchDescription {
    type Item = ProcessDirective;
    type IntoIter = std::vec::IntoIter<ProcessDirective>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.into_iter()
    }
}

impl std::fmt::Display for LaunchDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Launch Description")?;
        writeln!(f, "==================")?;

        for (i, directive) in self.directives.iter().enumerate() {
            writeln!(f)?;
            writeln!(
                f,
                "  {}. {} ({}/{})",
                i + 1,
                directive.name,
                directive.package,
                directive.executable
            )?;

            if let Some(ns) = &directive.namespace {
                writeln!(f, "     Namespace: /{}", ns.trim_start_matches('/'))?;
            }

            for path in &directive.parameters {
                writeln!(f, "     Parameters: {}", path.display())?;
            }

            if !directive.remappings.is_empty() {
                let pairs: Vec<String> = directive
                    .remappings
                    .iter()
                    .map(|r| format!("{}:={}", r.from, r.to))
                    .collect();
                writeln!(f, "     Remappings: {}", pairs.join(", "))?;
            }

            let sink = match directive.output {
                OutputSink::Screen => "screen",
                OutputSink::Log => "log",
            };
            writeln!(f, "     Output: {}", sink)?;
        }

        Ok(())
    }
}
