//! Testing utilities for config loading.
//!
//! Provides a deterministic [`FakeEnvironment`] so expansion behavior can be
//! tested without touching the process environment or spawning shells.

use std::collections::HashMap;

use crate::expand::Environment;

/// Scripted [`Environment`]: fixed variables and canned command results.
///
/// # Example
/// ```ignore
/// let env = FakeEnvironment::new()
///     .with_var("HOST", "localhost")
///     .with_command("echo hello", "hello\n");
/// ```
#[derive(Debug, Default)]
pub struct FakeEnvironment {
    vars: HashMap<String, String>,
    commands: HashMap<String, Result<String, String>>,
}

impl FakeEnvironment {
    /// Creates an environment with no variables and no known commands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Script a command to succeed with the given stdout.
    pub fn with_command(mut self, command: impl Into<String>, stdout: impl Into<String>) -> Self {
        self.commands.insert(command.into(), Ok(stdout.into()));
        self
    }

    /// Script a command to fail with the given error message.
    pub fn with_failing_command(
        mut self,
        command: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        self.commands.insert(command.into(), Err(error.into()));
        self
    }
}

impl Environment for FakeEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn execute(&self, command: &str) -> anyhow::Result<String> {
        match self.commands.get(command) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(message)) => Err(anyhow::anyhow!("{message}")),
            None => Err(anyhow::anyhow!("unexpected command: {command}")),
        }
    }
}
