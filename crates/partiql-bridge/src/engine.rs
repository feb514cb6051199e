//! How to launch the engine.

use std::fmt;
use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Program plus leading arguments used to launch the engine.
///
/// Mode-specific arguments (the worker flag, the environment file, ...) are
/// appended after these by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl EngineCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// `java -jar <jar>`, the packaged engine.
    pub fn java_jar(java: impl Into<PathBuf>, jar: &Path) -> Self {
        Self::new(java)
            .arg("-jar")
            .arg(jar.display().to_string())
    }

    /// Append a leading argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// A fresh process builder with the program and leading arguments set.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
