//! External tool discovery
//!
//! Resolved once before the router is built. The router only ever sees the
//! final program path and the tokens that select the tool script.

use std::path::{Path, PathBuf};
use tracing::debug;
use which::which;

use crate::config::{Config, ToolConfig};
use crate::error::{Error, Result};

/// Interpreter names tried on `PATH` when no virtual environment is found
const SYSTEM_INTERPRETERS: &[&str] = &["python3", "python"];

/// A fully resolved external tool: program plus leading arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Executable to start
    pub program: PathBuf,
    /// Tokens placed before the canonical arguments (e.g. the script path)
    pub prefix: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, prefix: Vec<String>) -> Self {
        Self {
            program: program.into(),
            prefix,
        }
    }

    /// A tool that is its own executable, with no leading arguments
    pub fn native(program: impl Into<PathBuf>) -> Self {
        Self::new(program, Vec::new())
    }

    /// Find the interpreter and tool script for a config
    pub fn discover(config: &Config) -> Result<Self> {
        let root = config.project_root();
        let interpreter = find_interpreter(&config.tool, &root)?;
        let script = find_script(&config.tool, &root)?;
        debug!(
            interpreter = %interpreter.display(),
            script = %script.display(),
            "discovered external tool"
        );
        Ok(Self::new(
            interpreter,
            vec![script.to_string_lossy().into_owned()],
        ))
    }
}

/// Pick the interpreter: explicit setting, then a project virtual
/// environment, then the system `python3`/`python`.
pub fn find_interpreter(tool: &ToolConfig, root: &Path) -> Result<PathBuf> {
    if let Some(explicit) = &tool.interpreter {
        return resolve_program(explicit);
    }

    for venv in &tool.venv_dirs {
        let candidate = venv_python(&root.join(venv));
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    SYSTEM_INTERPRETERS
        .iter()
        .find_map(|name| which(name).ok())
        .ok_or_else(|| Error::ExecutableNotFound(PathBuf::from(SYSTEM_INTERPRETERS[0])))
}

/// Locate the tool script under the project root
pub fn find_script(tool: &ToolConfig, root: &Path) -> Result<PathBuf> {
    let script = if tool.script.is_absolute() {
        tool.script.clone()
    } else {
        root.join(&tool.script)
    };

    if script.is_file() {
        Ok(script)
    } else {
        Err(Error::ExecutableNotFound(script))
    }
}

/// Resolve a program given either as a path or as a bare name on `PATH`
pub fn resolve_program(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        if program.is_file() {
            return Ok(program.to_path_buf());
        }
        return Err(Error::ExecutableNotFound(program.to_path_buf()));
    }
    which(program).map_err(|_| Error::ExecutableNotFound(program.to_path_buf()))
}

#[cfg(unix)]
fn venv_python(venv: &Path) -> PathBuf {
    venv.join("bin").join("python")
}

#[cfg(windows)]
fn venv_python(venv: &Path) -> PathBuf {
    venv.join("Scripts").join("python.exe")
}
