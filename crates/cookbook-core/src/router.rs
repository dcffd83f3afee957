//! Alias resolution and invocation
//!
//! `resolve` is a pure function of (table, name, args). `invoke` adds the one
//! effectful step: starting the external tool through a [`Launcher`].

use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::alias::{AliasEntry, AliasTable, ID_FLAG};
use crate::error::{Error, Result};
use crate::process::{Launcher, SystemLauncher};
use crate::tool::ToolCommand;

/// A fully resolved command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Executable to start
    pub program: PathBuf,
    /// Tool-selecting tokens (e.g. the script path)
    pub prefix: Vec<String>,
    /// Canonical arguments followed by the transformed user arguments
    pub args: Vec<String>,
}

impl Invocation {
    /// Full token vector: `[program, prefix..., args...]`
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.prefix.iter().cloned())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.argv().iter().map(|t| quote(t)).collect();
        write!(f, "{}", quoted.join(" "))
    }
}

/// Quote a token for display so the line can be pasted into a shell
fn quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Outcome of a successful invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
}

/// Maps alias invocations onto the external tool
pub struct AliasRouter<L = SystemLauncher> {
    table: AliasTable,
    tool: ToolCommand,
    strict_ids: bool,
    launcher: L,
}

impl AliasRouter<SystemLauncher> {
    pub fn new(table: AliasTable, tool: ToolCommand) -> Self {
        Self::with_launcher(table, tool, SystemLauncher)
    }
}

impl<L: Launcher> AliasRouter<L> {
    pub fn with_launcher(table: AliasTable, tool: ToolCommand, launcher: L) -> Self {
        Self {
            table,
            tool,
            strict_ids: false,
            launcher,
        }
    }

    /// Reject ID-taking aliases called with no arguments
    pub fn strict_ids(mut self, strict: bool) -> Self {
        self.strict_ids = strict;
        self
    }

    /// Add an entry during start-up; fails if the name is taken
    pub fn register(&mut self, entry: AliasEntry) -> Result<()> {
        self.table.register(entry)
    }

    pub fn table(&self) -> &AliasTable {
        &self.table
    }

    pub fn tool(&self) -> &ToolCommand {
        &self.tool
    }

    /// Resolve an alias and its user arguments into a command line
    pub fn resolve<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Result<Invocation> {
        let entry = self
            .table
            .get(name)
            .ok_or_else(|| Error::UnknownAlias(name.to_string()))?;

        let mut resolved: Vec<String> = entry.canonical_args.clone();
        let user = args.iter().map(|a| a.as_ref().to_string());

        match args.split_first() {
            Some((id, rest)) if entry.inject_id => {
                resolved.push(ID_FLAG.to_string());
                resolved.push(id.as_ref().to_string());
                resolved.extend(rest.iter().map(|a| a.as_ref().to_string()));
            }
            None if entry.inject_id => {
                if self.strict_ids {
                    return Err(Error::MissingId(name.to_string()));
                }
                warn!(alias = name, "no ID given; passing through without {}", ID_FLAG);
            }
            _ => resolved.extend(user),
        }

        let invocation = Invocation {
            program: self.tool.program.clone(),
            prefix: self.tool.prefix.clone(),
            args: resolved,
        };
        debug!(alias = name, command = %invocation, "resolved alias");
        Ok(invocation)
    }

    /// Resolve and run an alias, blocking until the tool exits.
    ///
    /// A non-zero exit becomes `ExternalTool` carrying the tool's own status.
    pub fn invoke<S: AsRef<str>>(&self, name: &str, args: &[S]) -> Result<ExecutionResult> {
        let invocation = self.resolve(name, args)?;

        if has_path(&invocation.program) && !invocation.program.exists() {
            return Err(Error::ExecutableNotFound(invocation.program));
        }

        match self.launcher.launch(&invocation)? {
            0 => Ok(ExecutionResult { exit_code: 0 }),
            exit_code => Err(Error::ExternalTool { exit_code }),
        }
    }
}

fn has_path(program: &std::path::Path) -> bool {
    program.is_absolute() || program.components().count() > 1
}
