//! Shell glue generation
//!
//! `cookbook shell-init bash|fish` prints one function per alias so users can
//! keep typing `recipe-cook dill` directly at the prompt.

use clap::ValueEnum;
use cookbook_core::AliasTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Fish,
}

impl Shell {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Fish => "fish",
        }
    }

    /// Guess from `$SHELL`, defaulting to bash
    pub fn detect() -> Self {
        match std::env::var("SHELL") {
            Ok(s) if s.ends_with("fish") => Self::Fish,
            _ => Self::Bash,
        }
    }
}

pub fn generate(shell: Shell, table: &AliasTable, program: &str) -> String {
    let mut out = format!("# cookbook aliases for {}\n", shell.as_str());
    match shell {
        Shell::Bash => out.push_str(&generate_bash(table, program)),
        Shell::Fish => out.push_str(&generate_fish(table, program)),
    }
    out
}

fn generate_bash(table: &AliasTable, program: &str) -> String {
    let program = single_quote(program);
    let mut out = String::from(
        "# Add to ~/.bashrc:  eval \"$(cookbook shell-init bash)\"\n\n",
    );

    for entry in table.iter() {
        out.push_str(&format!(
            "{}() {{ {} {} \"$@\"; }}\n",
            entry.name, program, entry.name
        ));
    }

    out.push_str(&format!("\ncookbook-help() {{ {} aliases; }}\n", program));
    out
}

fn generate_fish(table: &AliasTable, program: &str) -> String {
    let program = single_quote(program);
    let mut out = String::from(
        "# Add to ~/.config/fish/config.fish:  cookbook shell-init fish | source\n\n",
    );

    for entry in table.iter() {
        let description = if entry.summary.is_empty() {
            entry.canonical_form()
        } else {
            entry.summary.clone()
        };
        out.push_str(&format!(
            "function {} --description {}\n    {} {} $argv\nend\n",
            entry.name,
            single_quote(&description),
            program,
            entry.name
        ));
    }

    out.push_str(&format!(
        "\nfunction cookbook-help --description 'List cookbook aliases'\n    {} aliases\nend\n",
        program
    ));
    out
}

/// Single-quote in the POSIX `'\''` style, which fish also accepts
fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
