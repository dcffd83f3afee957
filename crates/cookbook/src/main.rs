//! cookbook - Short commands for the recipe database tool
//!
//! `cookbook recipe-cook dill` runs `python cli.py recipe cook dill` with the
//! project's interpreter. The same binary answers to every alias name when
//! linked under that name, and can print bash/fish functions for all of them.

mod shell;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use cookbook_core::{tool, AliasRouter, AliasTable, Config, Error, Paths, ToolCommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use shell::Shell;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BIN_NAME: &str = "cookbook";

/// Names the front end handles itself; config aliases may not take them
const RESERVED: &[&str] = &[
    BIN_NAME,
    "cookbook-help",
    "aliases",
    "resolve",
    "shell-init",
    "link",
    "doctor",
    "version",
];

/// Short commands for the recipe database tool
#[derive(Parser)]
#[command(name = "cookbook")]
#[command(version = VERSION)]
#[command(about = "Short commands for the recipe database tool")]
#[command(disable_help_subcommand = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Log resolution and process details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Alias to run, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every alias and its canonical form
    Aliases {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the command an alias would run, without running it
    Resolve {
        alias: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print shell functions for every alias
    ShellInit {
        /// Shell type (defaults to $SHELL)
        #[arg(value_enum)]
        shell: Option<Shell>,
    },

    /// Create alias-named links to this binary
    Link {
        /// Target directory (defaults to ~/.local/bin)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Replace existing files
        #[arg(long)]
        force: bool,
    },

    /// Check configuration, interpreter and tool script
    Doctor,

    /// Show version information
    Version,
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red(), err);
            err.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let paths = Paths::new();
    let loaded = Config::load(&paths);

    // Multi-call: invoked through a link named after an alias
    let argv0 = std::env::args_os().next().unwrap_or_default();
    if let Some(alias) = link_alias(&argv0, &loaded) {
        init_logging(false);
        tracing::debug!(alias = %alias, "dispatching from link name");
        let (config, table) = load_table(loaded)?;
        let args: Vec<String> = std::env::args().skip(1).collect();
        return dispatch(&config, table, &alias, &args);
    }

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(command) = cli.command {
        return match command {
            // Both work without a usable config
            Commands::Doctor => cmd_doctor(&paths, loaded),
            Commands::Version => cmd_version(),
            Commands::Aliases { json } => cmd_aliases(&load_table(loaded)?.1, json),
            Commands::Resolve { alias, args } => {
                let (config, table) = load_table(loaded)?;
                cmd_resolve(&config, table, &alias, &args)
            }
            Commands::ShellInit { shell } => cmd_shell_init(&load_table(loaded)?.1, shell),
            Commands::Link { dir, force } => {
                cmd_link(&load_table(loaded)?.1, dir.unwrap_or(paths.bin), force)
            }
        };
    }

    let (config, table) = load_table(loaded)?;
    let Some((alias, args)) = cli.args.split_first() else {
        return cmd_aliases(&table, false);
    };

    dispatch(&config, table, alias, args)
}

fn load_table(loaded: cookbook_core::Result<Config>) -> Result<(Config, AliasTable)> {
    let config = loaded?;
    let table = config.alias_table(RESERVED)?;
    Ok((config, table))
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout belongs to the external tool
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Alias named by argv[0], when the binary runs under a link.
///
/// Decided before the table is built so a broken config still surfaces as an
/// error for a linked alias instead of falling through to the clap parser.
fn link_alias(argv0: &OsStr, loaded: &cookbook_core::Result<Config>) -> Option<String> {
    let name = Path::new(argv0).file_name()?.to_str()?.to_string();
    if RESERVED.contains(&name.as_str()) {
        return None;
    }
    let from_config = loaded
        .as_ref()
        .map(|c| c.aliases.iter().any(|e| e.name == name))
        .unwrap_or(false);
    (from_config || AliasTable::builtin().contains(&name)).then_some(name)
}

fn build_router(config: &Config, table: AliasTable) -> Result<AliasRouter> {
    let tool = ToolCommand::discover(config)?;
    Ok(AliasRouter::new(table, tool).strict_ids(config.strict_ids))
}

fn dispatch(config: &Config, table: AliasTable, alias: &str, args: &[String]) -> Result<i32> {
    if !table.contains(alias) {
        return Ok(usage_error(&Error::UnknownAlias(alias.to_string())));
    }

    let router = build_router(config, table)?;
    match router.invoke(alias, args) {
        Ok(result) => Ok(result.exit_code),
        // The tool has already reported its own failure
        Err(Error::ExternalTool { exit_code }) => Ok(exit_code),
        Err(err) if err.is_usage() => Ok(usage_error(&err)),
        Err(err) => Err(err.into()),
    }
}

fn usage_error(err: &Error) -> i32 {
    eprintln!("{} {}", "error:".red(), err);
    eprintln!("Run {} for the list of aliases", "cookbook aliases".bold());
    err.exit_code()
}

fn cmd_aliases(table: &AliasTable, json: bool) -> Result<i32> {
    #[derive(Serialize)]
    struct AliasInfo<'a> {
        name: &'a str,
        canonical: &'a [String],
        inject_id: bool,
        summary: &'a str,
    }

    if json {
        let infos: Vec<AliasInfo> = table
            .iter()
            .map(|e| AliasInfo {
                name: &e.name,
                canonical: &e.canonical_args,
                inject_id: e.inject_id,
                summary: &e.summary,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(0);
    }

    println!("{}", "Cookbook Aliases".bold());
    println!("================");
    println!();

    for entry in table.iter() {
        println!(
            "    {:16} {:28} {}",
            entry.name.cyan(),
            entry.canonical_form(),
            entry.summary.dimmed()
        );
    }

    println!();
    println!("{} aliases", table.len());
    Ok(0)
}

fn cmd_resolve(config: &Config, table: AliasTable, alias: &str, args: &[String]) -> Result<i32> {
    if !table.contains(alias) {
        return Ok(usage_error(&Error::UnknownAlias(alias.to_string())));
    }

    let tool = match ToolCommand::discover(config) {
        Ok(tool) => tool,
        // A dry run is still useful when the tool is missing
        Err(Error::ExecutableNotFound(path)) => {
            eprintln!("{}  not found: {}", "!".yellow(), path.display());
            placeholder_tool(config)
        }
        Err(err) => return Err(err.into()),
    };

    let router = AliasRouter::new(table, tool).strict_ids(config.strict_ids);
    match router.resolve(alias, args) {
        Ok(invocation) => {
            println!("{}", invocation);
            Ok(0)
        }
        Err(err) if err.is_usage() => Ok(usage_error(&err)),
        Err(err) => Err(err.into()),
    }
}

/// Tool command as configured, without checking that anything exists
fn placeholder_tool(config: &Config) -> ToolCommand {
    let program = config
        .tool
        .interpreter
        .clone()
        .unwrap_or_else(|| PathBuf::from("python3"));
    let script = config.project_root().join(&config.tool.script);
    ToolCommand::new(program, vec![script.to_string_lossy().into_owned()])
}

fn cmd_shell_init(table: &AliasTable, shell: Option<Shell>) -> Result<i32> {
    let shell = shell.unwrap_or_else(Shell::detect);
    let program = std::env::current_exe()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| BIN_NAME.to_string());

    print!("{}", shell::generate(shell, table, &program));
    Ok(0)
}

#[cfg(unix)]
fn cmd_link(table: &AliasTable, dir: PathBuf, force: bool) -> Result<i32> {
    let exe = std::env::current_exe().context("Could not locate the cookbook binary")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut created = 0;
    let mut skipped = 0;

    for entry in table.iter() {
        let link = dir.join(&entry.name);
        if link.symlink_metadata().is_ok() {
            if !force {
                println!("{}  {} exists, skipped", "!".yellow(), link.display());
                skipped += 1;
                continue;
            }
            std::fs::remove_file(&link)
                .with_context(|| format!("Failed to replace {}", link.display()))?;
        }

        std::os::unix::fs::symlink(&exe, &link)
            .with_context(|| format!("Failed to link {}", link.display()))?;
        created += 1;
    }

    println!(
        "{} {} links created in {}, {} skipped",
        "ok".green(),
        created,
        dir.display(),
        skipped
    );
    Ok(0)
}

#[cfg(not(unix))]
fn cmd_link(_table: &AliasTable, _dir: PathBuf, _force: bool) -> Result<i32> {
    eprintln!("{} links are only supported on Unix; use shell-init", "error:".red());
    Ok(1)
}

fn cmd_doctor(paths: &Paths, loaded: cookbook_core::Result<Config>) -> Result<i32> {
    println!("{}", "Cookbook Doctor".bold());
    println!("================");
    println!();

    let issues = doctor_checks(&paths.config_file(), loaded);

    println!();
    if issues == 0 {
        println!("{} All checks passed!", "ok".green());
    } else {
        println!("{}  {} issues found", "!".yellow(), issues);
    }

    Ok(0)
}

/// Print each check and return the number of problems found
fn doctor_checks(config_file: &Path, loaded: cookbook_core::Result<Config>) -> usize {
    let mut issues = 0;

    println!("{}", "Checking configuration...".bold());
    let config = match loaded {
        Ok(config) if config_file.exists() => {
            println!("{} {}", "ok".green(), config_file.display());
            config
        }
        Ok(config) => {
            println!(
                "{} {} - not present, using defaults",
                "-".dimmed(),
                config_file.display()
            );
            config
        }
        Err(err) => {
            println!("{}  {}", "!".yellow(), err);
            println!("{} remaining checks use defaults", "-".dimmed());
            issues += 1;
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    let root = config.project_root();
    if root.is_dir() {
        println!("{} project root: {}", "ok".green(), root.display());
    } else {
        println!("{}  project root missing: {}", "!".yellow(), root.display());
        issues += 1;
    }

    println!();
    println!("{}", "Checking external tool...".bold());
    match tool::find_interpreter(&config.tool, &root) {
        Ok(path) => println!("{} interpreter: {}", "ok".green(), path.display()),
        Err(err) => {
            println!("{}  interpreter: {}", "!".yellow(), err);
            issues += 1;
        }
    }
    match tool::find_script(&config.tool, &root) {
        Ok(path) => println!("{} script: {}", "ok".green(), path.display()),
        Err(err) => {
            println!("{}  script: {}", "!".yellow(), err);
            issues += 1;
        }
    }

    println!();
    println!("{}", "Aliases...".bold());
    match config.alias_table(RESERVED) {
        Ok(table) => println!(
            "{} {} registered ({} from config)",
            "ok".green(),
            table.len(),
            config.aliases.len()
        ),
        Err(err) => {
            println!("{}  {}", "!".yellow(), err);
            issues += 1;
        }
    }
    if config.strict_ids {
        println!("{} strict ID checking enabled", "-".dimmed());
    }

    issues
}

fn cmd_version() -> Result<i32> {
    println!("cookbook {}", VERSION);
    Ok(0)
}
