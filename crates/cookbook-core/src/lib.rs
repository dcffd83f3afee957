//! Cookbook Core - alias routing for the recipe database command line
//!
//! Short commands like `recipe-cook` or `tag-add` map onto the canonical
//! subcommand grammar of the external recipe tool. This crate owns that
//! mapping and the subprocess boundary; the `cookbook` binary is a thin
//! front end on top of it.

pub mod alias;
pub mod config;
pub mod error;
pub mod paths;
pub mod process;
pub mod router;
pub mod tool;

pub use alias::{AliasEntry, AliasTable};
pub use config::Config;
pub use error::{Error, Result};
pub use paths::Paths;
pub use router::{AliasRouter, ExecutionResult, Invocation};
pub use tool::ToolCommand;
