//! Configuration management for the cookbook front end
//!
//! Everything is optional: a missing file means defaults, and the
//! `COOKBOOK_ROOT` / `COOKBOOK_PYTHON` environment variables win over the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::alias::{AliasEntry, AliasTable};
use crate::error::{Error, Result};
use crate::paths::Paths;

/// Front-end configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the tool script and its virtual environment
    #[serde(default)]
    pub project_root: Option<PathBuf>,

    /// How to find and start the external tool
    #[serde(default)]
    pub tool: ToolConfig,

    /// Reject ID-taking aliases called without an argument
    #[serde(default)]
    pub strict_ids: bool,

    /// Extra aliases registered after the built-in ones
    #[serde(default)]
    pub aliases: Vec<AliasEntry>,
}

/// External tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Tool script, relative to the project root unless absolute
    #[serde(default = "default_script")]
    pub script: PathBuf,

    /// Explicit interpreter; skips discovery when set
    #[serde(default)]
    pub interpreter: Option<PathBuf>,

    /// Virtual environment directories searched under the project root
    #[serde(default = "default_venv_dirs")]
    pub venv_dirs: Vec<String>,
}

fn default_script() -> PathBuf {
    PathBuf::from("cli.py")
}

fn default_venv_dirs() -> Vec<String> {
    vec!["venv".to_string(), ".venv".to_string()]
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            script: default_script(),
            interpreter: None,
            venv_dirs: default_venv_dirs(),
        }
    }
}

impl Config {
    /// Load from the standard location and apply environment overrides
    pub fn load(paths: &Paths) -> Result<Self> {
        let mut config = load_config(&paths.config_file())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `COOKBOOK_ROOT` / `COOKBOOK_PYTHON` from the environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var("COOKBOOK_ROOT").ok(),
            std::env::var("COOKBOOK_PYTHON").ok(),
        );
    }

    /// Apply `COOKBOOK_ROOT` / `COOKBOOK_PYTHON` style overrides
    pub fn apply_overrides(&mut self, root: Option<String>, python: Option<String>) {
        if let Some(root) = root.filter(|r| !r.is_empty()) {
            self.project_root = Some(PathBuf::from(root));
        }
        if let Some(python) = python.filter(|p| !p.is_empty()) {
            self.tool.interpreter = Some(PathBuf::from(python));
        }
    }

    /// Configured project root, or the current directory
    pub fn project_root(&self) -> PathBuf {
        self.project_root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Build the alias table: built-ins first, then config extras.
    ///
    /// An extra that reuses a built-in name fails with `DuplicateAlias`; one
    /// that takes a name in `reserved` (front-end commands) fails with
    /// `InvalidAlias`, since it could never be routed.
    pub fn alias_table(&self, reserved: &[&str]) -> Result<AliasTable> {
        let mut table = AliasTable::builtin();
        for entry in &self.aliases {
            if reserved.contains(&entry.name.as_str()) {
                return Err(Error::InvalidAlias(format!(
                    "{} is a reserved command name",
                    entry.name
                )));
            }
            table.register(entry.clone())?;
        }
        Ok(table)
    }
}

/// Load config from a file, defaulting when it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&content).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("config.yaml")).unwrap();
        assert!(config.project_root.is_none());
        assert_eq!(config.tool.script, PathBuf::from("cli.py"));
        assert_eq!(config.tool.venv_dirs, vec!["venv", ".venv"]);
        assert!(!config.strict_ids);
    }

    #[test]
    fn test_parse_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            r#"
project_root: /srv/cookbook
tool:
  script: bin/cli.py
  interpreter: /usr/bin/python3.12
strict_ids: true
aliases:
  - name: recipe-stats
    canonical: [stats]
    summary: Show database statistics
  - name: art-edit
    canonical: [article, edit]
    inject_id: true
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.project_root, Some(PathBuf::from("/srv/cookbook")));
        assert_eq!(config.tool.script, PathBuf::from("bin/cli.py"));
        assert_eq!(config.tool.interpreter, Some(PathBuf::from("/usr/bin/python3.12")));
        // Unset keys inside a present section still default
        assert_eq!(config.tool.venv_dirs, vec!["venv", ".venv"]);
        assert!(config.strict_ids);
        assert_eq!(config.aliases.len(), 2);
        assert!(config.aliases[1].inject_id);

        let table = config.alias_table(&[]).unwrap();
        assert!(table.contains("recipe-stats"));
        assert!(table.contains("recipe-cook"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "strict_ids: [not, a, bool\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "\n").unwrap();
        assert!(load_config(&path).unwrap().aliases.is_empty());
    }

    #[test]
    fn test_extra_alias_clashing_with_builtin() {
        let config = Config {
            aliases: vec![AliasEntry::new("backup", ["stats"]).unwrap()],
            ..Config::default()
        };
        assert!(matches!(config.alias_table(&[]), Err(Error::DuplicateAlias(ref n)) if n == "backup"));
    }

    #[test]
    fn test_extra_alias_with_reserved_name() {
        let config = Config {
            aliases: vec![
                AliasEntry::new("recipe-stats", ["stats"]).unwrap(),
                AliasEntry::new("doctor", ["stats"]).unwrap(),
            ],
            ..Config::default()
        };
        let reserved = ["doctor", "link"];
        assert!(matches!(
            config.alias_table(&reserved),
            Err(Error::InvalidAlias(ref msg)) if msg.contains("doctor")
        ));
        // Without reservations the same name is an ordinary alias
        assert!(config.alias_table(&[]).unwrap().contains("doctor"));
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("/opt/cookbook".into()), Some(String::new()));
        assert_eq!(config.project_root(), PathBuf::from("/opt/cookbook"));
        assert!(config.tool.interpreter.is_none());

        config.apply_overrides(None, Some("/usr/local/bin/python3".into()));
        assert_eq!(config.project_root(), PathBuf::from("/opt/cookbook"));
        assert_eq!(config.tool.interpreter, Some(PathBuf::from("/usr/local/bin/python3")));
    }
}
