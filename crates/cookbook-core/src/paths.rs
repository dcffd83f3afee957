//! Standard paths used by the cookbook front end

use std::path::PathBuf;

/// Standard cookbook paths
pub struct Paths {
    /// Data directory (~/.local/share/cookbook)
    pub data: PathBuf,
    /// Config directory (~/.config/cookbook)
    pub config: PathBuf,
    /// Directory that alias links are installed into (~/.local/bin)
    pub bin: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("cookbook");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("cookbook");

        let bin = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(".local/bin");

        Self { data, config, bin }
    }

    /// Config file path, honouring `COOKBOOK_CONFIG`
    pub fn config_file(&self) -> PathBuf {
        if let Ok(path) = std::env::var("COOKBOOK_CONFIG") {
            return PathBuf::from(path);
        }
        self.config.join("config.yaml")
    }
}
