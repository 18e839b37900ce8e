//! Configuration loading and data-folder resolution

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable overriding the data folder.
pub const DATA_ENV_VAR: &str = "CIIT_DATA";

/// Data folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. `CIIT_DATA` environment variable
/// 3. TOML config file (`data_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_ENV_VAR) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(data_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_data_folder())
}

/// Locate the per-user config file (`~/.config/ciit/config.toml` or the
/// platform equivalent).
fn find_config_file() -> Result<PathBuf> {
    let path = dirs::config_dir()
        .map(|d| d.join("ciit").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default data folder (e.g. `~/.local/share/ciit` on Linux).
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ciit"))
        .unwrap_or_else(|| PathBuf::from("./ciit_data"))
}

/// On-disk layout of the data folder.
///
/// One YAML file per concept, one file each for the topic and barrier lists,
/// one JSON file per session, and uploaded concept images under `images/`.
#[derive(Debug, Clone)]
pub struct DataFolders {
    root: PathBuf,
}

impl DataFolders {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn concepts_dir(&self) -> PathBuf {
        self.root.join("concepts")
    }

    pub fn topics_file(&self) -> PathBuf {
        self.root.join("topics.yaml")
    }

    pub fn barriers_file(&self) -> PathBuf {
        self.root.join("barriers.yaml")
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Create the writable directories if they are missing. The catalog files
    /// themselves are authored content and are not created here; a missing
    /// catalog loads as empty.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(self.concepts_dir())?;
        std::fs::create_dir_all(self.sessions_dir())?;
        std::fs::create_dir_all(self.images_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_takes_priority() {
        let folder = resolve_data_folder(Some("/tmp/ciit-cli")).unwrap();
        assert_eq!(folder, PathBuf::from("/tmp/ciit-cli"));
    }

    #[test]
    fn ensure_directories_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let folders = DataFolders::new(dir.path());
        folders.ensure_directories().unwrap();
        assert!(folders.concepts_dir().is_dir());
        assert!(folders.sessions_dir().is_dir());
        assert!(folders.images_dir().is_dir());
    }
}
