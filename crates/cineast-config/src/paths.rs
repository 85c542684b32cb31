use anyhow::Result;
use std::path::{Path, PathBuf};

/// Get the base path override from the environment, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("CINEAST_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("cineast");

        Ok(Self::with_base(base_dir))
    }

    /// Lay out config, data and logs under a single directory
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn from_env() -> Self {
        Self::with_base(container_base_path())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    /// Reviewed flags and consent
    pub fn flags_file(&self) -> PathBuf {
        self.data_dir.join("flags.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("cineast.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // An explicit base path wins; otherwise use platform paths (~/.config/cineast on Linux)
        if std::env::var_os("CINEAST_BASE_PATH").is_some() {
            return Self::from_env();
        }
        Self::new().unwrap_or_else(|_| Self::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::with_base(PathBuf::from("/tmp/cineast-test"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/cineast-test/config.toml"));
        assert_eq!(paths.flags_file(), PathBuf::from("/tmp/cineast-test/data/flags.toml"));
        assert_eq!(paths.log_file(), PathBuf::from("/tmp/cineast-test/logs/cineast.log"));
    }
}
