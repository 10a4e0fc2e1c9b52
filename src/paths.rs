//! XDG-compliant path resolution for sakura-cycle.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Application directory name under each XDG base directory.
pub const APP_DIR: &str = "sakura-cycle";

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(sakura::paths::no_home),
        help("Set the HOME environment variable.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(sakura::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SakuraPaths {
    /// `$XDG_CONFIG_HOME/sakura-cycle/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/sakura-cycle/`
    pub data_dir: PathBuf,
}

impl SakuraPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join(APP_DIR);

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join(APP_DIR);

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Create both base directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_paths_use_app_dir() {
        // Env vars are not mutated here (unsafe in edition 2024).
        if std::env::var("HOME").is_err() {
            return;
        }
        let paths = SakuraPaths::resolve().unwrap();
        assert!(paths.config_dir.ends_with(APP_DIR));
        assert!(paths.data_dir.ends_with(APP_DIR));
        assert!(paths.config_file().starts_with(&paths.config_dir));
    }

    #[test]
    fn ensure_dirs_creates_both() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = SakuraPaths {
            config_dir: dir.path().join("cfg").join(APP_DIR),
            data_dir: dir.path().join("data").join(APP_DIR),
        };
        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();
        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
    }
}
