use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};

const MEMORY_URL: &str = "sqlite::memory:";

/// Where the local key-value store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    Memory,
    File(PathBuf),
}

impl DbLocation {
    /// Accepts `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>` or a bare
    /// path. Relative paths resolve against `cwd`. Query strings are dropped.
    pub fn parse(raw: &str, cwd: &Path) -> Option<Self> {
        let raw = raw.trim();
        if raw == MEMORY_URL {
            return Some(Self::Memory);
        }
        let rest = raw
            .strip_prefix("sqlite://")
            .or_else(|| raw.strip_prefix("sqlite:"))
            .unwrap_or(raw);
        let path = rest.split('?').next().unwrap_or_default();
        if path.is_empty() {
            return None;
        }
        let path = Path::new(path);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        Some(Self::File(path))
    }

    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Memory => MEMORY_URL.to_string(),
            Self::File(path) => format!("sqlite://{}", path.display()),
        }
    }

    /// Create the parent directory and an empty file so the pool can open it.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn ensure_exists(&self) -> io::Result<()> {
        let Self::File(path) = self else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(drop)
    }
}
