//! Export output directory
//!
//! Everything a run produces is written below one root directory. Paths
//! derived from remote data (namespace ids, file names) are checked so
//! they cannot escape it.

use crate::export::ExportError;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Writer rooted at the export output directory
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    /// Create the writer, creating the directory if it is missing
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| ExportError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Resolve a relative path below the root
    pub fn path(&self, relative: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let relative = relative.as_ref();
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if !safe || relative.as_os_str().is_empty() {
            return Err(ExportError::UnsafePath(relative.display().to_string()));
        }

        Ok(self.root.join(relative))
    }

    /// Write raw bytes, creating parent directories
    pub fn write_bytes(
        &self,
        relative: impl AsRef<Path>,
        contents: &[u8],
    ) -> Result<PathBuf, ExportError> {
        let path = self.path(relative)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| ExportError::io(&path, e))?;

        tracing::debug!("Wrote {} ({} bytes)", path.display(), contents.len());

        Ok(path)
    }

    pub fn write_text(
        &self,
        relative: impl AsRef<Path>,
        contents: &str,
    ) -> Result<PathBuf, ExportError> {
        self.write_bytes(relative, contents.as_bytes())
    }

    /// Write pretty-printed JSON
    pub fn write_json<T: Serialize + ?Sized>(
        &self,
        relative: impl AsRef<Path>,
        value: &T,
    ) -> Result<PathBuf, ExportError> {
        let json = serde_json::to_vec_pretty(value).map_err(|e| {
            ExportError::io(relative.as_ref(), std::io::Error::other(e))
        })?;
        self.write_bytes(relative, &json)
    }

    /// Write a shell script, executable on unix
    pub fn write_script(
        &self,
        relative: impl AsRef<Path>,
        contents: &str,
    ) -> Result<PathBuf, ExportError> {
        let path = self.write_text(relative, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .map_err(|e| ExportError::io(&path, e))?;
        }

        Ok(path)
    }
}

/// Echo an artifact to the console, framed by its name
pub fn echo_artifact(name: &str, contents: &str) {
    println!("\n\n{} {} {}\n\n", "*".repeat(10), name, "*".repeat(10));
    println!("{}", contents);
}
