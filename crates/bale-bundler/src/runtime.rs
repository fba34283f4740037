//! Filesystem runtime abstraction.
//!
//! Every read and write the pipeline performs goes through [`Runtime`], so the
//! executor's write sequencing can be observed in tests and the backend never
//! touches `std::fs` directly.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// Platform runtime trait
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Write a file, replacing any existing content
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Create a directory and its parents
    async fn create_dir_all(&self, path: &Path) -> RuntimeResult<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;
}

/// Read a UTF-8 file through the runtime.
pub async fn read_to_string(runtime: &dyn Runtime, path: &Path) -> RuntimeResult<String> {
    let bytes = runtime.read_file(path).await?;
    String::from_utf8(bytes)
        .map_err(|e| RuntimeError::Io(format!("{} is not valid UTF-8: {}", path.display(), e)))
}

/// Native filesystem runtime backed by tokio.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRuntime;

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(format!("Failed to read {}: {}", path.display(), e))
            }
        })
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        tokio::fs::write(path, content)
            .await
            .map_err(|e| RuntimeError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    async fn create_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            RuntimeError::Io(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
