//! Test doubles for the pipeline seams.
//!
//! - [`MemoryRuntime`]: in-memory filesystem that records every write in order.
//! - [`RecordingBundler`]: returns canned output and records each request.
//! - [`MarkingDownlevel`]: prefixes a marker instead of lowering syntax.
//!
//! Compiled for unit tests and, through the `test-utils` feature, for the
//! integration tests under `tests/`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::bundler::{BundleArtifact, BundleRequest, Bundler};
use crate::diagnostics::BundlerDiagnostic;
use crate::downlevel::{DownlevelConfig, DownlevelTransform};
use crate::runtime::{Runtime, RuntimeError, RuntimeResult};
use crate::{Error, Result};

/// In-memory [`Runtime`].
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without recording it as a write.
    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.files
            .lock()
            .insert(path.into(), contents.into().into_bytes());
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Every write, in order.
    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().clone()
    }

    /// Contents written to `path`, in order.
    pub fn writes_to(&self, path: &Path) -> Vec<String> {
        self.writes
            .lock()
            .iter()
            .filter(|(written, _)| written == path)
            .map(|(_, contents)| contents.clone())
            .collect()
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RuntimeError::FileNotFound(path.to_path_buf()))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        self.files
            .lock()
            .insert(path.to_path_buf(), content.to_vec());
        self.writes.lock().push((
            path.to_path_buf(),
            String::from_utf8_lossy(content).into_owned(),
        ));
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> RuntimeResult<()> {
        self.dirs.lock().insert(path.to_path_buf());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path) || self.dirs.lock().contains(path)
    }
}

/// [`Bundler`] that returns the same artifact for every request.
#[derive(Debug, Default)]
pub struct RecordingBundler {
    code: String,
    warnings: Vec<BundlerDiagnostic>,
    modules: Vec<String>,
    /// Overrides `modules` for requests with this entry.
    entry_modules: Vec<(PathBuf, Vec<String>)>,
    requests: Mutex<Vec<BundleRequest>>,
}

impl RecordingBundler {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<BundlerDiagnostic>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = modules;
        self
    }

    pub fn with_entry_modules(mut self, entry: impl Into<PathBuf>, modules: Vec<String>) -> Self {
        self.entry_modules.push((entry.into(), modules));
        self
    }

    pub fn requests(&self) -> Vec<BundleRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Bundler for RecordingBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleArtifact> {
        self.requests.lock().push(request.clone());
        let modules = self
            .entry_modules
            .iter()
            .find(|(entry, _)| *entry == request.entry)
            .map_or(&self.modules, |(_, modules)| modules);
        Ok(BundleArtifact {
            code: self.code.clone(),
            modules: modules.clone(),
            warnings: self.warnings.clone(),
        })
    }
}

/// [`DownlevelTransform`] that prefixes [`MarkingDownlevel::MARKER`] once.
#[derive(Debug, Default)]
pub struct MarkingDownlevel {
    fail: bool,
    calls: AtomicUsize,
}

impl MarkingDownlevel {
    pub const MARKER: &'static str = "/* downleveled */\n";

    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every input like a transform hitting unparseable syntax.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DownlevelTransform for MarkingDownlevel {
    fn transform(&self, source: &str, path: &Path, _config: &DownlevelConfig) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Downlevel {
                path: path.display().to_string(),
                message: "Unexpected token".to_string(),
            });
        }
        if source.starts_with(Self::MARKER) {
            return Ok(source.to_string());
        }
        Ok(format!("{}{}", Self::MARKER, source))
    }
}
