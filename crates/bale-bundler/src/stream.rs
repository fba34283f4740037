//! Lazy build-event stream over one descriptor.

use std::path::PathBuf;
use std::sync::Arc;

use bale_config::{BundleDescriptor, GlobalBuildOptions, Project};
use tokio_stream::Stream;
use tracing::{debug, info};

use crate::Result;
use crate::bundler::{Bundler, RolldownBundler};
use crate::downlevel::{DownlevelTransform, OxcDownlevel};
use crate::executor::BuildExecutor;
use crate::plugins::LicenseLedger;
use crate::runtime::{NativeRuntime, Runtime};
use crate::variant::resolve;

/// Progress of one variant build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// Excluded by the file filter or playground mode; nothing was built.
    Skipped { name: String },
    Started { name: String },
    Completed {
        name: String,
        /// Output path relative to the distribution root, after any rename.
        relative_path: String,
        absolute_path: PathBuf,
    },
}

impl BuildEvent {
    pub fn name(&self) -> &str {
        match self {
            BuildEvent::Skipped { name }
            | BuildEvent::Started { name }
            | BuildEvent::Completed { name, .. } => name,
        }
    }
}

/// Entry point of the build core.
///
/// Holds the read-only [`Project`], the three seams and the license ledger
/// shared by every [`Pipeline::build`] call. Cheap to clone; clones share the
/// ledger.
#[derive(Debug, Clone)]
pub struct Pipeline {
    project: Arc<Project>,
    bundler: Arc<dyn Bundler>,
    downlevel: Arc<dyn DownlevelTransform>,
    runtime: Arc<dyn Runtime>,
    licenses: Arc<LicenseLedger>,
}

impl Pipeline {
    /// Pipeline on rolldown, oxc and the local filesystem.
    pub fn new(project: Arc<Project>) -> Self {
        let runtime: Arc<dyn Runtime> = Arc::new(NativeRuntime);
        Self {
            project,
            bundler: Arc::new(RolldownBundler::with_runtime(Arc::clone(&runtime))),
            downlevel: Arc::new(OxcDownlevel::new()),
            runtime,
            licenses: Arc::new(LicenseLedger::new()),
        }
    }

    pub fn with_bundler(mut self, bundler: Arc<dyn Bundler>) -> Self {
        self.bundler = bundler;
        self
    }

    pub fn with_downlevel(mut self, downlevel: Arc<dyn DownlevelTransform>) -> Self {
        self.downlevel = downlevel;
        self
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Licenses recorded by every build so far.
    pub fn licenses(&self) -> &LicenseLedger {
        &self.licenses
    }

    /// Build every variant of `descriptor`, in order.
    ///
    /// Nothing runs until the stream is polled. Variants are built strictly
    /// one after another. The first error ends the stream; configuration
    /// errors surface before any variant is started.
    pub fn build<'a>(
        &'a self,
        descriptor: &'a BundleDescriptor,
        options: &'a GlobalBuildOptions,
    ) -> impl Stream<Item = Result<BuildEvent>> + 'a {
        async_stream::try_stream! {
            let variants = resolve(&self.project, descriptor, options)?;
            let executor = BuildExecutor::new(
                self.bundler.as_ref(),
                self.downlevel.as_ref(),
                self.runtime.as_ref(),
                self.project.root(),
            )
            .with_licenses(&self.licenses);

            for variant in variants {
                if !variant.is_selected(options) {
                    debug!(variant = %variant.name, "skipped");
                    yield BuildEvent::Skipped { name: variant.name };
                    continue;
                }

                info!(variant = %variant.name, format = %variant.format, "build started");
                yield BuildEvent::Started { name: variant.name.clone() };

                let built = executor.execute(&variant).await?;
                info!(
                    variant = %built.name,
                    path = %built.absolute_path.display(),
                    "build completed"
                );
                yield BuildEvent::Completed {
                    name: built.name,
                    relative_path: built.relative_path,
                    absolute_path: built.absolute_path,
                };
            }
        }
    }
}
