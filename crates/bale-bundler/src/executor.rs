//! Build executor.
//!
//! Turns one [`VariantConfig`] into a byte-final artifact on disk. Without
//! downleveling this is a single bundler pass. With it, three stages run in
//! strict sequence against the same output path:
//!
//! 1. **Primary build**: full module pipeline, no minification, no UMD
//!    wrapper, modern syntax kept ([`PrimaryOutput`]).
//! 2. **Secondary transform**: the written file is read back, lowered by the
//!    [`DownlevelTransform`] and overwritten in place ([`DownleveledOutput`]).
//! 3. **Rebuild wrap**: the lowered file is bundled again as the entry, with
//!    only the UMD wrapper (for UMD variants) and warning escalation. Constant
//!    injection is not repeated; the runtime target applies again.
//!
//! The executor is the only component that writes through the [`Runtime`].

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bundler::{BundleRequest, Bundler};
use crate::downlevel::{DownlevelConfig, DownlevelTransform};
use crate::plugins::{BuildReport, LicenseLedger, PipelinePlugin, PluginKind, SideOutput};
use crate::runtime::{Runtime, read_to_string};
use crate::variant::{DefineMap, Format, VariantConfig};
use crate::{Error, Result};

/// A finished variant build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    /// Logical variant name.
    pub name: String,
    /// Output path relative to the distribution root, after any rename.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub format: Format,
    /// License manifests and reports written alongside the artifact.
    pub side_outputs: Vec<PathBuf>,
}

/// Untransformed output of the primary pass, already on disk.
#[derive(Debug)]
struct PrimaryOutput {
    path: PathBuf,
    side_outputs: Vec<PathBuf>,
}

/// Primary output after the syntax transform has overwritten it.
#[derive(Debug)]
struct DownleveledOutput {
    path: PathBuf,
    side_outputs: Vec<PathBuf>,
}

/// What a single bundler pass wrote.
#[derive(Debug)]
struct PassOutput {
    side_outputs: Vec<PathBuf>,
}

/// Runs the build state machine for one variant at a time.
#[derive(Debug, Clone, Copy)]
pub struct BuildExecutor<'a> {
    bundler: &'a dyn Bundler,
    downlevel: &'a dyn DownlevelTransform,
    runtime: &'a dyn Runtime,
    /// Working directory handed to the bundler (the project root).
    cwd: &'a Path,
    /// Shared across executors of one invocation; `None` keeps licenses per pass.
    licenses: Option<&'a LicenseLedger>,
}

impl<'a> BuildExecutor<'a> {
    pub fn new(
        bundler: &'a dyn Bundler,
        downlevel: &'a dyn DownlevelTransform,
        runtime: &'a dyn Runtime,
        cwd: &'a Path,
    ) -> Self {
        Self {
            bundler,
            downlevel,
            runtime,
            cwd,
            licenses: None,
        }
    }

    pub fn with_licenses(mut self, licenses: &'a LicenseLedger) -> Self {
        self.licenses = Some(licenses);
        self
    }

    /// Build `variant` to its final path.
    ///
    /// Any failure aborts the variant. A failed secondary transform leaves
    /// the untransformed primary output on disk.
    pub async fn execute(&self, variant: &VariantConfig) -> Result<BuiltArtifact> {
        let side_outputs = match &variant.downlevel {
            None => {
                debug!(variant = %variant.name, "single-pass build");
                let request = self.request(
                    variant,
                    variant.entry.clone(),
                    variant.plugins.clone(),
                    variant.minify,
                    variant.define.clone(),
                    variant.runtime_target.clone(),
                );
                self.run_pass(&request, variant).await?.side_outputs
            }
            Some(config) => {
                let primary = self.primary_build(variant).await?;
                let downleveled = self.secondary_transform(primary, config).await?;
                self.rebuild_wrap(downleveled, variant).await?
            }
        };

        Ok(BuiltArtifact {
            name: variant.name.clone(),
            relative_path: variant.relative_output.clone(),
            absolute_path: variant.output.clone(),
            format: variant.format,
            side_outputs,
        })
    }

    async fn primary_build(&self, variant: &VariantConfig) -> Result<PrimaryOutput> {
        debug!(variant = %variant.name, "primary build");

        let plugins = variant
            .plugins
            .iter()
            .filter(|plugin| plugin.kind() != PluginKind::UmdWrap)
            .cloned()
            .collect();
        let request = self.request(
            variant,
            variant.entry.clone(),
            plugins,
            false,
            variant.define.clone(),
            Vec::new(),
        );
        let pass = self.run_pass(&request, variant).await?;

        Ok(PrimaryOutput {
            path: variant.output.clone(),
            side_outputs: pass.side_outputs,
        })
    }

    async fn secondary_transform(
        &self,
        primary: PrimaryOutput,
        config: &DownlevelConfig,
    ) -> Result<DownleveledOutput> {
        debug!(path = %primary.path.display(), "secondary transform");

        let source = read_to_string(self.runtime, &primary.path)
            .await
            .map_err(|e| {
                Error::io(
                    format!("Failed to read primary output {}", primary.path.display()),
                    e,
                )
            })?;
        let lowered = self.downlevel.transform(&source, &primary.path, config)?;
        self.write(&primary.path, &lowered).await?;

        Ok(DownleveledOutput {
            path: primary.path,
            side_outputs: primary.side_outputs,
        })
    }

    async fn rebuild_wrap(
        &self,
        downleveled: DownleveledOutput,
        variant: &VariantConfig,
    ) -> Result<Vec<PathBuf>> {
        debug!(variant = %variant.name, "rebuild wrap");

        let plugins = variant
            .plugins
            .iter()
            .filter(|plugin| {
                matches!(plugin.kind(), PluginKind::UmdWrap | PluginKind::WarnEscalate)
            })
            .cloned()
            .collect();
        let request = self.request(
            variant,
            downleveled.path,
            plugins,
            variant.minify,
            DefineMap::new(),
            variant.runtime_target.clone(),
        );
        let pass = self.run_pass(&request, variant).await?;

        let mut side_outputs = downleveled.side_outputs;
        side_outputs.extend(pass.side_outputs);
        Ok(side_outputs)
    }

    fn request(
        &self,
        variant: &VariantConfig,
        entry: PathBuf,
        plugins: Vec<PipelinePlugin>,
        minify: bool,
        define: DefineMap,
        runtime_target: Vec<String>,
    ) -> BundleRequest {
        BundleRequest {
            entry,
            cwd: self.cwd.to_path_buf(),
            format: variant.format.bundler_format(),
            platform: variant.target,
            minify,
            external: variant.external.clone(),
            define,
            runtime_target,
            plugins,
        }
    }

    /// Bundle, run chunk hooks, then write the artifact and its side outputs.
    ///
    /// `build_end` hooks run before anything is written, so an escalated
    /// warning leaves no new artifact behind.
    async fn run_pass(
        &self,
        request: &BundleRequest,
        variant: &VariantConfig,
    ) -> Result<PassOutput> {
        let artifact = self.bundler.bundle(request).await?;

        let code = request
            .plugins
            .iter()
            .fold(artifact.code, |code, plugin| {
                plugin.render_chunk(&code).unwrap_or(code)
            });

        let report = BuildReport {
            output: &variant.relative_output,
            warnings: &artifact.warnings,
            modules: &artifact.modules,
        };
        let pass_licenses = LicenseLedger::new();
        let licenses = self.licenses.unwrap_or(&pass_licenses);
        let mut extra: Vec<SideOutput> = Vec::new();
        for plugin in &request.plugins {
            extra.extend(plugin.build_end(&report, self.runtime, licenses).await?);
        }

        self.write(&variant.output, &code).await?;

        let mut side_outputs = Vec::with_capacity(extra.len());
        for side in extra {
            self.write(&side.path, &side.contents).await?;
            side_outputs.push(side.path);
        }

        Ok(PassOutput { side_outputs })
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.runtime.create_dir_all(parent).await.map_err(|e| {
                Error::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }
        self.runtime
            .write_file(path, contents.as_bytes())
            .await
            .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::BundlerDiagnostic;
    use crate::plugins::{UmdWrapPlugin, WarnEscalatePlugin};
    use crate::test_utils::{MarkingDownlevel, MemoryRuntime, RecordingBundler};
    use bale_config::{BundleDescriptor, PackageMetadata, Target};
    use indexmap::IndexMap;

    fn variant(format: Format, downlevel: bool) -> VariantConfig {
        let mut plugins = Vec::new();
        if format == Format::Umd {
            plugins.push(PipelinePlugin::UmdWrap(UmdWrapPlugin::new("bale")));
        }
        plugins.push(PipelinePlugin::WarnEscalate(WarnEscalatePlugin::new()));

        VariantConfig {
            name: "standalone.js".to_string(),
            entry: PathBuf::from("/repo/standalone.js"),
            relative_output: "standalone.js".to_string(),
            output: PathBuf::from("/repo/dist/standalone.js"),
            format,
            target: Target::Universal,
            global_name: Some("bale".to_string()),
            define: crate::variant::define_map(Target::Universal),
            replace_module: IndexMap::new(),
            replace_text: Vec::new(),
            plugins,
            minify: true,
            external: Vec::new(),
            runtime_target: vec!["es2018".to_string()],
            downlevel: downlevel.then(|| {
                DownlevelConfig::for_descriptor(
                    &BundleDescriptor::universal("standalone.js", "standalone.js", "bale"),
                    &PackageMetadata::new("1.0.0"),
                )
                .unwrap()
            }),
        }
    }

    #[tokio::test]
    async fn test_single_pass_writes_once() {
        let bundler = RecordingBundler::new("module.exports = 1;");
        let runtime = MemoryRuntime::new();
        let downlevel = MarkingDownlevel::new();
        let executor = BuildExecutor::new(&bundler, &downlevel, &runtime, Path::new("/repo"));

        let built = executor.execute(&variant(Format::Cjs, false)).await.unwrap();

        assert_eq!(built.absolute_path, PathBuf::from("/repo/dist/standalone.js"));
        assert_eq!(bundler.requests().len(), 1);
        assert_eq!(runtime.writes_to(&built.absolute_path).len(), 1);
        assert_eq!(downlevel.calls(), 0);
    }

    #[tokio::test]
    async fn test_downlevel_runs_three_stages() {
        let bundler = RecordingBundler::new("module.exports = 1;");
        let runtime = MemoryRuntime::new();
        let downlevel = MarkingDownlevel::new();
        let executor = BuildExecutor::new(&bundler, &downlevel, &runtime, Path::new("/repo"));

        let built = executor.execute(&variant(Format::Umd, true)).await.unwrap();

        let writes = runtime.writes_to(&built.absolute_path);
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0], "module.exports = 1;");
        assert!(writes[1].starts_with(MarkingDownlevel::MARKER));
        assert!(writes[2].starts_with(crate::plugins::UMD_BANNER));

        let requests = bundler.requests();
        assert_eq!(requests.len(), 2);
        let primary = &requests[0];
        assert!(!primary.minify);
        assert!(primary.runtime_target.is_empty());
        assert_eq!(primary.format, Format::Cjs);
        assert!(primary.plugins.iter().all(|p| p.kind() != PluginKind::UmdWrap));

        let rebuild = &requests[1];
        assert_eq!(rebuild.entry, built.absolute_path);
        assert!(rebuild.minify);
        assert!(rebuild.define.is_empty());
        assert_eq!(rebuild.runtime_target, vec!["es2018"]);
        assert_eq!(
            rebuild.plugins.iter().map(PipelinePlugin::kind).collect::<Vec<_>>(),
            vec![PluginKind::UmdWrap, PluginKind::WarnEscalate]
        );
    }

    #[tokio::test]
    async fn test_downlevel_failure_keeps_primary_output() {
        let bundler = RecordingBundler::new("module.exports = 1;");
        let runtime = MemoryRuntime::new();
        let downlevel = MarkingDownlevel::failing();
        let executor = BuildExecutor::new(&bundler, &downlevel, &runtime, Path::new("/repo"));

        let err = executor.execute(&variant(Format::Umd, true)).await.unwrap_err();

        assert!(matches!(err, Error::Downlevel { .. }));
        let writes = runtime.writes_to(Path::new("/repo/dist/standalone.js"));
        assert_eq!(writes, vec!["module.exports = 1;".to_string()]);
        assert_eq!(bundler.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_warnings_fail_before_write() {
        let bundler = RecordingBundler::new("module.exports = 1;")
            .with_warnings(vec![BundlerDiagnostic::warning(
                "CIRCULAR_DEPENDENCY",
                "Circular dependency: a.js -> b.js -> a.js",
            )]);
        let runtime = MemoryRuntime::new();
        let downlevel = MarkingDownlevel::new();
        let executor = BuildExecutor::new(&bundler, &downlevel, &runtime, Path::new("/repo"));

        let err = executor.execute(&variant(Format::Cjs, false)).await.unwrap_err();

        assert!(matches!(err, Error::EscalatedWarnings { .. }));
        assert!(runtime.writes().is_empty());
    }
}
