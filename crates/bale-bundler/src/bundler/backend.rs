use std::sync::Arc;

use async_trait::async_trait;
use bale_config::Target;
use rolldown::{
    BundlerBuilder, BundlerOptions, InputItem, IsExternal, OutputFormat, Platform,
    RawMinifyOptions,
};
use rolldown_common::{BundlerTransformOptions, Either, Output};
use rolldown_plugin::__inner::SharedPluginable;
use tracing::debug;

use super::adapter::PipelinePluginAdapter;
use super::{BundleArtifact, BundleRequest, Bundler};
use crate::plugins::PluginKind;
use crate::diagnostics::{self, BundlerDiagnostic};
use crate::runtime::{NativeRuntime, Runtime};
use crate::variant::Format;
use crate::{Error, Result};

/// [`Bundler`] backed by rolldown.
///
/// Every pass produces a single chunk. Anything else (code splitting from a
/// dynamic import, an emitted asset without code) is reported as an error.
#[derive(Debug, Clone)]
pub struct RolldownBundler {
    runtime: Arc<dyn Runtime>,
}

impl RolldownBundler {
    pub fn new() -> Self {
        Self::with_runtime(Arc::new(NativeRuntime))
    }

    /// Plugins read through `runtime` instead of the local filesystem.
    pub fn with_runtime(runtime: Arc<dyn Runtime>) -> Self {
        Self { runtime }
    }

    fn options(request: &BundleRequest) -> BundlerOptions {
        BundlerOptions {
            input: Some(vec![InputItem {
                name: None,
                import: request.entry.to_string_lossy().into_owned(),
            }]),
            cwd: Some(request.cwd.clone()),
            format: Some(match request.format {
                Format::Esm => OutputFormat::Esm,
                Format::Cjs | Format::Umd => OutputFormat::Cjs,
            }),
            platform: Some(match request.platform {
                Target::Node => Platform::Node,
                Target::Universal => Platform::Browser,
            }),
            external: Some(IsExternal::from(request.external.clone())),
            minify: request.minify.then(|| RawMinifyOptions::from(true)),
            define: (!request.define.is_empty()).then(|| {
                request
                    .define
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            }),
            transform: (!request.runtime_target.is_empty()).then(|| BundlerTransformOptions {
                target: Some(Either::Right(request.runtime_target.clone())),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn plugins(&self, request: &BundleRequest) -> Vec<SharedPluginable> {
        request
            .plugins
            .iter()
            .filter(|plugin| {
                matches!(
                    plugin.kind(),
                    PluginKind::Evaluate
                        | PluginKind::ReplaceModule
                        | PluginKind::Polyfill
                        | PluginKind::ReplaceText
                        | PluginKind::Visualize
                )
            })
            .map(|plugin| {
                let adapter: SharedPluginable = Arc::new(PipelinePluginAdapter::new(
                    plugin.clone(),
                    Arc::clone(&self.runtime),
                ));
                adapter
            })
            .collect()
    }
}

impl Default for RolldownBundler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bundler for RolldownBundler {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleArtifact> {
        debug!(
            entry = %request.entry.display(),
            format = %request.format,
            plugins = request.plugins.len(),
            minify = request.minify,
            target = ?request.runtime_target,
            "Invoking rolldown"
        );

        let mut bundler = BundlerBuilder::default()
            .with_options(Self::options(request))
            .with_plugins(self.plugins(request))
            .build()
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let output = bundler
            .generate()
            .await
            .map_err(|e| Error::from_rolldown_batch(&e))?;

        let warnings = diagnostics::extract_from_rolldown(&output.warnings);

        let mut chunks = output.assets.iter().filter_map(|asset| match asset {
            Output::Chunk(chunk) => Some(chunk),
            Output::Asset(_) => None,
        });

        let chunk = chunks.next().ok_or_else(|| {
            Error::Bundler(vec![BundlerDiagnostic::error(
                "NO_CHUNK",
                format!("no chunk emitted for {}", request.entry.display()),
            )])
        })?;
        if chunks.next().is_some() {
            return Err(Error::Bundler(vec![
                BundlerDiagnostic::error(
                    "CODE_SPLITTING",
                    format!("{} produced more than one chunk", request.entry.display()),
                )
                .with_help(
                    "Every artifact is a single file. Replace the dynamic import or mark it external.",
                ),
            ]));
        }

        Ok(BundleArtifact {
            code: chunk.code.clone(),
            modules: chunk.module_ids.iter().map(|id| id.to_string()).collect(),
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{PipelinePlugin, UmdWrapPlugin, WarnEscalatePlugin};
    use crate::variant::DefineMap;
    use std::path::PathBuf;

    fn request(plugins: Vec<PipelinePlugin>, define: DefineMap) -> BundleRequest {
        BundleRequest {
            entry: PathBuf::from("/repo/index.js"),
            cwd: PathBuf::from("/repo"),
            format: Format::Cjs,
            platform: Target::Universal,
            minify: false,
            external: vec!["fs".to_string()],
            define,
            runtime_target: Vec::new(),
            plugins,
        }
    }

    #[test]
    fn test_chunk_level_plugins_are_not_forwarded() {
        let bundler = RolldownBundler::new();
        let plugins = vec![
            PipelinePlugin::UmdWrap(UmdWrapPlugin::new("bale")),
            PipelinePlugin::WarnEscalate(WarnEscalatePlugin::new()),
        ];
        assert!(bundler.plugins(&request(plugins, DefineMap::new())).is_empty());
    }

    #[test]
    fn test_options_mapping() {
        let options = RolldownBundler::options(&request(Vec::new(), DefineMap::new()));
        assert!(matches!(options.format, Some(OutputFormat::Cjs)));
        assert!(matches!(options.platform, Some(Platform::Browser)));
        assert!(options.minify.is_none());
        assert!(options.define.is_none());
        assert!(options.transform.is_none());
        assert_eq!(options.cwd, Some(PathBuf::from("/repo")));
    }

    #[test]
    fn test_define_goes_to_native_option() {
        let mut define = DefineMap::new();
        define.insert("process.env.NODE_ENV".to_string(), "\"production\"".to_string());
        define.insert("process".to_string(), "({})".to_string());

        let options = RolldownBundler::options(&request(Vec::new(), define));
        let define = options.define.expect("define forwarded");
        let keys: Vec<&str> = define.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["process.env.NODE_ENV", "process"]);
        assert_eq!(define["process"], "({})");
    }

    #[test]
    fn test_runtime_target_becomes_transform_target() {
        let mut req = request(Vec::new(), DefineMap::new());
        req.runtime_target = vec!["es2015".to_string(), "chrome60".to_string()];

        let transform = RolldownBundler::options(&req)
            .transform
            .expect("transform options set");
        match transform.target {
            Some(Either::Right(targets)) => assert_eq!(targets, vec!["es2015", "chrome60"]),
            other => panic!("unexpected target {other:?}"),
        }
    }
}
