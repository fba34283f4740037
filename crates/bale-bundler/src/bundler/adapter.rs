//! Bridges [`PipelinePlugin`] module hooks onto rolldown's plugin trait.

use std::borrow::Cow;
use std::sync::Arc;

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage,
    Plugin, PluginContext, SharedTransformPluginContext,
};

use crate::plugins::{PipelinePlugin, PluginKind, Resolution};
use crate::runtime::Runtime;

/// One pipeline plugin as seen by rolldown.
///
/// Only the module-level hooks are forwarded. Chunk-level hooks run in the
/// executor once the pass has produced its code.
#[derive(Debug, Clone)]
pub struct PipelinePluginAdapter {
    plugin: PipelinePlugin,
    runtime: Arc<dyn Runtime>,
}

impl PipelinePluginAdapter {
    pub fn new(plugin: PipelinePlugin, runtime: Arc<dyn Runtime>) -> Self {
        Self { plugin, runtime }
    }
}

impl Plugin for PipelinePluginAdapter {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.plugin.name())
    }

    fn register_hook_usage(&self) -> HookUsage {
        match self.plugin.kind() {
            PluginKind::Evaluate => HookUsage::Load,
            PluginKind::ReplaceModule | PluginKind::Polyfill => {
                HookUsage::ResolveId | HookUsage::Load
            }
            PluginKind::ReplaceText | PluginKind::Visualize => HookUsage::Transform,
            PluginKind::License | PluginKind::WarnEscalate | PluginKind::UmdWrap => {
                HookUsage::empty()
            }
        }
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(|importer| importer.to_string());
        let resolution = self.plugin.resolve_id(&specifier, importer.as_deref());

        async move {
            Ok(resolution.map(|resolution| match resolution {
                Resolution::Module(id) => HookResolveIdOutput {
                    id: id.into(),
                    external: Some(ResolvedExternal::Bool(false)),
                    ..Default::default()
                },
                Resolution::External(specifier) => HookResolveIdOutput {
                    id: specifier.into(),
                    external: Some(ResolvedExternal::Bool(true)),
                    ..Default::default()
                },
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let plugin = self.plugin.clone();
        let runtime = Arc::clone(&self.runtime);

        async move {
            let code = plugin.load(&id, runtime.as_ref()).await?;
            Ok(code.map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let code = args.code.to_string();
        let result = self.plugin.transform(&id, &code);

        async move {
            Ok(result?.map(|code| HookTransformOutput {
                code: Some(code),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }
}
