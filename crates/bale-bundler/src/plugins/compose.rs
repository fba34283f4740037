use std::path::Path;

use bale_config::{ModuleReplacement, ReportFormat, Target, TextReplaceRule};
use indexmap::IndexMap;

use super::{
    EvaluatePlugin, LicensePlugin, PipelinePlugin, PolyfillPlugin, ReplaceModulePlugin,
    ReplaceTextPlugin, UmdWrapPlugin, VisualizePlugin, WarnEscalatePlugin,
};
use crate::variant::Format;

/// Inputs the composer needs from a variant.
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    pub target: Target,
    pub format: Format,
    /// Final output path relative to the distribution root.
    pub output_name: &'a str,
    pub global_name: Option<&'a str>,
    pub replace_module: &'a IndexMap<String, ModuleReplacement>,
    pub replace_text: &'a [TextReplaceRule],
    pub license_sink: Option<&'a Path>,
    pub reports: &'a [ReportFormat],
    pub reports_dir: &'a Path,
}

/// Build the ordered plugin list for one variant.
///
/// evaluate → replace-module → polyfill (universal) → replace-text →
/// license (optional) → visualize (optional) → warn-escalate, with the UMD
/// wrapper in front for UMD variants.
pub fn compose(ctx: &ComposeContext<'_>) -> Vec<PipelinePlugin> {
    let mut plugins = Vec::with_capacity(8);

    if ctx.format == Format::Umd {
        plugins.push(PipelinePlugin::UmdWrap(UmdWrapPlugin::new(
            ctx.global_name.unwrap_or("bundle"),
        )));
    }

    plugins.push(PipelinePlugin::Evaluate(EvaluatePlugin::new()));
    plugins.push(PipelinePlugin::ReplaceModule(ReplaceModulePlugin::new(
        ctx.replace_module.clone(),
    )));
    if ctx.target == Target::Universal {
        plugins.push(PipelinePlugin::Polyfill(PolyfillPlugin::new()));
    }
    plugins.push(PipelinePlugin::ReplaceText(ReplaceTextPlugin::new(
        ctx.replace_text,
    )));
    if let Some(sink) = ctx.license_sink {
        plugins.push(PipelinePlugin::License(LicensePlugin::new(sink)));
    }
    if !ctx.reports.is_empty() {
        plugins.push(PipelinePlugin::Visualize(VisualizePlugin::new(
            ctx.reports.to_vec(),
            ctx.reports_dir.join(ctx.output_name),
        )));
    }
    plugins.push(PipelinePlugin::WarnEscalate(WarnEscalatePlugin::new()));

    plugins
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::plugins::PluginKind;

    fn kinds(ctx: &ComposeContext<'_>) -> Vec<PluginKind> {
        compose(ctx).iter().map(PipelinePlugin::kind).collect()
    }

    #[test]
    fn test_node_order() {
        let replace = IndexMap::new();
        let ctx = ComposeContext {
            target: Target::Node,
            format: Format::Cjs,
            output_name: "index.js",
            global_name: None,
            replace_module: &replace,
            replace_text: &[],
            license_sink: None,
            reports: &[],
            reports_dir: Path::new("/repo/reports"),
        };
        assert_eq!(
            kinds(&ctx),
            vec![
                PluginKind::Evaluate,
                PluginKind::ReplaceModule,
                PluginKind::ReplaceText,
                PluginKind::WarnEscalate,
            ]
        );
    }

    #[test]
    fn test_universal_umd_order_with_optionals() {
        let replace = IndexMap::new();
        let sink = PathBuf::from("/repo/licenses.json");
        let ctx = ComposeContext {
            target: Target::Universal,
            format: Format::Umd,
            output_name: "standalone.js",
            global_name: Some("bale"),
            replace_module: &replace,
            replace_text: &[],
            license_sink: Some(&sink),
            reports: &[ReportFormat::Json],
            reports_dir: Path::new("/repo/reports"),
        };
        assert_eq!(
            kinds(&ctx),
            vec![
                PluginKind::UmdWrap,
                PluginKind::Evaluate,
                PluginKind::ReplaceModule,
                PluginKind::Polyfill,
                PluginKind::ReplaceText,
                PluginKind::License,
                PluginKind::Visualize,
                PluginKind::WarnEscalate,
            ]
        );
    }

    #[test]
    fn test_esm_twin_has_no_wrapper() {
        let replace = IndexMap::new();
        let ctx = ComposeContext {
            target: Target::Universal,
            format: Format::Esm,
            output_name: "esm/standalone.mjs",
            global_name: Some("bale"),
            replace_module: &replace,
            replace_text: &[],
            license_sink: None,
            reports: &[],
            reports_dir: Path::new("/repo/reports"),
        };
        let kinds = kinds(&ctx);
        assert!(!kinds.contains(&PluginKind::UmdWrap));
        assert_eq!(kinds.last(), Some(&PluginKind::WarnEscalate));
    }
}
