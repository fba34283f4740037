//! Downlevel transform on the oxc toolchain.
//!
//! Parse → object-spread rewrite → semantic analysis → transformer
//! (target-driven lowering plus forced plugins) → codegen. Helpers the
//! transformer needs are imported from `@oxc-project/runtime` and get bundled
//! by the rewrap pass that follows.

use std::path::Path;

use bale_config::SyntaxPlugin;
use oxc_allocator::Allocator;
use oxc_ast::AstBuilder;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{
    ArrowFunctionsOptions, ClassPropertiesOptions, TransformOptions, Transformer,
};
use tracing::debug;

use super::spread::spread_to_assign;
use super::{DownlevelConfig, DownlevelTransform, ObjectSpread, SourceKind};
use crate::{Error, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct OxcDownlevel;

impl OxcDownlevel {
    pub fn new() -> Self {
        Self
    }
}

impl DownlevelTransform for OxcDownlevel {
    fn transform(&self, source: &str, path: &Path, config: &DownlevelConfig) -> Result<String> {
        if config.is_excluded(path) {
            debug!(path = %path.display(), "downlevel skipped for excluded path");
            return Ok(source.to_string());
        }

        let fail = |message: String| Error::Downlevel {
            path: path.display().to_string(),
            message,
        };

        let source_type = match config.source_kind {
            SourceKind::Unambiguous => SourceType::unambiguous(),
            SourceKind::Module => SourceType::mjs(),
            SourceKind::Script => SourceType::cjs(),
        };

        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, source_type).parse();
        if parsed.panicked || !parsed.errors.is_empty() {
            return Err(fail(join_diagnostics(&parsed.errors, "parser panicked")));
        }
        let mut program = parsed.program;

        // Before semantic analysis, so the inserted `Object` references are bound
        if config.object_spread == ObjectSpread::Assign {
            let rewritten = spread_to_assign(AstBuilder::new(&allocator), &mut program);
            if rewritten > 0 {
                debug!(path = %path.display(), rewritten, "object spread lowered to Object.assign");
            }
        }

        let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();

        let mut options = TransformOptions::from_target_list(&config.targets).map_err(fail)?;
        for plugin in &config.plugins {
            enable_plugin(&mut options, *plugin);
        }

        let transformed =
            Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
        if !transformed.errors.is_empty() {
            return Err(fail(join_diagnostics(&transformed.errors, "transform failed")));
        }

        Ok(Codegen::new().build(&program).code)
    }
}

/// Force `plugin` on, whatever the targets decided.
fn enable_plugin(options: &mut TransformOptions, plugin: SyntaxPlugin) {
    let env = &mut options.env;
    match plugin {
        SyntaxPlugin::ArrowFunctions => {
            env.es2015.arrow_function.get_or_insert_with(ArrowFunctionsOptions::default);
        }
        SyntaxPlugin::ExponentiationOperator => env.es2016.exponentiation_operator = true,
        SyntaxPlugin::AsyncToGenerator => env.es2017.async_to_generator = true,
        SyntaxPlugin::ObjectRestSpread => {
            env.es2018.object_rest_spread.get_or_insert_with(Default::default);
        }
        SyntaxPlugin::AsyncGeneratorFunctions => env.es2018.async_generator_functions = true,
        SyntaxPlugin::OptionalCatchBinding => env.es2019.optional_catch_binding = true,
        SyntaxPlugin::NullishCoalescingOperator => env.es2020.nullish_coalescing_operator = true,
        SyntaxPlugin::OptionalChaining => env.es2020.optional_chaining = true,
        SyntaxPlugin::LogicalAssignmentOperators => env.es2021.logical_assignment_operators = true,
        SyntaxPlugin::ClassProperties => {
            env.es2022.class_properties.get_or_insert_with(ClassPropertiesOptions::default);
        }
        SyntaxPlugin::ClassStaticBlock => env.es2022.class_static_block = true,
    }
}

fn join_diagnostics<E: std::fmt::Display>(errors: &[E], fallback: &str) -> String {
    if errors.is_empty() {
        return fallback.to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use bale_config::{BundleDescriptor, PackageMetadata};

    use super::*;

    fn config_for(targets: &[&str]) -> DownlevelConfig {
        let mut config = DownlevelConfig::for_descriptor(
            &BundleDescriptor::node("src/index.js", "index.js"),
            &PackageMetadata::new("1.0.0"),
        )
        .unwrap();
        config.targets = targets.iter().map(|t| t.to_string()).collect();
        config
    }

    #[test]
    fn test_lowers_nullish_coalescing() {
        let out = OxcDownlevel
            .transform(
                "var value = input ?? 1;\nmodule.exports = value;\n",
                Path::new("/dist/index.js"),
                &config_for(&["chrome60"]),
            )
            .unwrap();
        assert!(!out.contains("??"), "still has nullish coalescing: {out}");
        assert!(out.contains("module.exports"));
    }

    #[test]
    fn test_forced_plugin_ignores_modern_targets() {
        let mut config = config_for(&["chrome100"]);
        let source = "module.exports = (input) => input?.value;\n";

        let untouched = OxcDownlevel
            .transform(source, Path::new("/dist/index.js"), &config)
            .unwrap();
        assert!(untouched.contains("?."));

        config.plugins = vec![SyntaxPlugin::OptionalChaining];
        let lowered = OxcDownlevel
            .transform(source, Path::new("/dist/index.js"), &config)
            .unwrap();
        assert!(!lowered.contains("?."), "optional chaining survived: {lowered}");
    }

    #[test]
    fn test_object_spread_becomes_assign() {
        let out = OxcDownlevel
            .transform(
                "module.exports = function merge(a, b) { return { ...a, ...b }; };\n",
                Path::new("/dist/index.js"),
                &config_for(&["node14"]),
            )
            .unwrap();
        assert!(out.contains("Object.assign({}, a, b)"), "unexpected output: {out}");
        assert!(!out.contains("@oxc-project/runtime"));
    }

    #[test]
    fn test_second_run_is_byte_identical() {
        let config = config_for(&["node14"]);
        let path = Path::new("/dist/index.js");
        let source = "\"use strict\";\nvar a = 1;\nfunction add(b) {\n  return a + b;\n}\nmodule.exports = add;\n";

        let first = OxcDownlevel.transform(source, path, &config).unwrap();
        let second = OxcDownlevel.transform(&first, path, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let err = OxcDownlevel
            .transform("var = ;", Path::new("/dist/broken.js"), &config_for(&["node14"]))
            .unwrap_err();
        assert!(matches!(err, Error::Downlevel { ref path, .. } if path == "/dist/broken.js"));
    }

    #[test]
    fn test_excluded_path_is_untouched() {
        let source = "const x = a ?? b;";
        let out = OxcDownlevel
            .transform(
                source,
                Path::new("/repo/node_modules/core-js/internals/x.js"),
                &config_for(&["chrome60"]),
            )
            .unwrap();
        assert_eq!(out, source);
    }
}
