//! Variant resolution against a multi-bundle project.

use std::path::PathBuf;

use bale_bundler::plugins::PluginKind;
use bale_bundler::variant::{self, Format};
use bale_bundler::{Error, GlobalBuildOptions, Project};
use bale_config::{BundleDescriptor, Manifest, ModuleReplacement, PackageMetadata};

fn project() -> Project {
    let mut standalone = BundleDescriptor::universal("standalone.js", "standalone.js", "bale");
    standalone.replace_module.insert(
        "package.json".to_string(),
        ModuleReplacement::Contents("export default { version: \"dev\" };".to_string()),
    );

    let manifest = Manifest {
        dist_dir: PathBuf::from("dist"),
        bundles: vec![
            BundleDescriptor::node("index.js", "index.js"),
            BundleDescriptor::node("src/doc/index.js", "doc.js"),
            BundleDescriptor::node("bin/cli.js", "bin/cli.js"),
            standalone,
            BundleDescriptor::universal(
                "src/language-js/parse/babel.js",
                "parser-babel.js",
                "babel",
            ),
            BundleDescriptor::universal("src/document/browser.js", "doc.browser.js", "doc"),
        ],
    };
    let metadata = PackageMetadata::new("3.0.0").with_browserslist(["chrome >= 60"]);
    Project::new("/repo", manifest, metadata).expect("valid project")
}

fn descriptor<'a>(project: &'a Project, output: &str) -> &'a BundleDescriptor {
    project
        .bundles()
        .iter()
        .find(|bundle| bundle.output == output)
        .expect("descriptor exists")
}

#[test]
fn node_siblings_are_redirected_and_external() {
    let project = project();
    let options = GlobalBuildOptions::default();

    for node in project.bundles().iter().filter(|b| !b.is_universal()) {
        let variants: Vec<_> = variant::resolve(&project, node, &options)
            .expect("resolve")
            .collect();
        assert_eq!(variants.len(), 1);
        let variant = &variants[0];
        assert_eq!(variant.format, Format::Cjs);

        let mut redirects = 0;
        for other in project.bundles().iter().filter(|b| b.input != node.input) {
            let key = project.resolve(&other.input).to_string_lossy().into_owned();
            let Some(ModuleReplacement::External(specifier)) = variant.replace_module.get(&key)
            else {
                panic!("{} should redirect {}", node.output, other.output);
            };
            assert!(variant.external.contains(specifier));
            redirects += 1;
        }
        assert!(redirects > 0);
    }

    let cli = variant::resolve(&project, descriptor(&project, "bin/cli.js"), &options)
        .expect("resolve")
        .next()
        .expect("one variant");
    assert!(cli.external.contains(&"../index.js".to_string()));
}

#[test]
fn universal_define_uses_placeholders() {
    let project = project();
    let options = GlobalBuildOptions::default();

    for universal in project.bundles().iter().filter(|b| b.is_universal()) {
        for variant in variant::resolve(&project, universal, &options).expect("resolve") {
            for key in ["__filename", "__dirname"] {
                let value = variant.define.get(key).expect("placeholder defined");
                assert!(!value.contains("/repo"));
                assert!(value.contains("bale-"));
            }
            assert_eq!(
                variant.define.get("process.env.BUILD_TARGET").map(String::as_str),
                Some("\"universal\"")
            );
        }
    }
}

#[test]
fn esm_twin_only_for_standalone_and_parsers() {
    let project = project();
    let options = GlobalBuildOptions::default();

    let names = |output: &str| -> Vec<(String, Format)> {
        variant::resolve(&project, descriptor(&project, output), &options)
            .expect("resolve")
            .map(|v| (v.name, v.format))
            .collect()
    };

    assert_eq!(
        names("standalone.js"),
        vec![
            ("standalone.js".to_string(), Format::Umd),
            ("esm/standalone.mjs".to_string(), Format::Esm),
        ]
    );
    assert_eq!(
        names("parser-babel.js"),
        vec![
            ("parser-babel.js".to_string(), Format::Umd),
            ("esm/parser-babel.mjs".to_string(), Format::Esm),
        ]
    );
    assert_eq!(names("doc.browser.js"), vec![("doc.browser.js".to_string(), Format::Umd)]);
}

#[test]
fn descriptor_replacement_wins_over_default() {
    let project = project();
    let options = GlobalBuildOptions::default();

    let standalone = variant::resolve(&project, descriptor(&project, "standalone.js"), &options)
        .expect("resolve")
        .next()
        .expect("umd variant");
    assert_eq!(
        standalone.replace_module.get("/repo/package.json"),
        Some(&ModuleReplacement::Contents(
            "export default { version: \"dev\" };".to_string()
        ))
    );

    let parser = variant::resolve(&project, descriptor(&project, "parser-babel.js"), &options)
        .expect("resolve")
        .next()
        .expect("umd variant");
    let Some(ModuleReplacement::Contents(default)) = parser.replace_module.get("/repo/package.json")
    else {
        panic!("package.json should be inlined");
    };
    assert!(default.contains("\"3.0.0\""));
    assert_eq!(
        parser.replace_module.get("/repo/src/parser-loader.js"),
        Some(&ModuleReplacement::empty())
    );
}

#[test]
fn umd_plugins_start_with_wrapper() {
    let project = project();
    let options = GlobalBuildOptions::default();

    let variants: Vec<_> =
        variant::resolve(&project, descriptor(&project, "standalone.js"), &options)
            .expect("resolve")
            .collect();

    assert_eq!(
        variants[0].plugin_kinds(),
        vec![
            PluginKind::UmdWrap,
            PluginKind::Evaluate,
            PluginKind::ReplaceModule,
            PluginKind::Polyfill,
            PluginKind::ReplaceText,
            PluginKind::WarnEscalate,
        ]
    );
    assert!(!variants[1].plugin_kinds().contains(&PluginKind::UmdWrap));
    assert!(variants.iter().all(|v| v.minify && v.is_downleveled()));
}

#[test]
fn save_as_renames_primary_output_only() {
    let project = project();
    let options = GlobalBuildOptions {
        save_as: Some("custom/standalone.js".to_string()),
        ..Default::default()
    };

    let variants: Vec<_> =
        variant::resolve(&project, descriptor(&project, "standalone.js"), &options)
            .expect("resolve")
            .collect();

    assert_eq!(variants[0].relative_output, "custom/standalone.js");
    assert_eq!(variants[0].output, PathBuf::from("/repo/dist/custom/standalone.js"));
    assert_eq!(variants[1].relative_output, "esm/standalone.mjs");
}

#[test]
fn escaping_save_as_is_rejected() {
    let project = project();
    let options = GlobalBuildOptions {
        save_as: Some("../outside.js".to_string()),
        ..Default::default()
    };

    let err = variant::resolve(&project, descriptor(&project, "index.js"), &options).unwrap_err();
    assert!(matches!(err, Error::InvalidOutputPath(_)));
}

#[test]
fn invalid_descriptor_fails_before_any_variant() {
    let project = project();
    let broken = BundleDescriptor::universal("src/broken.js", "broken.js", "not valid");

    let err = variant::resolve(&project, &broken, &GlobalBuildOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn global_options_override_descriptor() {
    let project = project();
    let options = GlobalBuildOptions {
        minify: Some(false),
        downlevel: false,
        ..Default::default()
    };

    for variant in variant::resolve(&project, descriptor(&project, "standalone.js"), &options)
        .expect("resolve")
    {
        assert!(!variant.minify);
        assert!(!variant.is_downleveled());
    }
}
