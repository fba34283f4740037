use std::path::{Component, Path, PathBuf};
use std::vec;

use bale_config::{
    BundleDescriptor, GlobalBuildOptions, ModuleReplacement, Project, ReportFormat, Target,
    TextReplaceRule, validate_descriptor,
};
use indexmap::IndexMap;
use path_clean::PathClean;
use tracing::debug;

use super::{DefineMap, Format, VariantConfig, targets};
use crate::downlevel::DownlevelConfig;
use crate::plugins::{ComposeContext, compose};
use crate::{Error, Result};

/// Expression replaced with the JSON-quoted target name.
pub const TARGET_MARKER: &str = "process.env.BUILD_TARGET";

pub const FILENAME_PLACEHOLDER: &str = "\"/bale-filename-placeholder.js\"";
pub const DIRNAME_PLACEHOLDER: &str = "\"/bale-dirname-placeholder\"";
pub const PROCESS_PLACEHOLDER: &str = "({\"env\":{},\"argv\":[]})";

/// Loaders that pull every optional parser in; browser bundles get an empty module.
pub const PARSER_LOADER_MODULES: &[&str] = &["src/parser-loader.js"];

/// Bundle-composition reports are written here, relative to the project root.
const REPORTS_DIR: &str = "reports";

/// Lazy sequence of variants for one descriptor.
///
/// Shared settings are computed once by [`resolve`]; each call to `next`
/// assembles one [`VariantConfig`] and its plugin list.
#[derive(Debug)]
pub struct Variants {
    shared: Shared,
    pending: vec::IntoIter<Format>,
}

#[derive(Debug)]
struct Shared {
    output: String,
    entry: PathBuf,
    root: PathBuf,
    dist_dir: PathBuf,
    target: Target,
    global_name: Option<String>,
    save_as: Option<String>,
    define: DefineMap,
    replace_module: IndexMap<String, ModuleReplacement>,
    replace_text: Vec<TextReplaceRule>,
    minify: bool,
    external: Vec<String>,
    runtime_target: Vec<String>,
    downlevel: Option<DownlevelConfig>,
    license_sink: Option<PathBuf>,
    reports: Vec<ReportFormat>,
}

impl Iterator for Variants {
    type Item = VariantConfig;

    fn next(&mut self) -> Option<VariantConfig> {
        let format = self.pending.next()?;
        Some(self.shared.variant(format))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

impl ExactSizeIterator for Variants {}

impl Shared {
    fn variant(&self, format: Format) -> VariantConfig {
        let name = match format {
            Format::Esm => esm_name(&self.output),
            Format::Cjs | Format::Umd => self.output.clone(),
        };
        // The rename targets the primary output only
        let relative_output = match (format, &self.save_as) {
            (Format::Cjs | Format::Umd, Some(save_as)) => save_as.clone(),
            _ => name.clone(),
        };
        let output = self.dist_dir.join(&relative_output).clean();

        let reports_dir = self.root.join(REPORTS_DIR);
        let plugins = compose(&ComposeContext {
            target: self.target,
            format,
            output_name: &relative_output,
            global_name: self.global_name.as_deref(),
            replace_module: &self.replace_module,
            replace_text: &self.replace_text,
            license_sink: self.license_sink.as_deref(),
            reports: &self.reports,
            reports_dir: &reports_dir,
        });

        debug!(
            variant = %name,
            format = %format,
            minify = self.minify,
            downlevel = self.downlevel.is_some(),
            "resolved variant"
        );

        VariantConfig {
            name,
            entry: self.entry.clone(),
            relative_output,
            output,
            format,
            target: self.target,
            global_name: self.global_name.clone(),
            define: self.define.clone(),
            replace_module: self.replace_module.clone(),
            replace_text: self.replace_text.clone(),
            plugins,
            minify: self.minify,
            external: self.external.clone(),
            runtime_target: self.runtime_target.clone(),
            downlevel: self.downlevel.clone(),
        }
    }
}

/// Expand a descriptor into its build variants.
///
/// Configuration errors surface here, before any variant is yielded and
/// before any bundler invocation.
pub fn resolve(
    project: &Project,
    descriptor: &BundleDescriptor,
    options: &GlobalBuildOptions,
) -> Result<Variants> {
    validate_descriptor(descriptor)?;
    if let Some(save_as) = &options.save_as {
        if !is_contained_relative(Path::new(save_as)) {
            return Err(Error::InvalidOutputPath(save_as.clone()));
        }
    }

    let target = descriptor.target;
    let (replace_module, sibling_externals) = replace_module_map(project, descriptor);

    let mut external = descriptor.external.clone();
    for sibling in sibling_externals {
        if !external.contains(&sibling) {
            external.push(sibling);
        }
    }

    let minify = options
        .minify
        .or(descriptor.minify)
        .unwrap_or(target == Target::Universal);

    let downlevel = (options.downlevel && !descriptor.skip_legacy_downlevel)
        .then(|| DownlevelConfig::for_descriptor(descriptor, project.metadata()))
        .transpose()?;

    let formats = match target {
        Target::Node => vec![Format::Cjs],
        Target::Universal if has_esm_twin(descriptor.output_file_name()) => {
            vec![Format::Umd, Format::Esm]
        }
        Target::Universal => vec![Format::Umd],
    };

    debug!(
        bundle = %descriptor.output,
        target = %target,
        variants = formats.len(),
        "resolving bundle"
    );

    Ok(Variants {
        shared: Shared {
            output: descriptor.output.clone(),
            entry: project.resolve(&descriptor.input),
            root: project.root().to_path_buf(),
            dist_dir: project.dist_dir().to_path_buf(),
            target,
            global_name: descriptor.name.clone(),
            save_as: options.save_as.clone(),
            define: define_map(target),
            replace_module,
            replace_text: text_rules(descriptor),
            minify,
            external,
            runtime_target: targets::runtime_targets(descriptor, project.metadata()),
            downlevel,
            // Relative sinks are taken from the project root.
            license_sink: options.license_sink.as_ref().map(|sink| project.resolve(sink)),
            reports: options.reports.clone(),
        },
        pending: formats.into_iter(),
    })
}

/// Constant-injection map for a target.
pub fn define_map(target: Target) -> DefineMap {
    let mut define = DefineMap::new();
    define.insert(TARGET_MARKER.to_string(), format!("\"{}\"", target.as_str()));
    define.insert(
        "process.env.NODE_ENV".to_string(),
        "\"production\"".to_string(),
    );
    if target == Target::Universal {
        define.insert("__filename".to_string(), FILENAME_PLACEHOLDER.to_string());
        define.insert("__dirname".to_string(), DIRNAME_PLACEHOLDER.to_string());
        define.insert("process".to_string(), PROCESS_PLACEHOLDER.to_string());
    }
    define
}

/// Layer the module-replacement map: sibling redirects (node) or browser
/// stubs (universal), then the descriptor's own entries.
///
/// Returns the map and the sibling specifiers that must also be external.
fn replace_module_map(
    project: &Project,
    descriptor: &BundleDescriptor,
) -> (IndexMap<String, ModuleReplacement>, Vec<String>) {
    let mut map = IndexMap::new();
    let mut sibling_externals = Vec::new();

    match descriptor.target {
        Target::Node => {
            for other in project.bundles() {
                if other.input == descriptor.input {
                    continue;
                }
                let specifier = relative_specifier(&descriptor.output, &other.output);
                map.insert(
                    path_key(&project.resolve(&other.input)),
                    ModuleReplacement::External(specifier.clone()),
                );
                sibling_externals.push(specifier);
            }
        }
        Target::Universal => {
            let version = serde_json::Value::String(project.metadata().version.clone());
            map.insert(
                path_key(&project.resolve("package.json")),
                ModuleReplacement::Contents(format!(
                    "export const version = {version};\nexport default {{ version: {version} }};\n"
                )),
            );
            for loader in PARSER_LOADER_MODULES {
                map.insert(
                    path_key(&project.resolve(loader)),
                    ModuleReplacement::empty(),
                );
            }
        }
    }

    for (key, replacement) in &descriptor.replace_module {
        let replacement = match replacement {
            ModuleReplacement::Path(path) => ModuleReplacement::Path(project.resolve(path)),
            other => other.clone(),
        };
        map.insert(normalize_key(project, key), replacement);
    }

    (map, sibling_externals)
}

/// Hard-coded text rules followed by the descriptor's.
fn text_rules(descriptor: &BundleDescriptor) -> Vec<TextReplaceRule> {
    let mut rules = vec![TextReplaceRule::new(
        "node_modules/tslib/tslib.js",
        "factory(createExporter(root, createExporter(module.exports)));",
        "factory(createExporter(module.exports));",
    )];
    if descriptor.is_universal() {
        rules.push(TextReplaceRule::new(
            "*",
            "process.env.BALE_DEBUG",
            "globalThis.BALE_DEBUG",
        ));
    }
    rules.extend(descriptor.replace_text.iter().cloned());
    rules
}

/// `standalone.js` and `parser-*.js` get an ES-module twin.
fn has_esm_twin(file_name: &str) -> bool {
    file_name == "standalone.js"
        || file_name
            .strip_prefix("parser-")
            .is_some_and(|rest| rest.ends_with(".js"))
}

fn esm_name(output: &str) -> String {
    let renamed = Path::new(output).with_extension("mjs");
    format!("esm/{}", to_slash(&renamed))
}

/// Keys that look like paths are made absolute; bare specifiers stay as written.
fn normalize_key(project: &Project, key: &str) -> String {
    let path = Path::new(key);
    let path_like = key.starts_with('.')
        || key.starts_with('/')
        || (!key.starts_with('@') && path.extension().is_some());
    if path_like {
        path_key(&project.resolve(path))
    } else {
        key.to_string()
    }
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `./`-prefixed specifier for `to`, as imported from the directory of `from`.
fn relative_specifier(from: &str, to: &str) -> String {
    let from_dir: Vec<Component<'_>> = Path::new(from)
        .parent()
        .map(|parent| parent.components().collect())
        .unwrap_or_default();
    let to_components: Vec<Component<'_>> = Path::new(to).components().collect();

    let common = from_dir
        .iter()
        .zip(&to_components)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from_dir.len() {
        relative.push("..");
    }
    for component in &to_components[common..] {
        relative.push(component.as_os_str());
    }

    let relative = to_slash(&relative);
    if relative.starts_with("../") {
        relative
    } else {
        format!("./{relative}")
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_contained_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && !path.is_absolute()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esm_twin_pattern() {
        assert!(has_esm_twin("standalone.js"));
        assert!(has_esm_twin("parser-babel.js"));
        assert!(has_esm_twin("parser-.js"));
        assert!(!has_esm_twin("doc.js"));
        assert!(!has_esm_twin("standalone.mjs"));
        assert!(!has_esm_twin("my-parser-babel.js"));
    }

    #[test]
    fn test_esm_name() {
        assert_eq!(esm_name("standalone.js"), "esm/standalone.mjs");
        assert_eq!(esm_name("plugins/parser-babel.js"), "esm/plugins/parser-babel.mjs");
    }

    #[test]
    fn test_relative_specifier() {
        assert_eq!(relative_specifier("index.js", "doc.js"), "./doc.js");
        assert_eq!(relative_specifier("index.js", "bin/cli.js"), "./bin/cli.js");
        assert_eq!(relative_specifier("bin/cli.js", "index.js"), "../index.js");
        assert_eq!(relative_specifier("bin/cli.js", "bin/run.js"), "./run.js");
    }

    #[test]
    fn test_define_map_targets() {
        let node = define_map(Target::Node);
        assert_eq!(node.get(TARGET_MARKER).map(String::as_str), Some("\"node\""));
        assert!(!node.contains_key("__dirname"));

        let universal = define_map(Target::Universal);
        assert_eq!(
            universal.get("process.env.NODE_ENV").map(String::as_str),
            Some("\"production\"")
        );
        assert_eq!(
            universal.get("__filename").map(String::as_str),
            Some(FILENAME_PLACEHOLDER)
        );
    }
}
