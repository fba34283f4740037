//! Bundle descriptors: the static record describing one logical build target.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Runtime a bundle is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Node.js only; emitted as CommonJS.
    Node,
    /// Browser and server alike; emitted as UMD (plus an optional ESM twin).
    Universal,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Node => "node",
            Target::Universal => "universal",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a replaced module resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleReplacement {
    /// Load this file instead.
    Path(PathBuf),
    /// Serve these contents instead of reading the module.
    Contents(String),
    /// Leave the import unbundled and point it at this specifier.
    External(String),
}

impl ModuleReplacement {
    /// An empty ES module.
    pub fn empty() -> Self {
        Self::Contents("export default {};".to_string())
    }
}

/// A textual patch applied to module sources during bundling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextReplaceRule {
    /// Module path suffix this rule applies to, or `*` for every module.
    pub module: String,
    pub find: String,
    pub replacement: String,
    /// Treat `find` as a regular expression.
    #[serde(default)]
    pub regex: bool,
}

impl TextReplaceRule {
    pub fn new(
        module: impl Into<String>,
        find: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            find: find.into(),
            replacement: replacement.into(),
            regex: false,
        }
    }

    pub fn applies_to_all(&self) -> bool {
        self.module == "*"
    }
}

/// Syntax transforms a descriptor can force during downleveling, on top of
/// what its runtime targets already require.
///
/// Identifiers follow the Babel plugin names; the `@babel/plugin-` prefix and
/// the `transform-`/`proposal-` stem are both optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxPlugin {
    ArrowFunctions,
    ExponentiationOperator,
    AsyncToGenerator,
    ObjectRestSpread,
    AsyncGeneratorFunctions,
    OptionalCatchBinding,
    NullishCoalescingOperator,
    OptionalChaining,
    LogicalAssignmentOperators,
    ClassProperties,
    ClassStaticBlock,
}

impl SyntaxPlugin {
    pub const ALL: &'static [SyntaxPlugin] = &[
        SyntaxPlugin::ArrowFunctions,
        SyntaxPlugin::ExponentiationOperator,
        SyntaxPlugin::AsyncToGenerator,
        SyntaxPlugin::ObjectRestSpread,
        SyntaxPlugin::AsyncGeneratorFunctions,
        SyntaxPlugin::OptionalCatchBinding,
        SyntaxPlugin::NullishCoalescingOperator,
        SyntaxPlugin::OptionalChaining,
        SyntaxPlugin::LogicalAssignmentOperators,
        SyntaxPlugin::ClassProperties,
        SyntaxPlugin::ClassStaticBlock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxPlugin::ArrowFunctions => "arrow-functions",
            SyntaxPlugin::ExponentiationOperator => "exponentiation-operator",
            SyntaxPlugin::AsyncToGenerator => "async-to-generator",
            SyntaxPlugin::ObjectRestSpread => "object-rest-spread",
            SyntaxPlugin::AsyncGeneratorFunctions => "async-generator-functions",
            SyntaxPlugin::OptionalCatchBinding => "optional-catch-binding",
            SyntaxPlugin::NullishCoalescingOperator => "nullish-coalescing-operator",
            SyntaxPlugin::OptionalChaining => "optional-chaining",
            SyntaxPlugin::LogicalAssignmentOperators => "logical-assignment-operators",
            SyntaxPlugin::ClassProperties => "class-properties",
            SyntaxPlugin::ClassStaticBlock => "class-static-block",
        }
    }

    /// Look up a plugin identifier. `None` for anything unknown.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        let id = id
            .strip_prefix("@babel/plugin-")
            .or_else(|| id.strip_prefix("babel-plugin-"))
            .unwrap_or(id);
        let stem = id
            .strip_prefix("transform-")
            .or_else(|| id.strip_prefix("proposal-"))
            .unwrap_or(id);
        Self::ALL.iter().copied().find(|plugin| plugin.as_str() == stem)
    }
}

impl std::fmt::Display for SyntaxPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one logical build target.
///
/// Identity is the `input` path. Descriptors are read from the manifest and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleDescriptor {
    /// Entry file, relative to the project root.
    pub input: PathBuf,

    /// Artifact path, relative to the distribution root.
    pub output: String,

    pub target: Target,

    /// Module specifiers that are never bundled.
    #[serde(default)]
    pub external: Vec<String>,

    /// Syntax-transform plugin identifiers applied only while downleveling.
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Descriptor-specific module replacements; merged over the defaults.
    #[serde(default)]
    pub replace_module: IndexMap<String, ModuleReplacement>,

    /// Descriptor-specific text patches; appended after the defaults.
    #[serde(default)]
    pub replace_text: Vec<TextReplaceRule>,

    #[serde(default)]
    pub skip_legacy_downlevel: bool,

    /// `None` lets the resolver derive minification from the target.
    #[serde(default)]
    pub minify: Option<bool>,

    /// Explicit runtime-target list; overrides the derived defaults.
    #[serde(default)]
    pub runtime_target: Option<Vec<String>>,

    /// Global name exposed by the UMD wrapper.
    #[serde(default)]
    pub name: Option<String>,
}

impl BundleDescriptor {
    fn with_target(input: impl Into<PathBuf>, output: impl Into<String>, target: Target) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            target,
            external: Vec::new(),
            plugins: Vec::new(),
            replace_module: IndexMap::new(),
            replace_text: Vec::new(),
            skip_legacy_downlevel: false,
            minify: None,
            runtime_target: None,
            name: None,
        }
    }

    /// A Node.js bundle emitted as CommonJS.
    pub fn node(input: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        Self::with_target(input, output, Target::Node)
    }

    /// A universal bundle exposed as `name` when loaded as a script.
    pub fn universal(
        input: impl Into<PathBuf>,
        output: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut descriptor = Self::with_target(input, output, Target::Universal);
        descriptor.name = Some(name.into());
        descriptor
    }

    pub fn is_universal(&self) -> bool {
        self.target == Target::Universal
    }

    /// The `plugins` list as known syntax transforms.
    pub fn syntax_plugins(&self) -> Result<Vec<SyntaxPlugin>> {
        self.plugins
            .iter()
            .map(|id| {
                SyntaxPlugin::from_id(id).ok_or_else(|| ConfigError::UnknownSyntaxPlugin {
                    bundle: self.input.display().to_string(),
                    plugin: id.clone(),
                })
            })
            .collect()
    }

    /// File name of the artifact (`parser-babel.js` for `plugins/parser-babel.js`).
    pub fn output_file_name(&self) -> &str {
        Path::new(&self.output)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.output)
    }
}
