//! Runtime-target resolution.
//!
//! Targets are plain strings understood by the downlevel transform
//! (`chrome60`, `node14`, `es2018`).

use bale_config::{BundleDescriptor, PackageMetadata, Target};
use tracing::debug;

/// Minimum syntax level every universal bundle is lowered to.
pub const UNIVERSAL_MINIMUM: &str = "es2018";

/// Node.js runtime baseline.
pub const NODE_BASELINE: &str = "node14";

const KNOWN_BROWSERS: &[(&str, &str)] = &[
    ("chrome", "chrome"),
    ("edge", "edge"),
    ("firefox", "firefox"),
    ("safari", "safari"),
    ("ios_saf", "ios"),
    ("ios", "ios"),
    ("opera", "opera"),
    ("samsung", "samsung"),
    ("node", "node"),
];

/// Runtime targets for a descriptor: the explicit list if present, otherwise
/// derived from the target kind.
pub fn runtime_targets(descriptor: &BundleDescriptor, metadata: &PackageMetadata) -> Vec<String> {
    if let Some(explicit) = &descriptor.runtime_target {
        return explicit.clone();
    }

    match descriptor.target {
        Target::Node => vec![NODE_BASELINE.to_string()],
        Target::Universal => {
            let mut targets = browserslist_targets(&metadata.browserslist);
            targets.push(UNIVERSAL_MINIMUM.to_string());
            targets
        }
    }
}

/// Convert browserslist queries to runtime targets.
///
/// Only `<browser> >= <version>` and `<browser> <version>` are understood.
/// Everything else (`defaults`, `not dead`, `last 2 versions`, ...) is skipped.
pub fn browserslist_targets(queries: &[String]) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for query in queries {
        match parse_query(query) {
            Some(target) => {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
            None => debug!(query = %query, "ignoring browserslist query"),
        }
    }
    targets
}

fn parse_query(query: &str) -> Option<String> {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    let (browser, version) = match tokens.as_slice() {
        [browser, ">=", version] => (*browser, *version),
        [browser, version] => (*browser, *version),
        _ => return None,
    };

    let browser = browser.to_ascii_lowercase();
    let engine = KNOWN_BROWSERS
        .iter()
        .find(|(name, _)| *name == browser)
        .map(|(_, engine)| *engine)?;

    // Ranges like `11.0-11.2` use their lower bound
    let version = version.split('-').next().unwrap_or(version);
    let valid = !version.is_empty()
        && version.chars().all(|c| c.is_ascii_digit() || c == '.')
        && version.chars().next().is_some_and(|c| c.is_ascii_digit());
    valid.then(|| format!("{engine}{version}"))
}
