//! Descriptor validation.
//!
//! Everything here runs before the first bundler invocation; a descriptor
//! that fails is a configuration error and nothing gets built.

use std::collections::HashSet;
use std::path::{Component, Path};

use regex::Regex;

use crate::descriptor::{BundleDescriptor, Target};
use crate::error::{ConfigError, Result};
use crate::manifest::Manifest;

/// Validate every descriptor and check that outputs are unique.
pub fn validate_manifest(manifest: &Manifest) -> Result<()> {
    let mut outputs = HashSet::new();
    for descriptor in &manifest.bundles {
        validate_descriptor(descriptor)?;
        if !outputs.insert(descriptor.output.as_str()) {
            return Err(ConfigError::DuplicateOutput(descriptor.output.clone()));
        }
    }
    Ok(())
}

pub fn validate_descriptor(descriptor: &BundleDescriptor) -> Result<()> {
    let bundle = descriptor.input.display().to_string();

    if descriptor.input.as_os_str().is_empty() {
        return Err(ConfigError::descriptor(
            &descriptor.output,
            "input cannot be empty",
        ));
    }

    if descriptor.output.trim().is_empty() {
        return Err(ConfigError::descriptor(bundle, "output cannot be empty"));
    }

    if !is_contained_relative(Path::new(&descriptor.output)) {
        return Err(ConfigError::descriptor(
            bundle,
            format!(
                "output '{}' must be a relative path inside the distribution root",
                descriptor.output
            ),
        ));
    }

    if descriptor.target == Target::Universal {
        match descriptor.name.as_deref() {
            None => {
                return Err(ConfigError::descriptor(
                    bundle,
                    "universal bundles need a `name` for the UMD global",
                ));
            }
            Some(name) if !is_identifier(name) => {
                return Err(ConfigError::descriptor(
                    bundle,
                    format!("UMD name '{name}' is not a valid identifier"),
                ));
            }
            Some(_) => {}
        }
    }

    descriptor.syntax_plugins()?;

    for external in &descriptor.external {
        if external.trim().is_empty() {
            return Err(ConfigError::descriptor(
                bundle,
                "external module names cannot be empty",
            ));
        }
    }

    for rule in &descriptor.replace_text {
        if rule.find.is_empty() {
            return Err(ConfigError::descriptor(
                bundle,
                "replace_text rules need a non-empty `find`",
            ));
        }
        if rule.regex {
            Regex::new(&rule.find).map_err(|e| {
                ConfigError::descriptor(
                    bundle.clone(),
                    format!("invalid replace_text pattern '{}': {}", rule.find, e),
                )
            })?;
        }
    }

    Ok(())
}

fn is_contained_relative(path: &Path) -> bool {
    !path.is_absolute()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
