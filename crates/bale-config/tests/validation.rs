//! Tests for descriptor validation rules.

use bale_config::{
    validate_descriptor, validate_manifest, BundleDescriptor, ConfigError, Manifest,
    TextReplaceRule,
};

#[test]
fn accepts_minimal_descriptors() {
    validate_descriptor(&BundleDescriptor::node("src/index.js", "index.js")).unwrap();
    validate_descriptor(&BundleDescriptor::universal(
        "src/standalone.js",
        "standalone.js",
        "bale",
    ))
    .unwrap();
}

#[test]
fn rejects_escaping_output() {
    let descriptor = BundleDescriptor::node("src/index.js", "../index.js");
    let err = validate_descriptor(&descriptor).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDescriptor { .. }));
}

#[test]
fn rejects_invalid_umd_name() {
    let descriptor = BundleDescriptor::universal("src/a.js", "a.js", "not-valid");
    assert!(validate_descriptor(&descriptor).is_err());
}

#[test]
fn rejects_bad_regex_rule() {
    let mut descriptor = BundleDescriptor::node("src/index.js", "index.js");
    let mut rule = TextReplaceRule::new("*", "(unclosed", "x");
    rule.regex = true;
    descriptor.replace_text.push(rule);

    let err = validate_descriptor(&descriptor).unwrap_err();
    assert!(err.to_string().contains("invalid replace_text pattern"));
}

#[test]
fn literal_rules_are_not_compiled() {
    let mut descriptor = BundleDescriptor::node("src/index.js", "index.js");
    descriptor
        .replace_text
        .push(TextReplaceRule::new("*", "(unclosed", "x"));
    validate_descriptor(&descriptor).unwrap();
}

#[test]
fn rejects_unknown_syntax_plugin() {
    let mut descriptor = BundleDescriptor::universal("src/a.js", "a.js", "a");
    descriptor.plugins = vec![
        "transform-optional-chaining".to_string(),
        "transform-html-literals".to_string(),
    ];

    let err = validate_descriptor(&descriptor).unwrap_err();
    assert!(
        matches!(err, ConfigError::UnknownSyntaxPlugin { ref plugin, .. } if plugin == "transform-html-literals")
    );
    assert!(err.to_string().contains("unknown syntax plugin"));
}

#[test]
fn rejects_duplicate_outputs() {
    let manifest = Manifest {
        bundles: vec![
            BundleDescriptor::node("src/a.js", "index.js"),
            BundleDescriptor::node("src/b.js", "index.js"),
        ],
        ..Manifest::default()
    };
    let err = validate_manifest(&manifest).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateOutput(ref out) if out == "index.js"));
}
