//! Textual patches applied to module sources.

use std::sync::Arc;

use bale_config::TextReplaceRule;
use regex::Regex;

use super::normalize_id;
use crate::{Error, Result};

#[derive(Debug)]
enum Matcher {
    Literal(String),
    Pattern(Regex),
    Invalid { pattern: String, error: String },
}

#[derive(Debug)]
struct CompiledRule {
    /// `None` matches every module.
    module: Option<String>,
    matcher: Matcher,
    replacement: String,
}

impl CompiledRule {
    fn applies_to(&self, id: &str) -> bool {
        self.module
            .as_deref()
            .is_none_or(|module| id.ends_with(module))
    }
}

#[derive(Debug, Clone)]
pub struct ReplaceTextPlugin {
    rules: Arc<Vec<CompiledRule>>,
}

impl ReplaceTextPlugin {
    pub fn new(rules: &[TextReplaceRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledRule {
                module: (!rule.applies_to_all()).then(|| normalize_id(&rule.module)),
                matcher: if rule.regex {
                    match Regex::new(&rule.find) {
                        Ok(regex) => Matcher::Pattern(regex),
                        Err(e) => Matcher::Invalid {
                            pattern: rule.find.clone(),
                            error: e.to_string(),
                        },
                    }
                } else {
                    Matcher::Literal(rule.find.clone())
                },
                replacement: rule.replacement.clone(),
            })
            .collect();
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Apply every matching rule in order. `None` when nothing changed.
    pub fn transform(&self, id: &str, code: &str) -> Result<Option<String>> {
        let id = normalize_id(id);
        let mut current: Option<String> = None;

        for rule in self.rules.iter().filter(|rule| rule.applies_to(&id)) {
            let source = current.as_deref().unwrap_or(code);
            let replaced = match &rule.matcher {
                Matcher::Literal(find) if source.contains(find.as_str()) => {
                    source.replace(find.as_str(), &rule.replacement)
                }
                Matcher::Pattern(regex) if regex.is_match(source) => regex
                    .replace_all(source, rule.replacement.as_str())
                    .into_owned(),
                Matcher::Invalid { pattern, error } => {
                    return Err(Error::plugin(
                        "bale:replace-text",
                        format!("invalid pattern '{pattern}': {error}"),
                    ));
                }
                _ => continue,
            };
            current = Some(replaced);
        }

        Ok(current)
    }
}
