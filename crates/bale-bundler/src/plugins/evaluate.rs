//! Build-time evaluation of data modules.
//!
//! `foo.evaluate.json` / `foo.evaluate.toml` are parsed during the build and
//! inlined as an ES module, so the parser for the data format never ships.

use std::path::Path;

use serde_json::Value;

use crate::runtime::{Runtime, read_to_string};
use crate::{Error, Result};

const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

#[derive(Debug, Clone, Default)]
pub struct EvaluatePlugin;

impl EvaluatePlugin {
    pub fn new() -> Self {
        Self
    }

    pub fn handles(id: &str) -> bool {
        id.contains(".evaluate.") && (id.ends_with(".json") || id.ends_with(".toml"))
    }

    pub async fn load(&self, id: &str, runtime: &dyn Runtime) -> Result<Option<String>> {
        if !Self::handles(id) {
            return Ok(None);
        }

        let source = read_to_string(runtime, Path::new(id))
            .await
            .map_err(|e| Error::io(format!("Failed to read evaluated module {id}"), e))?;

        let value: Value = if id.ends_with(".toml") {
            let parsed: toml::Table = toml::from_str(&source)
                .map_err(|e| Error::plugin("bale:evaluate", format!("{id}: {e}")))?;
            serde_json::to_value(parsed)
                .map_err(|e| Error::plugin("bale:evaluate", format!("{id}: {e}")))?
        } else {
            serde_json::from_str(&source)
                .map_err(|e| Error::plugin("bale:evaluate", format!("{id}: {e}")))?
        };

        Ok(Some(to_module(&value)))
    }
}

fn to_module(value: &Value) -> String {
    let mut module = format!("const data = {value};\nexport default data;\n");
    if let Value::Object(map) = value {
        for key in map.keys().filter(|key| is_exportable(key)) {
            module.push_str(&format!("export const {key} = data[{}];\n", Value::from(key.as_str())));
        }
    }
    module
}

fn is_exportable(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED.contains(&key)
}
