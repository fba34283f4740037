//! Project package metadata (`package.json`).
//!
//! Only the version and the browser support matrix matter to the build, so
//! that is all this reads.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub version: String,
    /// Browser support queries, one per entry.
    pub browserslist: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BrowserslistField {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RawPackageJson {
    name: Option<String>,
    version: Option<String>,
    browserslist: Option<BrowserslistField>,
}

impl PackageMetadata {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: None,
            version: version.into(),
            browserslist: Vec::new(),
        }
    }

    pub fn with_browserslist<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.browserslist = queries.into_iter().map(Into::into).collect();
        self
    }

    /// Read `package.json` from the project root.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("package.json");
        let content = fs::read_to_string(&path).map_err(|e| {
            ConfigError::Metadata(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawPackageJson = serde_json::from_str(content)
            .map_err(|e| ConfigError::Metadata(format!("invalid package.json: {e}")))?;

        let version = raw
            .version
            .ok_or_else(|| ConfigError::Metadata("package.json has no version".to_string()))?;

        let browserslist = match raw.browserslist {
            None => Vec::new(),
            // A single string is a comma-separated query list
            Some(BrowserslistField::One(query)) => query
                .split(',')
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from)
                .collect(),
            Some(BrowserslistField::Many(queries)) => queries,
        };

        Ok(Self {
            name: raw.name,
            version,
            browserslist,
        })
    }
}
