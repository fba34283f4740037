//! Third-party license extraction.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{BuildReport, SideOutput, package_root};
use crate::runtime::{Runtime, read_to_string};
use crate::{Error, Result};

const LICENSE_FILES: &[&str] = &[
    "LICENSE",
    "LICENSE.md",
    "LICENSE.txt",
    "license",
    "license.md",
    "LICENCE",
    "LICENCE.md",
];

/// One bundled third-party package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseEntry {
    pub name: String,
    pub version: String,
    pub license: Option<String>,
    pub license_text: Option<String>,
}

/// Every license recorded during one invocation.
///
/// The sink is shared by all descriptors and variants, so each manifest
/// written holds the union of what was bundled so far.
#[derive(Debug, Default)]
pub struct LicenseLedger {
    entries: Mutex<BTreeSet<LicenseEntry>>,
}

impl LicenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entries` and return everything recorded, sorted by name.
    pub fn record(&self, entries: impl IntoIterator<Item = LicenseEntry>) -> Vec<LicenseEntry> {
        let mut recorded = self.entries.lock();
        recorded.extend(entries);
        let mut all: Vec<LicenseEntry> = recorded.iter().cloned().collect();
        all.dedup_by(|a, b| a.name == b.name && a.version == b.version);
        all
    }

    pub fn entries(&self) -> Vec<LicenseEntry> {
        self.record(std::iter::empty())
    }
}

#[derive(Debug, Clone)]
pub struct LicensePlugin {
    sink: PathBuf,
}

impl LicensePlugin {
    pub fn new(sink: impl Into<PathBuf>) -> Self {
        Self { sink: sink.into() }
    }

    /// Record the packages present in the artifact and render the manifest
    /// of everything `ledger` holds.
    pub async fn manifest(
        &self,
        report: &BuildReport<'_>,
        runtime: &dyn Runtime,
        ledger: &LicenseLedger,
    ) -> Result<SideOutput> {
        let packages: BTreeSet<PathBuf> = report
            .modules
            .iter()
            .filter_map(|id| package_root(id))
            .collect();

        let mut entries = Vec::with_capacity(packages.len());
        for package in &packages {
            if let Some(entry) = read_package(package, runtime).await? {
                entries.push(entry);
            }
        }
        debug!(
            output = report.output,
            packages = entries.len(),
            "collected third-party licenses"
        );
        let entries = ledger.record(entries);

        let contents = serde_json::to_string_pretty(&entries)
            .map_err(|e| Error::plugin("bale:license", e.to_string()))?;
        Ok(SideOutput {
            path: self.sink.clone(),
            contents,
        })
    }
}

async fn read_package(root: &Path, runtime: &dyn Runtime) -> Result<Option<LicenseEntry>> {
    let manifest_path = root.join("package.json");
    if !runtime.exists(&manifest_path) {
        debug!(package = %root.display(), "package without package.json");
        return Ok(None);
    }

    let manifest = read_to_string(runtime, &manifest_path)
        .await
        .map_err(|e| Error::io(format!("Failed to read {}", manifest_path.display()), e))?;
    let manifest: Value = serde_json::from_str(&manifest).map_err(|e| {
        Error::plugin("bale:license", format!("{}: {}", manifest_path.display(), e))
    })?;

    let name = match manifest.get("name").and_then(Value::as_str) {
        Some(name) => name.to_string(),
        None => return Ok(None),
    };
    let version = manifest
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    // `license` may be a string or the legacy `{ "type": ... }` object
    let license = match manifest.get("license") {
        Some(Value::String(license)) => Some(license.clone()),
        Some(Value::Object(map)) => map.get("type").and_then(Value::as_str).map(String::from),
        _ => None,
    };

    let mut license_text = None;
    for file in LICENSE_FILES {
        let path = root.join(file);
        if runtime.exists(&path) {
            let text = read_to_string(runtime, &path)
                .await
                .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;
            license_text = Some(text.trim().to_string());
            break;
        }
    }

    Ok(Some(LicenseEntry {
        name,
        version,
        license,
        license_text,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemoryRuntime;

    #[tokio::test]
    async fn test_manifest_lists_bundled_packages() {
        let runtime = MemoryRuntime::new();
        runtime.insert(
            "/repo/node_modules/tslib/package.json",
            r#"{"name":"tslib","version":"2.6.0","license":"0BSD"}"#,
        );
        runtime.insert("/repo/node_modules/tslib/LICENSE.txt", "Copyright Microsoft\n");
        runtime.insert(
            "/repo/node_modules/@scope/dep/package.json",
            r#"{"name":"@scope/dep","version":"1.0.0","license":{"type":"MIT"}}"#,
        );

        let modules = vec![
            "/repo/src/index.js".to_string(),
            "/repo/node_modules/tslib/tslib.js".to_string(),
            "/repo/node_modules/tslib/modules/index.js".to_string(),
            "/repo/node_modules/@scope/dep/lib/a.js".to_string(),
        ];
        let report = BuildReport {
            output: "index.js",
            warnings: &[],
            modules: &modules,
        };

        let side = LicensePlugin::new("/repo/dist/licenses.json")
            .manifest(&report, &runtime, &LicenseLedger::new())
            .await
            .unwrap();
        assert_eq!(side.path, PathBuf::from("/repo/dist/licenses.json"));

        let entries: Vec<LicenseEntry> = serde_json::from_str(&side.contents).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "@scope/dep");
        assert_eq!(entries[0].license.as_deref(), Some("MIT"));
        assert_eq!(entries[1].name, "tslib");
        assert_eq!(entries[1].license_text.as_deref(), Some("Copyright Microsoft"));
        assert!(side.contents.contains("\"licenseText\""));
    }

    #[tokio::test]
    async fn test_manifest_accumulates_across_passes() {
        let runtime = MemoryRuntime::new();
        runtime.insert(
            "/repo/node_modules/left-pad/package.json",
            r#"{"name":"left-pad","version":"1.3.0","license":"WTFPL"}"#,
        );
        runtime.insert(
            "/repo/node_modules/tslib/package.json",
            r#"{"name":"tslib","version":"2.6.0","license":"0BSD"}"#,
        );
        let plugin = LicensePlugin::new("/repo/dist/licenses.json");
        let ledger = LicenseLedger::new();

        let first = vec!["/repo/node_modules/tslib/tslib.js".to_string()];
        let second = vec![
            "/repo/node_modules/left-pad/index.js".to_string(),
            "/repo/node_modules/tslib/tslib.js".to_string(),
        ];
        for (output, modules) in [("index.js", &first), ("standalone.js", &second)] {
            let report = BuildReport {
                output,
                warnings: &[],
                modules,
            };
            plugin.manifest(&report, &runtime, &ledger).await.unwrap();
        }

        let only_first = BuildReport {
            output: "index.js",
            warnings: &[],
            modules: &first,
        };
        let side = plugin.manifest(&only_first, &runtime, &ledger).await.unwrap();
        let entries: Vec<LicenseEntry> = serde_json::from_str(&side.contents).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["left-pad", "tslib"]);
        assert_eq!(ledger.entries().len(), 2);
    }
}
