//! Bundle-composition reports.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use bale_config::ReportFormat;
use parking_lot::Mutex;
use serde::Serialize;

use super::{BuildReport, SideOutput};

#[derive(Debug, Serialize)]
struct ModuleSize<'a> {
    id: &'a str,
    size: usize,
}

#[derive(Debug, Serialize)]
struct Composition<'a> {
    output: &'a str,
    total: usize,
    modules: Vec<ModuleSize<'a>>,
}

#[derive(Debug, Clone)]
pub struct VisualizePlugin {
    formats: Vec<ReportFormat>,
    /// Report path without the format extension.
    base: PathBuf,
    sizes: Arc<Mutex<BTreeMap<String, usize>>>,
}

impl VisualizePlugin {
    pub fn new(formats: Vec<ReportFormat>, base: impl Into<PathBuf>) -> Self {
        Self {
            formats,
            base: base.into(),
            sizes: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Record the transformed size of a module.
    pub fn observe(&self, id: &str, code: &str) {
        self.sizes.lock().insert(id.to_string(), code.len());
    }

    pub fn reports(&self, report: &BuildReport<'_>) -> Vec<SideOutput> {
        let sizes = self.sizes.lock();
        let mut modules: Vec<ModuleSize<'_>> = report
            .modules
            .iter()
            .map(|id| ModuleSize {
                id,
                size: sizes.get(id).copied().unwrap_or(0),
            })
            .collect();
        modules.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.id.cmp(b.id)));

        let composition = Composition {
            output: report.output,
            total: modules.iter().map(|m| m.size).sum(),
            modules,
        };

        self.formats
            .iter()
            .map(|format| SideOutput {
                path: self.path_for(*format),
                contents: match format {
                    ReportFormat::Json => render_json(&composition),
                    ReportFormat::Html => render_html(&composition),
                },
            })
            .collect()
    }

    fn path_for(&self, format: ReportFormat) -> PathBuf {
        let mut name = self.base.as_os_str().to_owned();
        name.push(".");
        name.push(format.extension());
        PathBuf::from(name)
    }
}

fn render_json(composition: &Composition<'_>) -> String {
    serde_json::to_string_pretty(composition).unwrap_or_else(|_| "{}".to_string())
}

fn render_html(composition: &Composition<'_>) -> String {
    let mut rows = String::new();
    for module in &composition.modules {
        let share = if composition.total == 0 {
            0.0
        } else {
            module.size as f64 * 100.0 / composition.total as f64
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
            escape(module.id),
            module.size,
            share
        ));
    }
    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n<p>{total} bytes</p>\n<table>\n<tr><th>Module</th><th>Size</th><th>Share</th></tr>\n{rows}</table>\n</body></html>\n",
        title = escape(composition.output),
        total = composition.total,
        rows = rows,
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\0', "")
}
