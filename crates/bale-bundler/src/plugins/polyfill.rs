//! Browser shims for Node.js built-ins in universal bundles.

use super::{Resolution, VIRTUAL_PREFIX};

const PATH_SHIM: &str = r#"function normalize(parts) {
  const out = [];
  for (const part of parts.join("/").split("/")) {
    if (part === "" || part === ".") continue;
    if (part === "..") out.pop();
    else out.push(part);
  }
  return out;
}
export const sep = "/";
export const delimiter = ":";
export function join(...parts) { return normalize(parts).join("/") || "."; }
export function resolve(...parts) { return "/" + normalize(parts).join("/"); }
export function dirname(p) { const i = p.lastIndexOf("/"); return i <= 0 ? (i === 0 ? "/" : ".") : p.slice(0, i); }
export function basename(p, ext) { let b = p.slice(p.lastIndexOf("/") + 1); if (ext && b.endsWith(ext)) b = b.slice(0, -ext.length); return b; }
export function extname(p) { const b = basename(p); const i = b.lastIndexOf("."); return i > 0 ? b.slice(i) : ""; }
export function isAbsolute(p) { return p.startsWith("/"); }
const path = { sep, delimiter, join, resolve, dirname, basename, extname, isAbsolute };
path.posix = path;
export const posix = path;
export default path;
"#;

const FS_SHIM: &str = r#"export function existsSync() { return false; }
export function readFileSync() { throw new Error("fs is not available in the browser"); }
export const promises = {};
export default { existsSync, readFileSync, promises };
"#;

const URL_SHIM: &str = r#"export const URL = globalThis.URL;
export function pathToFileURL(p) { return new URL("file://" + p); }
export function fileURLToPath(u) { return new URL(u).pathname; }
export default { URL, pathToFileURL, fileURLToPath };
"#;

const MODULE_SHIM: &str = r#"export function createRequire() {
  return function require(id) { throw new Error("Cannot require '" + id + "' in the browser"); };
}
export default { createRequire };
"#;

const OS_SHIM: &str = r#"export const EOL = "\n";
export function platform() { return "browser"; }
export function homedir() { return "/"; }
export default { EOL, platform, homedir };
"#;

const UTIL_SHIM: &str = r#"export function inspect(value) { try { return JSON.stringify(value); } catch { return String(value); } }
export function promisify(fn) { return (...args) => new Promise((ok, fail) => fn(...args, (err, v) => (err ? fail(err) : ok(v)))); }
export const TextEncoder = globalThis.TextEncoder;
export const TextDecoder = globalThis.TextDecoder;
export default { inspect, promisify, TextEncoder, TextDecoder };
"#;

const ASSERT_SHIM: &str = r#"export default function assert(value, message) {
  if (!value) throw new Error(message || "Assertion failed");
}
export const ok = assert;
export function strictEqual(a, b, message) { assert(a === b, message); }
"#;

const TTY_SHIM: &str = r#"export function isatty() { return false; }
export default { isatty };
"#;

const PROCESS_SHIM: &str = r#"const process = { env: {}, argv: [], platform: "browser", cwd() { return "/"; } };
export const env = process.env;
export const argv = process.argv;
export default process;
"#;

const EVENTS_SHIM: &str = r#"export class EventEmitter {
  constructor() { this._events = new Map(); }
  on(name, fn) { (this._events.get(name) || this._events.set(name, []).get(name)).push(fn); return this; }
  off(name, fn) { const list = this._events.get(name) || []; const i = list.indexOf(fn); if (i >= 0) list.splice(i, 1); return this; }
  emit(name, ...args) { const list = this._events.get(name) || []; for (const fn of [...list]) fn(...args); return list.length > 0; }
}
export default EventEmitter;
"#;

/// Built-in module names (without `node:`) and their shims.
pub const BUILTIN_SHIMS: &[(&str, &str)] = &[
    ("path", PATH_SHIM),
    ("fs", FS_SHIM),
    ("url", URL_SHIM),
    ("module", MODULE_SHIM),
    ("os", OS_SHIM),
    ("util", UTIL_SHIM),
    ("assert", ASSERT_SHIM),
    ("tty", TTY_SHIM),
    ("process", PROCESS_SHIM),
    ("events", EVENTS_SHIM),
];

#[derive(Debug, Clone, Default)]
pub struct PolyfillPlugin;

impl PolyfillPlugin {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve_id(&self, specifier: &str) -> Option<Resolution> {
        let name = specifier.strip_prefix("node:").unwrap_or(specifier);
        shim(name).map(|_| Resolution::Module(format!("{VIRTUAL_PREFIX}polyfill:{name}")))
    }

    pub fn load(&self, id: &str) -> Option<String> {
        let name = id.strip_prefix(VIRTUAL_PREFIX)?.strip_prefix("polyfill:")?;
        shim(name).map(str::to_string)
    }
}

fn shim(name: &str) -> Option<&'static str> {
    BUILTIN_SHIMS
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, code)| *code)
}
