//! UMD wrapper around a CommonJS chunk.

/// Marker comment on the first line of wrapped output.
pub const UMD_BANNER: &str = "/* bale umd */";

#[derive(Debug, Clone)]
pub struct UmdWrapPlugin {
    global_name: String,
}

impl UmdWrapPlugin {
    pub fn new(global_name: impl Into<String>) -> Self {
        Self {
            global_name: global_name.into(),
        }
    }

    pub fn global_name(&self) -> &str {
        &self.global_name
    }

    /// Wrap CommonJS `code` so it loads as CommonJS, AMD or a global.
    pub fn wrap(&self, code: &str) -> String {
        format!(
            r#"{banner}
(function (root, factory) {{
  if (typeof exports === "object" && typeof module === "object") {{
    module.exports = factory();
  }} else if (typeof define === "function" && define.amd) {{
    define([], factory);
  }} else {{
    var g = typeof globalThis !== "undefined" ? globalThis
      : typeof self !== "undefined" ? self
      : typeof global !== "undefined" ? global
      : root || {{}};
    g.{name} = factory();
  }}
}})(this, function () {{
var module = {{ exports: {{}} }};
var exports = module.exports;
{code}
return module.exports;
}});
"#,
            banner = UMD_BANNER,
            name = self.global_name,
            code = code.trim_end(),
        )
    }
}
