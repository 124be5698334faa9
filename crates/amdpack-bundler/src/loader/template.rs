//! The loader runtime, rendered once per target from its capability table.

use minijinja::Environment;

use super::target::Capabilities;
use crate::Result;

/// Splits the rendered runtime into header and footer.
pub(crate) const BUNDLE_MARKER: &str = "'marker:bundle';";

/// Replaced by the entry module name, or `entry[0]` for the last define.
pub(crate) const ENTRY_MARKER: &str = "\"marker:entry\"";

const RUNTIME: &str = r#"(function () {
{% set decl = "const" if block_scoping else "var" %}
{% set binding = "let" if block_scoping else "var" %}
{% set exports_fn = "(exports) =>" if arrow_functions else "function (exports)" %}
{% set catch_clause = "catch" if optional_catch_binding else "catch (error)" %}
{% set invoke = "definition.factory(...dependencies)" if spread_arguments else "definition.factory.apply(null, dependencies)" %}
    {{ decl }} defines = {};
    {{ decl }} entry = [null];
    {{ decl }} instances = {};
    {{ decl }} host = typeof globalThis !== "undefined" ? globalThis
        : typeof window !== "undefined" ? window
        : typeof self !== "undefined" ? self
        : this;

    function has(table, name) {
        return Object.prototype.hasOwnProperty.call(table, name);
    }

    function set_default(exports, flag, value) {
{% if define_property %}
        Object.defineProperty(exports, flag, { value: true });
        Object.defineProperty(exports, "default", { value: value });
{% else %}
        exports[flag] = true;
        exports["default"] = value;
{% endif %}
    }

    function host_require(name) {
        if (typeof require !== "function") {
            throw new Error("require is not available in this host.");
        }
        return require(name);
    }

    function define(name, dependencies, factory) {
        defines[name] = { dependencies: dependencies, factory: factory };
        entry[0] = name;
    }

    define("require", ["exports"], {{ exports_fn }} {
        set_default(exports, "__cjsModule", host_require);
    });

    'marker:bundle';

    function get_define(name) {
        if (has(defines, name)) {
            return defines[name];
        }
        if (has(defines, name + "/index")) {
            return defines[name + "/index"];
        }
        return {
            dependencies: ["exports"],
            factory: {{ exports_fn }} {
                {{ binding }} value;
                try {
                    value = host_require(name);
                } {{ catch_clause }} {
                    throw new Error("module " + name + " not found.");
                }
                set_default(exports, "__cjsModule", value);
            }
        };
    }

    function resolve(name) {
        if (has(instances, name)) {
            return instances[name].value;
        }
        {{ decl }} definition = get_define(name);
        {{ decl }} exports = {};
        {{ decl }} record = { state: "registered", value: exports };
        instances[name] = record;
        try {
            {{ decl }} dependencies = [];
            for ({{ binding }} i = 0; i < definition.dependencies.length; i++) {
                {{ decl }} dependency = definition.dependencies[i];
                dependencies.push(dependency === "exports" ? exports : resolve(dependency));
            }
            {{ invoke }};
            record.state = "ready";
        } finally {
            if (record.state !== "ready") {
                delete instances[name];
            }
        }
        if (exports["__cjsModule"]) {
            record.value = exports["default"];
        }
        return record.value;
    }

    if (entry[0] !== null) {
        return resolve("marker:entry");
    }
})();
"#;

/// Render the runtime and split it at the bundle marker.
pub(crate) fn render(capabilities: &Capabilities) -> Result<(String, String)> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("loader", RUNTIME)?;
    let rendered = env.get_template("loader")?.render(capabilities)?;

    let (header, footer) = rendered
        .split_once(BUNDLE_MARKER)
        .unwrap_or((rendered.as_str(), ""));
    Ok((
        header.trim_end().to_string(),
        footer.trim_start_matches('\n').trim_end().to_string(),
    ))
}
