//! AMD reader.
//!
//! Reads the module headers out of a `tsc` AMD bundle and works out which
//! dependencies are resource directives (`text!./file.txt`, `json!../data.json`,
//! ...). Each resource token is resolved against the directory of the module
//! that imports it, giving a stable key such as `text!assets/file.txt`. The
//! reader also produces the remap table and the per-`define` rewrites needed to
//! point those dependencies at the injected resource modules.

mod scanner;

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::{BundleError, Result};

/// Resource directive prefix on a dependency token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// UTF-8 text as a string literal
    Text,
    /// Parsed and re-serialized JSON
    Json,
    /// Raw bytes as a base64 string
    Base64,
    /// Raw bytes as a `Uint8Array`
    Buffer,
    /// Stylesheet with its `@import`s inlined
    Css,
    /// Every file below a directory, keyed by relative path
    Directory,
}

impl Directive {
    /// All directives the reader recognises.
    pub const ALL: [Directive; 6] = [
        Directive::Text,
        Directive::Json,
        Directive::Base64,
        Directive::Buffer,
        Directive::Css,
        Directive::Directory,
    ];

    /// Parse a directive prefix. Unknown prefixes return `None`.
    pub fn parse(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == prefix)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Text => "text",
            Directive::Json => "json",
            Directive::Base64 => "base64",
            Directive::Buffer => "buffer",
            Directive::Css => "css",
            Directive::Directory => "directory",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Directive {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| BundleError::UnknownDirective(s.to_string()))
    }
}

/// A code module declared by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDefine {
    pub name: String,
    /// Dependencies in factory-argument order, resource tokens already remapped
    pub dependencies: Vec<String>,
}

/// A resource module synthesized from a directive dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefine {
    /// `directive!path`, unique per bundle
    pub name: String,
    /// Path of the file relative to the project root
    pub source_path: String,
    pub directive: Directive,
    pub dependencies: Vec<String>,
}

impl ResourceDefine {
    /// Build a resource from its `directive!path` key.
    ///
    /// `prefix` is prepended to the source path so lookups stay anchored to the
    /// project root when the compiler relocated the entry module.
    pub fn from_key(key: &str, prefix: &str) -> Result<Self> {
        let (directive, path) = key
            .split_once('!')
            .ok_or_else(|| BundleError::UnknownDirective(key.to_string()))?;
        Ok(Self {
            name: key.to_string(),
            source_path: format!("{}{}", prefix, path),
            directive: directive.parse()?,
            dependencies: vec!["exports".to_string()],
        })
    }
}

/// Either kind of definition found in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Define {
    Module(ModuleDefine),
    Resource(ResourceDefine),
}

impl Define {
    pub fn name(&self) -> &str {
        match self {
            Define::Module(m) => &m.name,
            Define::Resource(r) => &r.name,
        }
    }

    pub fn dependencies(&self) -> &[String] {
        match self {
            Define::Module(m) => &m.dependencies,
            Define::Resource(r) => &r.dependencies,
        }
    }
}

/// A dependency literal that must be rewritten to its resource key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rewrite {
    span: Range<usize>,
    quote: char,
    key: String,
}

/// Result of reading one bundle.
#[derive(Debug, Clone, Default)]
pub struct AmdDocument {
    /// Resource definitions first, then modules in source order
    pub defines: Vec<Define>,
    /// Resource key to every original token spelling that maps onto it
    pub remaps: IndexMap<String, IndexSet<String>>,
    rewrites: Vec<Rewrite>,
}

impl AmdDocument {
    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefine> {
        self.defines.iter().filter_map(|d| match d {
            Define::Resource(r) => Some(r),
            Define::Module(_) => None,
        })
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleDefine> {
        self.defines.iter().filter_map(|d| match d {
            Define::Module(m) => Some(m),
            Define::Resource(_) => None,
        })
    }

    /// The last module declared in the bundle.
    pub fn entry(&self) -> Option<&ModuleDefine> {
        self.modules().last()
    }

    /// Rewrite resource dependency literals in `code` to their resource keys.
    ///
    /// Only literals inside the dependency list of the owning `define` call
    /// are touched. `code` must be the text this document was read from.
    pub fn remap(&self, code: &str) -> String {
        let mut out = String::with_capacity(code.len());
        let mut last = 0;
        for rewrite in &self.rewrites {
            out.push_str(&code[last..rewrite.span.start]);
            out.push(rewrite.quote);
            out.push_str(&rewrite.key);
            out.push(rewrite.quote);
            last = rewrite.span.end;
        }
        out.push_str(&code[last..]);
        out
    }
}

/// Reads `define` declarations out of compiler output.
pub struct AmdReader;

impl AmdReader {
    pub fn read(code: &str) -> Result<AmdDocument> {
        let calls = scanner::scan(code)?;
        let mut document = AmdDocument::default();
        let mut resource_keys: IndexSet<String> = IndexSet::new();

        for call in calls {
            let mut dependencies = Vec::with_capacity(call.dependencies.len());
            for literal in &call.dependencies {
                let token = literal.value.trim();
                match resource_key(call.name, token) {
                    Some(key) => {
                        document
                            .remaps
                            .entry(key.clone())
                            .or_default()
                            .insert(token.to_string());
                        resource_keys.insert(key.clone());
                        document.rewrites.push(Rewrite {
                            span: literal.span.clone(),
                            quote: literal.quote,
                            key: key.clone(),
                        });
                        dependencies.push(key);
                    }
                    None => dependencies.push(token.to_string()),
                }
            }
            document.defines.push(Define::Module(ModuleDefine {
                name: call.name.to_string(),
                dependencies,
            }));
        }

        let prefix = document
            .entry()
            .map(|entry| relocation_prefix(&entry.name))
            .unwrap_or_default();
        if !prefix.is_empty() {
            debug!("entry module relocated, prefixing resource paths with '{}'", prefix);
        }

        let resources = resource_keys
            .iter()
            .map(|key| ResourceDefine::from_key(key, &prefix).map(Define::Resource))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "read {} modules and {} resources",
            document.defines.len(),
            resources.len()
        );
        document.defines.splice(0..0, resources);
        Ok(document)
    }
}

/// Compute the `directive!path` key for a dependency token, if it is a resource.
fn resource_key(module_name: &str, token: &str) -> Option<String> {
    let (prefix, path) = token.split_once('!')?;
    let directive = Directive::parse(prefix.trim())?;
    Some(format!(
        "{}!{}",
        directive,
        resolve_relative(module_name, path.trim())
    ))
}

/// Resolve `relative` against the directory of the AMD module id `module_name`.
///
/// Module ids are always `/` separated regardless of host platform.
fn resolve_relative(module_name: &str, relative: &str) -> String {
    let base = module_name.rfind('/').map_or("", |i| &module_name[..i]);
    let mut segments: Vec<&str> = Vec::new();
    for part in base.split('/').chain(relative.split('/')) {
        match part {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// One `../` per path segment beyond the first in the entry module's name.
fn relocation_prefix(entry_name: &str) -> String {
    let segments = entry_name.split('/').filter(|s| !s.is_empty()).count();
    "../".repeat(segments.saturating_sub(1))
}
