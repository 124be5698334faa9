//! # amdpack-bundler
//!
//! Turns the single-file AMD bundle emitted by `tsc --module amd --outFile`
//! into a self-contained, loadable script.
//!
//! The pipeline is pure and synchronous:
//!
//! ```text
//! bundle text → AmdReader → resource fragments (+ css @import inlining)
//!             → Loader (ES-target runtime, export-as / import-as) → script
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use amdpack_bundler::{BundleOptions, Bundler, EsTarget, ExportAs};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let code = std::fs::read_to_string("dist/bundle.js")?;
//! if Bundler::should_bundle(&code) {
//!     let options = BundleOptions::new("./src")
//!         .es_target(EsTarget::Es2015)
//!         .export_as(ExportAs::Global("MyLibrary".into()));
//!     let script = Bundler::bundle(&code, &options)?;
//!     std::fs::write("dist/bundle.js", script)?;
//! }
//! # Ok(()) }
//! ```
//!
//! ## Resource directives
//!
//! A dependency such as `import data from "json!./data.json"` is read from
//! disk and injected into the bundle as its own module. Supported directives
//! are `text`, `json`, `base64`, `buffer`, `css` and `directory`.
//!
//! ## Logging
//!
//! The library only emits `tracing` events; install a subscriber in the
//! host application to see them.

pub mod bundler;
pub mod loader;
pub mod options;
pub mod reader;
pub mod resources;

pub use bundler::Bundler;
pub use loader::{Capabilities, EsTarget, Loader, LoaderOptions, RESOLVER_MARKER};
pub use options::{BundleOptions, ExportAs, ImportAs, ImportKind};
pub use reader::{AmdDocument, AmdReader, Define, Directive, ModuleDefine, ResourceDefine};
pub use resources::css::{CssError, CssReader};
pub use resources::Resources;

/// Error types for amdpack-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// The compiler output did not have the expected `define(...)` shape.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// A resource directive reached the materializer without a renderer.
    #[error("unknown resource directive '{0}'")]
    UnknownDirective(String),

    /// The loader runtime template failed to render.
    #[error("Loader template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Serializing a resource payload failed.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while scanning compiler output for `define` calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// A line starting with `define(` did not match `define("name", [deps], function`.
    #[error("malformed define on line {line}: {reason}")]
    MalformedDefine {
        /// 1-based line of the offending `define`
        line: usize,
        /// What the scanner expected to see
        reason: String,
    },
}

/// Result type alias for bundler operations.
pub type Result<T, E = BundleError> = std::result::Result<T, E>;
