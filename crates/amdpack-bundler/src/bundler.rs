//! Composition root: resources, then loader.

use tracing::{debug, info_span};

use crate::loader::{Loader, LoaderOptions, RESOLVER_MARKER};
use crate::options::BundleOptions;
use crate::resources::Resources;
use crate::Result;

pub struct Bundler;

impl Bundler {
    /// False once `code` has already been through [`Bundler::bundle`].
    pub fn should_bundle(code: &str) -> bool {
        !code.contains(RESOLVER_MARKER)
    }

    /// Inline resources and wrap the bundle in the loader runtime.
    ///
    /// Pure: reads resource files but never writes.
    pub fn bundle(code: &str, options: &BundleOptions) -> Result<String> {
        let _span = info_span!("bundle", target = %options.es_target).entered();
        let code = Resources::transform(&options.project_root, code)?;
        let output = Loader::transform(&LoaderOptions::from(options), &code)?;
        debug!("bundled {} bytes into {} bytes", code.len(), output.len());
        Ok(output)
    }
}
