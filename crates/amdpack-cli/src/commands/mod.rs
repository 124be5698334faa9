//! Command implementations for the amdpack CLI.
//!
//! - [`build`] - compile and bundle a TypeScript script or project

pub mod build;

pub use build::execute as build_execute;
