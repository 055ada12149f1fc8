//! Rollup JavaScript bundler integration for axum applications.
//!
//! See [`rollup::Rollup`] for the coordinator and [`rollup::Bundle`] for bundle
//! definitions.

pub mod rollup;

pub use rollup::{Bundle, Entrypoint, Rollup, RollupConfig, RollupError};
