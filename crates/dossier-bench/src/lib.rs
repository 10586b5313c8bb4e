//! Organisation snapshot generator and benchmark utilities for `dossier-core`.
//!
//! This crate provides deterministic generation of realistic user and
//! document sets for benchmarking and property-based testing of the access
//! engine.

pub mod correctness;
pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, generate_organisation};
