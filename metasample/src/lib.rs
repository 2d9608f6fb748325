//! Metamorphic and adaptive random test input sampling.
//!
//! This is the main entry point for the library. It re-exports the sampling
//! engine from `metasample-core`: input generators (adaptive random, random,
//! partition-weighted) and pair samplers (MT-ART, uniform, balanced).

pub use metasample_core::*;
