//! Core sampling algorithms for metamorphic and adaptive random testing.
//!
//! This crate provides the input generators (adaptive random, plain random,
//! partition-weighted allocation) and the pair samplers (MT-ART, uniform,
//! partition-balanced) used to pick test inputs under a fixed budget.

pub mod art;
pub mod balanced;
pub mod catalog;
pub mod data;
pub mod domain;
pub mod error;
pub mod model;
pub mod mtart;
pub mod partition;
pub mod projection;
pub mod random;
pub mod relation;
pub mod rules;
pub mod strategy;
pub mod uniform;

// Re-export the main types
pub use art::*;
pub use balanced::*;
pub use catalog::*;
pub use data::*;
pub use domain::*;
pub use error::*;
pub use model::*;
pub use mtart::*;
pub use partition::*;
pub use projection::*;
pub use random::*;
pub use relation::*;
pub use rules::*;
pub use strategy::*;
pub use uniform::*;
