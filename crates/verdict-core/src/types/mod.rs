//! Core data types: row identity, samples, matrices, and tabular access.

pub mod collections;
pub mod dataset;
pub mod identifiers;
pub mod sample;
