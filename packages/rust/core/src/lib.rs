//! Export orchestration for docsplit.
//!
//! This crate ties together segmentation, hierarchy tracking, section
//! rendering, and archive assembly into a single export job.

pub mod exporter;
pub mod hierarchy;
pub mod pipeline;
pub mod renderer;

#[cfg(test)]
mod test_support;
