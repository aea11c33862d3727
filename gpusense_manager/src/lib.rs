//! gpusense Manager Library
//!
//! Batch front-end for `gpusense_core`: finds Python sources, classifies them
//! in parallel and renders the results.

pub mod report;
pub mod scanner;
