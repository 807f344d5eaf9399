//! rulegauge - complexity scoring and threshold evaluation for rule documents
//!
//! The library is the whole decision pipeline; the binary adds discovery,
//! terminal output and exit codes.
//!
//! - [`detectors`]: deterministic static analyzer
//! - [`ai`]: semantic analyzer behind a [`ai::RatingProvider`]
//! - [`scoring`]: baseline store and threshold evaluator
//! - [`pipeline`]: per-run orchestration
//! - [`reporters`]: machine-readable record, summary and alert

pub mod ai;
pub mod config;
pub mod detectors;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
