//! The rsyncstat pipeline: line parsing, streaming aggregation and report
//! rendering.
//!
//! Raw text flows through [`parser::LineParser`] into typed events, the
//! [`aggregator::StreamAggregator`] folds them into a [`Stats`] snapshot,
//! and [`report::render`] turns that snapshot into the final text report.
//!
//! [`Stats`]: rsyncstat_core::models::Stats

pub mod aggregator;
pub mod parser;
pub mod report;

pub use rsyncstat_core as core;
