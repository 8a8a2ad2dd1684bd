//! Ingestion, normalization and KPI aggregation for a published sheet of
//! student academic and billing records.

pub mod aggregate;
pub mod certificates;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod ratio;
pub mod report;
pub mod source;
pub mod table;

pub use aggregate::aggregate;
pub use normalize::normalize;
