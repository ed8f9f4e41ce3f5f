//! OTF Wrapped: fetch a member's Orangetheory workout history, align and
//! segment the per-class heart-rate series, aggregate the year, and render
//! an HTML report with inlined SVG charts.

pub mod aggregate;
pub mod align;
pub mod charts;
pub mod error;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod segment;

pub use error::{ReportError, ReportResult};
pub use pipeline::{ReportOptions, generate_report};
