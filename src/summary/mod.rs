//! Extraction summary.
//!
//! Statistics are gathered per record while the stream is written and
//! serialized as JSON once extraction ends.

mod collector;
mod report;

pub use collector::SummaryCollector;
pub use report::{SummaryReport, summary_path, write_summary};
