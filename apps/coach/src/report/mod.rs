// Report Builder: summary of the finished session, export and results history.

pub mod builder;
pub mod recommendations;

pub use builder::{finalize, ReportBuilder, ReportSummary};
