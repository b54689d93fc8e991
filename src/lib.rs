pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod filtering;
pub mod io;
pub mod logging;
pub mod models;

#[cfg(test)]
mod test_support;

// Re-export the main types for convenience
pub use dashboard::{DashboardPage, DashboardService, DashboardSnapshot, PageView};
pub use filtering::{apply_filters, DateRange, Filters, Selection};
pub use models::{CallRecord, CustomerSegment, Outcome, PolicyType, RecordError, Sentiment};

// Re-export the error types
pub use analytics::ExportError;
pub use io::RecordSourceError;
