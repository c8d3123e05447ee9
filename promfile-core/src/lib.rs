pub mod config;
pub mod document;
pub mod error;
pub mod metric;

pub use config::ExporterConfig;
pub use document::MeasurementDocument;
pub use error::ExporterError;
pub use metric::{MetricRecord, MetricSpec, NumberFormat, Provenance};

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, ExporterError>;
