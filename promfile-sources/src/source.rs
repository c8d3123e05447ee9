use promfile_core::metric::{self, MetricSpec, Provenance};
use promfile_core::{ExporterConfig, MeasurementDocument, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// A measurement source: how to acquire its document and how the document
/// maps onto gauges.
pub trait Source {
    /// Short name, used in logs and as the subcommand name.
    fn name(&self) -> &'static str;

    /// Prefix for every metric name this source emits.
    fn namespace(&self) -> &'static str;

    /// File name inside the textfile directory.
    fn file_name(&self) -> &'static str;

    fn metrics(&self) -> &'static [MetricSpec];

    fn provenance(&self) -> &'static [Provenance];

    /// Obtain one fully parsed document. Never returns a partial one.
    fn acquire(&self, config: &ExporterConfig) -> Result<MeasurementDocument>;
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub metrics: usize,
}

/// Render a document into textfile contents without touching the disk.
pub fn render_document(source: &dyn Source, doc: &MeasurementDocument) -> Result<String> {
    let provenance = metric::provenance_lines(doc, source.provenance())?;
    let records = metric::extract(doc, source.namespace(), source.metrics())?;
    promfile_exposition::render(&provenance, &records)
}

/// Acquire → render → write, once.
pub fn export(source: &dyn Source, config: &ExporterConfig) -> Result<ExportSummary> {
    info!(source = source.name(), "Acquiring measurement");
    let doc = source.acquire(config)?;

    let contents = render_document(source, &doc)?;
    debug!(source = source.name(), bytes = contents.len(), "Rendered textfile");

    let path = config.output_path(source.file_name());
    promfile_exposition::write_textfile(&path, &contents)?;

    let metrics = source.metrics().len();
    info!(source = source.name(), path = %path.display(), metrics, "Textfile updated");
    Ok(ExportSummary { path, metrics })
}
