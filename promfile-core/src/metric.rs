//! Declarative mapping from document fields to gauge metrics.
//!
//! Each source owns a static table of [`MetricSpec`] rows. Traversal lives
//! here; the tables carry no logic, so a schema change is a table edit.

use crate::document::MeasurementDocument;
use crate::error::ExporterError;
use serde_json::Number;

/// How a source number becomes a sample value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Truncate toward zero; rendered without a decimal point.
    Truncate,
    /// Write the number exactly as the source wrote it.
    Preserve,
}

impl NumberFormat {
    /// Gauge value and the sample text written on the value line.
    pub fn apply(self, number: &Number) -> Option<(f64, String)> {
        let value = number.as_f64()?;
        Some(match self {
            // `+ 0.0` folds -0.0 into 0.0.
            NumberFormat::Truncate => {
                let truncated = value.trunc() + 0.0;
                (truncated, truncated.to_string())
            }
            NumberFormat::Preserve => (value, number.to_string()),
        })
    }
}

/// One row of a source's metric table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub path: &'static [&'static str],
    /// Name without the namespace prefix.
    pub name: &'static str,
    pub help: &'static str,
    pub format: NumberFormat,
}

/// A `# <prefix><value>` comment line sourced from the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Provenance {
    pub prefix: &'static str,
    pub path: &'static [&'static str],
}

impl Provenance {
    pub fn render(&self, doc: &MeasurementDocument) -> Result<String, ExporterError> {
        Ok(format!("# {}{}", self.prefix, doc.text(self.path)?))
    }
}

/// A single gauge sample, ready to be encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    pub help: String,
    pub value: f64,
    /// Sample text, e.g. `12` or `4.0`.
    pub sample: String,
}

impl MetricRecord {
    pub fn from_spec(
        doc: &MeasurementDocument,
        namespace: &str,
        spec: &MetricSpec,
    ) -> Result<Self, ExporterError> {
        let number = doc.number(spec.path)?;
        let (value, sample) = spec
            .format
            .apply(number)
            .ok_or_else(|| ExporterError::NotANumber {
                path: spec.path.join("."),
            })?;
        Ok(Self {
            name: format!("{namespace}_{}", spec.name),
            help: spec.help.to_string(),
            value,
            sample,
        })
    }
}

/// Resolve every row of `table` in order. The first failure aborts.
pub fn extract(
    doc: &MeasurementDocument,
    namespace: &str,
    table: &[MetricSpec],
) -> Result<Vec<MetricRecord>, ExporterError> {
    table
        .iter()
        .map(|spec| MetricRecord::from_spec(doc, namespace, spec))
        .collect()
}

/// Render all provenance lines, in table order.
pub fn provenance_lines(
    doc: &MeasurementDocument,
    provenance: &[Provenance],
) -> Result<Vec<String>, ExporterError> {
    provenance.iter().map(|p| p.render(doc)).collect()
}
