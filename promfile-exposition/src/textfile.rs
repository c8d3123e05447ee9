use prometheus::core::Collector;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use promfile_core::{ExporterError, MetricRecord};

/// Render provenance comments followed by one HELP/TYPE/value block per
/// record, in the order given.
///
/// Every gauge is registered into a throwaway registry so duplicate names
/// are rejected, but each one is encoded on its own: `Registry::gather`
/// sorts by name and would lose the table order. The encoder supplies the
/// HELP/TYPE lines; the value line carries the record's sample text, since
/// the encoder would reformat it through `f64`.
pub fn render(provenance: &[String], records: &[MetricRecord]) -> Result<String, ExporterError> {
    let registry = Registry::new();
    let encoder = TextEncoder::new();
    let mut output = String::new();

    for line in provenance {
        output.push_str(line);
        output.push('\n');
    }

    for record in records {
        let gauge = Gauge::with_opts(Opts::new(record.name.as_str(), record.help.as_str()))
            .map_err(|e| ExporterError::Encode(format!("{}: {e}", record.name)))?;
        gauge.set(record.value);
        registry
            .register(Box::new(gauge.clone()))
            .map_err(|e| match e {
                prometheus::Error::AlreadyReg => ExporterError::DuplicateMetric(record.name.clone()),
                other => ExporterError::Encode(format!("{}: {other}", record.name)),
            })?;

        let mut block = Vec::new();
        encoder
            .encode(&gauge.collect(), &mut block)
            .map_err(|e| ExporterError::Encode(e.to_string()))?;
        let block = String::from_utf8(block).map_err(|e| ExporterError::Encode(e.to_string()))?;

        output.push_str(header(&block));
        output.push_str(&record.name);
        output.push(' ');
        output.push_str(&record.sample);
        output.push('\n');
    }

    Ok(output)
}

/// Everything before the encoder's trailing sample line.
fn header(block: &str) -> &str {
    let end = block
        .trim_end_matches('\n')
        .rfind('\n')
        .map_or(0, |i| i + 1);
    &block[..end]
}
