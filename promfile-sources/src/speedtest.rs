//! Ookla speedtest CLI source.
//!
//! Runs `speedtest -f json` and exports bandwidth, latency and transfer
//! figures as integer gauges under the `speedtest_` namespace.

use crate::source::Source;
use promfile_core::{
    ExporterConfig, ExporterError, MeasurementDocument, MetricSpec, NumberFormat, Provenance,
    Result,
};
use std::process::Command;
use tracing::debug;

const ARGS: &[&str] = &["-f", "json"];

const fn int(path: &'static [&'static str], name: &'static str, help: &'static str) -> MetricSpec {
    MetricSpec { path, name, help, format: NumberFormat::Truncate }
}

pub const METRICS: &[MetricSpec] = &[
    int(&["packetLoss"], "packetloss", "Packetloss"),
    int(&["upload", "latency", "iqm"], "upload_latency", "Upload latency"),
    int(&["upload", "bandwidth"], "upload_bandwidth", "Upload bandwidth bps"),
    int(&["upload", "bytes"], "upload_bytes", "Upload bytes"),
    int(&["upload", "elapsed"], "upload_elapsed", "Upload elapsed ms"),
    int(&["download", "latency", "iqm"], "download_latency", "Download latency"),
    int(&["download", "bandwidth"], "download_bandwidth", "Download bandwidth bps"),
    int(&["download", "bytes"], "download_bytes", "Download bytes"),
    int(&["download", "elapsed"], "download_elapsed", "Download elapsed ms"),
    int(&["ping", "latency"], "ping_latency", "Ping latency"),
    int(&["ping", "low"], "ping_low", "Ping low"),
    int(&["ping", "high"], "ping_high", "Ping high"),
];

pub const PROVENANCE: &[Provenance] = &[Provenance { prefix: "", path: &["timestamp"] }];

#[derive(Debug, Clone, Copy, Default)]
pub struct Speedtest;

impl Source for Speedtest {
    fn name(&self) -> &'static str { "speedtest" }
    fn namespace(&self) -> &'static str { "speedtest" }
    fn file_name(&self) -> &'static str { "speedtest.prom" }
    fn metrics(&self) -> &'static [MetricSpec] { METRICS }
    fn provenance(&self) -> &'static [Provenance] { PROVENANCE }

    fn acquire(&self, config: &ExporterConfig) -> Result<MeasurementDocument> {
        let command = &config.speedtest_command;
        debug!(command = %command, args = ?ARGS, "Running speedtest");

        let output = Command::new(command)
            .args(ARGS)
            .output()
            .map_err(|source| ExporterError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExporterError::CommandFailed {
                command: command.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        MeasurementDocument::from_slice(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::render_document;
    use serde_json::json;
    use std::collections::HashSet;

    fn sample() -> MeasurementDocument {
        MeasurementDocument::new(json!({
            "timestamp": "T",
            "packetLoss": 0.5,
            "upload": {"latency": {"iqm": 5.2}, "bandwidth": 1000, "bytes": 500, "elapsed": 200},
            "download": {"latency": {"iqm": 8.9}, "bandwidth": 2000, "bytes": 900, "elapsed": 300},
            "ping": {"latency": 14.0, "low": 10, "high": 20},
        }))
    }

    // ── Table ────────────────────────────────────────────────────

    #[test]
    fn metric_names_are_unique() {
        let names: HashSet<_> = METRICS.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), METRICS.len());
    }

    #[test]
    fn download_bandwidth_reads_download_field() {
        let spec = METRICS.iter().find(|m| m.name == "download_bandwidth").unwrap();
        assert_eq!(spec.path, &["download", "bandwidth"]);
    }

    #[test]
    fn every_metric_is_truncated() {
        assert!(METRICS.iter().all(|m| m.format == NumberFormat::Truncate));
    }

    // ── Rendering ────────────────────────────────────────────────

    #[test]
    fn render_sample_document() {
        let output = render_document(&Speedtest, &sample()).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0], "# T");
        assert_eq!(lines.len(), 1 + 3 * 12);

        let values: Vec<_> = lines
            .iter()
            .filter(|l| !l.starts_with('#'))
            .map(|l| l.split_once(' ').unwrap().1)
            .collect();
        assert_eq!(
            values,
            ["0", "5", "1000", "500", "200", "8", "2000", "900", "300", "14", "10", "20"]
        );
    }

    #[test]
    fn render_block_shape() {
        let output = render_document(&Speedtest, &sample()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[1], "# HELP speedtest_packetloss Packetloss");
        assert_eq!(lines[2], "# TYPE speedtest_packetloss gauge");
        assert_eq!(lines[3], "speedtest_packetloss 0");
    }

    #[test]
    fn render_values_have_no_decimal_point() {
        let mut doc = sample().root().clone();
        doc["ping"]["latency"] = json!(12.7);
        let output = render_document(&Speedtest, &MeasurementDocument::new(doc)).unwrap();
        assert!(output.contains("\nspeedtest_ping_latency 12\n"), "got:\n{output}");
        for line in output.lines().filter(|l| !l.starts_with('#')) {
            assert!(!line.contains('.'), "fractional value in {line:?}");
        }
    }

    #[test]
    fn removing_any_field_fails() {
        for spec in METRICS {
            let mut doc = sample().root().clone();
            let (last, parents) = spec.path.split_last().unwrap();
            let mut node = &mut doc;
            for key in parents {
                node = &mut node[*key];
            }
            node.as_object_mut().unwrap().remove(*last);

            let result = render_document(&Speedtest, &MeasurementDocument::new(doc));
            assert!(
                matches!(result, Err(ExporterError::MissingField { .. })),
                "{} should be required",
                spec.name
            );
        }
    }

    #[test]
    fn missing_timestamp_fails() {
        let mut doc = sample().root().clone();
        doc.as_object_mut().unwrap().remove("timestamp");
        let err = render_document(&Speedtest, &MeasurementDocument::new(doc)).unwrap_err();
        assert!(matches!(err, ExporterError::MissingField { .. }));
    }

    // ── Acquire ──────────────────────────────────────────────────

    #[test]
    fn acquire_missing_binary_is_spawn_error() {
        let config = ExporterConfig {
            speedtest_command: "/nonexistent/speedtest".into(),
            ..ExporterConfig::default()
        };
        let err = Speedtest.acquire(&config).unwrap_err();
        assert!(matches!(err, ExporterError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn acquire_non_zero_exit_is_command_failed() {
        let config = ExporterConfig {
            speedtest_command: "false".into(),
            ..ExporterConfig::default()
        };
        let err = Speedtest.acquire(&config).unwrap_err();
        assert!(matches!(err, ExporterError::CommandFailed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn acquire_non_json_output_is_decode_error() {
        // `echo -f json` prints its arguments, which is not a JSON document.
        let config = ExporterConfig {
            speedtest_command: "echo".into(),
            ..ExporterConfig::default()
        };
        let err = Speedtest.acquire(&config).unwrap_err();
        assert!(matches!(err, ExporterError::Decode(_)));
    }
}
