pub mod source;
pub mod speedtest;
pub mod weather;

pub use source::{ExportSummary, Source, export, render_document};
pub use speedtest::Speedtest;
pub use weather::Weather;
