//! weatherapi.com current conditions + air quality source.

use crate::source::Source;
use promfile_core::config::WeatherCredentials;
use promfile_core::{
    ExporterConfig, ExporterError, MeasurementDocument, MetricSpec, NumberFormat, Provenance,
    Result,
};
use reqwest::Url;
use tracing::debug;

const fn float(path: &'static [&'static str], name: &'static str, help: &'static str) -> MetricSpec {
    MetricSpec { path, name, help, format: NumberFormat::Preserve }
}

pub const METRICS: &[MetricSpec] = &[
    float(&["current", "temp_c"], "temp", "Current Temp in degrees c"),
    float(&["current", "wind_kph"], "wind_speed", "Wind Speed kph"),
    float(&["current", "gust_kph"], "gust_speed", "Gust Speed kph"),
    float(&["current", "wind_degree"], "wind_dir", "Wind Direction"),
    float(&["current", "precip_mm"], "precip", "Precipitation mm"),
    float(&["current", "uv"], "uv", "UV"),
    float(&["current", "humidity"], "humidity", "Humidity"),
    float(&["current", "air_quality", "co"], "aqi_co", "Carbon Monoxide ug/m3"),
    // Published as `aqi_no`; renaming would break existing series.
    float(&["current", "air_quality", "no2"], "aqi_no", "Nitrogen Dioxide ug/m3"),
    float(&["current", "air_quality", "o3"], "aqi_o3", "Ozone ug/m3"),
    float(&["current", "air_quality", "so2"], "aqi_so2", "Sulfur Dioxide ug/m3"),
    float(&["current", "air_quality", "pm2_5"], "aqi_pm2_5", "PM 2.5 ug/m3"),
    float(&["current", "air_quality", "pm10"], "aqi_pm10", "PM 10 ug/m3"),
    float(&["current", "air_quality", "us-epa-index"], "aqi_epa", "US EPA Index"),
];

pub const PROVENANCE: &[Provenance] = &[
    Provenance { prefix: "Collected from API ", path: &["location", "localtime"] },
    Provenance { prefix: "Data from ", path: &["current", "last_updated"] },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Weather;

/// `<base>?key=..&q=..&aqi=yes`, query-encoded.
pub fn request_url(base: &str, creds: &WeatherCredentials) -> Result<Url> {
    Url::parse_with_params(
        base,
        &[
            ("key", creds.api_key.as_str()),
            ("q", creds.location.as_str()),
            ("aqi", "yes"),
        ],
    )
    .map_err(|e| ExporterError::Config(format!("invalid weather API URL {base:?}: {e}")))
}

impl Source for Weather {
    fn name(&self) -> &'static str { "weather" }
    fn namespace(&self) -> &'static str { "weather" }
    fn file_name(&self) -> &'static str { "weather.prom" }
    fn metrics(&self) -> &'static [MetricSpec] { METRICS }
    fn provenance(&self) -> &'static [Provenance] { PROVENANCE }

    fn acquire(&self, config: &ExporterConfig) -> Result<MeasurementDocument> {
        let creds = config.require_weather()?;
        let url = request_url(&config.weather_api_url, &creds)?;
        debug!(
            host = url.host_str().unwrap_or_default(),
            location = %creds.location,
            "Requesting current conditions"
        );

        // The key travels in the query string; keep it out of error messages.
        let http_err = |e: reqwest::Error| ExporterError::Http(e.without_url().to_string());
        let body = reqwest::blocking::get(url)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(http_err)?;

        MeasurementDocument::from_slice(&body)
    }
}
