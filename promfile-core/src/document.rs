use crate::error::ExporterError;
use serde_json::{Number, Value};

/// A parsed result document from a measurement source.
///
/// The schema is owned by the source; fields are looked up by key path and
/// a missing key is a hard error rather than a default.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementDocument {
    root: Value,
}

impl MeasurementDocument {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parse a JSON document from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ExporterError> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Walk `path` one mapping key at a time.
    pub fn lookup(&self, path: &[&str]) -> Result<&Value, ExporterError> {
        let mut node = &self.root;
        for key in path {
            node = node
                .as_object()
                .and_then(|map| map.get(*key))
                .ok_or_else(|| ExporterError::MissingField {
                    path: dotted(path),
                })?;
        }
        Ok(node)
    }

    pub fn number(&self, path: &[&str]) -> Result<&Number, ExporterError> {
        match self.lookup(path)? {
            Value::Number(n) => Ok(n),
            _ => Err(ExporterError::NotANumber { path: dotted(path) }),
        }
    }

    /// Scalar rendered for a provenance comment. Strings are used verbatim.
    pub fn text(&self, path: &[&str]) -> Result<String, ExporterError> {
        Ok(match self.lookup(path)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

fn dotted(path: &[&str]) -> String {
    path.join(".")
}
