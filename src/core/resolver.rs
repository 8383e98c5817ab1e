use crate::domain::model::TimeSeriesValue;
use crate::domain::ports::SourceReader;
use crate::utils::error::{InterpreterError, Result};

pub const DEFAULT_TIME_UNIT: &str = "s";
pub const DEFAULT_DATA_UNIT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Time,
    Data,
}

impl Axis {
    pub fn from_token(token: &str) -> Self {
        match token {
            "time" | "timestamps" => Axis::Time,
            _ => Axis::Data,
        }
    }
}

pub fn parse_path(path: &str, separator: &str) -> Vec<String> {
    path.split(separator).map(str::to_string).collect()
}

/// Replays a model path against the original source tree and reads one axis.
pub struct ValueResolver<'r, R: SourceReader> {
    reader: &'r R,
    max_samples: usize,
}

impl<'r, R: SourceReader> ValueResolver<'r, R> {
    pub fn new(reader: &'r R, max_samples: usize) -> Self {
        Self {
            reader,
            max_samples,
        }
    }

    /// `segments` is `<root>/<key>.../<axis>`: the root token is dropped and
    /// the keys in between are looked up in the source tree.
    pub fn resolve(&self, segments: &[String]) -> Result<TimeSeriesValue> {
        if segments.len() < 2 {
            return Err(InterpreterError::InvalidPath {
                path: segments.join("/"),
                reason: "expected at least a root token and an axis token".to_string(),
            });
        }

        let axis_token = &segments[segments.len() - 1];
        let keys = &segments[1..segments.len() - 1];
        let node = self.reader.retrieve_by_path(keys)?;
        let container = node.as_container();
        let node_name = node.name().unwrap_or_default();

        let value = match Axis::from_token(axis_token) {
            Axis::Time => {
                let values = self.reader.timestamps(node, self.max_samples)?;
                let unit = container
                    .and_then(|c| c.text_field("timestamps_unit"))
                    .unwrap_or(DEFAULT_TIME_UNIT);
                TimeSeriesValue {
                    name: format!("time_{}", node_name),
                    unit: unit.to_string(),
                    values,
                }
            }
            Axis::Data => {
                let values = self.reader.data_series(node, self.max_samples)?;
                let unit = container
                    .and_then(|c| c.text_field("unit"))
                    .unwrap_or(DEFAULT_DATA_UNIT);
                TimeSeriesValue {
                    name: format!("data_{}", node_name),
                    unit: unit.to_string(),
                    values,
                }
            }
        };

        tracing::debug!(
            "Resolved {} ({} samples, unit '{}')",
            value.name,
            value.values.len(),
            value.unit
        );
        Ok(value)
    }
}
