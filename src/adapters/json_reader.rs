use crate::domain::model::ImageFrame;
use crate::domain::ports::SourceReader;
use crate::domain::source::{Container, ContainerKind, SourceNode, SourceTree};
use crate::utils::error::{InterpreterError, Result};
use std::fs;
use std::path::Path;

/// Reads a recording exported as a JSON source tree.
#[derive(Debug, Clone)]
pub struct JsonSourceReader {
    tree: SourceTree,
}

impl JsonSourceReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening source file {}", path.display());
        let content = fs::read_to_string(path)?;
        let tree = SourceTree::from_json_str(path.display().to_string(), &content)?;
        Ok(Self { tree })
    }

    pub fn from_tree(tree: SourceTree) -> Self {
        Self { tree }
    }
}

fn series<'a>(node: &'a SourceNode, axis: &str) -> Result<&'a Container> {
    match node.as_container() {
        Some(container)
            if matches!(container.kind, ContainerKind::TimeSeries | ContainerKind::ImageSeries) =>
        {
            Ok(container)
        }
        _ => Err(InterpreterError::NotASeries {
            name: node.name().unwrap_or("<unnamed>").to_string(),
            axis: axis.to_string(),
        }),
    }
}

/// Picks exactly `min(len, max_samples)` samples, evenly spaced from the
/// first one: sample `i` comes from index `i * len / max_samples`.
pub fn decimate(values: &[f64], max_samples: usize) -> Vec<f64> {
    if values.len() <= max_samples {
        return values.to_vec();
    }

    let len = values.len();
    (0..max_samples)
        .map(|i| values[i * len / max_samples])
        .collect()
}

impl SourceReader for JsonSourceReader {
    fn origin(&self) -> &str {
        &self.tree.origin
    }

    fn root(&self) -> &SourceNode {
        &self.tree.root
    }

    fn retrieve_by_path(&self, keys: &[String]) -> Result<&SourceNode> {
        let mut node = &self.tree.root;
        for (depth, key) in keys.iter().enumerate() {
            node = node.child(key).ok_or_else(|| InterpreterError::NotFound {
                path: keys[..=depth].join("/"),
                key: key.clone(),
            })?;
        }
        Ok(node)
    }

    fn timestamps(&self, node: &SourceNode, max_samples: usize) -> Result<Vec<f64>> {
        let container = series(node, "time")?;

        if let Some(timestamps) = container.field("timestamps").and_then(SourceNode::as_array) {
            return Ok(decimate(timestamps, max_samples));
        }

        let (Some(starting_time), Some(rate), Some(num_samples)) = (
            container.number_field("starting_time"),
            container.number_field("rate"),
            container.num_samples(),
        ) else {
            return Err(InterpreterError::NotASeries {
                name: container.name.clone(),
                axis: "time".to_string(),
            });
        };

        if rate <= 0.0 {
            return Err(InterpreterError::NotASeries {
                name: container.name.clone(),
                axis: "time".to_string(),
            });
        }

        let synthesized: Vec<f64> = (0..num_samples)
            .map(|i| starting_time + i as f64 / rate)
            .collect();
        Ok(decimate(&synthesized, max_samples))
    }

    fn data_series(&self, node: &SourceNode, max_samples: usize) -> Result<Vec<f64>> {
        let container = series(node, "data")?;
        let data = container
            .field("data")
            .and_then(SourceNode::as_array)
            .ok_or_else(|| InterpreterError::NotASeries {
                name: container.name.clone(),
                axis: "data".to_string(),
            })?;
        Ok(decimate(data, max_samples))
    }

    fn image(&self, name: &str, interface: &str, index: usize) -> Result<ImageFrame> {
        let keys = [interface.to_string(), name.to_string()];
        let node = self.retrieve_by_path(&keys)?;

        let files = match node.as_container() {
            Some(container) if container.kind == ContainerKind::ImageSeries => {
                container.field("external_file")
            }
            _ => None,
        };
        let Some(SourceNode::Set(files)) = files else {
            return Err(InterpreterError::Unsupported {
                message: format!("'{}/{}' has no external image files", interface, name),
            });
        };

        match files.get(index) {
            Some(SourceNode::Text(location)) => Ok(ImageFrame {
                name: name.to_string(),
                index,
                location: location.clone(),
            }),
            _ => Err(InterpreterError::NotFound {
                path: format!("{}/{}/external_file", interface, name),
                key: index.to_string(),
            }),
        }
    }
}
