//! Entry point the visualization host talks to.
//!
//! Each [`NwbModelInterpreter::create_model`] call returns a [`ModelSession`]
//! that owns the opened source. Value paths are resolved against the session
//! that produced the model, so independent sessions never share state.

use crate::adapters::json_reader::JsonSourceReader;
use crate::core::builder::{ExtendedBuild, GraphBuilder};
use crate::core::policy::MappingPolicy;
use crate::core::resolver::{parse_path, ValueResolver};
use crate::domain::model::{ImageFrame, Model, TimeSeriesValue};
use crate::domain::ports::{ConfigProvider, SourceReader};
use crate::domain::source::SourceTree;
use crate::utils::error::Result;
use std::path::PathBuf;

pub const INTERPRETER_NAME: &str = "NWB Model Interpreter";

/// A source to build from: a file still to be opened, or an already-open tree.
#[derive(Debug, Clone)]
pub enum SourceHandle {
    Path(PathBuf),
    Open(SourceTree),
}

impl SourceHandle {
    pub fn open(self) -> Result<JsonSourceReader> {
        match self {
            SourceHandle::Path(path) => JsonSourceReader::open(path),
            SourceHandle::Open(tree) => Ok(JsonSourceReader::from_tree(tree)),
        }
    }
}

impl From<PathBuf> for SourceHandle {
    fn from(path: PathBuf) -> Self {
        SourceHandle::Path(path)
    }
}

impl From<&str> for SourceHandle {
    fn from(path: &str) -> Self {
        SourceHandle::Path(PathBuf::from(path))
    }
}

impl From<SourceTree> for SourceHandle {
    fn from(tree: SourceTree) -> Self {
        SourceHandle::Open(tree)
    }
}

/// A built model together with the source it was built from.
pub struct ModelSession<R: SourceReader = JsonSourceReader> {
    pub model: Model,
    /// `None` when the interpreter runs without the extension pass.
    pub extended: Option<ExtendedBuild>,
    reader: R,
}

impl<R: SourceReader> ModelSession<R> {
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

pub struct NwbModelInterpreter<C: ConfigProvider> {
    config: C,
    policy: MappingPolicy,
    extension_pass: bool,
}

impl<C: ConfigProvider> NwbModelInterpreter<C> {
    pub fn new(config: C) -> Self {
        if config.extended_policy() {
            Self::with_policy(config, MappingPolicy::extended())
        } else {
            Self {
                config,
                policy: MappingPolicy::base(),
                extension_pass: false,
            }
        }
    }

    /// Custom policy; the extension pass always runs.
    pub fn with_policy(config: C, policy: MappingPolicy) -> Self {
        Self {
            config,
            policy,
            extension_pass: true,
        }
    }

    pub fn name(&self) -> &'static str {
        INTERPRETER_NAME
    }

    /// This interpreter never depends on other models.
    pub fn dependent_models(&self) -> Vec<String> {
        Vec::new()
    }

    pub fn create_model(&self, source: impl Into<SourceHandle>) -> Result<ModelSession> {
        let reader = source.into().open()?;
        self.create_model_with_reader(reader)
    }

    pub fn create_model_with_reader<R: SourceReader>(&self, reader: R) -> Result<ModelSession<R>> {
        tracing::info!("Creating model '{}' from {}", self.config.model_name(), reader.origin());

        let mut builder = GraphBuilder::new(
            self.config.model_name(),
            self.config.library_id(),
            self.config.root_name(),
            &self.policy,
        );
        builder.build(reader.root())?;
        let extended = if self.extension_pass {
            Some(builder.extended_build(reader.root())?)
        } else {
            None
        };

        let stats = builder.stats().clone();
        let model = builder.finish();
        tracing::info!(
            "Model '{}' ready: {} types, {} variables",
            model.name,
            stats.types,
            stats.variables
        );

        Ok(ModelSession {
            model,
            extended,
            reader,
        })
    }

    /// Resolves a separator-delimited path such as `nwbfile/acquisition/unitA/time`.
    pub fn resolve_value<R: SourceReader>(
        &self,
        session: &ModelSession<R>,
        path: &str,
    ) -> Result<TimeSeriesValue> {
        let segments = parse_path(path, self.config.path_separator());
        ValueResolver::new(&session.reader, self.config.max_samples()).resolve(&segments)
    }

    pub fn image<R: SourceReader>(
        &self,
        session: &ModelSession<R>,
        name: &str,
        interface: &str,
        index: usize,
    ) -> Result<ImageFrame> {
        session.reader.image(name, interface, index)
    }
}
