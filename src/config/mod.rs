pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_file_extensions, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub use toml_config::InterpreterConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "nwb-model")]
#[command(about = "Builds a typed model graph from an NWB source tree")]
pub struct CliConfig {
    /// JSON export of the recording
    #[arg(long)]
    pub source: String,

    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<String>,

    /// Value paths to resolve after building, e.g. nwbfile/acquisition/unitA/time
    #[arg(long)]
    pub resolve: Vec<String>,

    /// Write the model JSON here instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    /// Override resolve.max_samples from the config file
    #[arg(long)]
    pub max_samples: Option<usize>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Config file (or defaults) with command line overrides applied.
    pub fn interpreter_config(&self) -> Result<InterpreterConfig> {
        let mut config = match &self.config {
            Some(path) => InterpreterConfig::from_file(path)?,
            None => InterpreterConfig::default(),
        };

        if let Some(max_samples) = self.max_samples {
            tracing::info!("🔧 max_samples overridden to: {}", max_samples);
            config.resolve.max_samples = max_samples;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("source", &self.source)?;
        validate_file_extensions("source", std::slice::from_ref(&self.source), &["json"])?;
        if let Some(config) = &self.config {
            validate_file_extensions("config", std::slice::from_ref(config), &["toml"])?;
        }
        Ok(())
    }
}
