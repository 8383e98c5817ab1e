pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::json_reader::JsonSourceReader;
pub use config::InterpreterConfig;
pub use core::{
    builder::{ExtendedBuild, GraphBuilder},
    interpreter::{ModelSession, NwbModelInterpreter, SourceHandle},
    policy::MappingPolicy,
};
pub use utils::error::{InterpreterError, Result};
