pub mod builder;
pub mod interpreter;
pub mod policy;
pub mod resolver;
pub mod summary;

pub use crate::domain::model::{CompositeType, Model, TimeSeriesValue, Variable, VariableValue};
pub use crate::domain::ports::{ConfigProvider, SourceReader};
pub use crate::utils::error::Result;
