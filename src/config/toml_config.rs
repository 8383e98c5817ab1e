use crate::core::ConfigProvider;
use crate::utils::error::{InterpreterError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_SAMPLES: usize = 1000;
const MAX_SAMPLES_CEILING: usize = 10_000_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpreterConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default = "default_root_name")]
    pub root_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    #[serde(default = "default_path_separator")]
    pub path_separator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Adds the synthetic summary record to every model.
    #[serde(default = "default_extended")]
    pub extended: bool,
}

fn default_model_name() -> String {
    "nwb".to_string()
}

fn default_library() -> String {
    "nwblib".to_string()
}

fn default_root_name() -> String {
    "nwbfile".to_string()
}

fn default_max_samples() -> usize {
    DEFAULT_MAX_SAMPLES
}

fn default_path_separator() -> String {
    "/".to_string()
}

fn default_extended() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            library: default_library(),
            root_name: default_root_name(),
        }
    }
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_samples: default_max_samples(),
            path_separator: default_path_separator(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            extended: default_extended(),
        }
    }
}

impl InterpreterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(InterpreterError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| InterpreterError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NWB_MAX_SAMPLES})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| InterpreterError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("model.name", &self.model.name)?;
        validate_non_empty_string("model.library", &self.model.library)?;
        validate_non_empty_string("model.root_name", &self.model.root_name)?;
        validate_range("resolve.max_samples", self.resolve.max_samples, 1, MAX_SAMPLES_CEILING)?;

        if self.resolve.path_separator.is_empty() {
            return Err(InterpreterError::InvalidConfigValueError {
                field: "resolve.path_separator".to_string(),
                value: self.resolve.path_separator.clone(),
                reason: "Separator cannot be empty".to_string(),
            });
        }

        // Type ids are dot-joined, so a dot in the root name would be ambiguous.
        if self.model.root_name.contains('.') {
            return Err(InterpreterError::InvalidConfigValueError {
                field: "model.root_name".to_string(),
                value: self.model.root_name.clone(),
                reason: "Root name cannot contain '.'".to_string(),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for InterpreterConfig {
    fn model_name(&self) -> &str {
        &self.model.name
    }

    fn library_id(&self) -> &str {
        &self.model.library
    }

    fn root_name(&self) -> &str {
        &self.model.root_name
    }

    fn max_samples(&self) -> usize {
        self.resolve.max_samples
    }

    fn path_separator(&self) -> &str {
        &self.resolve.path_separator
    }

    fn extended_policy(&self) -> bool {
        self.policy.extended
    }
}

impl Validate for InterpreterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
