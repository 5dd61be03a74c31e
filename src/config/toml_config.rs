use crate::config::validate_provider;
use crate::core::ConfigProvider;
use crate::domain::model::TemplatePaths;
use crate::ifc::builder::{DEFAULT_OBJECT_CLASS, DEFAULT_OBJECT_NAME, DEFAULT_PROJECT_NAME};
use crate::ifc::LibrarySettings;
use crate::utils::error::{EpdIfcError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub templates: TemplatePaths,
    #[serde(default)]
    pub product: ProductConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub project_name: String,
    pub object_class: String,
    pub object_name: String,
    pub library: LibrarySettings,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            object_class: DEFAULT_OBJECT_CLASS.to_string(),
            object_name: DEFAULT_OBJECT_NAME.to_string(),
            library: LibrarySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductConfig {
    pub data: Option<String>,
    #[serde(default)]
    pub demo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub file_name: String,
    #[serde(default)]
    pub archive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EpdIfcError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EpdIfcError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(level) = self.monitoring.as_ref().and_then(|m| m.log_level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(EpdIfcError::InvalidConfigValueError {
                    field: "monitoring.log_level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        validate_provider(self)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn template_paths(&self) -> TemplatePaths {
        self.templates.clone()
    }

    fn product_data(&self) -> Option<&str> {
        self.product.data.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn file_name(&self) -> &str {
        &self.output.file_name
    }

    fn object_class(&self) -> &str {
        &self.model.object_class
    }

    fn object_name(&self) -> &str {
        &self.model.object_name
    }

    fn project_name(&self) -> &str {
        &self.model.project_name
    }

    fn demo(&self) -> bool {
        self.product.demo
    }

    fn archive(&self) -> bool {
        self.output.archive
    }

    fn library(&self) -> LibrarySettings {
        self.model.library.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
