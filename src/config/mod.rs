pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::ifc::ObjectClass;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_file_stem, validate_non_empty_string, validate_path,
    validate_required_field, validate_url,
};

#[cfg(feature = "cli")]
pub use args::CliConfig;

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    for (field, path) in config.template_paths().entries() {
        validate_file_extension(&format!("templates.{}", field), path, &["csv"])?;
    }

    let product_data = config.product_data();
    if !config.demo() {
        validate_required_field("product_data", &product_data)?;
    }
    if let Some(path) = product_data {
        validate_file_extension("product_data", path, &["json"])?;
    }

    validate_path("output_path", config.output_path())?;
    validate_file_stem("file_name", config.file_name())?;
    validate_non_empty_string("object_name", config.object_name())?;
    validate_non_empty_string("project_name", config.project_name())?;
    ObjectClass::parse(config.object_class())?;

    let library = config.library();
    validate_url("library.location", &library.location)?;
    validate_url(
        "library.publisher_identification",
        &library.publisher_identification,
    )?;

    Ok(())
}

#[cfg(feature = "cli")]
mod args {
    use super::validate_provider;
    use crate::core::ConfigProvider;
    use crate::domain::model::{
        TemplatePaths, DEFAULT_COMPLEX_PROPERTIES, DEFAULT_ENUMERATIONS, DEFAULT_INDICATOR_ROWS,
        DEFAULT_MODULE_COLUMNS, DEFAULT_PROPERTY_SETS,
    };
    use crate::ifc::builder::{DEFAULT_OBJECT_CLASS, DEFAULT_OBJECT_NAME, DEFAULT_PROJECT_NAME};
    use crate::utils::error::Result;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "epd-ifc")]
    #[command(about = "Embed EN ISO 22057 LCA property sets and EPD data into IFC-SPF models")]
    pub struct CliConfig {
        #[arg(long, default_value = DEFAULT_PROPERTY_SETS)]
        pub property_sets: String,

        #[arg(long, default_value = DEFAULT_ENUMERATIONS)]
        pub enumerations: String,

        #[arg(long, default_value = DEFAULT_COMPLEX_PROPERTIES)]
        pub complex_properties: String,

        #[arg(long, default_value = DEFAULT_INDICATOR_ROWS)]
        pub indicator_rows: String,

        #[arg(long, default_value = DEFAULT_MODULE_COLUMNS)]
        pub module_columns: String,

        #[arg(long, help = "EPD JSON document with the product's values")]
        pub product_data: Option<String>,

        #[arg(long, default_value = "./output")]
        pub output_path: String,

        #[arg(long, default_value = "lca_model", help = "Output file name without extension")]
        pub file_name: String,

        #[arg(long, default_value = DEFAULT_OBJECT_CLASS)]
        pub object_class: String,

        #[arg(long, default_value = DEFAULT_OBJECT_NAME)]
        pub object_name: String,

        #[arg(long, default_value = DEFAULT_PROJECT_NAME)]
        pub project_name: String,

        #[arg(long, help = "Fill every template with placeholder values")]
        pub demo: bool,

        #[arg(long, help = "Also write a compressed .ifczip")]
        pub archive: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,
    }

    impl ConfigProvider for CliConfig {
        fn template_paths(&self) -> TemplatePaths {
            TemplatePaths {
                property_sets: self.property_sets.clone(),
                enumerations: self.enumerations.clone(),
                complex_properties: self.complex_properties.clone(),
                indicator_rows: self.indicator_rows.clone(),
                module_columns: self.module_columns.clone(),
            }
        }

        fn product_data(&self) -> Option<&str> {
            self.product_data.as_deref()
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn file_name(&self) -> &str {
            &self.file_name
        }

        fn object_class(&self) -> &str {
            &self.object_class
        }

        fn object_name(&self) -> &str {
            &self.object_name
        }

        fn project_name(&self) -> &str {
            &self.project_name
        }

        fn demo(&self) -> bool {
            self.demo
        }

        fn archive(&self) -> bool {
            self.archive
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)
        }
    }

}
