pub mod config;
pub mod core;
pub mod domain;
pub mod epd;
pub mod ifc;
pub mod templates;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use core::{embed::Embedder, etl::EtlEngine, pipeline::IfcPipeline};
pub use utils::error::{EpdIfcError, Result};
