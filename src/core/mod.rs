pub mod embed;
pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{GeneratedModel, SourceData, TemplatePaths};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
