use crate::domain::model::{GeneratedModel, SourceData, TemplatePaths};
use crate::ifc::LibrarySettings;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where generated files go, rooted at the output path. Template and product
/// inputs are read relative to the working directory during extract and do
/// not pass through this port; `read_file` reads back written output.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn template_paths(&self) -> TemplatePaths;
    fn product_data(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    /// Output file stem; `.ifc` is appended.
    fn file_name(&self) -> &str;
    fn object_class(&self) -> &str;
    fn object_name(&self) -> &str;
    fn project_name(&self) -> &str;
    fn demo(&self) -> bool;

    /// Also write a `.ifczip` archive next to the `.ifc` file.
    fn archive(&self) -> bool {
        false
    }

    fn library(&self) -> LibrarySettings {
        LibrarySettings::default()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceData>;
    async fn transform(&self, data: SourceData) -> Result<GeneratedModel>;
    async fn load(&self, result: GeneratedModel) -> Result<String>;
}
