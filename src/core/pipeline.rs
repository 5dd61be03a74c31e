use crate::core::embed::Embedder;
use crate::core::{ConfigProvider, GeneratedModel, Pipeline, SourceData, Storage};
use crate::epd::ProductData;
use crate::ifc::{write_spf, ModelBuilder, ModelSettings, ObjectClass, SpfHeader};
use crate::templates::{TemplateCatalog, TemplateTable};
use crate::utils::error::{EpdIfcError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub struct IfcPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> IfcPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn model_settings(&self) -> Result<ModelSettings> {
        Ok(ModelSettings {
            project_name: self.config.project_name().to_string(),
            object_class: ObjectClass::parse(self.config.object_class())?,
            object_name: self.config.object_name().to_string(),
            library: self.config.library(),
        })
    }
}

/// Reads an input file relative to the working directory, naming it in the error.
async fn read_input(path: &str) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        EpdIfcError::IoError(std::io::Error::new(e.kind(), format!("{}: {}", path, e)))
    })
}

async fn read_table(path: &str) -> Result<TemplateTable> {
    let data = read_input(path).await?;
    let table = TemplateTable::from_reader(path, data.as_slice())?;
    tracing::debug!("Read {} groups from {}", table.len(), path);
    Ok(table)
}

/// Packs the IFC text into a single-entry `.ifczip` archive.
fn archive(entry_name: &str, data: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file::<_, ()>(entry_name, FileOptions::default())?;
    zip.write_all(data)?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for IfcPipeline<S, C> {
    async fn extract(&self) -> Result<SourceData> {
        let paths = self.config.template_paths();
        let catalog = TemplateCatalog {
            property_sets: read_table(&paths.property_sets).await?,
            enumerations: read_table(&paths.enumerations).await?,
            complex_properties: read_table(&paths.complex_properties).await?,
            indicator_rows: read_table(&paths.indicator_rows).await?,
            module_columns: read_table(&paths.module_columns).await?,
        };

        let product = match self.config.product_data() {
            Some(path) if self.config.demo() => {
                tracing::info!("Demo mode: product data {} is not used", path);
                None
            }
            Some(path) => {
                tracing::debug!("Reading product data from {}", path);
                Some(ProductData::from_slice(&read_input(path).await?)?)
            }
            None => None,
        };

        Ok(SourceData { catalog, product })
    }

    async fn transform(&self, data: SourceData) -> Result<GeneratedModel> {
        let mut builder = ModelBuilder::new(self.model_settings()?)?;
        let report = Embedder::new(&data.catalog, data.product.as_ref(), self.config.demo())
            .embed(&mut builder)?;

        tracing::debug!("Embed report: {:?}", report);
        Ok(GeneratedModel {
            model: builder.into_model(),
            report,
        })
    }

    async fn load(&self, result: GeneratedModel) -> Result<String> {
        let file_name = format!("{}.ifc", self.config.file_name());
        let output_path = format!("{}/{}", self.config.output_path(), file_name);

        let text = write_spf(&result.model, &SpfHeader::new(&file_name))?;
        tracing::debug!("Writing {} bytes to {}", text.len(), file_name);
        self.storage.write_file(&file_name, text.as_bytes()).await?;

        if self.config.archive() {
            let zip_name = format!("{}.ifczip", self.config.file_name());
            let zip_data = archive(&file_name, text.as_bytes())?;
            tracing::debug!("Writing archive ({} bytes) to {}", zip_data.len(), zip_name);
            self.storage.write_file(&zip_name, &zip_data).await?;
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TemplatePaths;
    use crate::ifc::model::layout;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EpdIfcError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        templates: TemplatePaths,
        product_data: Option<String>,
        object_class: String,
        demo: bool,
        archive: bool,
    }

    impl MockConfig {
        fn demo() -> Self {
            Self {
                templates: TemplatePaths::default(),
                product_data: None,
                object_class: "IfcBuildingElementProxyType".to_string(),
                demo: true,
                archive: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn template_paths(&self) -> TemplatePaths {
            self.templates.clone()
        }

        fn product_data(&self) -> Option<&str> {
            self.product_data.as_deref()
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn file_name(&self) -> &str {
            "model"
        }

        fn object_class(&self) -> &str {
            &self.object_class
        }

        fn object_name(&self) -> &str {
            "Test Object"
        }

        fn project_name(&self) -> &str {
            "Test Project"
        }

        fn demo(&self) -> bool {
            self.demo
        }

        fn archive(&self) -> bool {
            self.archive
        }
    }

    fn table(content: &str) -> TemplateTable {
        TemplateTable::from_reader("test.csv", content.as_bytes()).unwrap()
    }

    fn source() -> SourceData {
        SourceData {
            catalog: TemplateCatalog {
                property_sets: table(
                    "PropertySet,Description,PropertyName,DataType,IFCType,ISO22057GUID\n\
                     LCAPset_ProductInformation,General,,,,\n\
                     ,,ProductName,IfcLabel,IfcPropertySingleValue,name-guid\n",
                ),
                ..Default::default()
            },
            product: Some(ProductData::new(json!({"guid": "name-guid", "value": "Lettbetong"}))),
        }
    }

    #[tokio::test]
    async fn test_transform_builds_type_with_property_set() {
        let mut config = MockConfig::demo();
        config.demo = false;
        let pipeline = IfcPipeline::new(MockStorage::new(), config);

        let result = pipeline.transform(source()).await.unwrap();

        assert_eq!(result.report.property_sets, 1);
        let object = result
            .model
            .find_by_name("IfcBuildingElementProxyType", layout::ROOT_NAME, "Test Object")
            .unwrap();
        let psets = result
            .model
            .get(object)
            .unwrap()
            .attribute(layout::TYPE_HAS_PROPERTY_SETS)
            .and_then(|a| a.as_list())
            .unwrap();
        assert_eq!(psets.len(), 1);
        assert!(result
            .model
            .find_by_name("IfcProject", layout::ROOT_NAME, "Test Project")
            .is_some());
    }

    #[tokio::test]
    async fn test_transform_rejects_unknown_object_class() {
        let mut config = MockConfig::demo();
        config.object_class = "IfcWindowType".to_string();
        let pipeline = IfcPipeline::new(MockStorage::new(), config);

        let err = pipeline.transform(source()).await.unwrap_err();
        assert!(matches!(err, EpdIfcError::UnsupportedObjectClass { .. }));
    }

    #[tokio::test]
    async fn test_load_writes_ifc_file() {
        let storage = MockStorage::new();
        let pipeline = IfcPipeline::new(storage.clone(), MockConfig::demo());

        let generated = pipeline.transform(source()).await.unwrap();
        let output_path = pipeline.load(generated).await.unwrap();

        assert_eq!(output_path, "test_output/model.ifc");
        let text = String::from_utf8(storage.get_file("model.ifc").await.unwrap()).unwrap();
        assert!(text.starts_with("ISO-10303-21;"));
        assert!(text.contains("FILE_NAME('model.ifc',"));
        assert!(text.contains("IFCPROPERTYSET("));
        assert!(text.contains("'ProductName',$,IFCLABEL('NaN'),$"));
        assert!(storage.get_file("model.ifczip").await.is_none());
    }

    #[tokio::test]
    async fn test_load_writes_archive_when_enabled() {
        let storage = MockStorage::new();
        let mut config = MockConfig::demo();
        config.archive = true;
        let pipeline = IfcPipeline::new(storage.clone(), config);

        let generated = pipeline.transform(source()).await.unwrap();
        pipeline.load(generated).await.unwrap();

        let zip_data = storage.get_file("model.ifczip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_name("model.ifc").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content.as_bytes(), storage.get_file("model.ifc").await.unwrap());
    }

    #[tokio::test]
    async fn test_extract_reports_missing_template_path() {
        let mut config = MockConfig::demo();
        config.templates.property_sets = "does/not/exist.csv".to_string();
        let pipeline = IfcPipeline::new(MockStorage::new(), config);

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EpdIfcError::IoError(_)));
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
