use crate::core::embed::EmbedReport;
use crate::epd::ProductData;
use crate::ifc::IfcModel;
use crate::templates::TemplateCatalog;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROPERTY_SETS: &str = "CSV/22057IFC_psets.csv";
pub const DEFAULT_ENUMERATIONS: &str = "CSV/22057IFC_enumerations.csv";
pub const DEFAULT_COMPLEX_PROPERTIES: &str = "CSV/22057IFC_complexprops.csv";
pub const DEFAULT_INDICATOR_ROWS: &str = "CSV/22057IFC_tablerows.csv";
pub const DEFAULT_MODULE_COLUMNS: &str = "CSV/22057IFC_tablecolumns.csv";

/// Locations of the five template sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePaths {
    pub property_sets: String,
    pub enumerations: String,
    pub complex_properties: String,
    pub indicator_rows: String,
    pub module_columns: String,
}

impl Default for TemplatePaths {
    fn default() -> Self {
        Self {
            property_sets: DEFAULT_PROPERTY_SETS.to_string(),
            enumerations: DEFAULT_ENUMERATIONS.to_string(),
            complex_properties: DEFAULT_COMPLEX_PROPERTIES.to_string(),
            indicator_rows: DEFAULT_INDICATOR_ROWS.to_string(),
            module_columns: DEFAULT_MODULE_COLUMNS.to_string(),
        }
    }
}

impl TemplatePaths {
    /// `(field, path)` pairs, for validation and logging.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("property_sets", &self.property_sets),
            ("enumerations", &self.enumerations),
            ("complex_properties", &self.complex_properties),
            ("indicator_rows", &self.indicator_rows),
            ("module_columns", &self.module_columns),
        ]
    }
}

/// Output of the extract phase.
#[derive(Debug, Clone)]
pub struct SourceData {
    pub catalog: TemplateCatalog,
    pub product: Option<ProductData>,
}

/// Output of the transform phase.
#[derive(Debug, Clone)]
pub struct GeneratedModel {
    pub model: IfcModel,
    pub report: EmbedReport,
}
