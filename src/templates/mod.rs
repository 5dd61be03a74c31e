//! EN ISO 22057 template tables, exported from the information requirements
//! workbook as grouped CSV files.

pub mod catalog;
pub mod table;

pub use catalog::{
    EnumerationItem, IndicatorRowTemplate, ModuleColumnTemplate, PropertyKind, PropertyTemplate,
    TemplateCatalog,
};
pub use table::{TemplateGroup, TemplateRow, TemplateTable};
