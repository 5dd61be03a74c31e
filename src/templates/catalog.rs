use crate::templates::table::{TemplateGroup, TemplateRow, TemplateTable};
use crate::utils::error::Result;
use std::fmt;

pub const ENVIRONMENTAL_INDICATORS_PSET: &str = "LCAPset_EnvironmentalIndicators";
pub const METHODOLOGY_PSET: &str = "LCAPset_EPDMethodologicalSpecification";
pub const INFORMATION_MODULE_PROPERTY: &str = "InformationModule";

/// The `IFCType` column of a property template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    SingleValue,
    ListValue,
    EnumeratedValue,
    Complex,
    Unsupported(String),
}

impl PropertyKind {
    pub fn parse(ifc_type: &str) -> Self {
        match ifc_type {
            "IfcPropertySingleValue" => Self::SingleValue,
            "IfcPropertyListValue" => Self::ListValue,
            "IfcPropertyEnumeratedValue" => Self::EnumeratedValue,
            "IfcComplexProperty" => Self::Complex,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SingleValue => "IfcPropertySingleValue",
            Self::ListValue => "IfcPropertyListValue",
            Self::EnumeratedValue => "IfcPropertyEnumeratedValue",
            Self::Complex => "IfcComplexProperty",
            Self::Unsupported(other) => other,
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTemplate {
    /// Group the template was read from, kept for error messages.
    pub group: String,
    pub name: String,
    pub kind: PropertyKind,
    pub data_type: Option<String>,
    pub guid: Option<String>,
    pub unit: Option<String>,
    pub specification: Option<String>,
    pub enumeration_reference: Option<String>,
}

impl PropertyTemplate {
    pub fn from_row(group: &str, row: &TemplateRow) -> Result<Self> {
        let owned = |field: &str| row.get(field).map(str::to_string);
        Ok(Self {
            group: group.to_string(),
            name: row.require(group, "PropertyName")?.to_string(),
            kind: PropertyKind::parse(row.require(group, "IFCType")?),
            data_type: owned("DataType"),
            guid: owned("ISO22057GUID"),
            unit: owned("Unit"),
            specification: owned("Specification"),
            enumeration_reference: owned("EnumerationReference"),
        })
    }

    pub fn require_data_type(&self) -> Result<&str> {
        self.data_type
            .as_deref()
            .ok_or_else(|| crate::utils::error::EpdIfcError::MissingTemplateField {
                group: format!("{}.{}", self.group, self.name),
                field: "DataType".to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationItem {
    pub data_type: String,
    pub value: String,
}

impl EnumerationItem {
    pub fn from_row(group: &str, row: &TemplateRow) -> Result<Self> {
        Ok(Self {
            data_type: row.require(group, "DataType")?.to_string(),
            value: row.require(group, "EnumerationValues")?.to_string(),
        })
    }
}

/// One indicator (e.g. GWP-total) of an environmental indicator table.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRowTemplate {
    pub row_name: String,
    pub unit: String,
    pub data_type: String,
    pub guid: String,
}

impl IndicatorRowTemplate {
    pub fn from_row(group: &str, row: &TemplateRow) -> Result<Self> {
        Ok(Self {
            row_name: row.require(group, "RowName")?.to_string(),
            unit: row.require(group, "Unit")?.to_string(),
            data_type: row.require(group, "DataType")?.to_string(),
            guid: row.require(group, "ISO22057GUID")?.to_string(),
        })
    }
}

/// A life-cycle information module (A1..D), one column of every indicator table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleColumnTemplate {
    pub module: String,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub reference_to: Option<String>,
}

impl ModuleColumnTemplate {
    pub fn from_group(group: &TemplateGroup) -> Self {
        let owned = |field: &str| group.attribute(field).map(str::to_string);
        Self {
            module: group.name.clone(),
            guid: owned("ISO22057GUID"),
            description: owned("Description"),
            reference_to: owned("ReferenceTo"),
        }
    }
}

/// The five template sheets one model is generated from.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    pub property_sets: TemplateTable,
    pub enumerations: TemplateTable,
    pub complex_properties: TemplateTable,
    pub indicator_rows: TemplateTable,
    pub module_columns: TemplateTable,
}

impl TemplateCatalog {
    pub fn property_set_groups(&self) -> impl Iterator<Item = &TemplateGroup> {
        self.property_sets.groups()
    }

    pub fn property_templates(group: &TemplateGroup) -> Result<Vec<PropertyTemplate>> {
        group
            .members
            .iter()
            .map(|row| PropertyTemplate::from_row(&group.name, row))
            .collect()
    }

    /// `None` when no enumeration of that name exists.
    pub fn enumeration_items(&self, name: &str) -> Result<Option<Vec<EnumerationItem>>> {
        self.enumerations
            .group(name)
            .map(|group| {
                group
                    .members
                    .iter()
                    .map(|row| EnumerationItem::from_row(name, row))
                    .collect()
            })
            .transpose()
    }

    pub fn complex_members(&self, name: &str) -> Result<Option<Vec<PropertyTemplate>>> {
        self.complex_properties
            .group(name)
            .map(Self::property_templates)
            .transpose()
    }

    pub fn indicator_tables(&self) -> Result<Vec<(String, Vec<IndicatorRowTemplate>)>> {
        self.indicator_rows
            .groups()
            .map(|group| {
                let rows = group
                    .members
                    .iter()
                    .map(|row| IndicatorRowTemplate::from_row(&group.name, row))
                    .collect::<Result<Vec<_>>>()?;
                Ok((group.name.clone(), rows))
            })
            .collect()
    }

    pub fn module_column(&self, module: &str) -> Option<ModuleColumnTemplate> {
        self.module_columns
            .group(module)
            .map(ModuleColumnTemplate::from_group)
    }

    pub fn module_names(&self) -> Vec<String> {
        self.module_columns.groups().map(|g| g.name.clone()).collect()
    }

    /// GUID of the `InformationModule` property, which lists the declared modules.
    pub fn information_module_guid(&self) -> Option<&str> {
        self.property_sets
            .group(METHODOLOGY_PSET)?
            .members
            .iter()
            .find(|row| row.get("PropertyName") == Some(INFORMATION_MODULE_PROPERTY))
            .and_then(|row| row.get("ISO22057GUID"))
    }
}
