use crate::epd::{find_by_guid, raw_text, ProductData};
use crate::ifc::model::{layout, Attribute, EntityId};
use crate::ifc::units::{parse_unit, SiUnit};
use crate::ifc::value::{convert, convert_or_label, IfcValue, MISSING_VALUE};
use crate::ifc::ModelBuilder;
use crate::templates::catalog::ENVIRONMENTAL_INDICATORS_PSET;
use crate::templates::{
    IndicatorRowTemplate, ModuleColumnTemplate, PropertyKind, PropertyTemplate, TemplateCatalog,
    TemplateGroup,
};
use crate::utils::error::{EpdIfcError, Result};
use serde::Serialize;

const LIST_SEPARATOR: char = ';';
const REFERENCE_TYPE: &str = "IfcBuildingElementProxyType";
const REFERENCE_ATTRIBUTE: &str = "HasPropertySets";

/// What one embedding run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmbedReport {
    pub property_sets: usize,
    pub properties: usize,
    pub tables: usize,
    pub empty_property_sets: usize,
    pub skipped_properties: usize,
}

/// Populates the construction object of a [`ModelBuilder`] with the templated
/// property sets. Values come from `product`, or are placeholders in demo mode.
pub struct Embedder<'a> {
    catalog: &'a TemplateCatalog,
    product: Option<&'a ProductData>,
    demo: bool,
    report: EmbedReport,
}

impl<'a> Embedder<'a> {
    pub fn new(catalog: &'a TemplateCatalog, product: Option<&'a ProductData>, demo: bool) -> Self {
        Self {
            catalog,
            product,
            demo,
            report: EmbedReport::default(),
        }
    }

    pub fn embed(mut self, builder: &mut ModelBuilder) -> Result<EmbedReport> {
        for group in self.catalog.property_set_groups() {
            self.embed_property_set(builder, group)?;
        }
        tracing::info!(
            property_sets = self.report.property_sets,
            properties = self.report.properties,
            tables = self.report.tables,
            "Embedded {} property sets ({} empty ones left out)",
            self.report.property_sets,
            self.report.empty_property_sets
        );
        Ok(self.report)
    }

    fn embed_property_set(&mut self, builder: &mut ModelBuilder, group: &TemplateGroup) -> Result<()> {
        let mut properties = Vec::new();

        for template in TemplateCatalog::property_templates(group)? {
            let property = match template.kind {
                PropertyKind::Complex => self.complex_property(builder, &template)?,
                _ => self.simple_property(builder, &template)?,
            };
            match property {
                Some(id) => properties.push(id),
                None => self.report.skipped_properties += 1,
            }
        }

        if group.name == ENVIRONMENTAL_INDICATORS_PSET {
            properties.extend(self.environmental_indicators(builder)?);
        }

        if properties.is_empty() {
            tracing::debug!("Property set {} has no values; leaving it out", group.name);
            self.report.empty_property_sets += 1;
            return Ok(());
        }

        self.report.properties += properties.len();
        builder.add_property_set(&group.name, group.attribute("Description"), properties)?;
        self.report.property_sets += 1;
        Ok(())
    }

    fn raw_value(&self, template: &PropertyTemplate) -> Option<String> {
        if self.demo {
            return None;
        }
        let guid = template.guid.as_deref()?;
        self.product?.value_of(guid)
    }

    /// Builds a single, list or enumerated value. `None` when there is no data
    /// for it or its `IFCType` is not supported.
    fn simple_property(
        &mut self,
        builder: &mut ModelBuilder,
        template: &PropertyTemplate,
    ) -> Result<Option<EntityId>> {
        let raw = self.raw_value(template);
        if !self.demo && raw.is_none() {
            return Ok(None);
        }

        let unit = template.unit.as_deref().and_then(parse_unit);
        let name = Attribute::string(&template.name);
        let specification = Attribute::opt_string(template.specification.as_deref());

        let id = match &template.kind {
            PropertyKind::SingleValue => {
                let value = convert_or_label(template.require_data_type()?, raw.as_deref());
                let unit = unit.map(|u| builder.unit(&u));
                builder.model_mut().add(
                    "IfcPropertySingleValue",
                    vec![name, specification, Attribute::Typed(value), Attribute::opt_ref(unit)],
                )
            }
            PropertyKind::ListValue => {
                let values = list_values(template.require_data_type()?, raw.as_deref());
                let unit = unit.map(|u| builder.unit(&u));
                builder.model_mut().add(
                    "IfcPropertyListValue",
                    vec![
                        name,
                        specification,
                        Attribute::List(values.into_iter().map(Attribute::Typed).collect()),
                        Attribute::opt_ref(unit),
                    ],
                )
            }
            PropertyKind::EnumeratedValue => {
                let (enumeration, values) =
                    self.enumerated_values(builder, template, raw.as_deref(), unit.as_ref())?;
                builder.model_mut().add(
                    "IfcPropertyEnumeratedValue",
                    vec![
                        name,
                        specification,
                        Attribute::opt_list(values.into_iter().map(Attribute::Typed).collect()),
                        Attribute::Ref(enumeration),
                    ],
                )
            }
            PropertyKind::Complex | PropertyKind::Unsupported(_) => {
                tracing::warn!(
                    "Unsupported IFCType {} for {}.{}",
                    template.kind,
                    template.group,
                    template.name
                );
                return Ok(None);
            }
        };
        Ok(Some(id))
    }

    fn enumerated_values(
        &self,
        builder: &mut ModelBuilder,
        template: &PropertyTemplate,
        raw: Option<&str>,
        unit: Option<&SiUnit>,
    ) -> Result<(EntityId, Vec<IfcValue>)> {
        let enumeration_name = template.enumeration_reference.as_deref().ok_or_else(|| {
            EpdIfcError::MissingTemplateField {
                group: format!("{}.{}", template.group, template.name),
                field: "EnumerationReference".to_string(),
            }
        })?;
        let items = self
            .catalog
            .enumeration_items(enumeration_name)?
            .ok_or_else(|| EpdIfcError::TemplateStructureError {
                source_name: self.catalog.enumerations.source_name().to_string(),
                message: format!(
                    "enumeration '{}' referenced by {} is not defined",
                    enumeration_name, template.name
                ),
            })?;

        let existing = builder.model().find_by_name(
            "IfcPropertyEnumeration",
            layout::ENUMERATION_NAME,
            enumeration_name,
        );
        let enumeration = match existing {
            Some(id) => id,
            None => {
                let values = items
                    .iter()
                    .map(|item| convert(&item.data_type, Some(&item.value)).map(Attribute::Typed))
                    .collect::<Result<Vec<_>>>()?;
                let unit = unit.map(|u| builder.unit(u));
                builder.model_mut().add(
                    "IfcPropertyEnumeration",
                    vec![
                        Attribute::string(enumeration_name),
                        Attribute::List(values),
                        Attribute::opt_ref(unit),
                    ],
                )
            }
        };

        let requested: Vec<Option<&str>> = match raw {
            Some(raw) => raw.split(LIST_SEPARATOR).map(|v| Some(v.trim())).collect(),
            None => vec![None],
        };

        let mut values = Vec::new();
        for value in requested {
            // demo placeholders take the first enumeration item
            let item = match value {
                Some(v) => items.iter().find(|item| item.value == v),
                None => items.first(),
            };
            match item {
                Some(item) => match convert(&item.data_type, Some(&item.value)) {
                    Ok(converted) => values.push(converted),
                    Err(e) => tracing::warn!("Enumeration value skipped: {}", e),
                },
                None => tracing::warn!(
                    "Value '{}' is not part of enumeration {}",
                    value.unwrap_or_default(),
                    enumeration_name
                ),
            }
        }

        Ok((enumeration, values))
    }

    fn complex_property(
        &mut self,
        builder: &mut ModelBuilder,
        template: &PropertyTemplate,
    ) -> Result<Option<EntityId>> {
        if let Some(existing) = builder.model().find_by_name(
            "IfcComplexProperty",
            layout::PROPERTY_NAME,
            &template.name,
        ) {
            return Ok(Some(existing));
        }

        let members = self.catalog.complex_members(&template.name)?.ok_or_else(|| {
            EpdIfcError::TemplateStructureError {
                source_name: self.catalog.complex_properties.source_name().to_string(),
                message: format!("complex property '{}' is not defined", template.name),
            }
        })?;

        let mut parts = Vec::new();
        for member in &members {
            if let Some(id) = self.simple_property(builder, member)? {
                parts.push(id);
            }
        }

        if parts.is_empty() {
            return Ok(None);
        }

        let id = builder.model_mut().add(
            "IfcComplexProperty",
            vec![
                Attribute::string(&template.name),
                Attribute::Unset,
                Attribute::string(&template.name),
                Attribute::refs(parts),
            ],
        );
        Ok(Some(id))
    }

    /// One IfcPropertyReferenceValue per indicator, each pointing at a table
    /// of values per information module.
    fn environmental_indicators(&mut self, builder: &mut ModelBuilder) -> Result<Vec<EntityId>> {
        let Some(modules) = self.applicable_modules() else {
            return Ok(Vec::new());
        };

        let mut references = Vec::new();
        for (indicator, rows) in self.catalog.indicator_tables()? {
            let row_cells = self.indicator_rows(&rows, &modules);
            if row_cells.is_empty() {
                tracing::info!("No rows to add for table {}; table skipped", indicator);
                continue;
            }

            let columns = table_columns(builder, &modules);
            let rows: Vec<EntityId> = row_cells
                .into_iter()
                .map(|cells| {
                    builder.model_mut().add(
                        "IfcTableRow",
                        vec![
                            Attribute::List(cells.into_iter().map(Attribute::Typed).collect()),
                            Attribute::Unset,
                        ],
                    )
                })
                .collect();

            let table = builder.model_mut().add(
                "IfcTable",
                vec![
                    Attribute::string(format!("{}Table", indicator)),
                    Attribute::refs(rows),
                    Attribute::refs(columns),
                ],
            );
            self.report.tables += 1;

            references.push(builder.model_mut().add(
                "IfcPropertyReferenceValue",
                vec![
                    Attribute::string(&indicator),
                    Attribute::Unset,
                    Attribute::string(format!("{}Results", indicator)),
                    Attribute::Ref(table),
                ],
            ));
        }
        Ok(references)
    }

    /// Module columns that apply: all of them in demo mode, otherwise the ones
    /// the EPD declares in its information module list.
    fn applicable_modules(&self) -> Option<Vec<ModuleColumnTemplate>> {
        let names: Vec<String> = if self.demo {
            self.catalog.module_names()
        } else {
            let declared = self
                .catalog
                .information_module_guid()
                .and_then(|guid| self.product?.value_of(guid));
            let Some(declared) = declared else {
                tracing::warn!("EPD does not declare its information modules; indicator tables skipped");
                return None;
            };
            declared
                .split(LIST_SEPARATOR)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(normalize_module)
                .collect()
        };

        let modules = names
            .iter()
            .filter_map(|name| {
                let column = self.catalog.module_column(name);
                if column.is_none() {
                    tracing::warn!("Information module '{}' has no column template; dropped", name);
                }
                column
            })
            .collect();
        Some(modules)
    }

    fn indicator_rows(
        &self,
        rows: &[IndicatorRowTemplate],
        modules: &[ModuleColumnTemplate],
    ) -> Vec<Vec<IfcValue>> {
        let mut table = Vec::new();
        for row in rows {
            let values = if self.demo {
                None
            } else {
                match self.product.and_then(|p| p.indicator_values(&row.guid)) {
                    Some(values) => Some(values),
                    None => continue,
                }
            };

            let mut cells = vec![IfcValue::label(&row.row_name), IfcValue::label(&row.unit)];
            for module in modules {
                let cell = match values {
                    None => convert_or_label(&row.data_type, None),
                    Some(values) => {
                        let raw = module
                            .guid
                            .as_deref()
                            .and_then(|guid| find_by_guid(values, guid, "value"))
                            .and_then(raw_text);
                        match raw {
                            Some(raw) => convert_or_label(&row.data_type, Some(&raw)),
                            None => IfcValue::label(MISSING_VALUE),
                        }
                    }
                };
                cells.push(cell);
            }
            table.push(cells);
        }
        table
    }
}

/// The EPD JSON uses `D1` for module D.
fn normalize_module(module: &str) -> String {
    if module == "D1" {
        "D".to_string()
    } else {
        module.to_string()
    }
}

/// Converts each `;`-separated item. If any item fails, every item becomes an
/// IfcLabel so the list stays homogeneous.
fn list_values(data_type: &str, raw: Option<&str>) -> Vec<IfcValue> {
    let items: Vec<Option<&str>> = match raw {
        Some(raw) => raw.split(LIST_SEPARATOR).map(|v| Some(v.trim())).collect(),
        None => vec![None, None],
    };

    let converted: Result<Vec<IfcValue>> = items.iter().map(|item| convert(data_type, *item)).collect();
    match converted {
        Ok(values) => values,
        Err(e) => {
            tracing::debug!("List value stored as labels: {}", e);
            items
                .iter()
                .map(|item| IfcValue::label(item.unwrap_or(MISSING_VALUE)))
                .collect()
        }
    }
}

/// `Indicator`, `Unit`, then one column per module; columns are shared by name.
fn table_columns(builder: &mut ModelBuilder, modules: &[ModuleColumnTemplate]) -> Vec<EntityId> {
    let mut columns = vec![
        table_column(builder, "Indicator", None, None),
        table_column(builder, "Unit", None, None),
    ];
    for module in modules {
        if let Some(existing) = find_column(builder, &module.module) {
            columns.push(existing);
            continue;
        }
        let reference = module
            .reference_to
            .as_deref()
            .map(|instance| reference(builder, instance));
        columns.push(table_column(
            builder,
            &module.module,
            module.description.as_deref(),
            reference,
        ));
    }
    columns
}

fn find_column(builder: &ModelBuilder, name: &str) -> Option<EntityId> {
    builder
        .model()
        .find_by_name("IfcTableColumn", layout::TABLE_COLUMN_NAME, name)
}

fn table_column(
    builder: &mut ModelBuilder,
    name: &str,
    description: Option<&str>,
    reference: Option<EntityId>,
) -> EntityId {
    if let Some(existing) = find_column(builder, name) {
        return existing;
    }
    builder.model_mut().add(
        "IfcTableColumn",
        vec![
            Attribute::string(name),
            Attribute::string(name),
            Attribute::opt_string(description),
            Attribute::Unset,
            Attribute::opt_ref(reference),
        ],
    )
}

/// IfcReference to a property set of the library type, shared by instance name.
fn reference(builder: &mut ModelBuilder, instance_name: &str) -> EntityId {
    let key = [REFERENCE_TYPE, REFERENCE_ATTRIBUTE, instance_name];
    let existing = builder.model().by_type("IfcReference").find(|e| {
        key.iter()
            .enumerate()
            .all(|(i, part)| e.attribute(i).and_then(Attribute::as_str) == Some(*part))
    });
    if let Some(entity) = existing {
        return entity.id;
    }
    builder.model_mut().add(
        "IfcReference",
        vec![
            Attribute::string(REFERENCE_TYPE),
            Attribute::string(REFERENCE_ATTRIBUTE),
            Attribute::string(instance_name),
            Attribute::Unset,
            Attribute::Unset,
        ],
    )
}
