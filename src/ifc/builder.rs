use crate::ifc::model::{layout, Attribute, EntityId, IfcModel};
use crate::ifc::units::{SiUnit, PROJECT_UNITS};
use crate::utils::error::{EpdIfcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_PROJECT_NAME: &str = "CODview2 22057 Demo Library Object";
pub const DEFAULT_OBJECT_CLASS: &str = "IfcBuildingElementProxyType";
pub const DEFAULT_OBJECT_NAME: &str = "My Demo Object";

/// Element types whose attribute layout ends in `ElementType, PredefinedType`.
const ELEMENT_TYPE_CLASSES: &[&str] = &[
    "IfcBuildingElementProxyType",
    "IfcWallType",
    "IfcSlabType",
    "IfcBeamType",
    "IfcColumnType",
    "IfcCoveringType",
    "IfcMemberType",
    "IfcPlateType",
    "IfcRoofType",
    "IfcFootingType",
    "IfcPileType",
];

/// The object the LCA property sets describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    /// A spatial occurrence; property sets attach through relationships.
    Building,
    /// A reusable library type; property sets live in `HasPropertySets`.
    ElementType(&'static str),
}

impl ObjectClass {
    pub fn parse(class: &str) -> Result<Self> {
        let class = class.trim();
        if class.eq_ignore_ascii_case("IfcBuilding") {
            return Ok(Self::Building);
        }
        ELEMENT_TYPE_CLASSES
            .iter()
            .find(|c| c.eq_ignore_ascii_case(class))
            .copied()
            .map(Self::ElementType)
            .ok_or_else(|| EpdIfcError::UnsupportedObjectClass {
                class: class.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Building => "IfcBuilding",
            Self::ElementType(class) => class,
        }
    }

    pub fn supported() -> Vec<&'static str> {
        std::iter::once("IfcBuilding")
            .chain(ELEMENT_TYPE_CLASSES.iter().copied())
            .collect()
    }
}

/// Library information describing the LCA indicator and module catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    pub name: String,
    pub version: String,
    pub version_date: String,
    pub location: String,
    pub publisher_name: String,
    pub publisher_identification: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            name: "LCA indicators and modules".to_string(),
            version: "3.0".to_string(),
            version_date: "2023-12-01".to_string(),
            location: "https://identifier.buildingsmart.org/uri/LCA/LCA/3.0".to_string(),
            publisher_name: "buildingSMART Sustainability Strategic Group".to_string(),
            publisher_identification: "https://identifier.buildingsmart.org/uri/LCA".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub project_name: String,
    pub object_class: ObjectClass,
    pub object_name: String,
    pub library: LibrarySettings,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            object_class: ObjectClass::ElementType(DEFAULT_OBJECT_CLASS),
            object_name: DEFAULT_OBJECT_NAME.to_string(),
            library: LibrarySettings::default(),
        }
    }
}

/// Owns the model while property sets are added to its construction object.
#[derive(Debug)]
pub struct ModelBuilder {
    model: IfcModel,
    settings: ModelSettings,
    project: EntityId,
    object: EntityId,
    units: HashMap<SiUnit, EntityId>,
}

impl ModelBuilder {
    pub fn new(settings: ModelSettings) -> Result<Self> {
        let mut model = IfcModel::default();

        // IfcProject: Name, Description, ObjectType, LongName, Phase,
        // RepresentationContexts, UnitsInContext
        let project = model.add_rooted(
            "IfcProject",
            vec![
                Attribute::string(&settings.project_name),
                Attribute::Unset,
                Attribute::Unset,
                Attribute::Unset,
                Attribute::Unset,
                Attribute::Unset,
                Attribute::Unset,
            ],
        );

        let mut builder = Self {
            model,
            settings,
            project,
            object: project,
            units: HashMap::new(),
        };

        builder.assign_project_units()?;
        builder.add_library_information();
        builder.object = builder.add_construction_object()?;

        tracing::debug!(
            "Created {} '{}' in project '{}'",
            builder.settings.object_class.name(),
            builder.settings.object_name,
            builder.settings.project_name
        );
        Ok(builder)
    }

    fn assign_project_units(&mut self) -> Result<()> {
        let units: Vec<EntityId> = PROJECT_UNITS.iter().map(|u| self.unit(u)).collect();
        let assignment = self.model.add("IfcUnitAssignment", vec![Attribute::refs(units)]);
        self.model
            .set_attribute(self.project, layout::CONTEXT_UNITS, Attribute::Ref(assignment))
    }

    fn add_library_information(&mut self) {
        let library = &self.settings.library;
        // IfcOrganization: Identification, Name, Description, Roles, Addresses
        let publisher = self.model.add(
            "IfcOrganization",
            vec![
                Attribute::string(&library.publisher_identification),
                Attribute::string(&library.publisher_name),
                Attribute::Unset,
                Attribute::Unset,
                Attribute::Unset,
            ],
        );
        // IfcLibraryInformation: Name, Version, Publisher, VersionDate, Location, Description
        self.model.add(
            "IfcLibraryInformation",
            vec![
                Attribute::string(&library.name),
                Attribute::string(&library.version),
                Attribute::Ref(publisher),
                Attribute::string(&library.version_date),
                Attribute::string(&library.location),
                Attribute::Unset,
            ],
        );
    }

    fn add_construction_object(&mut self) -> Result<EntityId> {
        let name = Attribute::string(&self.settings.object_name);
        match self.settings.object_class {
            ObjectClass::Building => {
                // IfcBuilding: Name, Description, ObjectType, ObjectPlacement,
                // Representation, LongName, CompositionType, ElevationOfRefHeight,
                // ElevationOfTerrain, BuildingAddress
                let mut attributes = vec![name];
                attributes.extend(std::iter::repeat(Attribute::Unset).take(5));
                attributes.push(Attribute::enumeration("ELEMENT"));
                attributes.extend(std::iter::repeat(Attribute::Unset).take(3));
                let building = self.model.add_rooted("IfcBuilding", attributes);

                // IfcRelAggregates: Name, Description, RelatingObject, RelatedObjects
                self.model.add_rooted(
                    "IfcRelAggregates",
                    vec![
                        Attribute::Unset,
                        Attribute::Unset,
                        Attribute::Ref(self.project),
                        Attribute::refs([building]),
                    ],
                );
                Ok(building)
            }
            ObjectClass::ElementType(class) => {
                // IfcProjectLibrary shares the IfcContext layout with IfcProject
                let mut library_attributes = vec![Attribute::string(&self.settings.project_name)];
                library_attributes.extend(std::iter::repeat(Attribute::Unset).take(6));
                let library = self.model.add_rooted("IfcProjectLibrary", library_attributes);
                self.declare(self.project, library);

                // Name, Description, ApplicableOccurrence, HasPropertySets,
                // RepresentationMaps, Tag, ElementType, PredefinedType
                let mut attributes = vec![name];
                attributes.extend(std::iter::repeat(Attribute::Unset).take(6));
                attributes.push(Attribute::enumeration("NOTDEFINED"));
                let element_type = self.model.add_rooted(class, attributes);
                self.declare(library, element_type);
                Ok(element_type)
            }
        }
    }

    /// IfcRelDeclares: Name, Description, RelatingContext, RelatedDefinitions
    fn declare(&mut self, context: EntityId, definition: EntityId) -> EntityId {
        self.model.add_rooted(
            "IfcRelDeclares",
            vec![
                Attribute::Unset,
                Attribute::Unset,
                Attribute::Ref(context),
                Attribute::refs([definition]),
            ],
        )
    }

    /// The IfcSIUnit for `unit`, created on first use.
    pub fn unit(&mut self, unit: &SiUnit) -> EntityId {
        if let Some(id) = self.units.get(unit) {
            return *id;
        }
        let id = self.model.add("IfcSIUnit", unit.attributes());
        self.units.insert(unit.clone(), id);
        id
    }

    /// Creates an IfcPropertySet and attaches it to the construction object.
    pub fn add_property_set(
        &mut self,
        name: &str,
        description: Option<&str>,
        properties: Vec<EntityId>,
    ) -> Result<EntityId> {
        if properties.is_empty() {
            return Err(EpdIfcError::ProcessingError {
                message: format!("property set '{}' has no properties", name),
            });
        }

        let pset = self.model.add_rooted(
            "IfcPropertySet",
            vec![
                Attribute::string(name),
                Attribute::opt_string(description),
                Attribute::refs(properties),
            ],
        );

        match self.settings.object_class {
            ObjectClass::Building => {
                // IfcRelDefinesByProperties: Name, Description, RelatedObjects,
                // RelatingPropertyDefinition
                self.model.add_rooted(
                    "IfcRelDefinesByProperties",
                    vec![
                        Attribute::Unset,
                        Attribute::Unset,
                        Attribute::refs([self.object]),
                        Attribute::Ref(pset),
                    ],
                );
            }
            ObjectClass::ElementType(_) => {
                self.model.push_to_list(
                    self.object,
                    layout::TYPE_HAS_PROPERTY_SETS,
                    Attribute::Ref(pset),
                )?;
            }
        }
        Ok(pset)
    }

    pub fn model(&self) -> &IfcModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut IfcModel {
        &mut self.model
    }

    pub fn object(&self) -> EntityId {
        self.object
    }

    pub fn project(&self) -> EntityId {
        self.project
    }

    pub fn into_model(self) -> IfcModel {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifc::units::KILOGRAM;

    #[test]
    fn test_object_class_parse() {
        assert_eq!(ObjectClass::parse("IfcBuilding").unwrap(), ObjectClass::Building);
        assert_eq!(
            ObjectClass::parse("ifcwalltype").unwrap(),
            ObjectClass::ElementType("IfcWallType")
        );
        assert!(ObjectClass::parse("IfcWindow").is_err());
        assert!(ObjectClass::supported().contains(&"IfcBuildingElementProxyType"));
    }

    #[test]
    fn test_element_type_is_declared_in_a_project_library() {
        let builder = ModelBuilder::new(ModelSettings::default()).unwrap();
        let model = builder.model();

        let library = model.by_type("IfcProjectLibrary").next().unwrap();
        assert_eq!(
            library.attribute(layout::ROOT_NAME).and_then(Attribute::as_str),
            Some(DEFAULT_PROJECT_NAME)
        );
        assert_eq!(model.by_type("IfcRelDeclares").count(), 2);

        let object = model.get(builder.object()).unwrap();
        assert!(object.is_a("IfcBuildingElementProxyType"));
        assert_eq!(object.attributes.len(), 10);
        assert_eq!(object.attribute(9), Some(&Attribute::enumeration("NOTDEFINED")));
    }

    #[test]
    fn test_project_units_and_library_information() {
        let builder = ModelBuilder::new(ModelSettings::default()).unwrap();
        let model = builder.model();

        assert_eq!(model.by_type("IfcSIUnit").count(), 4);
        let project = model.get(builder.project()).unwrap();
        let assignment = project
            .attribute(layout::CONTEXT_UNITS)
            .and_then(Attribute::as_ref_id)
            .and_then(|id| model.get(id))
            .unwrap();
        assert!(assignment.is_a("IfcUnitAssignment"));

        let info = model.by_type("IfcLibraryInformation").next().unwrap();
        assert_eq!(info.attribute(1).and_then(Attribute::as_str), Some("3.0"));
        assert_eq!(
            model.find_by_name("IfcOrganization", 1, "buildingSMART Sustainability Strategic Group"),
            info.attribute(2).and_then(Attribute::as_ref_id)
        );
    }

    #[test]
    fn test_units_are_reused() {
        let mut builder = ModelBuilder::new(ModelSettings::default()).unwrap();
        let before = builder.model().len();
        builder.unit(&KILOGRAM);
        assert_eq!(builder.model().len(), before);
    }

    #[test]
    fn test_building_property_sets_use_relationships() {
        let settings = ModelSettings {
            object_class: ObjectClass::Building,
            object_name: "My Demo Building".to_string(),
            ..Default::default()
        };
        let mut builder = ModelBuilder::new(settings).unwrap();
        assert_eq!(builder.model().by_type("IfcProjectLibrary").count(), 0);
        assert_eq!(builder.model().by_type("IfcRelAggregates").count(), 1);

        let prop = builder.model_mut().add(
            "IfcPropertySingleValue",
            vec![Attribute::string("P"), Attribute::Unset, Attribute::Unset, Attribute::Unset],
        );
        let pset = builder.add_property_set("Pset_Test", Some("desc"), vec![prop]).unwrap();

        let rel = builder.model().by_type("IfcRelDefinesByProperties").next().unwrap();
        assert_eq!(rel.attribute(5), Some(&Attribute::Ref(pset)));
        assert!(builder.add_property_set("Pset_Empty", None, vec![]).is_err());
    }

    #[test]
    fn test_type_property_sets_are_listed_on_the_type() {
        let mut builder = ModelBuilder::new(ModelSettings::default()).unwrap();
        let prop = builder.model_mut().add(
            "IfcPropertySingleValue",
            vec![Attribute::string("P"), Attribute::Unset, Attribute::Unset, Attribute::Unset],
        );
        let pset = builder.add_property_set("Pset_Test", None, vec![prop]).unwrap();

        let object = builder.model().get(builder.object()).unwrap();
        assert_eq!(
            object.attribute(layout::TYPE_HAS_PROPERTY_SETS),
            Some(&Attribute::List(vec![Attribute::Ref(pset)]))
        );
    }
}
