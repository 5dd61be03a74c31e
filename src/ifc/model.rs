use crate::ifc::guid;
use crate::ifc::value::IfcValue;
use crate::utils::error::{EpdIfcError, Result};
use std::fmt;

pub const SCHEMA_IFC4X3: &str = "IFC4X3";

/// Instance name of an entity, `#n` in the data section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// `$`
    Unset,
    /// `*`, for attributes redeclared as DERIVE in a subtype.
    Derived,
    Ref(EntityId),
    Typed(IfcValue),
    Enum(String),
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    List(Vec<Attribute>),
}

impl Attribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn enumeration(literal: impl Into<String>) -> Self {
        Self::Enum(literal.into())
    }

    pub fn opt_string(value: Option<&str>) -> Self {
        value.map_or(Self::Unset, Self::string)
    }

    pub fn opt_ref(id: Option<EntityId>) -> Self {
        id.map_or(Self::Unset, Self::Ref)
    }

    pub fn refs(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self::List(ids.into_iter().map(Self::Ref).collect())
    }

    /// A list, or `$` when empty (optional aggregates may not be empty).
    pub fn opt_list(items: Vec<Attribute>) -> Self {
        if items.is_empty() {
            Self::Unset
        } else {
            Self::List(items)
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Attribute]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub class: String,
    pub attributes: Vec<Attribute>,
}

impl Entity {
    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn is_a(&self, class: &str) -> bool {
        self.class.eq_ignore_ascii_case(class)
    }
}

/// Positional attribute indices shared by the entities this crate writes.
pub mod layout {
    /// IfcRoot: GlobalId, OwnerHistory, Name, Description.
    pub const ROOT_NAME: usize = 2;
    /// IfcProperty subtypes: Name, Specification, ...
    pub const PROPERTY_NAME: usize = 0;
    /// IfcPropertyEnumeration: Name, EnumerationValues, Unit.
    pub const ENUMERATION_NAME: usize = 0;
    /// IfcTableColumn: Identifier, Name, Description, Unit, ReferencePath.
    pub const TABLE_COLUMN_NAME: usize = 1;
    /// IfcTypeObject: ..., ApplicableOccurrence, HasPropertySets.
    pub const TYPE_HAS_PROPERTY_SETS: usize = 5;
    /// IfcContext: ..., RepresentationContexts, UnitsInContext.
    pub const CONTEXT_UNITS: usize = 8;
}

/// Entities of one IFC-SPF file, numbered densely from `#1` in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct IfcModel {
    schema: String,
    entities: Vec<Entity>,
}

impl Default for IfcModel {
    fn default() -> Self {
        Self::new(SCHEMA_IFC4X3)
    }
}

impl IfcModel {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            entities: Vec::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn add(&mut self, class: &str, attributes: Vec<Attribute>) -> EntityId {
        let id = EntityId(self.entities.len() + 1);
        self.entities.push(Entity {
            id,
            class: class.to_string(),
            attributes,
        });
        id
    }

    /// Adds an IfcRoot subtype. `attributes` start at `Name`; a new GlobalId
    /// and an unset OwnerHistory are put in front.
    pub fn add_rooted(&mut self, class: &str, attributes: Vec<Attribute>) -> EntityId {
        let mut full = Vec::with_capacity(attributes.len() + 2);
        full.push(Attribute::String(guid::new_guid()));
        full.push(Attribute::Unset);
        full.extend(attributes);
        self.add(class, full)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        id.0.checked_sub(1).and_then(|i| self.entities.get(i))
    }

    fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        id.0.checked_sub(1)
            .and_then(|i| self.entities.get_mut(i))
            .ok_or_else(|| EpdIfcError::ProcessingError {
                message: format!("entity {} does not exist", id),
            })
    }

    pub fn set_attribute(&mut self, id: EntityId, index: usize, value: Attribute) -> Result<()> {
        let entity = self.get_mut(id)?;
        match entity.attributes.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(EpdIfcError::ProcessingError {
                message: format!("{} {} has no attribute {}", entity.class, id, index),
            }),
        }
    }

    /// Appends to an aggregate attribute, turning `$` into a one-item list.
    pub fn push_to_list(&mut self, id: EntityId, index: usize, item: Attribute) -> Result<()> {
        let entity = self.get_mut(id)?;
        let class = entity.class.clone();
        match entity.attributes.get_mut(index) {
            Some(Attribute::List(items)) => {
                items.push(item);
                Ok(())
            }
            Some(slot @ Attribute::Unset) => {
                *slot = Attribute::List(vec![item]);
                Ok(())
            }
            _ => Err(EpdIfcError::ProcessingError {
                message: format!("{} {} attribute {} is not a list", class, id, index),
            }),
        }
    }

    pub fn by_type<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.iter().filter(move |e| e.is_a(class))
    }

    /// First entity of `class` whose string attribute at `name_index` is `name`.
    pub fn find_by_name(&self, class: &str, name_index: usize, name: &str) -> Option<EntityId> {
        self.by_type(class)
            .find(|e| e.attribute(name_index).and_then(Attribute::as_str) == Some(name))
            .map(|e| e.id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
