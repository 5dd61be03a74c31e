//! A minimal IFC4X3 entity graph and its STEP Physical File encoding.

pub mod builder;
pub mod guid;
pub mod model;
pub mod units;
pub mod value;
pub mod writer;

pub use builder::{LibrarySettings, ModelBuilder, ModelSettings, ObjectClass};
pub use model::{Attribute, Entity, EntityId, IfcModel};
pub use value::{IfcValue, PrimitiveValue};
pub use writer::{write_spf, SpfHeader};
