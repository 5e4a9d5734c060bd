//! Thermal boundaries.
//!
//! A [`BoundaryObject`] is a named boundary in the design's boundary
//! namespace. Its [`BoundaryType`] picks the engine methods:
//!
//! | Operation | Engine call |
//! |-----------|-------------|
//! | create    | `Assign<Type>Boundary(["NAME:<name>", ..])` |
//! | update    | `Edit<Type>Boundary(<name>, ["NAME:<name>", ..])` |
//! | delete    | `DeleteBoundaries([<name>])` |

mod builders;
mod schema;

pub use builders::{
    block_power, BoundaryDefinition, ConductingPlate, Electrical, Geometry, HollowBlock,
    HollowCondition, Opening, OpeningFlow, PlateSpecification, RadiationSide, RadiationTarget,
    SolidBlock, Source, SourceCondition, StationaryWall, WallCondition, DEFAULT_SOLID_MATERIAL,
    DEFAULT_SURFACE_MATERIAL,
};

use std::fmt;

use serde::{Deserialize, Serialize};

use super::props::{to_named_block, Arg, PropertyDictionary, Schema};
use super::remote::{EngineCommand, RemoteHandle, RemoteKind};
use super::session::Target;

/// A boundary in the design's boundary namespace.
pub type BoundaryObject = RemoteHandle<BoundaryType>;

/// Boundary type, as reported in the engine's `BoundType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryType {
    /// Solid or hollow block.
    Block,
    /// Heat source.
    #[serde(rename = "SourceIcepak")]
    Source,
    /// Stationary wall.
    #[serde(rename = "Stationary Wall")]
    StationaryWall,
    /// Conducting plate.
    #[serde(rename = "Conducting Plate")]
    ConductingPlate,
    /// Opening.
    Opening,
}

impl BoundaryType {
    /// All supported boundary types.
    pub const ALL: [Self; 5] = [
        Self::Block,
        Self::Source,
        Self::StationaryWall,
        Self::ConductingPlate,
        Self::Opening,
    ];

    /// Engine `BoundType` name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "Block",
            Self::Source => "SourceIcepak",
            Self::StationaryWall => "Stationary Wall",
            Self::ConductingPlate => "Conducting Plate",
            Self::Opening => "Opening",
        }
    }

    /// Parses an engine `BoundType` name.
    #[must_use]
    pub fn from_bound_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Stem of the `Assign*Boundary` / `Edit*Boundary` methods.
    const fn method_stem(self) -> &'static str {
        match self {
            Self::Block => "Block",
            Self::Source => "Source",
            Self::StationaryWall => "StationaryWall",
            Self::ConductingPlate => "ConductingPlate",
            Self::Opening => "Opening",
        }
    }

    /// Prefix of generated names.
    #[must_use]
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::Block => "Block",
            Self::Source => "Source",
            Self::StationaryWall => "StationaryWall",
            Self::ConductingPlate => "Plate",
            Self::Opening => "Opening",
        }
    }

    /// Static defaults for this type.
    #[must_use]
    pub const fn schema(self) -> Schema {
        match self {
            Self::Block => schema::BLOCK,
            Self::Source => schema::SOURCE,
            Self::StationaryWall => schema::STATIONARY_WALL,
            Self::ConductingPlate => schema::CONDUCTING_PLATE,
            Self::Opening => schema::OPENING,
        }
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RemoteKind for BoundaryType {
    fn target(&self) -> Target {
        Target::Boundary
    }

    fn create_command(&self, name: &str, props: &PropertyDictionary) -> EngineCommand {
        EngineCommand::new(
            format!("Assign{}Boundary", self.method_stem()),
            vec![to_named_block(name, props)],
        )
    }

    fn edit_command(&self, name: &str, props: &PropertyDictionary) -> EngineCommand {
        EngineCommand::new(
            format!("Edit{}Boundary", self.method_stem()),
            vec![Arg::from(name), to_named_block(name, props)],
        )
    }

    fn delete_command(&self, name: &str) -> EngineCommand {
        EngineCommand::new("DeleteBoundaries", vec![Arg::Array(vec![Arg::from(name)])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_type_names_round_trip() {
        for kind in BoundaryType::ALL {
            assert_eq!(BoundaryType::from_bound_type(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert_eq!(BoundaryType::from_bound_type("Network"), None);
    }

    #[test]
    fn commands_use_type_stem() {
        let props = PropertyDictionary::new().with("Objects", vec!["Box1"]);
        let create = BoundaryType::StationaryWall.create_command("W1", &props);
        assert_eq!(create.method, "AssignStationaryWallBoundary");
        assert_eq!(create.args[0].block_name(), Some("W1"));

        let edit = BoundaryType::Source.edit_command("S1", &props);
        assert_eq!(edit.method, "EditSourceBoundary");
        assert_eq!(edit.args[0], Arg::from("S1"));

        let delete = BoundaryType::Opening.delete_command("O1");
        assert_eq!(delete.method, "DeleteBoundaries");
        assert_eq!(delete.args, vec![Arg::Array(vec![Arg::from("O1")])]);
    }
}
