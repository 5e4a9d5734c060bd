//! Native components.
//!
//! A native component is a parametric component whose geometry is produced
//! by a provider inside the engine (a linked PCB layout, a fan). Its
//! dictionary carries:
//!
//! - the `NativeComponentDefinitionProvider` block with the provider's own
//!   parameters
//! - geometry, design and material definition parameter blocks
//! - the submodel definition name and a unique definition identifier used
//!   when the definition is instantiated again
//!
//! Creation goes through the 3D modeler editor:
//!
//! | Operation | Engine call |
//! |-----------|-------------|
//! | create    | `InsertNativeComponent(["NAME:InsertNativeComponentData", ..])` |
//! | update    | `EditNativeComponentDefinition(["NAME:EditNativeComponentDefinitionData", ..])` |
//! | delete    | `Delete(["NAME:Selections", "Selections:=", <instance>])` |
//!
//! The engine names the instance (`<definition>1`), and that name becomes
//! authoritative.

mod fan;
mod pcb;

pub use fan::{FanCurve, FanDefinition, FanModel, FanShape, MovePlane};
pub use pcb::{Extents, PartFilter, PartsChoice, PcbDefinition, Solderballs};

use std::fmt;

use crate::aedt::error::{AedtResult, ValidationError};
use crate::aedt::props::{to_named_block, Assignment, PropValue, PropertyDictionary};
use crate::aedt::remote::{EngineCommand, RemoteHandle, RemoteKind, UpdateOutcome};
use crate::aedt::session::Target;

use crate::aedt::boundary::RadiationSide;

/// Key of the provider block.
pub const PROVIDER: &str = "NativeComponentDefinitionProvider";

/// Key of the submodel definition name.
pub const SUBMODEL_DEFINITION_NAME: &str = "SubmodelDefinitionName";

/// Definition-level keys sent back on edit, in order.
const DEFINITION_KEYS: [&str; 9] = [
    "GeometryDefinitionParameters",
    "DesignDefinitionParameters",
    "MaterialDefinitionParameters",
    "NextUniqueID",
    "MoveBackwards",
    "DatasetType",
    "DatasetDefinitions",
    PROVIDER,
    "InstanceParameters",
];

/// A native component instance.
pub type NativeComponentObject = RemoteHandle<NativeComponentKind>;

/// Provider type of a native component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeComponentKind {
    /// Linked PCB layout.
    Pcb,
    /// Fan.
    Fan,
    /// Any other provider, by its `Type` name.
    Other(String),
}

impl NativeComponentKind {
    /// Provider `Type` name.
    #[must_use]
    pub fn provider_type(&self) -> &str {
        match self {
            Self::Pcb => "PCB",
            Self::Fan => "Fan",
            Self::Other(name) => name,
        }
    }

    /// Kind from a provider `Type` name.
    #[must_use]
    pub fn from_provider_type(name: &str) -> Self {
        match name {
            "PCB" => Self::Pcb,
            "Fan" => Self::Fan,
            other => Self::Other(other.to_string()),
        }
    }

    /// Kind of a complete component dictionary.
    #[must_use]
    pub fn of_props(props: &PropertyDictionary) -> Option<Self> {
        props
            .get_path(&format!("{PROVIDER}::Type"))
            .and_then(PropValue::as_str)
            .map(Self::from_provider_type)
    }

    /// Prefix of generated definition names.
    #[must_use]
    pub fn default_prefix(&self) -> &str {
        match self {
            Self::Pcb => "PCB",
            Self::Fan => "Fan",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for NativeComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_type())
    }
}

impl RemoteKind for NativeComponentKind {
    fn target(&self) -> Target {
        Target::Editor
    }

    fn create_command(&self, _name: &str, props: &PropertyDictionary) -> EngineCommand {
        EngineCommand::new(
            "InsertNativeComponent",
            vec![to_named_block("InsertNativeComponentData", props)],
        )
    }

    fn edit_command(&self, name: &str, props: &PropertyDictionary) -> EngineCommand {
        let definition = props
            .get(SUBMODEL_DEFINITION_NAME)
            .and_then(PropValue::as_str)
            .unwrap_or(name);
        let mut data = PropertyDictionary::new().with("DefinitionName", definition);
        for key in DEFINITION_KEYS {
            if let Some(value) = props.get(key) {
                data.insert(key, value.clone());
            }
        }
        EngineCommand::new(
            "EditNativeComponentDefinition",
            vec![to_named_block("EditNativeComponentDefinitionData", &data)],
        )
    }

    fn delete_command(&self, name: &str) -> EngineCommand {
        let selection = PropertyDictionary::new().with("Selections", name);
        EngineCommand::new("Delete", vec![to_named_block("Selections", &selection)])
    }
}

/// Wraps a provider block in the common native component envelope.
pub(crate) fn component_envelope(
    definition_name: &str,
    provider: PropertyDictionary,
) -> PropertyDictionary {
    let empty_orders = || PropertyDictionary::new().with("VariableOrders", PropertyDictionary::new());
    let component_info = PropertyDictionary::new()
        .with("ComponentName", definition_name)
        .with("Company", "")
        .with("Company URL", "")
        .with("Model Number", "")
        .with("Help URL", "")
        .with("Notes", "")
        .with("IconType", "");
    let instance_parameters = PropertyDictionary::new()
        .with("GeometryParameters", "")
        .with("MaterialParameters", "")
        .with("DesignParameters", "");

    PropertyDictionary::new()
        .with("TargetCS", "Global")
        .with(SUBMODEL_DEFINITION_NAME, definition_name)
        .with("ComponentPriorityLists", PropertyDictionary::new())
        .with("NextUniqueID", 0.0)
        .with("MoveBackwards", false)
        .with("DatasetType", "ComponentDatasetType")
        .with("DatasetDefinitions", PropertyDictionary::new())
        .with("BasicComponentInfo", component_info)
        .with("GeometryDefinitionParameters", empty_orders())
        .with("DesignDefinitionParameters", empty_orders())
        .with("MaterialDefinitionParameters", empty_orders())
        .with("MapInstanceParameters", "DesignVariable")
        .with(
            "UniqueDefinitionIdentifier",
            uuid::Uuid::new_v4().hyphenated().to_string(),
        )
        .with("OriginFilePath", "")
        .with("IsLocal", false)
        .with("ChecksumString", "")
        .with(PROVIDER, provider)
        .with("InstanceParameters", instance_parameters)
}

fn provider_path(key: &str) -> String {
    format!("{PROVIDER}::{key}")
}

/// PCB-specific edits.
impl RemoteHandle<NativeComponentKind> {
    fn ensure_pcb(&self) -> AedtResult<()> {
        if self.kind() == NativeComponentKind::Pcb {
            Ok(())
        } else {
            Err(ValidationError::invalid_argument(
                "component",
                format!("'{}' is not a PCB component", self.name()),
            )
            .into())
        }
    }

    /// Sets the mesh resolution of a PCB component.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] for a resolution of zero
    /// or a non-PCB component, or an engine error from the update.
    pub fn set_resolution(&self, resolution: u32) -> AedtResult<UpdateOutcome> {
        self.ensure_pcb()?;
        if resolution == 0 {
            return Err(
                ValidationError::invalid_argument("Resolution", "must be at least 1").into(),
            );
        }
        let path = provider_path("Resolution");
        self.update_with(|props| props.set_path(&path, resolution))
    }

    /// Sets the dissipated power of a PCB component.
    ///
    /// Bare numbers take the design's power unit.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedConfiguration`] for variations
    /// and Joule heating, or an engine error from the update.
    pub fn set_power(&self, power: impl Into<Assignment>) -> AedtResult<UpdateOutcome> {
        self.ensure_pcb()?;
        let literal = pcb::power_literal(&power.into(), &self.units().power)?;
        let path = provider_path("Power");
        self.update_with(|props| props.set_path(&path, literal))
    }

    /// Replaces the low side radiation settings.
    ///
    /// Bare reference temperatures take the design's temperature unit.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid radiation settings, or an
    /// engine error from the update.
    pub fn set_low_side_radiation(&self, side: &RadiationSide) -> AedtResult<UpdateOutcome> {
        self.set_side_radiation("LowSide", side)
    }

    /// Replaces the high side radiation settings.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_low_side_radiation`].
    pub fn set_high_side_radiation(&self, side: &RadiationSide) -> AedtResult<UpdateOutcome> {
        self.set_side_radiation("HighSide", side)
    }

    fn set_side_radiation(&self, key: &str, side: &RadiationSide) -> AedtResult<UpdateOutcome> {
        self.ensure_pcb()?;
        let block = side.to_props(&self.units().temperature)?;
        let path = provider_path(key);
        self.update_with(|props| props.set_path(&path, block))
    }

    /// Sets or clears the part filter.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] when setting a filter on
    /// a component that does not import parts, or an engine error from the
    /// update.
    pub fn set_part_filter(&self, filter: Option<&PartFilter>) -> AedtResult<UpdateOutcome> {
        self.ensure_pcb()?;
        let Some(filter) = filter else {
            return self.update_with(|props| {
                if let Some(PropValue::Dict(provider)) = props.get_mut(PROVIDER) {
                    provider.remove("Filters");
                }
            });
        };

        let parts = self.property(&provider_path("PartsChoice"))?;
        if parts.as_ref().and_then(PropValue::as_number) == Some(f64::from(PartsChoice::None.code())) {
            return Err(ValidationError::invalid_argument(
                "Filters",
                "part filters need parts to be imported",
            )
            .into());
        }
        let block = filter.to_props()?;
        let path = provider_path("Filters");
        self.update_with(|props| props.set_path(&path, block))
    }

    /// Deep-merges `patch` into the provider block.
    ///
    /// # Errors
    ///
    /// Returns an engine error from the update.
    pub fn update_provider(&self, patch: PropertyDictionary) -> AedtResult<UpdateOutcome> {
        self.update(&PropertyDictionary::new().with(PROVIDER, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_type_round_trip() {
        for kind in [
            NativeComponentKind::Pcb,
            NativeComponentKind::Fan,
            NativeComponentKind::Other("Heat Sink".into()),
        ] {
            assert_eq!(NativeComponentKind::from_provider_type(kind.provider_type()), kind);
        }
    }

    #[test]
    fn envelope_has_unique_identifier() {
        let a = component_envelope("Board", PropertyDictionary::new().with("Type", "PCB"));
        let b = component_envelope("Board", PropertyDictionary::new().with("Type", "PCB"));
        assert_ne!(
            a.get("UniqueDefinitionIdentifier"),
            b.get("UniqueDefinitionIdentifier")
        );
        assert_eq!(NativeComponentKind::of_props(&a), Some(NativeComponentKind::Pcb));
        assert_eq!(
            a.get_path("GeometryDefinitionParameters::VariableOrders"),
            Some(&PropValue::Dict(PropertyDictionary::new()))
        );
    }

    #[test]
    fn edit_command_carries_definition_blocks() {
        let props = component_envelope("Board", PropertyDictionary::new().with("Type", "PCB"));
        let command = NativeComponentKind::Pcb.edit_command("Board1", &props);
        assert_eq!(command.method, "EditNativeComponentDefinition");
        let block = command.args[0].as_array().unwrap();
        assert_eq!(command.args[0].block_name(), Some("EditNativeComponentDefinitionData"));
        let (_, data) = crate::aedt::props::from_arg_list(block).unwrap();
        assert_eq!(data.get("DefinitionName"), Some(&PropValue::from("Board")));
        assert!(data.contains_key(PROVIDER));
        assert!(!data.contains_key("TargetCS"));
    }

    #[test]
    fn delete_command_selects_instance() {
        let command = NativeComponentKind::Fan.delete_command("Fan1");
        assert_eq!(command.method, "Delete");
        assert_eq!(
            command.args[0],
            crate::aedt::props::Arg::Array(vec![
                "NAME:Selections".into(),
                "Selections:=".into(),
                "Fan1".into(),
            ])
        );
    }
}
