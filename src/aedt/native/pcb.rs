//! PCB native component: a thermal model of a linked board layout.

use crate::aedt::boundary::RadiationSide;
use crate::aedt::design::DesignSettings;
use crate::aedt::error::ValidationError;
use crate::aedt::props::{merge_defaults, Assignment, PropertyDictionary, Schema, SchemaDefault};

use super::component_envelope;

const PROVIDER_ENTRIES: &[(&str, SchemaDefault)] = &[
    ("Type", SchemaDefault::Str("PCB")),
    ("Unit", SchemaDefault::Str("mm")),
    ("MovePlane", SchemaDefault::Str("XY")),
    ("Use3DLayoutExtents", SchemaDefault::Bool(false)),
    ("ExtentsType", SchemaDefault::Str("Bounding Box")),
    ("CreateDevices", SchemaDefault::Bool(false)),
    ("CreateTopSolderballs", SchemaDefault::Bool(false)),
    ("CreateBottomSolderballs", SchemaDefault::Bool(false)),
    ("Resolution", SchemaDefault::Number(2.0)),
    ("PartsChoice", SchemaDefault::Number(0.0)),
];
const PROVIDER_SCHEMA: Schema = Schema::new(PROVIDER_ENTRIES);

/// Board outline used for the thermal model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extents {
    /// Bounding box of the layout.
    BoundingBox,
    /// A named outline polygon from the layout.
    Polygon(String),
}

/// Which layout parts are modelled as separate components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartsChoice {
    /// No parts; the board only.
    #[default]
    None,
    /// Device parts.
    Device,
    /// Package parts.
    Package,
}

impl PartsChoice {
    /// Engine code of the choice.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Device => 1,
            Self::Package => 2,
        }
    }
}

/// Solderball creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Solderballs {
    /// Create top solderballs.
    pub top: bool,
    /// Create bottom solderballs.
    pub bottom: bool,
}

/// Filter on imported parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartFilter {
    /// Skip parts lower than this height.
    pub height_threshold: Option<String>,
    /// Skip parts dissipating less than this power.
    pub power_threshold: Option<String>,
    /// Skip capacitors.
    pub exclude_capacitors: bool,
    /// Skip inductors.
    pub exclude_inductors: bool,
    /// Skip resistors.
    pub exclude_resistors: bool,
}

impl PartFilter {
    /// Builds the `Filters` block.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] for an empty threshold.
    pub fn to_props(&self) -> Result<PropertyDictionary, ValidationError> {
        let types = PropertyDictionary::new()
            .with("Capacitors", self.exclude_capacitors)
            .with("Inductors", self.exclude_inductors)
            .with("Resistors", self.exclude_resistors);
        let mut filters = PropertyDictionary::new().with("Type", types);
        for (key, threshold) in [
            ("Height", &self.height_threshold),
            ("Power", &self.power_threshold),
        ] {
            match threshold.as_deref() {
                Some("") => {
                    return Err(ValidationError::invalid_argument(
                        key,
                        "threshold must not be empty",
                    ))
                }
                Some(value) => {
                    filters.insert(
                        key,
                        PropertyDictionary::new()
                            .with("Enabled", true)
                            .with("Value", value),
                    );
                }
                None => {
                    filters.insert(key, PropertyDictionary::new().with("Enabled", false));
                }
            }
        }
        Ok(filters)
    }
}

/// A PCB component linked to a layout design.
#[derive(Debug, Clone, PartialEq)]
pub struct PcbDefinition {
    /// Project holding the layout. `"This Project*"` for the current one.
    pub project: String,
    /// Layout design name.
    pub design: String,
    /// Layout solution providing the power map, if any.
    pub solution: String,
    /// Length unit.
    pub unit: String,
    /// Mesh resolution, at least 1.
    pub resolution: u32,
    /// Board outline.
    pub extents: Extents,
    /// Dissipated power.
    pub power: Assignment,
    /// Low side radiation.
    pub low_side: RadiationSide,
    /// High side radiation.
    pub high_side: RadiationSide,
    /// Modelled parts.
    pub parts: PartsChoice,
    /// Filter on modelled parts.
    pub part_filter: Option<PartFilter>,
    /// Solderball creation.
    pub solderballs: Solderballs,
}

impl PcbDefinition {
    /// A board-only PCB component for `design` in `project`.
    pub fn new(project: impl Into<String>, design: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            design: design.into(),
            solution: String::new(),
            unit: "mm".to_string(),
            resolution: 2,
            extents: Extents::BoundingBox,
            power: Assignment::Number(0.0),
            low_side: RadiationSide::disabled(),
            high_side: RadiationSide::disabled(),
            parts: PartsChoice::None,
            part_filter: None,
            solderballs: Solderballs::default(),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.project.is_empty() {
            return Err(ValidationError::invalid_argument("Project", "must not be empty"));
        }
        if self.design.is_empty() {
            return Err(ValidationError::invalid_argument("Design", "must not be empty"));
        }
        if self.resolution == 0 {
            return Err(ValidationError::invalid_argument("Resolution", "must be at least 1"));
        }
        if self.part_filter.is_some() && self.parts == PartsChoice::None {
            return Err(ValidationError::invalid_argument(
                "Filters",
                "part filters need parts to be imported",
            ));
        }
        if let Extents::Polygon(name) = &self.extents {
            if name.is_empty() {
                return Err(ValidationError::invalid_argument(
                    "OutlinePolygon",
                    "polygon name must not be empty",
                ));
            }
        }
        Ok(())
    }

    /// Builds the complete component dictionary.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an invalid definition.
    pub fn to_props(
        &self,
        definition_name: &str,
        settings: &DesignSettings,
    ) -> Result<PropertyDictionary, ValidationError> {
        self.validate()?;

        let link = PropertyDictionary::new()
            .with("Project", self.project.as_str())
            .with("Product", "ElectronicsDesktop")
            .with("Design", self.design.as_str())
            .with("Soln", self.solution.as_str())
            .with("Params", PropertyDictionary::new())
            .with("ForceSyncMode", false);

        let mut provider = PropertyDictionary::new()
            .with("Type", "PCB")
            .with("Unit", self.unit.as_str())
            .with("DefnLink", link);
        match &self.extents {
            Extents::BoundingBox => {
                provider.insert("ExtentsType", "Bounding Box");
            }
            Extents::Polygon(name) => {
                provider.insert("ExtentsType", "Polygon");
                provider.insert("OutlinePolygon", name.as_str());
            }
        }
        provider.insert("CreateTopSolderballs", self.solderballs.top);
        provider.insert("CreateBottomSolderballs", self.solderballs.bottom);
        provider.insert("Resolution", self.resolution);
        provider.insert("LowSide", self.low_side.to_props(&settings.units.temperature)?);
        provider.insert("HighSide", self.high_side.to_props(&settings.units.temperature)?);
        provider.insert("PartsChoice", self.parts.code());
        if let Some(filter) = &self.part_filter {
            provider.insert("Filters", filter.to_props()?);
        }
        provider.insert("Power", power_literal(&self.power, &settings.units.power)?);

        let provider = merge_defaults(&provider, &PROVIDER_SCHEMA);
        Ok(component_envelope(definition_name, provider))
    }
}

/// Normalises a PCB power value. Bare numbers get `unit`.
pub(super) fn power_literal(power: &Assignment, unit: &str) -> Result<String, ValidationError> {
    match power {
        Assignment::Variation(_) => Err(ValidationError::unsupported(
            "Power",
            "PCB power must be a constant",
        )),
        _ if power.is_joule_heating() => Err(ValidationError::unsupported(
            "Power",
            "Joule heating is only valid as a block's total power",
        )),
        Assignment::Literal(s) => Ok(s.clone()),
        Assignment::Number(n) => Ok(format!("{n}{unit}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aedt::props::{PropValue, VariationDescriptor, JOULE_HEATING};

    #[test]
    fn provider_block_is_complete() {
        let pcb = PcbDefinition::new("This Project*", "Board");
        let props = pcb.to_props("Board_PCB", &DesignSettings::default()).unwrap();
        let provider = props
            .get("NativeComponentDefinitionProvider")
            .and_then(PropValue::as_dict)
            .unwrap();
        for key in PROVIDER_SCHEMA.keys() {
            assert!(provider.contains_key(key), "missing {key}");
        }
        assert_eq!(provider.get("Resolution"), Some(&PropValue::Number(2.0)));
        assert_eq!(provider.get_path("DefnLink::Design"), Some(&PropValue::from("Board")));
        assert_eq!(provider.get("Power"), Some(&PropValue::from("0W")));
        assert_eq!(
            props.get("SubmodelDefinitionName"),
            Some(&PropValue::from("Board_PCB"))
        );
    }

    #[test]
    fn polygon_extents() {
        let mut pcb = PcbDefinition::new("This Project*", "Board");
        pcb.extents = Extents::Polygon("poly_outline".into());
        let props = pcb.to_props("P", &DesignSettings::default()).unwrap();
        assert_eq!(
            props.get_path("NativeComponentDefinitionProvider::OutlinePolygon"),
            Some(&PropValue::from("poly_outline"))
        );
    }

    #[test]
    fn invalid_definitions() {
        let settings = DesignSettings::default();
        let mut pcb = PcbDefinition::new("This Project*", "Board");
        pcb.resolution = 0;
        assert!(pcb.to_props("P", &settings).is_err());

        let mut pcb = PcbDefinition::new("This Project*", "Board");
        pcb.part_filter = Some(PartFilter::default());
        assert!(pcb.to_props("P", &settings).is_err());
        pcb.parts = PartsChoice::Device;
        assert!(pcb.to_props("P", &settings).is_ok());

        assert!(PcbDefinition::new("", "Board").to_props("P", &settings).is_err());
    }

    #[test]
    fn power_literal_rules() {
        assert_eq!(power_literal(&Assignment::Number(1.5), "W").unwrap(), "1.5W");
        assert_eq!(power_literal(&Assignment::Number(2.0), "mW").unwrap(), "2mW");
        assert_eq!(power_literal(&"300mW".into(), "W").unwrap(), "300mW");
        assert!(power_literal(&JOULE_HEATING.into(), "W").is_err());
        let dataset = VariationDescriptor::temperature_dependent("ds");
        assert!(power_literal(&dataset.into(), "W").is_err());
    }

    #[test]
    fn part_filter_thresholds() {
        let filter = PartFilter {
            height_threshold: Some("0.5mm".into()),
            exclude_capacitors: true,
            ..PartFilter::default()
        };
        let props = filter.to_props().unwrap();
        assert_eq!(props.get_path("Height::Value"), Some(&PropValue::from("0.5mm")));
        assert_eq!(props.get_path("Power::Enabled"), Some(&PropValue::Bool(false)));
        assert_eq!(props.get_path("Type::Capacitors"), Some(&PropValue::Bool(true)));

        let empty = PartFilter {
            power_threshold: Some(String::new()),
            ..PartFilter::default()
        };
        assert!(empty.to_props().is_err());
    }
}
