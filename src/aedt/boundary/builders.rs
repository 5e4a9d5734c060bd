//! Typed boundary definitions.
//!
//! Each definition validates its caller values and builds the complete
//! property dictionary for one boundary type. Defaults for everything the
//! caller leaves out come from [`BoundaryType::schema`].

use std::fmt;
use std::str::FromStr;

use crate::aedt::design::DesignSettings;
use crate::aedt::error::ValidationError;
use crate::aedt::props::{
    assign_quantity, merge_defaults, Assignment, PropValue, PropertyDictionary,
};

use super::BoundaryType;

/// Default surface material for radiating sides.
pub const DEFAULT_SURFACE_MATERIAL: &str = "Steel-oxidised-surface";

/// Default solid material for walls and plates.
pub const DEFAULT_SOLID_MATERIAL: &str = "Al-Extruded";

/// Geometry a boundary is assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    /// Whole objects, by name.
    Objects(Vec<String>),
    /// Individual faces, by id.
    Faces(Vec<u32>),
}

impl Geometry {
    /// Object geometry from names.
    pub fn objects<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Objects(names.into_iter().map(Into::into).collect())
    }

    /// Face geometry from ids.
    pub fn faces(ids: impl IntoIterator<Item = u32>) -> Self {
        Self::Faces(ids.into_iter().collect())
    }

    fn write(&self, props: &mut PropertyDictionary) -> Result<(), ValidationError> {
        match self {
            Self::Objects(names) if names.is_empty() => Err(ValidationError::invalid_argument(
                "Objects",
                "at least one object is required",
            )),
            Self::Faces(ids) if ids.is_empty() => Err(ValidationError::invalid_argument(
                "Faces",
                "at least one face is required",
            )),
            Self::Objects(names) => {
                props.insert("Objects", names.clone());
                Ok(())
            }
            Self::Faces(ids) => {
                props.insert(
                    "Faces",
                    ids.iter().map(|id| f64::from(*id)).collect::<Vec<_>>(),
                );
                Ok(())
            }
        }
    }
}

fn reject_joule_heating(quantity: &str, value: &Assignment) -> Result<(), ValidationError> {
    if value.is_joule_heating() {
        return Err(ValidationError::unsupported(
            quantity,
            "Joule heating is only valid as a block's total power",
        ));
    }
    Ok(())
}

/// Where a radiating side exchanges heat.
#[derive(Debug, Clone, PartialEq)]
pub enum RadiationTarget {
    /// All visible objects.
    AllObjects,
    /// A fixed reference temperature.
    ReferenceTemperature {
        /// Reference temperature.
        temperature: Assignment,
        /// View factor, between 0 and 1.
        view_factor: f64,
    },
}

/// Radiation settings for one side of a plate or PCB.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiationSide {
    /// Whether the side radiates at all.
    pub enabled: bool,
    /// Surface material of the side.
    pub surface_material: String,
    /// Radiation target.
    pub target: RadiationTarget,
}

impl Default for RadiationSide {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RadiationSide {
    /// A side that does not radiate.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            surface_material: DEFAULT_SURFACE_MATERIAL.to_string(),
            target: RadiationTarget::AllObjects,
        }
    }

    /// A side radiating to all objects.
    #[must_use]
    pub fn to_all_objects() -> Self {
        Self {
            enabled: true,
            ..Self::disabled()
        }
    }

    /// A side radiating to a reference temperature.
    pub fn to_reference(temperature: impl Into<Assignment>, view_factor: f64) -> Self {
        Self {
            enabled: true,
            surface_material: DEFAULT_SURFACE_MATERIAL.to_string(),
            target: RadiationTarget::ReferenceTemperature {
                temperature: temperature.into(),
                view_factor,
            },
        }
    }

    /// Sets the surface material.
    #[must_use]
    pub fn with_surface_material(mut self, material: impl Into<String>) -> Self {
        self.surface_material = material.into();
        self
    }

    /// Builds the `LowSide` / `HighSide` block.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] for a view factor
    /// outside `0..=1` and [`ValidationError::UnsupportedConfiguration`]
    /// for a variation as reference temperature.
    pub fn to_props(&self, temperature_unit: &str) -> Result<PropertyDictionary, ValidationError> {
        let mut side = PropertyDictionary::new().with("Radiate", self.enabled);
        if !self.enabled {
            return Ok(side);
        }

        match &self.target {
            RadiationTarget::AllObjects => {
                side.insert("RadiateTo", "AllObjects");
                side.insert("Surface Material", self.surface_material.as_str());
            }
            RadiationTarget::ReferenceTemperature {
                temperature,
                view_factor,
            } => {
                if !(0.0..=1.0).contains(view_factor) {
                    return Err(ValidationError::invalid_argument(
                        "View Factor",
                        format!("must be between 0 and 1, got {view_factor}"),
                    ));
                }
                let temperature = match temperature {
                    Assignment::Variation(_) => {
                        return Err(ValidationError::unsupported(
                            "Ref. Temperature",
                            "reference temperature must be a constant",
                        ))
                    }
                    Assignment::Literal(s) => s.clone(),
                    Assignment::Number(n) => format!("{n}{temperature_unit}"),
                };
                side.insert("RadiateTo", "RefTemperature");
                side.insert("Surface Material", self.surface_material.as_str());
                side.insert("Ref. Temperature", temperature);
                side.insert("View Factor", *view_factor);
            }
        }
        Ok(side)
    }
}

/// Solid block dissipating a total power.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidBlock {
    /// Block objects.
    pub objects: Vec<String>,
    /// Total power. `"Joule Heating"` is accepted.
    pub power: Assignment,
    /// Optional external conditions: heat transfer coefficient and
    /// external temperature.
    pub external: Option<(Assignment, Assignment)>,
}

impl SolidBlock {
    /// Creates a solid block.
    pub fn new<S: Into<String>>(
        objects: impl IntoIterator<Item = S>,
        power: impl Into<Assignment>,
    ) -> Self {
        Self {
            objects: objects.into_iter().map(Into::into).collect(),
            power: power.into(),
            external: None,
        }
    }

    /// Enables external conditions.
    #[must_use]
    pub fn with_external_conditions(
        mut self,
        htc: impl Into<Assignment>,
        temperature: impl Into<Assignment>,
    ) -> Self {
        self.external = Some((htc.into(), temperature.into()));
        self
    }

    fn build(&self, settings: &DesignSettings) -> Result<PropertyDictionary, ValidationError> {
        let units = &settings.units;
        let mode = settings.solution_mode;
        let mut props = PropertyDictionary::new();
        Geometry::Objects(self.objects.clone()).write(&mut props)?;
        props.insert("Block Type", "Solid");
        props.insert("Use External Conditions", self.external.is_some());
        assign_quantity(&mut props, "Total Power", &self.power, &units.power, mode)?;
        if let Some((htc, temperature)) = &self.external {
            assign_quantity(&mut props, "Heat Transfer Coefficient", htc, &units.htc, mode)?;
            assign_quantity(
                &mut props,
                "External Temperature",
                temperature,
                &units.temperature,
                mode,
            )?;
        }
        Ok(props)
    }
}

/// Thermal condition of a hollow block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HollowCondition {
    /// Convective exchange with an external temperature.
    HeatTransferCoefficient,
    /// Imposed heat flux.
    HeatFlux,
    /// Imposed temperature.
    Temperature,
    /// Imposed total power.
    TotalPower,
}

impl HollowCondition {
    /// Engine name of the condition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeatTransferCoefficient => "Heat Transfer Coefficient",
            Self::HeatFlux => "Heat Flux",
            Self::Temperature => "Temperature",
            Self::TotalPower => "Total Power",
        }
    }
}

impl fmt::Display for HollowCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HollowCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Heat Transfer Coefficient" => Ok(Self::HeatTransferCoefficient),
            "Heat Flux" => Ok(Self::HeatFlux),
            "Temperature" => Ok(Self::Temperature),
            "Total Power" => Ok(Self::TotalPower),
            other => Err(ValidationError::invalid_argument(
                "assignment_type",
                format!(
                    "expected 'Heat Transfer Coefficient', 'Heat Flux', 'Temperature' or 'Total Power', got '{other}'"
                ),
            )),
        }
    }
}

/// Hollow block with an imposed thermal condition.
#[derive(Debug, Clone, PartialEq)]
pub struct HollowBlock {
    /// Block objects.
    pub objects: Vec<String>,
    /// Imposed condition.
    pub condition: HollowCondition,
    /// Value of the condition.
    pub value: Assignment,
    /// External temperature, used with a heat transfer coefficient.
    pub external_temperature: Assignment,
}

impl HollowBlock {
    /// Creates a hollow block.
    pub fn new<S: Into<String>>(
        objects: impl IntoIterator<Item = S>,
        condition: HollowCondition,
        value: impl Into<Assignment>,
    ) -> Self {
        Self {
            objects: objects.into_iter().map(Into::into).collect(),
            condition,
            value: value.into(),
            external_temperature: Assignment::from("AmbientTemp"),
        }
    }

    /// Sets the external temperature.
    #[must_use]
    pub fn with_external_temperature(mut self, temperature: impl Into<Assignment>) -> Self {
        self.external_temperature = temperature.into();
        self
    }

    fn build(&self, settings: &DesignSettings) -> Result<PropertyDictionary, ValidationError> {
        if self.condition != HollowCondition::TotalPower {
            reject_joule_heating(self.condition.as_str(), &self.value)?;
        }

        let units = &settings.units;
        let mode = settings.solution_mode;
        let mut props = PropertyDictionary::new();
        Geometry::Objects(self.objects.clone()).write(&mut props)?;
        props.insert("Block Type", "Hollow");

        let (quantity, unit) = match self.condition {
            HollowCondition::HeatTransferCoefficient => {
                props.insert("Use External Conditions", true);
                assign_quantity(
                    &mut props,
                    "External Temperature",
                    &self.external_temperature,
                    &units.temperature,
                    mode,
                )?;
                ("Heat Transfer Coefficient", &units.htc)
            }
            HollowCondition::HeatFlux => ("Heat Flux", &units.heat_flux),
            HollowCondition::Temperature => ("Temperature", &units.temperature),
            HollowCondition::TotalPower => ("Total Power", &units.power),
        };
        if self.condition != HollowCondition::HeatTransferCoefficient {
            props.insert("Use External Conditions", false);
            props.insert("Thermal Condition", quantity);
        }
        assign_quantity(&mut props, quantity, &self.value, unit, mode)?;
        Ok(props)
    }
}

/// Thermal condition of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceCondition {
    /// Total dissipated power.
    TotalPower,
    /// Power per unit area.
    SurfaceHeat,
    /// Fixed temperature.
    Temperature,
}

impl SourceCondition {
    /// Engine name of the condition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalPower => "Total Power",
            Self::SurfaceHeat => "Surface Heat",
            Self::Temperature => "Temperature",
        }
    }
}

impl FromStr for SourceCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Total Power" => Ok(Self::TotalPower),
            "Surface Heat" => Ok(Self::SurfaceHeat),
            "Temperature" => Ok(Self::Temperature),
            other => Err(ValidationError::invalid_argument(
                "thermal_condition",
                format!("expected 'Total Power', 'Surface Heat' or 'Temperature', got '{other}'"),
            )),
        }
    }
}

/// Electrical excitation of a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Electrical {
    /// Imposed current.
    Current(Assignment),
    /// Imposed voltage.
    Voltage(Assignment),
}

/// Heat source on objects or faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// Source geometry.
    pub geometry: Geometry,
    /// Thermal condition.
    pub condition: SourceCondition,
    /// Value of the condition.
    pub value: Assignment,
    /// Whether the source radiates.
    pub radiate: bool,
    /// Optional electrical excitation.
    pub electrical: Option<Electrical>,
}

impl Source {
    /// Creates a non-radiating source.
    pub fn new(geometry: Geometry, condition: SourceCondition, value: impl Into<Assignment>) -> Self {
        Self {
            geometry,
            condition,
            value: value.into(),
            radiate: false,
            electrical: None,
        }
    }

    /// Enables or disables radiation.
    #[must_use]
    pub const fn radiate(mut self, radiate: bool) -> Self {
        self.radiate = radiate;
        self
    }

    /// Sets an electrical excitation.
    #[must_use]
    pub fn with_electrical(mut self, electrical: Electrical) -> Self {
        self.electrical = Some(electrical);
        self
    }

    fn build(&self, settings: &DesignSettings) -> Result<PropertyDictionary, ValidationError> {
        reject_joule_heating(self.condition.as_str(), &self.value)?;

        let units = &settings.units;
        let mode = settings.solution_mode;
        let mut props = PropertyDictionary::new();
        self.geometry.write(&mut props)?;
        props.insert("Thermal Condition", self.condition.as_str());
        let unit = match self.condition {
            SourceCondition::TotalPower => &units.power,
            SourceCondition::SurfaceHeat => &units.heat_flux,
            SourceCondition::Temperature => &units.temperature,
        };
        assign_quantity(&mut props, self.condition.as_str(), &self.value, unit, mode)?;
        props.insert("Radiation", self.radiate);

        match &self.electrical {
            None => {
                props.insert("Voltage/Current - Enabled", false);
            }
            Some(Electrical::Current(current)) => {
                props.insert("Voltage/Current - Enabled", true);
                props.insert("Voltage/Current Option", "Current");
                assign_quantity(&mut props, "Current", current, &units.current, mode)?;
            }
            Some(Electrical::Voltage(voltage)) => {
                props.insert("Voltage/Current - Enabled", true);
                props.insert("Voltage/Current Option", "Voltage");
                assign_quantity(&mut props, "Voltage", voltage, &units.voltage, mode)?;
            }
        }
        Ok(props)
    }
}

/// External condition of a stationary wall.
#[derive(Debug, Clone, PartialEq)]
pub enum WallCondition {
    /// Imposed heat flux.
    HeatFlux(Assignment),
    /// Imposed temperature.
    Temperature(Assignment),
    /// Convective exchange with an external temperature.
    HeatTransferCoefficient {
        /// Heat transfer coefficient.
        htc: Assignment,
        /// External temperature.
        temperature: Assignment,
    },
}

impl WallCondition {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::HeatFlux(_) => "Heat Flux",
            Self::Temperature(_) => "Temperature",
            Self::HeatTransferCoefficient { .. } => "Heat Transfer Coefficient",
        }
    }
}

/// Stationary wall on objects or faces.
#[derive(Debug, Clone, PartialEq)]
pub struct StationaryWall {
    /// Wall geometry.
    pub geometry: Geometry,
    /// Wall thickness.
    pub thickness: Assignment,
    /// Wall material.
    pub material: String,
    /// External condition.
    pub condition: WallCondition,
    /// Whether the wall radiates.
    pub radiate: bool,
    /// Whether conduction along the shell is modelled.
    pub shell_conduction: bool,
}

impl StationaryWall {
    /// Creates a zero-thickness, non-radiating wall.
    #[must_use]
    pub fn new(geometry: Geometry, condition: WallCondition) -> Self {
        Self {
            geometry,
            thickness: Assignment::Number(0.0),
            material: DEFAULT_SOLID_MATERIAL.to_string(),
            condition,
            radiate: false,
            shell_conduction: false,
        }
    }

    /// Sets thickness and material.
    #[must_use]
    pub fn with_thickness(mut self, thickness: impl Into<Assignment>, material: &str) -> Self {
        self.thickness = thickness.into();
        self.material = material.to_string();
        self
    }

    fn build(&self, settings: &DesignSettings) -> Result<PropertyDictionary, ValidationError> {
        let units = &settings.units;
        let mode = settings.solution_mode;
        let mut props = PropertyDictionary::new();
        self.geometry.write(&mut props)?;
        if self.thickness.is_variation() {
            return Err(ValidationError::unsupported(
                "Thickness",
                "wall thickness must be a constant",
            ));
        }
        assign_quantity(&mut props, "Thickness", &self.thickness, &units.length, mode)?;
        props.insert("Solid Material", self.material.as_str());
        props.insert("External Condition", self.condition.as_str());
        match &self.condition {
            WallCondition::HeatFlux(value) => {
                reject_joule_heating("Heat Flux", value)?;
                assign_quantity(&mut props, "Heat Flux", value, &units.heat_flux, mode)?;
            }
            WallCondition::Temperature(value) => {
                assign_quantity(&mut props, "Temperature", value, &units.temperature, mode)?;
            }
            WallCondition::HeatTransferCoefficient { htc, temperature } => {
                assign_quantity(&mut props, "Heat Transfer Coefficient", htc, &units.htc, mode)?;
                assign_quantity(
                    &mut props,
                    "External Temperature",
                    temperature,
                    &units.temperature,
                    mode,
                )?;
            }
        }
        props.insert("Radiate", self.radiate);
        props.insert("Shell Conduction", self.shell_conduction);
        Ok(props)
    }
}

/// How a conducting plate's conduction is specified.
#[derive(Debug, Clone, PartialEq)]
pub enum PlateSpecification {
    /// Physical thickness and material.
    Thickness {
        /// Plate thickness.
        thickness: Assignment,
        /// Plate material.
        material: String,
    },
    /// Conductance.
    Conductance(Assignment),
    /// Thermal resistance.
    ThermalResistance(Assignment),
    /// Thermal impedance.
    ThermalImpedance(Assignment),
}

impl PlateSpecification {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Thickness { .. } => "Thickness",
            Self::Conductance(_) => "Conductance",
            Self::ThermalResistance(_) => "Thermal Resistance",
            Self::ThermalImpedance(_) => "Thermal Impedance",
        }
    }
}

/// Conducting plate on objects or faces.
#[derive(Debug, Clone, PartialEq)]
pub struct ConductingPlate {
    /// Plate geometry.
    pub geometry: Geometry,
    /// Conduction specification.
    pub specification: PlateSpecification,
    /// Dissipated power.
    pub total_power: Assignment,
    /// Low side radiation.
    pub low_side: RadiationSide,
    /// High side radiation.
    pub high_side: RadiationSide,
    /// Whether conduction along the shell is modelled.
    pub shell_conduction: bool,
}

impl ConductingPlate {
    /// Creates a non-radiating plate dissipating no power.
    #[must_use]
    pub fn new(geometry: Geometry, specification: PlateSpecification) -> Self {
        Self {
            geometry,
            specification,
            total_power: Assignment::Number(0.0),
            low_side: RadiationSide::disabled(),
            high_side: RadiationSide::disabled(),
            shell_conduction: false,
        }
    }

    /// Sets the dissipated power.
    #[must_use]
    pub fn with_power(mut self, power: impl Into<Assignment>) -> Self {
        self.total_power = power.into();
        self
    }

    /// Sets both radiation sides.
    #[must_use]
    pub fn with_radiation(mut self, low_side: RadiationSide, high_side: RadiationSide) -> Self {
        self.low_side = low_side;
        self.high_side = high_side;
        self
    }

    fn build(&self, settings: &DesignSettings) -> Result<PropertyDictionary, ValidationError> {
        reject_joule_heating("Total Power", &self.total_power)?;

        let units = &settings.units;
        let mode = settings.solution_mode;
        let mut props = PropertyDictionary::new();
        self.geometry.write(&mut props)?;
        props.insert("Thermal Specification", self.specification.as_str());
        match &self.specification {
            PlateSpecification::Thickness {
                thickness,
                material,
            } => {
                assign_quantity(&mut props, "Thickness", thickness, &units.length, mode)?;
                props.insert("Solid Material", material.as_str());
            }
            PlateSpecification::Conductance(value) => {
                assign_quantity(&mut props, "Conductance", value, &units.conductance, mode)?;
            }
            PlateSpecification::ThermalResistance(value) => {
                assign_quantity(
                    &mut props,
                    "Thermal Resistance",
                    value,
                    &units.thermal_resistance,
                    mode,
                )?;
            }
            PlateSpecification::ThermalImpedance(value) => {
                assign_quantity(
                    &mut props,
                    "Thermal Impedance",
                    value,
                    &units.thermal_impedance,
                    mode,
                )?;
            }
        }
        assign_quantity(&mut props, "Total Power", &self.total_power, &units.power, mode)?;
        props.insert("LowSide", self.low_side.to_props(&units.temperature)?);
        props.insert("HighSide", self.high_side.to_props(&units.temperature)?);
        props.insert("Shell Conduction", self.shell_conduction);
        Ok(props)
    }
}

/// Flow specification of an opening.
#[derive(Debug, Clone, PartialEq)]
pub enum OpeningFlow {
    /// Free opening at ambient pressure.
    Free,
    /// Imposed total pressure.
    Pressure(Assignment),
    /// Imposed normal velocity.
    Velocity(Assignment),
}

/// Opening to the surroundings.
#[derive(Debug, Clone, PartialEq)]
pub struct Opening {
    /// Opening geometry.
    pub geometry: Geometry,
    /// Flow specification.
    pub flow: OpeningFlow,
    /// Temperature of incoming flow.
    pub temperature: Assignment,
    /// Whether reverse flow is blocked.
    pub no_reverse_flow: bool,
}

impl Opening {
    /// Creates an opening with ambient inflow temperature.
    #[must_use]
    pub fn new(geometry: Geometry, flow: OpeningFlow) -> Self {
        Self {
            geometry,
            flow,
            temperature: Assignment::from("AmbientTemp"),
            no_reverse_flow: false,
        }
    }

    /// Sets the inflow temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: impl Into<Assignment>) -> Self {
        self.temperature = temperature.into();
        self
    }

    fn build(&self, settings: &DesignSettings) -> Result<PropertyDictionary, ValidationError> {
        let units = &settings.units;
        let mode = settings.solution_mode;
        let mut props = PropertyDictionary::new();
        self.geometry.write(&mut props)?;
        assign_quantity(&mut props, "Temperature", &self.temperature, &units.temperature, mode)?;
        match &self.flow {
            OpeningFlow::Free => {
                props.insert("Inlet Type", "Pressure");
                props.insert("Total Pressure", "AmbientPressure");
            }
            OpeningFlow::Pressure(pressure) => {
                props.insert("Inlet Type", "Pressure");
                assign_quantity(&mut props, "Total Pressure", pressure, &units.pressure, mode)?;
            }
            OpeningFlow::Velocity(velocity) => {
                props.insert("Inlet Type", "Velocity");
                props.insert("Velocity Type", "Normal Velocity");
                assign_quantity(&mut props, "Normal Velocity", velocity, &units.velocity, mode)?;
            }
        }
        props.insert("No Reverse Flow", self.no_reverse_flow);
        Ok(props)
    }
}

/// Any typed boundary definition.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryDefinition {
    /// Solid block.
    SolidBlock(SolidBlock),
    /// Hollow block.
    HollowBlock(HollowBlock),
    /// Source.
    Source(Source),
    /// Stationary wall.
    StationaryWall(StationaryWall),
    /// Conducting plate.
    ConductingPlate(ConductingPlate),
    /// Opening.
    Opening(Opening),
}

impl BoundaryDefinition {
    /// Boundary type created by this definition.
    #[must_use]
    pub const fn boundary_type(&self) -> BoundaryType {
        match self {
            Self::SolidBlock(_) | Self::HollowBlock(_) => BoundaryType::Block,
            Self::Source(_) => BoundaryType::Source,
            Self::StationaryWall(_) => BoundaryType::StationaryWall,
            Self::ConductingPlate(_) => BoundaryType::ConductingPlate,
            Self::Opening(_) => BoundaryType::Opening,
        }
    }

    /// Builds the complete property dictionary, schema defaults included.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for values that cannot be used in a
    /// design with these settings. Nothing is sent to the engine.
    pub fn to_props(&self, settings: &DesignSettings) -> Result<PropertyDictionary, ValidationError> {
        let props = match self {
            Self::SolidBlock(b) => b.build(settings)?,
            Self::HollowBlock(b) => b.build(settings)?,
            Self::Source(s) => s.build(settings)?,
            Self::StationaryWall(w) => w.build(settings)?,
            Self::ConductingPlate(p) => p.build(settings)?,
            Self::Opening(o) => o.build(settings)?,
        };
        Ok(merge_defaults(&props, &self.boundary_type().schema()))
    }
}

macro_rules! impl_from_definition {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for BoundaryDefinition {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_definition!(
    SolidBlock,
    HollowBlock,
    Source,
    StationaryWall,
    ConductingPlate,
    Opening
);

/// Reads the `Total Power` literal of a block, if it has one.
#[must_use]
pub fn block_power(props: &PropertyDictionary) -> Option<&str> {
    props.get("Total Power").and_then(PropValue::as_str)
}
