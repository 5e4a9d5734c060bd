//! The thermal design: owner of the engine session and the object registries.
//!
//! Boundary and native component names are unique within their namespace.
//! A duplicate name is rejected locally, before anything reaches the engine.
//! Names left out by the caller are generated as `<prefix>_<6 hex>`.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::boundary::{
    BoundaryDefinition, BoundaryObject, BoundaryType, ConductingPlate, Geometry, HollowBlock,
    HollowCondition, Opening, OpeningFlow, PlateSpecification, SolidBlock, Source,
    SourceCondition, StationaryWall, WallCondition,
};
use super::error::{AedtResult, ValidationError};
use super::generate_unique_name;
use super::native::{
    FanDefinition, NativeComponentKind, NativeComponentObject, PcbDefinition,
    SUBMODEL_DEFINITION_NAME,
};
use super::props::{
    merge_defaults, validate_variations, Assignment, PropValue, PropertyDictionary, SolutionMode,
};
use super::remote::{Registry, RemoteHandle};
use super::session::EngineSession;

/// Default units appended to bare numbers, per quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Units {
    /// Power.
    pub power: String,
    /// Temperature.
    pub temperature: String,
    /// Heat flux and surface heat.
    pub heat_flux: String,
    /// Heat transfer coefficient.
    pub htc: String,
    /// Length and thickness.
    pub length: String,
    /// Pressure.
    pub pressure: String,
    /// Velocity.
    pub velocity: String,
    /// Plate conductance.
    pub conductance: String,
    /// Plate thermal resistance.
    pub thermal_resistance: String,
    /// Plate thermal impedance.
    pub thermal_impedance: String,
    /// Electrical current.
    pub current: String,
    /// Electrical voltage.
    pub voltage: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            power: "W".to_string(),
            temperature: "cel".to_string(),
            heat_flux: "irrad_W_per_m2".to_string(),
            htc: "w_per_m2kel".to_string(),
            length: "mm".to_string(),
            pressure: "n_per_meter_sq".to_string(),
            velocity: "m_per_sec".to_string(),
            conductance: "W_per_Cel".to_string(),
            thermal_resistance: "Kel_per_W".to_string(),
            thermal_impedance: "celm2_per_W".to_string(),
            current: "A".to_string(),
            voltage: "V".to_string(),
        }
    }
}

impl Units {
    /// Names and values of every unit, in declaration order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &str); 12] {
        [
            ("power", self.power.as_str()),
            ("temperature", self.temperature.as_str()),
            ("heat_flux", self.heat_flux.as_str()),
            ("htc", self.htc.as_str()),
            ("length", self.length.as_str()),
            ("pressure", self.pressure.as_str()),
            ("velocity", self.velocity.as_str()),
            ("conductance", self.conductance.as_str()),
            ("thermal_resistance", self.thermal_resistance.as_str()),
            ("thermal_impedance", self.thermal_impedance.as_str()),
            ("current", self.current.as_str()),
            ("voltage", self.voltage.as_str()),
        ]
    }
}

/// Design-wide settings that affect value normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DesignSettings {
    /// Design name.
    pub name: String,
    /// Solution mode.
    pub solution_mode: SolutionMode,
    /// Default units.
    pub units: Units,
}

impl Default for DesignSettings {
    fn default() -> Self {
        Self {
            name: "IcepakDesign1".to_string(),
            solution_mode: SolutionMode::default(),
            units: Units::default(),
        }
    }
}

/// A thermal design bound to an engine session.
///
/// Objects created through the design are tracked in its registries until
/// they are deleted.
#[derive(Debug)]
pub struct ThermalDesign {
    session: EngineSession,
    settings: DesignSettings,
    boundaries: Registry<BoundaryType>,
    native_components: Registry<NativeComponentKind>,
}

impl ThermalDesign {
    /// Creates an empty design.
    #[must_use]
    pub fn new(session: EngineSession, settings: DesignSettings) -> Self {
        Self {
            session,
            settings,
            boundaries: Rc::new(RefCell::new(IndexMap::new())),
            native_components: Rc::new(RefCell::new(IndexMap::new())),
        }
    }

    /// The engine session.
    #[must_use]
    pub const fn session(&self) -> &EngineSession {
        &self.session
    }

    /// Design settings.
    #[must_use]
    pub const fn settings(&self) -> &DesignSettings {
        &self.settings
    }

    /// Solution mode.
    #[must_use]
    pub const fn solution_mode(&self) -> SolutionMode {
        self.settings.solution_mode
    }

    /// Changes the solution mode. Existing objects are not re-validated.
    pub fn set_solution_mode(&mut self, mode: SolutionMode) {
        tracing::info!(%mode, "solution mode changed");
        self.settings.solution_mode = mode;
    }

    /// Creates a boundary from a typed definition.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the definition is invalid or the name
    /// is taken (nothing is sent to the engine), or
    /// [`AedtError::CreationRejected`](super::AedtError::CreationRejected)
    /// if the engine refuses it.
    pub fn assign(
        &self,
        definition: impl Into<BoundaryDefinition>,
        name: Option<&str>,
    ) -> AedtResult<BoundaryObject> {
        let definition = definition.into();
        let props = definition.to_props(&self.settings)?;
        self.insert_boundary_props(definition.boundary_type(), name, props)
    }

    /// Assigns a solid block dissipating `power`.
    ///
    /// # Errors
    ///
    /// See [`Self::assign`].
    pub fn assign_solid_block(
        &self,
        objects: &[&str],
        power: impl Into<Assignment>,
        name: Option<&str>,
    ) -> AedtResult<BoundaryObject> {
        self.assign(SolidBlock::new(objects.iter().copied(), power), name)
    }

    /// Assigns a hollow block.
    ///
    /// `assignment_type` is one of `"Heat Transfer Coefficient"`,
    /// `"Heat Flux"`, `"Temperature"` or `"Total Power"`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] for an unknown
    /// assignment type; otherwise see [`Self::assign`].
    pub fn assign_hollow_block(
        &self,
        objects: &[&str],
        assignment_type: &str,
        value: impl Into<Assignment>,
        name: Option<&str>,
    ) -> AedtResult<BoundaryObject> {
        let condition: HollowCondition = assignment_type.parse()?;
        self.assign(HollowBlock::new(objects.iter().copied(), condition, value), name)
    }

    /// Assigns a source.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] for an unknown thermal
    /// condition; otherwise see [`Self::assign`].
    pub fn assign_source(
        &self,
        geometry: Geometry,
        thermal_condition: &str,
        value: impl Into<Assignment>,
        radiate: bool,
        name: Option<&str>,
    ) -> AedtResult<BoundaryObject> {
        let condition: SourceCondition = thermal_condition.parse()?;
        self.assign(
            Source::new(geometry, condition, value).radiate(radiate),
            name,
        )
    }

    /// Assigns a stationary wall.
    ///
    /// # Errors
    ///
    /// See [`Self::assign`].
    pub fn assign_stationary_wall(
        &self,
        geometry: Geometry,
        condition: WallCondition,
        thickness: impl Into<Assignment>,
        material: &str,
        name: Option<&str>,
    ) -> AedtResult<BoundaryObject> {
        self.assign(
            StationaryWall::new(geometry, condition).with_thickness(thickness, material),
            name,
        )
    }

    /// Assigns a conducting plate.
    ///
    /// # Errors
    ///
    /// See [`Self::assign`].
    pub fn assign_conducting_plate(
        &self,
        geometry: Geometry,
        specification: PlateSpecification,
        total_power: impl Into<Assignment>,
        name: Option<&str>,
    ) -> AedtResult<BoundaryObject> {
        self.assign(
            ConductingPlate::new(geometry, specification).with_power(total_power),
            name,
        )
    }

    /// Assigns an opening.
    ///
    /// # Errors
    ///
    /// See [`Self::assign`].
    pub fn assign_opening(
        &self,
        geometry: Geometry,
        flow: OpeningFlow,
        name: Option<&str>,
    ) -> AedtResult<BoundaryObject> {
        self.assign(Opening::new(geometry, flow), name)
    }

    /// Creates a boundary from a pre-built dictionary.
    ///
    /// Schema defaults are merged in and variation blocks are checked
    /// against the solution mode.
    ///
    /// # Errors
    ///
    /// See [`Self::assign`].
    pub fn insert_boundary_props(
        &self,
        kind: BoundaryType,
        name: Option<&str>,
        props: PropertyDictionary,
    ) -> AedtResult<BoundaryObject> {
        validate_variations(&props, self.settings.solution_mode)?;
        let name = {
            let registry = self.boundaries.borrow();
            resolve_name(name, kind.default_prefix(), &registry)?
        };
        let props = merge_defaults(&props, &kind.schema());
        let boundary =
            RemoteHandle::registered(
                kind,
                name,
                props,
                &self.session,
                &self.settings.units,
                &self.boundaries,
            );
        boundary.create()?;
        Ok(boundary)
    }

    /// Creates a PCB native component.
    ///
    /// `name` is the submodel definition name; the engine names the instance.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid definition or a taken name,
    /// or a creation error if the engine refuses it.
    pub fn create_pcb_component(
        &self,
        definition: &PcbDefinition,
        name: Option<&str>,
    ) -> AedtResult<NativeComponentObject> {
        let name = self.definition_name(name, NativeComponentKind::Pcb.default_prefix())?;
        let props = definition.to_props(&name, &self.settings)?;
        self.insert_native_props(NativeComponentKind::Pcb, props)
    }

    /// Creates a fan native component.
    ///
    /// # Errors
    ///
    /// See [`Self::create_pcb_component`].
    pub fn create_fan(
        &self,
        definition: &FanDefinition,
        name: Option<&str>,
    ) -> AedtResult<NativeComponentObject> {
        let name = self.definition_name(name, NativeComponentKind::Fan.default_prefix())?;
        let props = definition.to_props(&name, &self.settings)?;
        self.insert_native_props(NativeComponentKind::Fan, props)
    }

    /// Creates a native component from a complete dictionary.
    ///
    /// The dictionary must carry a `SubmodelDefinitionName`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] without a definition
    /// name, [`ValidationError::DuplicateName`] if the definition exists,
    /// or a creation error if the engine refuses it.
    pub fn insert_native_props(
        &self,
        kind: NativeComponentKind,
        props: PropertyDictionary,
    ) -> AedtResult<NativeComponentObject> {
        let Some(definition) = props
            .get(SUBMODEL_DEFINITION_NAME)
            .and_then(PropValue::as_str)
            .map(str::to_string)
        else {
            return Err(ValidationError::invalid_argument(
                SUBMODEL_DEFINITION_NAME,
                "native component has no definition name",
            )
            .into());
        };
        if self.definition_names().contains(&definition) {
            return Err(ValidationError::DuplicateName { name: definition }.into());
        }
        validate_variations(&props, self.settings.solution_mode)?;

        let component = RemoteHandle::registered(
            kind,
            definition,
            props,
            &self.session,
            &self.settings.units,
            &self.native_components,
        );
        component.create()?;
        Ok(component)
    }

    /// Live boundaries, in creation order.
    #[must_use]
    pub fn boundaries(&self) -> Vec<BoundaryObject> {
        self.boundaries.borrow().values().cloned().collect()
    }

    /// A live boundary by name.
    #[must_use]
    pub fn boundary(&self, name: &str) -> Option<BoundaryObject> {
        self.boundaries.borrow().get(name).cloned()
    }

    /// Live native components, in creation order.
    #[must_use]
    pub fn native_components(&self) -> Vec<NativeComponentObject> {
        self.native_components.borrow().values().cloned().collect()
    }

    /// A live native component by instance name.
    #[must_use]
    pub fn native_component(&self, name: &str) -> Option<NativeComponentObject> {
        self.native_components.borrow().get(name).cloned()
    }

    fn definition_names(&self) -> HashSet<String> {
        self.native_components
            .borrow()
            .values()
            .filter_map(|c| {
                c.local_props()
                    .get(SUBMODEL_DEFINITION_NAME)
                    .and_then(PropValue::as_str)
                    .map(str::to_string)
            })
            .collect()
    }

    fn definition_name(&self, requested: Option<&str>, prefix: &str) -> AedtResult<String> {
        let used = self.definition_names();
        match requested {
            Some(name) if used.contains(name) => Err(ValidationError::DuplicateName {
                name: name.to_string(),
            }
            .into()),
            Some(name) => Ok(name.to_string()),
            None => Ok(generate_unique_name(prefix, &used)),
        }
    }
}

fn resolve_name<V>(
    requested: Option<&str>,
    prefix: &str,
    registry: &IndexMap<String, V>,
) -> Result<String, ValidationError> {
    match requested {
        Some(name) if name.is_empty() => Err(ValidationError::invalid_argument(
            "name",
            "name must not be empty",
        )),
        Some(name) if registry.contains_key(name) => Err(ValidationError::DuplicateName {
            name: name.to_string(),
        }),
        Some(name) => Ok(name.to_string()),
        None => {
            let used: HashSet<String> = registry.keys().cloned().collect();
            Ok(generate_unique_name(prefix, &used))
        }
    }
}
