//! Fan native component.

use crate::aedt::design::DesignSettings;
use crate::aedt::error::ValidationError;
use crate::aedt::props::{decompose_value, normalize_scalar, Assignment, PropValue, PropertyDictionary};

use super::component_envelope;

/// Fan model dimensionality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FanModel {
    /// Planar fan (a flow surface).
    TwoD,
    /// Volumetric fan with a hub.
    #[default]
    ThreeD,
}

impl FanModel {
    const fn as_str(self) -> &'static str {
        match self {
            Self::TwoD => "2D",
            Self::ThreeD => "3D",
        }
    }
}

/// Fan cross-section shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FanShape {
    /// Circular cross-section.
    #[default]
    Circular,
    /// Rectangular cross-section.
    Rectangular,
}

impl FanShape {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Circular => "Circular",
            Self::Rectangular => "Rectangular",
        }
    }
}

/// Plane of the fan cross-section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MovePlane {
    /// XY plane.
    #[default]
    XY,
    /// YZ plane.
    YZ,
    /// XZ plane.
    XZ,
}

impl MovePlane {
    const fn as_str(self) -> &'static str {
        match self {
            Self::XY => "XY",
            Self::YZ => "YZ",
            Self::XZ => "XZ",
        }
    }
}

/// Pressure rise over volumetric flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FanCurve {
    /// Unit of the flow values.
    pub flow_unit: String,
    /// Unit of the pressure values.
    pub pressure_unit: String,
    /// Flow values.
    pub flow: Vec<f64>,
    /// Pressure values, one per flow value.
    pub pressure: Vec<f64>,
}

impl FanCurve {
    /// A curve in `m3_per_s` and `n_per_meter_sq`.
    #[must_use]
    pub fn new(flow: Vec<f64>, pressure: Vec<f64>) -> Self {
        Self {
            flow_unit: "m3_per_s".to_string(),
            pressure_unit: "n_per_meter_sq".to_string(),
            flow,
            pressure,
        }
    }

    fn to_props(&self) -> Result<PropertyDictionary, ValidationError> {
        if self.flow.len() != self.pressure.len() {
            return Err(ValidationError::invalid_argument(
                "FanCurve",
                format!(
                    "{} flow values but {} pressure values",
                    self.flow.len(),
                    self.pressure.len()
                ),
            ));
        }
        if self.flow.len() < 2 {
            return Err(ValidationError::invalid_argument(
                "FanCurve",
                "at least two points are required",
            ));
        }
        Ok(PropertyDictionary::new()
            .with(
                "DimUnits",
                vec![self.flow_unit.as_str(), self.pressure_unit.as_str()],
            )
            .with("X", self.flow.clone())
            .with("Y", self.pressure.clone()))
    }
}

/// A fan component.
#[derive(Debug, Clone, PartialEq)]
pub struct FanDefinition {
    /// Model dimensionality.
    pub model: FanModel,
    /// Cross-section shape.
    pub shape: FanShape,
    /// Cross-section plane.
    pub plane: MovePlane,
    /// Center of the cross-section, in the design's length unit.
    pub center: [f64; 3],
    /// Outer radius.
    pub radius: Assignment,
    /// Hub radius; must be smaller than the radius.
    pub hub_radius: Assignment,
    /// Number of blades.
    pub blades: u32,
    /// Fan curve.
    pub curve: FanCurve,
}

impl FanDefinition {
    /// A 3D circular fan in the XY plane.
    pub fn new(
        radius: impl Into<Assignment>,
        hub_radius: impl Into<Assignment>,
        curve: FanCurve,
    ) -> Self {
        Self {
            model: FanModel::default(),
            shape: FanShape::default(),
            plane: MovePlane::default(),
            center: [0.0; 3],
            radius: radius.into(),
            hub_radius: hub_radius.into(),
            blades: 3,
            curve,
        }
    }

    /// Builds the complete component dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] for a hub radius not
    /// smaller than the radius, zero blades or an inconsistent fan curve.
    pub fn to_props(
        &self,
        definition_name: &str,
        settings: &DesignSettings,
    ) -> Result<PropertyDictionary, ValidationError> {
        let unit = settings.units.length.as_str();
        let radius = length_literal("Radius", &self.radius, unit)?;
        let hub_radius = length_literal("HubRadius", &self.hub_radius, unit)?;
        if let (Some((r, r_unit)), Some((h, h_unit))) =
            (decompose_value(&radius), decompose_value(&hub_radius))
        {
            if r_unit == h_unit && h >= r {
                return Err(ValidationError::invalid_argument(
                    "HubRadius",
                    format!("hub radius {hub_radius} must be smaller than radius {radius}"),
                ));
            }
        }
        if self.blades == 0 {
            return Err(ValidationError::invalid_argument("NumBlades", "must be at least 1"));
        }

        let [x, y, z] = self.center;
        let provider = PropertyDictionary::new()
            .with("Type", "Fan")
            .with("Unit", unit)
            .with("ModelAs", self.model.as_str())
            .with("Shape", self.shape.as_str())
            .with("MovePlane", self.plane.as_str())
            .with("Center", format!("{x}{unit},{y}{unit},{z}{unit}"))
            .with("Radius", radius)
            .with("HubRadius", hub_radius)
            .with("CaseSide", true)
            .with("NumBlades", self.blades)
            .with("FanCurve", self.curve.to_props()?);

        Ok(component_envelope(definition_name, provider))
    }
}

fn length_literal(key: &str, value: &Assignment, unit: &str) -> Result<String, ValidationError> {
    match value {
        Assignment::Variation(_) => Err(ValidationError::unsupported(
            key,
            "fan dimensions must be constants",
        )),
        Assignment::Literal(s) => Ok(s.clone()),
        Assignment::Number(n) => Ok(normalize_scalar(&PropValue::Number(*n), unit)),
    }
}
