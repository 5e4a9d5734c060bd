//! Value normalisation and schema defaulting.
//!
//! Callers hand in heterogeneous values (bare numbers, strings with units,
//! variation descriptors). This module turns each of them into the literal
//! form the engine expects, and fills in the per-type defaults so the engine
//! always receives a complete argument list.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{PropValue, PropertyDictionary};
use crate::aedt::error::ValidationError;

/// Literal accepted as a total power value on blocks.
pub const JOULE_HEATING: &str = "Joule Heating";

/// Solution mode of the owning design.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionMode {
    /// Steady-state solve. Transient variations are rejected.
    #[default]
    SteadyState,
    /// Transient solve.
    Transient,
}

impl SolutionMode {
    /// Engine name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SteadyState => "SteadyState",
            Self::Transient => "Transient",
        }
    }
}

impl fmt::Display for SolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a variation descriptor varies with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationKind {
    /// Varies with simulation time.
    Transient,
    /// Varies with local temperature.
    #[serde(rename = "Temp Dep")]
    TempDep,
}

impl VariationKind {
    /// Engine name of the variation type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transient => "Transient",
            Self::TempDep => "Temp Dep",
        }
    }

    /// Independent variable used in piecewise-linear expressions.
    const fn pwl_variable(self) -> &'static str {
        match self {
            Self::Transient => "Time",
            Self::TempDep => "Temp",
        }
    }
}

/// Function shape of a variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariationFunction {
    /// Dataset-driven piecewise-linear curve.
    #[serde(rename = "Piecewise Linear")]
    PiecewiseLinear,
    /// `a + b*x`.
    Linear,
    /// `a + b*x^c`.
    #[serde(rename = "Power Law")]
    PowerLaw,
    /// `a + b*exp(c*x)`.
    Exponential,
    /// Offset, amplitude, frequency, delay.
    Sinusoidal,
    /// On value, off value, start time, on time, period.
    #[serde(rename = "Square Wave")]
    SquareWave,
}

impl VariationFunction {
    /// All supported functions.
    pub const ALL: [Self; 6] = [
        Self::PiecewiseLinear,
        Self::Linear,
        Self::PowerLaw,
        Self::Exponential,
        Self::Sinusoidal,
        Self::SquareWave,
    ];

    /// Engine name of the function.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PiecewiseLinear => "Piecewise Linear",
            Self::Linear => "Linear",
            Self::PowerLaw => "Power Law",
            Self::Exponential => "Exponential",
            Self::Sinusoidal => "Sinusoidal",
            Self::SquareWave => "Square Wave",
        }
    }

    /// Number of values the function takes.
    #[must_use]
    pub const fn value_count(self) -> usize {
        match self {
            Self::PiecewiseLinear => 1,
            Self::Linear => 2,
            Self::PowerLaw | Self::Exponential => 3,
            Self::Sinusoidal => 4,
            Self::SquareWave => 5,
        }
    }
}

/// A transient or temperature-dependent assignment.
///
/// Mirrors the engine's `{"Type", "Function", "Values"}` descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationDescriptor {
    /// Variation type.
    #[serde(rename = "Type")]
    pub kind: VariationKind,
    /// Variation function.
    #[serde(rename = "Function")]
    pub function: VariationFunction,
    /// Function values. A dataset name for piecewise linear.
    #[serde(rename = "Values")]
    pub values: Vec<PropValue>,
}

impl VariationDescriptor {
    /// Creates a transient variation.
    pub fn transient<V: Into<PropValue>>(function: VariationFunction, values: Vec<V>) -> Self {
        Self {
            kind: VariationKind::Transient,
            function,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a piecewise-linear variation driven by `dataset`.
    pub fn piecewise_linear(kind: VariationKind, dataset: impl Into<String>) -> Self {
        Self {
            kind,
            function: VariationFunction::PiecewiseLinear,
            values: vec![PropValue::Str(dataset.into())],
        }
    }

    /// Creates a temperature-dependent variation driven by `dataset`.
    pub fn temperature_dependent(dataset: impl Into<String>) -> Self {
        Self::piecewise_linear(VariationKind::TempDep, dataset)
    }
}

/// A value assigned to an engine quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignment {
    /// Bare number; the default unit of the quantity is appended.
    Number(f64),
    /// Literal with units, a variable reference, or a keyword such as
    /// `"Joule Heating"`.
    Literal(String),
    /// Transient or temperature-dependent variation.
    Variation(VariationDescriptor),
}

impl Assignment {
    /// Returns true for the `"Joule Heating"` literal.
    #[must_use]
    pub fn is_joule_heating(&self) -> bool {
        matches!(self, Self::Literal(s) if s == JOULE_HEATING)
    }

    /// Returns true for variation descriptors.
    #[must_use]
    pub const fn is_variation(&self) -> bool {
        matches!(self, Self::Variation(_))
    }
}

impl From<&str> for Assignment {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for Assignment {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<f64> for Assignment {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<VariationDescriptor> for Assignment {
    fn from(value: VariationDescriptor) -> Self {
        Self::Variation(value)
    }
}

/// Normalises a scalar to the literal the engine expects.
///
/// Strings are returned unchanged (they already carry units or are variable
/// references). Numbers get `default_unit` appended. Ranges are never
/// checked here; out-of-range values are the engine's concern.
#[must_use]
pub fn normalize_scalar(value: &PropValue, default_unit: &str) -> String {
    match value {
        PropValue::Str(s) => s.clone(),
        PropValue::Number(n) => format!("{n}{default_unit}"),
        other => super::serializer::format_flat_value(other),
    }
}

/// Suffix of the block that carries a quantity's variation.
pub const VARIATION_SUFFIX: &str = " Variation Data";

/// Converts a variation descriptor into its `<quantity> Variation Data` block.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedConfiguration`] if:
/// - the descriptor is transient but the design is steady state
/// - the descriptor is temperature dependent with a function other than
///   piecewise linear
/// - the number of values does not match the function
pub fn normalize_transient(
    descriptor: &VariationDescriptor,
    quantity_name: &str,
    mode: SolutionMode,
) -> Result<PropertyDictionary, ValidationError> {
    if descriptor.kind == VariationKind::Transient && mode != SolutionMode::Transient {
        return Err(ValidationError::unsupported(
            quantity_name,
            "transient assignment requires a transient solution",
        ));
    }
    if descriptor.kind == VariationKind::TempDep
        && descriptor.function != VariationFunction::PiecewiseLinear
    {
        return Err(ValidationError::unsupported(
            quantity_name,
            format!(
                "temperature dependent assignment supports only piecewise linear, got {}",
                descriptor.function.as_str()
            ),
        ));
    }

    let expected = descriptor.function.value_count();
    if descriptor.values.len() != expected {
        return Err(ValidationError::unsupported(
            quantity_name,
            format!(
                "{} takes {expected} value(s), got {}",
                descriptor.function.as_str(),
                descriptor.values.len()
            ),
        ));
    }

    let values: Vec<PropValue> = if descriptor.function == VariationFunction::PiecewiseLinear {
        let Some(dataset) = descriptor.values[0].as_str() else {
            return Err(ValidationError::unsupported(
                quantity_name,
                "piecewise linear takes a dataset name",
            ));
        };
        let dataset = if dataset.starts_with('$') {
            dataset.to_string()
        } else {
            format!("${dataset}")
        };
        vec![
            PropValue::from("1"),
            PropValue::Str(format!(
                "pwl({dataset}, {})",
                descriptor.kind.pwl_variable()
            )),
        ]
    } else {
        descriptor
            .values
            .iter()
            .map(|v| PropValue::Str(normalize_scalar(v, "")))
            .collect()
    };

    let data = PropertyDictionary::new()
        .with("Variation Type", descriptor.kind.as_str())
        .with("Variation Function", descriptor.function.as_str())
        .with("Variation Value", PropValue::List(values));

    Ok(PropertyDictionary::new().with(format!("{quantity_name}{VARIATION_SUFFIX}"), data))
}

/// Writes `assignment` for `quantity` into `props`.
///
/// A variation descriptor writes only the `<quantity> Variation Data` block
/// and removes any literal under `quantity`; literals and numbers write the
/// normalised literal and remove any variation block.
///
/// # Errors
///
/// Propagates [`normalize_transient`] failures.
pub fn assign_quantity(
    props: &mut PropertyDictionary,
    quantity: &str,
    assignment: &Assignment,
    default_unit: &str,
    mode: SolutionMode,
) -> Result<(), ValidationError> {
    match assignment {
        Assignment::Variation(descriptor) => {
            let block = normalize_transient(descriptor, quantity, mode)?;
            props.remove(quantity);
            props.extend(block);
        }
        Assignment::Literal(s) => {
            props.remove(&format!("{quantity}{VARIATION_SUFFIX}"));
            props.insert(quantity, s.as_str());
        }
        Assignment::Number(n) => {
            props.remove(&format!("{quantity}{VARIATION_SUFFIX}"));
            props.insert(quantity, normalize_scalar(&PropValue::Number(*n), default_unit));
        }
    }
    Ok(())
}

/// Deep-merges `patch` into `props`, keeping each quantity on one branch.
///
/// A top-level `<quantity> Variation Data` block in the patch drops the
/// literal `<quantity>`, and a literal drops the block, unless the patch
/// carries both.
pub fn merge_quantity_patch(props: &mut PropertyDictionary, patch: &PropertyDictionary) {
    for key in patch.keys() {
        let counterpart = match key.strip_suffix(VARIATION_SUFFIX) {
            Some(quantity) => quantity.to_string(),
            None => format!("{key}{VARIATION_SUFFIX}"),
        };
        if !patch.contains_key(&counterpart) {
            props.remove(&counterpart);
        }
    }
    props.merge_patch(patch);
}

/// Checks every `<quantity> Variation Data` block of a pre-built dictionary.
///
/// Used for dictionaries that did not go through [`normalize_transient`],
/// such as imported configurations.
///
/// # Errors
///
/// Same conditions as [`normalize_transient`] for type and function; value
/// payloads are not re-checked.
pub fn validate_variations(
    props: &PropertyDictionary,
    mode: SolutionMode,
) -> Result<(), ValidationError> {
    for (key, value) in props {
        let Some(child) = value.as_dict() else {
            continue;
        };
        if let Some(quantity) = key.strip_suffix(VARIATION_SUFFIX) {
            let kind = child.get("Variation Type").and_then(PropValue::as_str);
            let function = child.get("Variation Function").and_then(PropValue::as_str);
            if kind == Some(VariationKind::Transient.as_str()) && mode != SolutionMode::Transient {
                return Err(ValidationError::unsupported(
                    quantity,
                    "transient assignment requires a transient solution",
                ));
            }
            if kind == Some(VariationKind::TempDep.as_str())
                && function != Some(VariationFunction::PiecewiseLinear.as_str())
            {
                return Err(ValidationError::unsupported(
                    quantity,
                    "temperature dependent assignment supports only piecewise linear",
                ));
            }
        } else {
            validate_variations(child, mode)?;
        }
    }
    Ok(())
}

/// Default value of a schema entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaDefault {
    /// String default.
    Str(&'static str),
    /// Flag default.
    Bool(bool),
    /// Number default.
    Number(f64),
}

impl From<SchemaDefault> for PropValue {
    fn from(value: SchemaDefault) -> Self {
        match value {
            SchemaDefault::Str(s) => Self::Str(s.to_string()),
            SchemaDefault::Bool(b) => Self::Bool(b),
            SchemaDefault::Number(n) => Self::Number(n),
        }
    }
}

/// Static defaults for one object type.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    entries: &'static [(&'static str, SchemaDefault)],
}

impl Schema {
    /// Creates a schema from static entries.
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, SchemaDefault)]) -> Self {
        Self { entries }
    }

    /// Schema entries in order.
    #[must_use]
    pub const fn entries(&self) -> &'static [(&'static str, SchemaDefault)] {
        self.entries
    }

    /// Schema keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(k, _)| *k)
    }
}

/// Fills every schema key missing from `props` with its default.
///
/// Existing keys keep their values and positions; missing ones are appended
/// in schema order. Applying it twice yields the same dictionary.
#[must_use]
pub fn merge_defaults(props: &PropertyDictionary, schema: &Schema) -> PropertyDictionary {
    let mut merged = props.clone();
    for (key, default) in schema.entries() {
        if !merged.contains_key(key) {
            merged.insert(*key, *default);
        }
    }
    merged
}

fn value_regex() -> &'static Regex {
    static VALUE_RE: OnceLock<Regex> = OnceLock::new();
    VALUE_RE.get_or_init(|| {
        Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*([A-Za-z_][A-Za-z0-9_]*)?\s*$")
            .unwrap_or_else(|e| unreachable!("value pattern is valid: {e}"))
    })
}

/// Splits a literal such as `"0.5mW"` into its number and unit.
///
/// The unit is empty when the literal is a bare number. Returns `None` for
/// anything that is not a plain number with an optional unit (variable
/// references, expressions, keywords).
#[must_use]
pub fn decompose_value(text: &str) -> Option<(f64, String)> {
    let captures = value_regex().captures(text)?;
    let value: f64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Some((value, unit))
}
