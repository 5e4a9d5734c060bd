//! JSON configuration export and import.
//!
//! A configuration file captures the boundaries and native components of a
//! design so they can be re-created in another design:
//!
//! ```json
//! {
//!   "general": {"design_name": "...", "solution_mode": "SteadyState", ...},
//!   "objects": ["Box1", "Chip"],
//!   "boundaries": {"Block_1": {"BoundType": "Block", "Objects": ["Box1"], ...}},
//!   "native components": {"Board1": {"SubmodelDefinitionName": "Board", ...}}
//! }
//! ```
//!
//! Import is best effort: each object that fails is reported and the rest
//! are still created.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aedt::boundary::BoundaryType;
use crate::aedt::design::ThermalDesign;
use crate::aedt::error::{AedtError, AedtResult, ValidationError};
use crate::aedt::native::NativeComponentKind;
use crate::aedt::props::{PropValue, PropertyDictionary, SolutionMode};

/// Key holding a boundary's type inside its exported dictionary.
const BOUND_TYPE: &str = "BoundType";

/// Design-level information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralSection {
    /// Name of the exporting design.
    pub design_name: String,
    /// Solution mode of the exporting design.
    pub solution_mode: SolutionMode,
    /// Export time, RFC 3339.
    #[serde(default)]
    pub exported_at: Option<String>,
    /// Tool that wrote the file.
    #[serde(default)]
    pub generator: Option<String>,
}

/// A complete configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationFile {
    /// Design-level information.
    pub general: GeneralSection,
    /// Geometry objects the configuration refers to.
    #[serde(default)]
    pub objects: Vec<String>,
    /// Boundaries by name, each with a `BoundType` entry.
    #[serde(default)]
    pub boundaries: IndexMap<String, PropertyDictionary>,
    /// Native components by instance name.
    #[serde(default, rename = "native components")]
    pub native_components: IndexMap<String, PropertyDictionary>,
}

/// An object that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Object name in the configuration.
    pub name: String,
    /// Why it failed.
    pub reason: String,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Names of the created boundaries.
    pub boundaries: Vec<String>,
    /// Instance names of the created native components.
    pub native_components: Vec<String>,
    /// Objects referenced by the configuration but missing in the design.
    pub missing_objects: Vec<String>,
    /// Objects that could not be created.
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    /// Returns true if every object was created.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Captures the live objects of a design.
///
/// # Errors
///
/// Returns an error if an object's properties cannot be read back.
pub fn export_configuration(design: &ThermalDesign) -> AedtResult<ConfigurationFile> {
    let mut boundaries = IndexMap::new();
    for boundary in design.boundaries() {
        let mut props = PropertyDictionary::new().with(BOUND_TYPE, boundary.kind().as_str());
        props.extend(boundary.props()?);
        boundaries.insert(boundary.name(), props);
    }

    let mut native_components = IndexMap::new();
    for component in design.native_components() {
        native_components.insert(component.name(), component.props()?);
    }

    tracing::info!(
        boundaries = boundaries.len(),
        native_components = native_components.len(),
        "exported configuration"
    );
    Ok(ConfigurationFile {
        general: GeneralSection {
            design_name: design.settings().name.clone(),
            solution_mode: design.solution_mode(),
            exported_at: Some(chrono::Local::now().to_rfc3339()),
            generator: Some(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )),
        },
        objects: design.session().object_names(),
        boundaries,
        native_components,
    })
}

/// Re-creates the objects of a configuration in `design`.
///
/// Failures are collected in the summary rather than returned.
pub fn import_configuration(design: &ThermalDesign, config: &ConfigurationFile) -> ImportSummary {
    let mut summary = ImportSummary::default();

    if config.general.solution_mode != design.solution_mode() {
        tracing::warn!(
            exported = %config.general.solution_mode,
            design = %design.solution_mode(),
            "configuration was exported from a design with another solution mode"
        );
    }

    let available: HashSet<String> = design.session().object_names().into_iter().collect();
    if !available.is_empty() {
        summary.missing_objects = config
            .objects
            .iter()
            .filter(|o| !available.contains(*o))
            .cloned()
            .collect();
        for object in &summary.missing_objects {
            tracing::warn!(object, "configuration object not in design");
        }
    }

    for (name, props) in &config.boundaries {
        match import_boundary(design, name, props) {
            Ok(created) => summary.boundaries.push(created),
            Err(e) => {
                tracing::warn!(name, error = %e, "boundary not imported");
                summary.failures.push(ImportFailure {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    for (name, props) in &config.native_components {
        match import_native_component(design, props) {
            Ok(created) => summary.native_components.push(created),
            Err(e) => {
                tracing::warn!(name, error = %e, "native component not imported");
                summary.failures.push(ImportFailure {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        boundaries = summary.boundaries.len(),
        native_components = summary.native_components.len(),
        failures = summary.failures.len(),
        "imported configuration"
    );
    summary
}

fn import_boundary(
    design: &ThermalDesign,
    name: &str,
    props: &PropertyDictionary,
) -> AedtResult<String> {
    let mut props = props.clone();
    let kind = match props.remove(BOUND_TYPE) {
        Some(PropValue::Str(bound_type)) => BoundaryType::from_bound_type(&bound_type)
            .ok_or_else(|| {
                ValidationError::invalid_argument(
                    BOUND_TYPE,
                    format!("unsupported boundary type '{bound_type}'"),
                )
            })?,
        _ => {
            return Err(
                ValidationError::invalid_argument(BOUND_TYPE, "missing boundary type").into(),
            )
        }
    };
    let boundary = design.insert_boundary_props(kind, Some(name), props)?;
    Ok(boundary.name())
}

fn import_native_component(
    design: &ThermalDesign,
    props: &PropertyDictionary,
) -> AedtResult<String> {
    let kind = NativeComponentKind::of_props(props).ok_or_else(|| {
        ValidationError::invalid_argument("NativeComponentDefinitionProvider", "missing provider type")
    })?;
    let component = design.insert_native_props(kind, props.clone())?;
    Ok(component.name())
}

/// Reads a configuration file.
///
/// # Errors
///
/// Returns [`AedtError::FileRead`] or [`AedtError::Json`].
pub fn read_configuration(path: &Path) -> AedtResult<ConfigurationFile> {
    let content = std::fs::read_to_string(path).map_err(|e| AedtError::file_read(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes a configuration file as pretty JSON.
///
/// # Errors
///
/// Returns [`AedtError::FileWrite`] or [`AedtError::Json`].
pub fn write_configuration(path: &Path, config: &ConfigurationFile) -> AedtResult<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| AedtError::file_write(path, e))
}
