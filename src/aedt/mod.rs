//! Thermal boundary and native component marshalling.
//!
//! This module holds the typed layer between caller-facing design APIs and
//! the automation engine:
//!
//! - [`props`]: ordered property dictionaries, value normalisation and the
//!   argument-list / flat read-back formats
//! - [`session`]: the [`Engine`] trait and the shared [`EngineSession`]
//! - [`remote`]: the `Unbound -> Bound -> Deleted` lifecycle shared by all
//!   engine objects
//! - [`boundary`]: thermal boundaries (blocks, sources, walls, plates,
//!   openings)
//! - [`native`]: native components (PCB, fan)
//! - [`design`]: [`ThermalDesign`], the registry that owns the objects
//! - [`io`]: power-map import and configuration export/import
//! - [`memory`]: [`InMemoryEngine`], the reference engine used for dry runs

pub mod boundary;
pub mod design;
pub mod error;
pub mod io;
pub mod memory;
pub mod native;
pub mod props;
pub mod remote;
pub mod session;

pub use boundary::{BoundaryDefinition, BoundaryObject, BoundaryType};
pub use design::{DesignSettings, ThermalDesign, Units};
pub use error::{AedtError, AedtResult, ValidationError};
pub use memory::{EngineCall, InMemoryEngine};
pub use native::{FanDefinition, NativeComponentKind, NativeComponentObject, PcbDefinition};
pub use props::{PropValue, PropertyDictionary};
pub use remote::{ObjectState, RemoteHandle, UpdateOutcome};
pub use session::{Engine, EngineSession, Reply, Target};

use std::collections::HashSet;
use std::hash::BuildHasher;

/// Number of hex characters in a generated name suffix.
const SUFFIX_LEN: usize = 6;

/// Generates a name of the form `<prefix>_<6 hex>` not present in `used`.
///
/// Falls back to a sequential suffix if random suffixes keep colliding.
#[must_use]
pub fn generate_unique_name<S: BuildHasher>(prefix: &str, used: &HashSet<String, S>) -> String {
    for _ in 0..1000 {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let candidate = format!("{prefix}_{}", &id[..SUFFIX_LEN].to_uppercase());
        if !used.contains(&candidate) {
            return candidate;
        }
    }

    // Only reachable when the namespace is nearly exhausted
    (1..)
        .map(|i| format!("{prefix}_{i}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| prefix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_name_has_prefix_and_hex_suffix() {
        let used = HashSet::new();
        let name = generate_unique_name("Block", &used);
        let (prefix, suffix) = name.split_once('_').unwrap();
        assert_eq!(prefix, "Block");
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn unique_name_avoids_used() {
        let mut used = HashSet::new();
        for _ in 0..50 {
            let name = generate_unique_name("Source", &used);
            assert!(!used.contains(&name));
            used.insert(name);
        }
        assert_eq!(used.len(), 50);
    }
}
