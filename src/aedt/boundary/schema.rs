//! Static default schemas per boundary type.
//!
//! Quantities that accept variations (`Total Power`, `Temperature`,
//! `Heat Flux`, ...) have no schema default: a variation writes only its
//! `Variation Data` block, and a default literal next to it would be
//! ambiguous to the engine.

use crate::aedt::props::{Schema, SchemaDefault};

use SchemaDefault::{Bool, Str};

const BLOCK_ENTRIES: &[(&str, SchemaDefault)] = &[
    ("Block Type", Str("Solid")),
    ("Use External Conditions", Bool(false)),
];
pub(super) const BLOCK: Schema = Schema::new(BLOCK_ENTRIES);

const SOURCE_ENTRIES: &[(&str, SchemaDefault)] = &[
    ("Thermal Condition", Str("Total Power")),
    ("Radiation", Bool(false)),
    ("Voltage/Current - Enabled", Bool(false)),
];
pub(super) const SOURCE: Schema = Schema::new(SOURCE_ENTRIES);

const STATIONARY_WALL_ENTRIES: &[(&str, SchemaDefault)] = &[
    ("Thickness", Str("0mm")),
    ("Solid Material", Str("Al-Extruded")),
    ("External Condition", Str("Heat Flux")),
    ("Radiate", Bool(false)),
    ("Shell Conduction", Bool(false)),
];
pub(super) const STATIONARY_WALL: Schema = Schema::new(STATIONARY_WALL_ENTRIES);

const CONDUCTING_PLATE_ENTRIES: &[(&str, SchemaDefault)] = &[
    ("Thermal Specification", Str("Thickness")),
    ("Shell Conduction", Bool(false)),
];
pub(super) const CONDUCTING_PLATE: Schema = Schema::new(CONDUCTING_PLATE_ENTRIES);

const OPENING_ENTRIES: &[(&str, SchemaDefault)] = &[
    ("Inlet Type", Str("Pressure")),
    ("No Reverse Flow", Bool(false)),
];
pub(super) const OPENING: Schema = Schema::new(OPENING_ENTRIES);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_keys_are_unique() {
        for schema in [BLOCK, SOURCE, STATIONARY_WALL, CONDUCTING_PLATE, OPENING] {
            let keys: Vec<_> = schema.keys().collect();
            let mut deduped = keys.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(keys.len(), deduped.len());
        }
    }

    #[test]
    fn no_variation_capable_defaults() {
        for schema in [BLOCK, SOURCE, STATIONARY_WALL, CONDUCTING_PLATE, OPENING] {
            assert!(schema
                .keys()
                .all(|k| !["Total Power", "Temperature", "Heat Flux"].contains(&k)));
        }
    }
}
