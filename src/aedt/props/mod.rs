//! Ordered property dictionaries.
//!
//! Every boundary and native component is described by a [`PropertyDictionary`]:
//! an insertion-ordered map from engine-defined key names (`"Total Power"`,
//! `"Objects"`, `"NativeComponentDefinitionProvider"`, ...) to [`PropValue`]s.
//!
//! Insertion order is significant. Some engine consumers read the entries of
//! a named block positionally, so dictionaries are never sorted.
//!
//! # Paths
//!
//! Nested entries are addressed with `::` separated paths, e.g.
//! `"NativeComponentDefinitionProvider::Resolution"`. A slash cannot be used
//! because engine key names contain slashes (`"Voltage/Current - Enabled"`).

pub mod normalize;
pub mod serializer;

pub use normalize::{
    assign_quantity, decompose_value, merge_defaults, merge_quantity_patch, normalize_scalar,
    normalize_transient, validate_variations, Assignment, Schema, SchemaDefault, SolutionMode,
    VariationDescriptor, VariationFunction, VariationKind, JOULE_HEATING, VARIATION_SUFFIX,
};
pub use serializer::{
    from_arg_list, from_flat_properties, restore_leaf_types, to_arg_list, to_flat,
    to_named_block, Arg, FlatProperties, FlatValue,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Separator between segments of a nested property path.
pub const PATH_SEPARATOR: &str = "::";

/// A single property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Boolean flag.
    Bool(bool),
    /// Bare number (the engine infers the unit).
    Number(f64),
    /// Literal string, usually a value with units or a variable reference.
    Str(String),
    /// List of values.
    List(Vec<PropValue>),
    /// Nested named block.
    Dict(PropertyDictionary),
}

impl PropValue {
    /// Returns the string content if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean if this is a flag.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a bare number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the nested dictionary if this is a block.
    #[must_use]
    pub const fn as_dict(&self) -> Option<&PropertyDictionary> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the list if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns true for scalars (strings, numbers and flags).
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::Str(_))
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<PropertyDictionary> for PropValue {
    fn from(value: PropertyDictionary) -> Self {
        Self::Dict(value)
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

/// An insertion-ordered map of engine property names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyDictionary {
    entries: IndexMap<String, PropValue>,
}

impl PropertyDictionary {
    /// Creates an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, keeping the original position if the key exists.
    ///
    /// Returns the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Gets a top-level value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.get(key)
    }

    /// Gets a mutable top-level value.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropValue> {
        self.entries.get_mut(key)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.entries.shift_remove(key)
    }

    /// Returns true if the key is present at the top level.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over top-level entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.entries.iter()
    }

    /// Iterates mutably over top-level entries in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut PropValue)> {
        self.entries.iter_mut()
    }

    /// Iterates over top-level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Gets a nested value by `::` separated path.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&PropValue> {
        let mut segments = path.split(PATH_SEPARATOR);
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = current.as_dict()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets a nested value by `::` separated path.
    ///
    /// Missing intermediate blocks are created; a non-block value in the way
    /// is replaced by a block.
    pub fn set_path(&mut self, path: &str, value: impl Into<PropValue>) {
        match path.split_once(PATH_SEPARATOR) {
            None => {
                self.insert(path, value);
            }
            Some((head, rest)) => {
                let entry = self
                    .entries
                    .entry(head.to_string())
                    .or_insert_with(|| PropValue::Dict(Self::new()));
                if !matches!(entry, PropValue::Dict(_)) {
                    *entry = PropValue::Dict(Self::new());
                }
                if let PropValue::Dict(child) = entry {
                    child.set_path(rest, value);
                }
            }
        }
    }

    /// Deep-merges `patch` into this dictionary.
    ///
    /// Blocks present on both sides merge recursively; every other value in
    /// the patch replaces the existing one. New keys are appended.
    pub fn merge_patch(&mut self, patch: &Self) {
        for (key, value) in patch.iter() {
            if let (Some(PropValue::Dict(existing)), PropValue::Dict(incoming)) =
                (self.entries.get_mut(key), value)
            {
                existing.merge_patch(incoming);
                continue;
            }
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Appends all entries of `other`, replacing existing keys in place.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for PropertyDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PropertyDictionary {
    type Item = (&'a String, &'a PropValue);
    type IntoIter = indexmap::map::Iter<'a, String, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PropertyDictionary {
        PropertyDictionary::new()
            .with("Objects", vec!["Box1"])
            .with("Total Power", "2W")
            .with(
                "LowSide",
                PropertyDictionary::new().with("Radiate", false),
            )
    }

    #[test]
    fn preserves_insertion_order() {
        let props = PropertyDictionary::new()
            .with("Zeta", 1.0)
            .with("Alpha", 2.0)
            .with("Mid", 3.0);
        let keys: Vec<_> = props.keys().cloned().collect();
        assert_eq!(keys, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut props = sample();
        props.remove("Total Power");
        let keys: Vec<_> = props.keys().cloned().collect();
        assert_eq!(keys, ["Objects", "LowSide"]);
    }

    #[test]
    fn get_path_reads_nested_values() {
        let props = sample();
        assert_eq!(
            props.get_path("LowSide::Radiate"),
            Some(&PropValue::Bool(false))
        );
        assert!(props.get_path("LowSide::Missing").is_none());
        assert!(props.get_path("Total Power::Nested").is_none());
    }

    #[test]
    fn set_path_creates_blocks() {
        let mut props = PropertyDictionary::new();
        props.set_path("HighSide::Radiate", true);
        props.set_path("HighSide::RadiateTo", "All objects");
        let high = props.get("HighSide").and_then(PropValue::as_dict).unwrap();
        assert_eq!(high.len(), 2);
        assert_eq!(high.get("Radiate"), Some(&PropValue::Bool(true)));
    }

    #[test]
    fn merge_patch_is_deep() {
        let mut props = sample();
        let patch = PropertyDictionary::new()
            .with("Total Power", "5W")
            .with(
                "LowSide",
                PropertyDictionary::new().with("RadiateTo", "All objects"),
            );
        props.merge_patch(&patch);

        assert_eq!(props.get("Total Power"), Some(&PropValue::from("5W")));
        let low = props.get("LowSide").and_then(PropValue::as_dict).unwrap();
        assert_eq!(low.get("Radiate"), Some(&PropValue::Bool(false)));
        assert_eq!(low.get("RadiateTo"), Some(&PropValue::from("All objects")));
    }

    #[test]
    fn json_shape_is_plain() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Objects": ["Box1"],
                "Total Power": "2W",
                "LowSide": {"Radiate": false}
            })
        );
        let back: PropertyDictionary = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
