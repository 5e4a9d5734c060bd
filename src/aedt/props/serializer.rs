//! Conversion between property dictionaries and engine argument formats.
//!
//! # Argument lists
//!
//! The automation API takes nested lists of alternating key/value entries:
//!
//! ```text
//! ["NAME:Block_1",
//!     "Objects:=", ["Box1"],
//!     "Total Power:=", "2W",
//!     ["NAME:LowSide", "Radiate:=", false]]
//! ```
//!
//! - a nested dictionary becomes a `["NAME:<key>", ..]` block
//! - a list of dictionaries becomes one `["NAME:<key>", ..]` block per entry
//! - anything else becomes `"<key>:="` followed by the value
//!
//! # Flat read-back
//!
//! When properties are read back, the engine reports one [`FlatValue`] per
//! leaf, keyed by its `::` separated path. Lists of blocks are indexed as
//! `Key[i]` and empty blocks are reported as [`FlatValue::EmptyBlock`].
//! Leaves keep their type, so `"5"` stays a string and `5` stays a number.
//!
//! Engines that can only report text send every leaf as
//! [`FlatValue::Text`]. [`restore_leaf_types`] maps such leaves back onto
//! the types of the previous local copy.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{PropValue, PropertyDictionary, PATH_SEPARATOR};

/// Prefix of a block header entry.
const NAME_PREFIX: &str = "NAME:";

/// Suffix of a key entry.
const KEY_SUFFIX: &str = ":=";

/// One element of an engine argument list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    /// Boolean argument.
    Bool(bool),
    /// Numeric argument.
    Number(f64),
    /// String argument, including `NAME:` headers and `key:=` markers.
    Text(String),
    /// Nested list.
    Array(Vec<Arg>),
}

impl Arg {
    /// Returns the string content of a text argument.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items of a nested list.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the block name if this is a `["NAME:<name>", ..]` block.
    #[must_use]
    pub fn block_name(&self) -> Option<&str> {
        self.as_array()?
            .first()?
            .as_text()?
            .strip_prefix(NAME_PREFIX)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One leaf of the flat read-back.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    /// Boolean flag.
    Flag(bool),
    /// Bare number.
    Number(f64),
    /// Text. Engines without typed read-back report every leaf this way.
    Text(String),
    /// List that is not a list of blocks.
    List(Vec<PropValue>),
    /// Block with no entries.
    EmptyBlock,
}

impl FlatValue {
    /// Converts the leaf into a property value.
    #[must_use]
    pub fn into_value(self) -> PropValue {
        match self {
            Self::Flag(b) => PropValue::Bool(b),
            Self::Number(n) => PropValue::Number(n),
            Self::Text(s) => PropValue::Str(s),
            Self::List(items) => PropValue::List(items),
            Self::EmptyBlock => PropValue::Dict(PropertyDictionary::new()),
        }
    }

    /// The same leaf as an engine without typed read-back reports it.
    #[must_use]
    pub fn to_text(&self) -> Self {
        Self::Text(self.to_string())
    }
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&format_flat_value(&PropValue::List(items.clone()))),
            Self::EmptyBlock => f.write_str("{}"),
        }
    }
}

/// Flat property read-back: leaf path to leaf value.
pub type FlatProperties = IndexMap<String, FlatValue>;

/// Serialises a dictionary into the engine's alternating argument list.
///
/// Entries follow the dictionary's insertion order.
#[must_use]
pub fn to_arg_list(props: &PropertyDictionary) -> Vec<Arg> {
    let mut out = Vec::with_capacity(props.len() * 2);
    for (key, value) in props {
        push_entry(&mut out, key, value);
    }
    out
}

/// Serialises a dictionary as a `["NAME:<name>", ..]` block.
#[must_use]
pub fn to_named_block(name: &str, props: &PropertyDictionary) -> Arg {
    let mut block = vec![Arg::Text(format!("{NAME_PREFIX}{name}"))];
    block.extend(to_arg_list(props));
    Arg::Array(block)
}

fn push_entry(out: &mut Vec<Arg>, key: &str, value: &PropValue) {
    match value {
        PropValue::Dict(child) => out.push(to_named_block(key, child)),
        PropValue::List(items) if is_block_list(items) => {
            for item in items {
                if let PropValue::Dict(child) = item {
                    out.push(to_named_block(key, child));
                }
            }
        }
        other => {
            out.push(Arg::Text(format!("{key}{KEY_SUFFIX}")));
            out.push(value_to_arg(other));
        }
    }
}

fn is_block_list(items: &[PropValue]) -> bool {
    !items.is_empty() && items.iter().all(|v| matches!(v, PropValue::Dict(_)))
}

fn value_to_arg(value: &PropValue) -> Arg {
    match value {
        PropValue::Bool(b) => Arg::Bool(*b),
        PropValue::Number(n) => Arg::Number(*n),
        PropValue::Str(s) => Arg::Text(s.clone()),
        PropValue::List(items) => Arg::Array(items.iter().map(value_to_arg).collect()),
        PropValue::Dict(child) => Arg::Array(to_arg_list(child)),
    }
}

/// Parses a `["NAME:<name>", ..]` block back into a name and dictionary.
///
/// Repeated child blocks with the same name become a list of dictionaries.
/// Returns `None` if the block is malformed.
#[must_use]
pub fn from_arg_list(block: &[Arg]) -> Option<(String, PropertyDictionary)> {
    let name = block.first()?.as_text()?.strip_prefix(NAME_PREFIX)?;
    let props = parse_children(&block[1..])?;
    Some((name.to_string(), props))
}

fn parse_children(args: &[Arg]) -> Option<PropertyDictionary> {
    let mut props = PropertyDictionary::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg {
            Arg::Text(marker) => {
                let key = marker.strip_suffix(KEY_SUFFIX)?;
                let value = iter.next()?;
                props.insert(key, arg_to_value(value));
            }
            Arg::Array(items) => {
                let (name, child) = from_arg_list(items)?;
                insert_block(&mut props, name, child);
            }
            _ => return None,
        }
    }

    Some(props)
}

fn insert_block(props: &mut PropertyDictionary, name: String, child: PropertyDictionary) {
    match props.get_mut(&name) {
        Some(PropValue::List(items)) => items.push(PropValue::Dict(child)),
        Some(existing @ PropValue::Dict(_)) => {
            let first = std::mem::replace(existing, PropValue::List(Vec::new()));
            *existing = PropValue::List(vec![first, PropValue::Dict(child)]);
        }
        _ => {
            props.insert(name, child);
        }
    }
}

fn arg_to_value(arg: &Arg) -> PropValue {
    match arg {
        Arg::Bool(b) => PropValue::Bool(*b),
        Arg::Number(n) => PropValue::Number(*n),
        Arg::Text(s) => PropValue::Str(s.clone()),
        Arg::Array(items) => PropValue::List(items.iter().map(arg_to_value).collect()),
    }
}

/// Flattens a dictionary into the engine's read-back form.
#[must_use]
pub fn to_flat(props: &PropertyDictionary) -> FlatProperties {
    let mut out = FlatProperties::new();
    flatten_into(&mut out, None, props);
    out
}

fn flatten_into(out: &mut FlatProperties, prefix: Option<&str>, props: &PropertyDictionary) {
    for (key, value) in props {
        let path = match prefix {
            Some(p) => format!("{p}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        flatten_value(out, path, value);
    }
}

fn flatten_value(out: &mut FlatProperties, path: String, value: &PropValue) {
    let leaf = match value {
        PropValue::Dict(child) if child.is_empty() => FlatValue::EmptyBlock,
        PropValue::Dict(child) => return flatten_into(out, Some(&path), child),
        PropValue::List(items) if is_block_list(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(out, format!("{path}[{i}]"), item);
            }
            return;
        }
        PropValue::List(items) => FlatValue::List(items.clone()),
        PropValue::Bool(b) => FlatValue::Flag(*b),
        PropValue::Number(n) => FlatValue::Number(*n),
        PropValue::Str(s) => FlatValue::Text(s.clone()),
    };
    out.insert(path, leaf);
}

/// Renders a value as read-back text.
pub(crate) fn format_flat_value(value: &PropValue) -> String {
    match value {
        PropValue::Str(s) => s.clone(),
        PropValue::Number(n) => n.to_string(),
        PropValue::Bool(b) => b.to_string(),
        PropValue::List(items) => {
            let parts: Vec<String> = items.iter().map(format_flat_value).collect();
            format!("[{}]", parts.join(", "))
        }
        PropValue::Dict(child) if child.is_empty() => "{}".to_string(),
        PropValue::Dict(child) => serde_json::to_string(child).unwrap_or_default(),
    }
}

/// Rebuilds a nested dictionary from the engine's flat read-back.
///
/// This is a full rebuild; nothing from a previous local copy is reused.
#[must_use]
pub fn from_flat_properties(flat: &FlatProperties) -> PropertyDictionary {
    let mut props = PropertyDictionary::new();
    for (path, leaf) in flat {
        insert_flat(&mut props, path, leaf.clone().into_value());
    }
    props
}

/// Gives text leaves of a rebuilt dictionary back the type they had in
/// `previous`.
///
/// Flags and numbers are re-parsed when the text allows it. Lists and
/// blocks are only restored when the text still equals their read-back
/// form. Leaves that were strings, or are new, stay as reported.
pub fn restore_leaf_types(rebuilt: &mut PropertyDictionary, previous: &PropertyDictionary) {
    for (key, value) in rebuilt.iter_mut() {
        if let Some(old) = previous.get(key) {
            restore_value(value, old);
        }
    }
}

fn restore_value(value: &mut PropValue, previous: &PropValue) {
    match (value, previous) {
        (PropValue::Dict(child), PropValue::Dict(old)) => restore_leaf_types(child, old),
        (PropValue::List(items), PropValue::List(old)) if items.len() == old.len() => {
            for (item, old_item) in items.iter_mut().zip(old) {
                restore_value(item, old_item);
            }
        }
        (value, old) => {
            let typed = match &*value {
                PropValue::Str(text) => typed_like(text, old),
                _ => None,
            };
            if let Some(typed) = typed {
                *value = typed;
            }
        }
    }
}

fn typed_like(text: &str, previous: &PropValue) -> Option<PropValue> {
    match previous {
        PropValue::Str(_) => None,
        PropValue::Bool(_) => text.parse().ok().map(PropValue::Bool),
        PropValue::Number(_) => text.parse().ok().map(PropValue::Number),
        other => (text == format_flat_value(other)).then(|| other.clone()),
    }
}

fn insert_flat(props: &mut PropertyDictionary, path: &str, value: PropValue) {
    let (head, rest) = match path.split_once(PATH_SEPARATOR) {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };

    match (split_index(head), rest) {
        ((key, None), None) => {
            props.insert(key, value);
        }
        ((key, None), Some(rest)) => {
            let child = dict_entry(props, key);
            insert_flat(child, rest, value);
        }
        ((key, Some(index)), rest) => {
            if !matches!(props.get(key), Some(PropValue::List(_))) {
                props.insert(key, PropValue::List(Vec::new()));
            }
            let Some(PropValue::List(items)) = props.get_mut(key) else {
                return;
            };
            while items.len() <= index {
                items.push(PropValue::Dict(PropertyDictionary::new()));
            }
            match rest {
                None => items[index] = value,
                Some(rest) => {
                    if !matches!(items[index], PropValue::Dict(_)) {
                        items[index] = PropValue::Dict(PropertyDictionary::new());
                    }
                    if let PropValue::Dict(child) = &mut items[index] {
                        insert_flat(child, rest, value);
                    }
                }
            }
        }
    }
}

fn dict_entry<'a>(props: &'a mut PropertyDictionary, key: &str) -> &'a mut PropertyDictionary {
    if !matches!(props.get(key), Some(PropValue::Dict(_))) {
        props.insert(key, PropertyDictionary::new());
    }
    match props.get_mut(key) {
        Some(PropValue::Dict(child)) => child,
        _ => unreachable!("entry was just set to a block"),
    }
}

/// Splits `Key[3]` into `("Key", Some(3))`.
fn split_index(segment: &str) -> (&str, Option<usize>) {
    segment
        .strip_suffix(']')
        .and_then(|s| s.rsplit_once('['))
        .and_then(|(key, index)| index.parse().ok().map(|i| (key, Some(i))))
        .unwrap_or((segment, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_props() -> PropertyDictionary {
        PropertyDictionary::new()
            .with("Objects", vec!["Box1", "Box2"])
            .with("Block Type", "Solid")
            .with("Total Power", "2W")
            .with("Use External Conditions", false)
    }

    #[test]
    fn arg_list_alternates_keys_and_values() {
        let args = to_arg_list(&block_props());
        assert_eq!(
            args,
            vec![
                Arg::from("Objects:="),
                Arg::Array(vec![Arg::from("Box1"), Arg::from("Box2")]),
                Arg::from("Block Type:="),
                Arg::from("Solid"),
                Arg::from("Total Power:="),
                Arg::from("2W"),
                Arg::from("Use External Conditions:="),
                Arg::Bool(false),
            ]
        );
    }

    #[test]
    fn nested_dict_becomes_named_block() {
        let props = PropertyDictionary::new()
            .with("Total Power", "1W")
            .with("LowSide", PropertyDictionary::new().with("Radiate", true));
        let block = to_named_block("Plate_1", &props);
        assert_eq!(block.block_name(), Some("Plate_1"));
        assert_eq!(
            block,
            Arg::Array(vec![
                Arg::from("NAME:Plate_1"),
                Arg::from("Total Power:="),
                Arg::from("1W"),
                Arg::Array(vec![Arg::from("NAME:LowSide"), Arg::from("Radiate:="), Arg::Bool(true)]),
            ])
        );
    }

    #[test]
    fn list_of_dicts_repeats_blocks() {
        let points = vec![
            PropertyDictionary::new().with("Flow", "0m3_per_s"),
            PropertyDictionary::new().with("Flow", "1m3_per_s"),
        ];
        let props = PropertyDictionary::new().with("Point", points);
        let args = to_arg_list(&props);
        assert_eq!(args.len(), 2);
        assert!(args.iter().all(|a| a.block_name() == Some("Point")));
    }

    #[test]
    fn empty_dict_is_bare_header() {
        let props = PropertyDictionary::new().with("VariableOrders", PropertyDictionary::new());
        assert_eq!(
            to_arg_list(&props),
            vec![Arg::Array(vec![Arg::from("NAME:VariableOrders")])]
        );
    }

    #[test]
    fn arg_list_parses_back() {
        let props = block_props()
            .with("LowSide", PropertyDictionary::new().with("Radiate", true))
            .with(
                "Point",
                vec![
                    PropertyDictionary::new().with("X", 1.0),
                    PropertyDictionary::new().with("X", 2.0),
                ],
            )
            .with("Empty", PropertyDictionary::new());
        let block = to_named_block("Block_1", &props);
        let (name, parsed) = from_arg_list(block.as_array().unwrap()).unwrap();
        assert_eq!(name, "Block_1");
        assert_eq!(parsed, props);
    }

    #[test]
    fn malformed_block_rejected() {
        assert!(from_arg_list(&[Arg::from("Block_1")]).is_none());
        assert!(from_arg_list(&[Arg::from("NAME:B"), Arg::from("Dangling:=")]).is_none());
        assert!(from_arg_list(&[Arg::from("NAME:B"), Arg::Bool(true)]).is_none());
    }

    #[test]
    fn flat_paths_use_separator() {
        let props = PropertyDictionary::new()
            .with("Voltage/Current - Enabled", false)
            .with("HighSide", PropertyDictionary::new().with("Radiate", true))
            .with("Variation Value", vec!["1", "pwl($ds1, Time)"]);
        let flat = to_flat(&props);
        assert_eq!(flat.get("Voltage/Current - Enabled"), Some(&FlatValue::Flag(false)));
        assert_eq!(flat.get("HighSide::Radiate"), Some(&FlatValue::Flag(true)));
        assert_eq!(
            flat.get("Variation Value").map(ToString::to_string).as_deref(),
            Some("[1, pwl($ds1, Time)]")
        );
    }

    #[test]
    fn flat_round_trip_with_scalar_leaves() {
        let props = PropertyDictionary::new()
            .with("Total Power", "2W")
            .with("Resolution", 2.0)
            .with("Ratio", 0.1)
            .with("Radiation", true)
            .with(
                "NativeComponentDefinitionProvider",
                PropertyDictionary::new()
                    .with("Type", "PCB")
                    .with("LowSide", PropertyDictionary::new().with("Radiate", false)),
            );
        assert_eq!(from_flat_properties(&to_flat(&props)), props);
    }

    #[test]
    fn flat_leaves_keep_their_type() {
        let props = PropertyDictionary::new()
            .with("Count", "5")
            .with("Flag", "true")
            .with("Name", "[Box]")
            .with("Braces", "{}")
            .with("Variation Value", vec!["0", "1"])
            .with("Points", PropValue::List(Vec::new()));
        let flat = to_flat(&props);
        assert_eq!(flat.get("Count"), Some(&FlatValue::Text("5".into())));
        assert_eq!(from_flat_properties(&flat), props);
    }

    #[test]
    fn flat_read_back_rebuilds_lists() {
        let mut flat = FlatProperties::new();
        flat.insert("Objects".into(), FlatValue::List(vec!["Box1".into(), "Box2".into()]));
        flat.insert("Point[1]::X".into(), FlatValue::Number(2.0));
        flat.insert("Point[0]::X".into(), FlatValue::Number(1.0));
        flat.insert("VariableOrders".into(), FlatValue::EmptyBlock);
        flat.insert("Expression".into(), FlatValue::Text("pwl($ds1, Time)".into()));

        let props = from_flat_properties(&flat);
        assert_eq!(props.get("Objects"), Some(&PropValue::from(vec!["Box1", "Box2"])));
        let points = props.get("Point").and_then(PropValue::as_list).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(
            points[0].as_dict().and_then(|d| d.get("X")),
            Some(&PropValue::Number(1.0))
        );
        assert_eq!(props.get("VariableOrders"), Some(&PropValue::Dict(PropertyDictionary::new())));
        assert_eq!(props.get("Expression"), Some(&PropValue::from("pwl($ds1, Time)")));
    }

    #[test]
    fn text_read_back_restores_previous_types() {
        let previous = PropertyDictionary::new()
            .with("Objects", vec!["Box1", "Box2"])
            .with("Resolution", 2.0)
            .with("Count", "5")
            .with("Radiate", false)
            .with("Variation Value", vec!["0", "1"])
            .with("LowSide", PropertyDictionary::new().with("Radiate", true));
        let text: FlatProperties = to_flat(&previous)
            .into_iter()
            .map(|(path, leaf)| (path, leaf.to_text()))
            .collect();

        let mut rebuilt = from_flat_properties(&text);
        assert_eq!(rebuilt.get("Resolution"), Some(&PropValue::from("2")));
        restore_leaf_types(&mut rebuilt, &previous);
        assert_eq!(rebuilt, previous);
    }

    #[test]
    fn changed_text_keeps_scalar_type() {
        let previous = PropertyDictionary::new()
            .with("Resolution", 2.0)
            .with("Radiate", false)
            .with("Objects", vec!["Box1"])
            .with("Ratio", 0.5);
        let mut rebuilt = PropertyDictionary::new()
            .with("Resolution", "3")
            .with("Radiate", "true")
            .with("Objects", "[Box1, Box2]")
            .with("Ratio", "half");
        restore_leaf_types(&mut rebuilt, &previous);
        assert_eq!(rebuilt.get("Resolution"), Some(&PropValue::Number(3.0)));
        assert_eq!(rebuilt.get("Radiate"), Some(&PropValue::Bool(true)));
        assert_eq!(rebuilt.get("Objects"), Some(&PropValue::from("[Box1, Box2]")));
        assert_eq!(rebuilt.get("Ratio"), Some(&PropValue::from("half")));
    }

    #[test]
    fn index_suffix_requires_number() {
        assert_eq!(split_index("Point[2]"), ("Point", Some(2)));
        assert_eq!(split_index("Weird[x]"), ("Weird[x]", None));
        assert_eq!(split_index("Plain"), ("Plain", None));
    }
}
