//! In-memory reference engine.
//!
//! [`InMemoryEngine`] implements the boundary and native-component methods
//! of the automation API against plain dictionaries. It is used for dry runs
//! (the CLI prints its call log) and as the engine behind the test suites.
//!
//! Behaviour:
//!
//! - `Assign*Boundary` stores a boundary; duplicate names are rejected
//! - `Edit*Boundary` replaces a boundary's properties
//! - `DeleteBoundaries` removes boundaries
//! - `InsertNativeComponent` stores an instance named `<definition><n>`
//! - `EditNativeComponentDefinition` updates every instance of a definition
//! - `Delete` removes native component instances
//!
//! When geometry has been declared, `Objects` and `Faces` references are
//! checked and unknown ones make creation fail.
//!
//! Read-back is typed unless [`InMemoryEngine::report_text_only`] is set.
//!
//! The engine is a cheap handle: clones share state, so a test can keep one
//! clone while a session owns another.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use super::props::{
    from_arg_list, to_flat, Arg, FlatProperties, PropValue, PropertyDictionary,
};
use super::session::{Engine, Reply, Target};

/// A call as recorded by the in-memory engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineCall {
    /// Target of the call.
    pub target: Target,
    /// Method name.
    pub method: String,
    /// Arguments as sent.
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    props: PropertyDictionary,
    revision: u64,
}

#[derive(Debug, Default)]
struct EngineState {
    objects: Vec<String>,
    faces: HashSet<String>,
    check_references: bool,
    hide_revisions: bool,
    text_only: bool,
    boundaries: IndexMap<String, StoredObject>,
    components: IndexMap<String, StoredObject>,
    next_revision: u64,
    rejections: Vec<String>,
    calls: Vec<EngineCall>,
}

impl EngineState {
    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    fn store(&self, target: Target) -> &IndexMap<String, StoredObject> {
        match target {
            Target::Boundary => &self.boundaries,
            Target::Editor => &self.components,
        }
    }

    fn store_mut(&mut self, target: Target) -> &mut IndexMap<String, StoredObject> {
        match target {
            Target::Boundary => &mut self.boundaries,
            Target::Editor => &mut self.components,
        }
    }

    fn references_exist(&self, props: &PropertyDictionary) -> bool {
        if !self.check_references {
            return true;
        }
        let objects_ok = props
            .get("Objects")
            .and_then(PropValue::as_list)
            .map_or(true, |items| {
                items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|n| self.objects.iter().any(|o| o == n)))
            });
        let faces_ok = props
            .get("Faces")
            .and_then(PropValue::as_list)
            .map_or(true, |items| {
                items.iter().all(|item| {
                    let id = super::props::normalize_scalar(item, "");
                    self.faces.contains(&id)
                })
            });
        objects_ok && faces_ok
    }

    fn assign_boundary(&mut self, args: &[Arg]) -> Reply {
        let Some((name, props)) = args.first().and_then(Arg::as_array).and_then(from_arg_list)
        else {
            return Reply::Empty;
        };
        if name.is_empty() || self.boundaries.contains_key(&name) {
            tracing::debug!(name, "duplicate or empty boundary name");
            return Reply::Empty;
        }
        if !self.references_exist(&props) {
            tracing::debug!(name, "boundary references unknown geometry");
            return Reply::Empty;
        }
        let revision = self.bump();
        self.boundaries
            .insert(name.clone(), StoredObject { props, revision });
        Reply::Name(name)
    }

    fn edit_boundary(&mut self, args: &[Arg]) -> Reply {
        let Some(name) = args.first().and_then(Arg::as_text) else {
            return Reply::Bool(false);
        };
        let Some((_, props)) = args.get(1).and_then(Arg::as_array).and_then(from_arg_list) else {
            return Reply::Bool(false);
        };
        if !self.references_exist(&props) {
            return Reply::Bool(false);
        }
        let revision = self.bump();
        match self.boundaries.get_mut(name) {
            Some(stored) => {
                stored.props = props;
                stored.revision = revision;
                Reply::Bool(true)
            }
            None => Reply::Bool(false),
        }
    }

    fn delete_boundaries(&mut self, args: &[Arg]) -> Reply {
        let Some(names) = args.first().and_then(Arg::as_array) else {
            return Reply::Bool(false);
        };
        let mut all_removed = !names.is_empty();
        for name in names.iter().filter_map(Arg::as_text) {
            all_removed &= self.boundaries.shift_remove(name).is_some();
        }
        Reply::Bool(all_removed)
    }

    fn insert_component(&mut self, args: &[Arg]) -> Reply {
        let Some((_, props)) = args.first().and_then(Arg::as_array).and_then(from_arg_list) else {
            return Reply::Empty;
        };
        let Some(definition) = props
            .get("SubmodelDefinitionName")
            .and_then(PropValue::as_str)
            .map(str::to_string)
        else {
            return Reply::Empty;
        };
        let instance = (1..)
            .map(|n| format!("{definition}{n}"))
            .find(|candidate| !self.components.contains_key(candidate))
            .unwrap_or_default();
        let revision = self.bump();
        self.components
            .insert(instance.clone(), StoredObject { props, revision });
        Reply::Names(vec![instance])
    }

    fn edit_component_definition(&mut self, args: &[Arg]) -> Reply {
        let Some((_, mut patch)) = args.first().and_then(Arg::as_array).and_then(from_arg_list)
        else {
            return Reply::Bool(false);
        };
        let Some(PropValue::Str(definition)) = patch.remove("DefinitionName") else {
            return Reply::Bool(false);
        };
        let revision = self.bump();
        let mut found = false;
        for stored in self.components.values_mut() {
            let matches = stored
                .props
                .get("SubmodelDefinitionName")
                .and_then(PropValue::as_str)
                == Some(definition.as_str());
            if matches {
                for (key, value) in &patch {
                    stored.props.insert(key.clone(), value.clone());
                }
                stored.revision = revision;
                found = true;
            }
        }
        Reply::Bool(found)
    }

    fn delete_components(&mut self, args: &[Arg]) -> Reply {
        let Some((_, selection)) = args.first().and_then(Arg::as_array).and_then(from_arg_list)
        else {
            return Reply::Bool(false);
        };
        let Some(names) = selection.get("Selections").and_then(PropValue::as_str) else {
            return Reply::Bool(false);
        };
        let mut all_removed = true;
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            all_removed &= self.components.shift_remove(name).is_some();
        }
        Reply::Bool(all_removed)
    }
}

/// Dictionary-backed engine for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEngine {
    state: Rc<RefCell<EngineState>>,
}

impl InMemoryEngine {
    /// Creates an engine that accepts any geometry reference.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that only accepts references to the given geometry.
    #[must_use]
    pub fn with_geometry<O, F>(objects: O, faces: F) -> Self
    where
        O: IntoIterator,
        O::Item: Into<String>,
        F: IntoIterator<Item = u32>,
    {
        let engine = Self::new();
        {
            let mut state = engine.state.borrow_mut();
            state.check_references = true;
            state.objects = objects.into_iter().map(Into::into).collect();
            state.faces = faces.into_iter().map(|f| f.to_string()).collect();
        }
        engine
    }

    /// Declares an additional geometry object.
    pub fn add_object(&self, name: impl Into<String>) {
        self.state.borrow_mut().objects.push(name.into());
    }

    /// Makes the next call to `method` fail.
    pub fn reject_next(&self, method: impl Into<String>) {
        self.state.borrow_mut().rejections.push(method.into());
    }

    /// Stops reporting revisions, as engines without revision tracking do.
    pub fn hide_revisions(&self) {
        self.state.borrow_mut().hide_revisions = true;
    }

    /// Reports every read-back leaf as text, as engines without typed
    /// read-back do.
    pub fn report_text_only(&self) {
        self.state.borrow_mut().text_only = true;
    }

    /// Changes a stored property behind the client's back.
    ///
    /// Returns false if the object does not exist.
    pub fn set_remote_property(
        &self,
        target: Target,
        name: &str,
        path: &str,
        value: impl Into<PropValue>,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        let revision = state.bump();
        match state.store_mut(target).get_mut(name) {
            Some(stored) => {
                stored.props.set_path(path, value);
                stored.revision = revision;
                true
            }
            None => false,
        }
    }

    /// Properties currently stored for an object.
    #[must_use]
    pub fn stored_properties(&self, target: Target, name: &str) -> Option<PropertyDictionary> {
        self.state
            .borrow()
            .store(target)
            .get(name)
            .map(|s| s.props.clone())
    }

    /// Names of stored boundaries.
    #[must_use]
    pub fn boundary_names(&self) -> Vec<String> {
        self.state.borrow().boundaries.keys().cloned().collect()
    }

    /// Names of stored native component instances.
    #[must_use]
    pub fn component_names(&self) -> Vec<String> {
        self.state.borrow().components.keys().cloned().collect()
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }
}

impl Engine for InMemoryEngine {
    fn call(&mut self, target: Target, method: &str, args: &[Arg]) -> Reply {
        let mut state = self.state.borrow_mut();
        state.calls.push(EngineCall {
            target,
            method: method.to_string(),
            args: args.to_vec(),
        });

        if let Some(pos) = state.rejections.iter().position(|m| m == method) {
            state.rejections.remove(pos);
            tracing::debug!(method, "injected rejection");
            return Reply::Empty;
        }

        let is_boundary_method = |prefix: &str| {
            method.starts_with(prefix) && method.ends_with("Boundary")
        };

        match target {
            Target::Boundary if is_boundary_method("Assign") => state.assign_boundary(args),
            Target::Boundary if is_boundary_method("Edit") => state.edit_boundary(args),
            Target::Boundary if method == "DeleteBoundaries" => state.delete_boundaries(args),
            Target::Editor if method == "InsertNativeComponent" => state.insert_component(args),
            Target::Editor if method == "EditNativeComponentDefinition" => {
                state.edit_component_definition(args)
            }
            Target::Editor if method == "Delete" => state.delete_components(args),
            _ => {
                tracing::debug!(%target, method, "unsupported method");
                Reply::Empty
            }
        }
    }

    fn properties(&self, target: Target, name: &str) -> Option<FlatProperties> {
        let state = self.state.borrow();
        let flat = to_flat(&state.store(target).get(name)?.props);
        if !state.text_only {
            return Some(flat);
        }
        Some(
            flat.into_iter()
                .map(|(path, leaf)| (path, leaf.to_text()))
                .collect(),
        )
    }

    fn revision(&self, target: Target, name: &str) -> Option<u64> {
        let state = self.state.borrow();
        if state.hide_revisions {
            return None;
        }
        state.store(target).get(name).map(|s| s.revision)
    }

    fn object_names(&self) -> Vec<String> {
        self.state.borrow().objects.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aedt::props::{to_named_block, FlatValue};

    fn block(name: &str, objects: &[&str]) -> Arg {
        to_named_block(
            name,
            &PropertyDictionary::new()
                .with("Objects", objects.to_vec())
                .with("Block Type", "Solid"),
        )
    }

    #[test]
    fn assign_and_read_back() {
        let mut engine = InMemoryEngine::new();
        let reply = engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &["Box1"])]);
        assert_eq!(reply, Reply::Name("B1".into()));

        let flat = engine.properties(Target::Boundary, "B1").unwrap();
        assert_eq!(flat.get("Block Type"), Some(&FlatValue::Text("Solid".into())));
        assert!(engine.revision(Target::Boundary, "B1").is_some());
    }

    #[test]
    fn text_only_read_back() {
        let mut engine = InMemoryEngine::new();
        engine.report_text_only();
        engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &["Box1"])]);
        let flat = engine.properties(Target::Boundary, "B1").unwrap();
        assert_eq!(flat.get("Objects"), Some(&FlatValue::Text("[Box1]".into())));
    }

    #[test]
    fn duplicate_boundary_rejected() {
        let mut engine = InMemoryEngine::new();
        engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &["Box1"])]);
        let reply = engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &["Box2"])]);
        assert!(!reply.is_success());
    }

    #[test]
    fn unknown_geometry_rejected() {
        let mut engine = InMemoryEngine::with_geometry(["Box1"], [7]);
        let ok = engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &["Box1"])]);
        let bad = engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B2", &["Nope"])]);
        assert!(ok.is_success());
        assert!(!bad.is_success());

        let faces = to_named_block("W1", &PropertyDictionary::new().with("Faces", vec![7.0]));
        let reply = engine.call(Target::Boundary, "AssignStationaryWallBoundary", &[faces]);
        assert!(reply.is_success());
    }

    #[test]
    fn injected_rejection_applies_once() {
        let mut engine = InMemoryEngine::new();
        engine.reject_next("AssignBlockBoundary");
        let first = engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &[])]);
        let second = engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &[])]);
        assert!(!first.is_success());
        assert!(second.is_success());
        assert_eq!(engine.call_count(), 2);
    }

    #[test]
    fn remote_property_change_bumps_revision() {
        let mut engine = InMemoryEngine::new();
        engine.call(Target::Boundary, "AssignBlockBoundary", &[block("B1", &[])]);
        let before = engine.revision(Target::Boundary, "B1");
        assert!(engine.set_remote_property(Target::Boundary, "B1", "Renormalize", true));
        assert_ne!(engine.revision(Target::Boundary, "B1"), before);
        assert!(!engine.set_remote_property(Target::Boundary, "Missing", "X", 1.0));

        engine.hide_revisions();
        assert_eq!(engine.revision(Target::Boundary, "B1"), None);
    }

    #[test]
    fn native_instances_are_numbered() {
        let mut engine = InMemoryEngine::new();
        let props = PropertyDictionary::new().with("SubmodelDefinitionName", "Board");
        let insert = to_named_block("InsertNativeComponentData", &props);
        let first = engine.call(Target::Editor, "InsertNativeComponent", &[insert.clone()]);
        let second = engine.call(Target::Editor, "InsertNativeComponent", &[insert]);
        assert_eq!(first.first_name(), Some("Board1"));
        assert_eq!(second.first_name(), Some("Board2"));

        let selection = to_named_block(
            "Selections",
            &PropertyDictionary::new().with("Selections", "Board1"),
        );
        assert!(engine.call(Target::Editor, "Delete", &[selection]).is_success());
        assert_eq!(engine.component_names(), ["Board2"]);
    }
}
