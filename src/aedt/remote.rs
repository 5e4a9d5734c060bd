//! Lifecycle of named objects that live in the engine.
//!
//! Boundaries and native components share one state machine:
//!
//! ```text
//! Unbound --create()--> Bound --update()--> Bound --delete()--> Deleted
//! ```
//!
//! - `create()` sends the full dictionary. A rejected creation leaves the
//!   object `Unbound`.
//! - `update()` sends the patched dictionary and only changes the local copy
//!   once the engine has accepted it. A patch that changes nothing is a
//!   no-op and makes no engine call.
//! - `delete()` removes the engine object and the design registry entry.
//!   Every later operation fails with [`AedtError::StaleHandle`].
//!
//! # Drift
//!
//! The engine may change an object on its own (some properties only appear
//! once another flag is set). A bound object remembers the engine revision
//! it last synced at and rebuilds its dictionary from the flat read-back
//! whenever the engine reports a different one. Engines without revision
//! tracking fall back to comparing property counts. [`RemoteHandle::refresh`]
//! forces a rebuild.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::design::Units;
use super::error::{AedtError, AedtResult};
use super::props::{
    from_flat_properties, merge_quantity_patch, restore_leaf_types, to_flat, Arg, PropValue,
    PropertyDictionary,
};
use super::session::{EngineSession, Target};

/// Where an object is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Constructed locally, not sent to the engine.
    Unbound,
    /// Created in the engine; the name is authoritative.
    Bound,
    /// Deleted; the handle must not be reused.
    Deleted,
}

/// Result of a successful `update()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The engine accepted the new properties.
    Committed,
    /// The patch changed nothing; the engine was not called.
    Unchanged,
}

/// A method call to send to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCommand {
    /// Method name.
    pub method: String,
    /// Argument list.
    pub args: Vec<Arg>,
}

impl EngineCommand {
    /// Creates a command.
    pub fn new(method: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// How a family of remote objects is created, edited and deleted.
pub trait RemoteKind: Clone + fmt::Debug {
    /// Engine object receiving the calls.
    fn target(&self) -> Target;

    /// Command that creates the object.
    fn create_command(&self, name: &str, props: &PropertyDictionary) -> EngineCommand;

    /// Command that replaces the object's properties.
    fn edit_command(&self, name: &str, props: &PropertyDictionary) -> EngineCommand;

    /// Command that deletes the object.
    fn delete_command(&self, name: &str) -> EngineCommand;
}

#[derive(Debug)]
struct RemoteObject<K> {
    kind: K,
    name: String,
    props: PropertyDictionary,
    state: ObjectState,
    session: EngineSession,
    units: Units,
    synced_revision: Option<u64>,
}

impl<K: RemoteKind> RemoteObject<K> {
    fn new(
        kind: K,
        name: String,
        props: PropertyDictionary,
        session: &EngineSession,
        units: Units,
    ) -> Self {
        Self {
            kind,
            name,
            props,
            state: ObjectState::Unbound,
            session: session.clone(),
            units,
            synced_revision: None,
        }
    }

    fn ensure_bound(&self) -> AedtResult<()> {
        match self.state {
            ObjectState::Bound => Ok(()),
            ObjectState::Unbound => Err(AedtError::NotBound {
                name: self.name.clone(),
            }),
            ObjectState::Deleted => Err(AedtError::stale_handle(&self.name)),
        }
    }

    fn sync(&mut self) -> AedtResult<bool> {
        let target = self.kind.target();
        let drifted = match self.session.revision(target, &self.name) {
            Some(revision) => self.synced_revision != Some(revision),
            None => {
                let flat = self
                    .session
                    .properties(target, &self.name)
                    .ok_or_else(|| AedtError::RemoteMissing {
                        name: self.name.clone(),
                    })?;
                flat.len() != to_flat(&self.props).len()
            }
        };
        if drifted {
            self.rebuild()?;
        }
        Ok(drifted)
    }

    fn rebuild(&mut self) -> AedtResult<()> {
        let target = self.kind.target();
        let flat = self
            .session
            .properties(target, &self.name)
            .ok_or_else(|| AedtError::RemoteMissing {
                name: self.name.clone(),
            })?;
        let mut rebuilt = from_flat_properties(&flat);
        restore_leaf_types(&mut rebuilt, &self.props);
        self.props = rebuilt;
        self.synced_revision = self.session.revision(target, &self.name);
        tracing::debug!(name = %self.name, "rebuilt properties from engine");
        Ok(())
    }

    fn create(&mut self) -> AedtResult<()> {
        match self.state {
            ObjectState::Unbound => {}
            ObjectState::Bound => {
                return Err(AedtError::AlreadyBound {
                    name: self.name.clone(),
                })
            }
            ObjectState::Deleted => return Err(AedtError::stale_handle(&self.name)),
        }

        let target = self.kind.target();
        let command = self.kind.create_command(&self.name, &self.props);
        let reply = self.session.call(target, &command.method, &command.args);
        if !reply.is_success() {
            tracing::warn!(name = %self.name, method = %command.method, "engine rejected creation");
            return Err(AedtError::creation_rejected(&self.name, command.method));
        }

        if let Some(assigned) = reply.first_name() {
            if assigned != self.name {
                tracing::debug!(requested = %self.name, assigned, "engine renamed object");
                self.name = assigned.to_string();
            }
        }
        self.state = ObjectState::Bound;
        self.synced_revision = self.session.revision(target, &self.name);
        tracing::info!(name = %self.name, method = %command.method, "created");
        Ok(())
    }

    fn current_props(&mut self) -> AedtResult<PropertyDictionary> {
        self.ensure_bound()?;
        self.sync()?;
        Ok(self.props.clone())
    }

    fn commit(&mut self, candidate: PropertyDictionary) -> AedtResult<UpdateOutcome> {
        self.ensure_bound()?;
        if candidate == self.props {
            return Ok(UpdateOutcome::Unchanged);
        }

        let target = self.kind.target();
        let command = self.kind.edit_command(&self.name, &candidate);
        let reply = self.session.call(target, &command.method, &command.args);
        if !reply.is_success() {
            tracing::warn!(name = %self.name, method = %command.method, "engine rejected update");
            return Err(AedtError::commit_rejected(&self.name, command.method));
        }

        self.props = candidate;
        self.synced_revision = self.session.revision(target, &self.name);
        tracing::debug!(name = %self.name, "update committed");
        Ok(UpdateOutcome::Committed)
    }

    fn delete(&mut self) -> AedtResult<()> {
        self.ensure_bound()?;

        let target = self.kind.target();
        let command = self.kind.delete_command(&self.name);
        let reply = self.session.call(target, &command.method, &command.args);
        if !reply.is_success() {
            tracing::warn!(name = %self.name, method = %command.method, "engine rejected deletion");
            return Err(AedtError::deletion_rejected(&self.name, command.method));
        }

        self.state = ObjectState::Deleted;
        tracing::info!(name = %self.name, "deleted");
        Ok(())
    }
}

/// Name-keyed registry of live handles, owned by a design.
pub(crate) type Registry<K> = Rc<RefCell<IndexMap<String, RemoteHandle<K>>>>;

/// Shared handle to an engine object.
///
/// Clones refer to the same object: deleting through one clone makes every
/// other clone stale.
pub struct RemoteHandle<K: RemoteKind> {
    inner: Rc<RefCell<RemoteObject<K>>>,
    registry: Weak<RefCell<IndexMap<String, RemoteHandle<K>>>>,
}

impl<K: RemoteKind> RemoteHandle<K> {
    /// Creates an unbound object that is not tracked by any design.
    ///
    /// Values set through the handle use the default [`Units`].
    pub fn detached(
        kind: K,
        name: impl Into<String>,
        props: PropertyDictionary,
        session: &EngineSession,
    ) -> Self {
        let object = RemoteObject::new(kind, name.into(), props, session, Units::default());
        Self::with_registry(object, Weak::new())
    }

    pub(crate) fn registered(
        kind: K,
        name: String,
        props: PropertyDictionary,
        session: &EngineSession,
        units: &Units,
        registry: &Registry<K>,
    ) -> Self {
        let object = RemoteObject::new(kind, name, props, session, units.clone());
        Self::with_registry(object, Rc::downgrade(registry))
    }

    fn with_registry(
        object: RemoteObject<K>,
        registry: Weak<RefCell<IndexMap<String, Self>>>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(object)),
            registry,
        }
    }

    /// Current name. Authoritative once bound.
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Object kind.
    #[must_use]
    pub fn kind(&self) -> K {
        self.inner.borrow().kind.clone()
    }

    /// Units applied to bare numbers set through the handle.
    #[must_use]
    pub fn units(&self) -> Units {
        self.inner.borrow().units.clone()
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> ObjectState {
        self.inner.borrow().state
    }

    /// Returns true once created and until deleted.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.state() == ObjectState::Bound
    }

    /// Returns true if both handles refer to the same object.
    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Current properties.
    ///
    /// For a bound object the engine is checked for drift first.
    ///
    /// # Errors
    ///
    /// Returns [`AedtError::StaleHandle`] after deletion, or
    /// [`AedtError::RemoteMissing`] if the engine lost the object.
    pub fn props(&self) -> AedtResult<PropertyDictionary> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            ObjectState::Deleted => Err(AedtError::stale_handle(&inner.name)),
            ObjectState::Unbound => Ok(inner.props.clone()),
            ObjectState::Bound => {
                inner.sync()?;
                Ok(inner.props.clone())
            }
        }
    }

    /// A single property by `::` separated path.
    ///
    /// # Errors
    ///
    /// Same as [`Self::props`].
    pub fn property(&self, path: &str) -> AedtResult<Option<PropValue>> {
        Ok(self.props()?.get_path(path).cloned())
    }

    /// Rebuilds the properties from the engine unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not bound or the engine lost it.
    pub fn refresh(&self) -> AedtResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.ensure_bound()?;
        inner.rebuild()
    }

    /// Sends the object to the engine.
    ///
    /// On success the object is bound under the name the engine reports and
    /// registered with its design.
    ///
    /// # Errors
    ///
    /// Returns [`AedtError::CreationRejected`] if the engine refuses it,
    /// [`AedtError::AlreadyBound`] or [`AedtError::StaleHandle`] when called
    /// in the wrong state.
    pub fn create(&self) -> AedtResult<()> {
        self.inner.borrow_mut().create()?;
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().insert(self.name(), self.clone());
        }
        Ok(())
    }

    /// Applies a patch and commits it to the engine.
    ///
    /// The local copy is only modified after the engine accepts the edit. A
    /// quantity's literal and its `Variation Data` block replace each other.
    ///
    /// # Errors
    ///
    /// Returns [`AedtError::CommitRejected`] if the engine refuses the edit,
    /// [`AedtError::NotBound`] or [`AedtError::StaleHandle`] when called in
    /// the wrong state.
    pub fn update(&self, patch: &PropertyDictionary) -> AedtResult<UpdateOutcome> {
        self.update_with(|props| merge_quantity_patch(props, patch))
    }

    /// Edits a copy of the properties and commits it to the engine.
    ///
    /// Use this instead of [`Self::update`] when a block must be replaced
    /// or a key removed, which a merge patch cannot express. The handle is
    /// not borrowed while `edit` runs, so `edit` may read it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update`].
    pub fn update_with(
        &self,
        edit: impl FnOnce(&mut PropertyDictionary),
    ) -> AedtResult<UpdateOutcome> {
        let mut candidate = self.inner.borrow_mut().current_props()?;
        edit(&mut candidate);
        self.inner.borrow_mut().commit(candidate)
    }

    /// Deletes the object from the engine and its design.
    ///
    /// # Errors
    ///
    /// Returns [`AedtError::StaleHandle`] if already deleted,
    /// [`AedtError::DeletionRejected`] if the engine refuses.
    pub fn delete(&self) -> AedtResult<()> {
        self.inner.borrow_mut().delete()?;
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().shift_remove(&self.name());
        }
        Ok(())
    }

    pub(crate) fn local_props(&self) -> PropertyDictionary {
        self.inner.borrow().props.clone()
    }
}

impl<K: RemoteKind> Clone for RemoteHandle<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            registry: Weak::clone(&self.registry),
        }
    }
}

impl<K: RemoteKind> fmt::Debug for RemoteHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RemoteHandle")
            .field("kind", &inner.kind)
            .field("name", &inner.name)
            .field("state", &inner.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aedt::memory::InMemoryEngine;
    use crate::aedt::props::to_named_block;

    #[derive(Debug, Clone)]
    struct Block;

    impl RemoteKind for Block {
        fn target(&self) -> Target {
            Target::Boundary
        }

        fn create_command(&self, name: &str, props: &PropertyDictionary) -> EngineCommand {
            EngineCommand::new("AssignBlockBoundary", vec![to_named_block(name, props)])
        }

        fn edit_command(&self, name: &str, props: &PropertyDictionary) -> EngineCommand {
            EngineCommand::new(
                "EditBlockBoundary",
                vec![Arg::from(name), to_named_block(name, props)],
            )
        }

        fn delete_command(&self, name: &str) -> EngineCommand {
            EngineCommand::new("DeleteBoundaries", vec![Arg::Array(vec![Arg::from(name)])])
        }
    }

    fn handle(engine: &InMemoryEngine) -> RemoteHandle<Block> {
        let session = EngineSession::new(engine.clone());
        RemoteHandle::detached(
            Block,
            "B1",
            PropertyDictionary::new().with("Total Power", "1W"),
            &session,
        )
    }

    #[test]
    fn lifecycle_states() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        assert_eq!(block.state(), ObjectState::Unbound);
        block.create().unwrap();
        assert_eq!(block.state(), ObjectState::Bound);
        block.delete().unwrap();
        assert_eq!(block.state(), ObjectState::Deleted);
        assert!(engine.boundary_names().is_empty());
    }

    #[test]
    fn create_twice_fails() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        block.create().unwrap();
        assert!(matches!(block.create(), Err(AedtError::AlreadyBound { .. })));
    }

    #[test]
    fn update_before_create_fails() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        let patch = PropertyDictionary::new().with("Total Power", "2W");
        assert!(matches!(block.update(&patch), Err(AedtError::NotBound { .. })));
        assert_eq!(engine.call_count(), 0);
    }

    #[test]
    fn unchanged_patch_skips_engine() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        block.create().unwrap();
        let calls = engine.call_count();
        let patch = PropertyDictionary::new().with("Total Power", "1W");
        assert_eq!(block.update(&patch).unwrap(), UpdateOutcome::Unchanged);
        assert_eq!(engine.call_count(), calls);
    }

    #[test]
    fn update_with_can_remove_keys() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        block.create().unwrap();
        let outcome = block
            .update_with(|props| {
                props.remove("Total Power");
            })
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Committed);
        assert!(block.props().unwrap().is_empty());
        assert!(engine
            .stored_properties(Target::Boundary, "B1")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn rejected_update_keeps_local_copy() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        block.create().unwrap();
        engine.reject_next("EditBlockBoundary");
        let patch = PropertyDictionary::new().with("Total Power", "9W");
        assert!(matches!(block.update(&patch), Err(AedtError::CommitRejected { .. })));
        assert_eq!(block.property("Total Power").unwrap(), Some(PropValue::from("1W")));
    }

    #[test]
    fn remote_drift_is_picked_up() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        block.create().unwrap();
        engine.set_remote_property(Target::Boundary, "B1", "Total Power", "3W");
        assert_eq!(block.property("Total Power").unwrap(), Some(PropValue::from("3W")));
    }

    #[test]
    fn drift_without_revisions_uses_property_count() {
        let engine = InMemoryEngine::new();
        engine.hide_revisions();
        let block = handle(&engine);
        block.create().unwrap();
        engine.set_remote_property(Target::Boundary, "B1", "Radiation", true);
        assert_eq!(block.property("Radiation").unwrap(), Some(PropValue::Bool(true)));
    }

    #[test]
    fn update_closure_may_read_handle() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        block.create().unwrap();
        let outcome = block
            .update_with(|props| {
                let current = block.property("Total Power").unwrap();
                assert_eq!(current, Some(PropValue::from("1W")));
                props.insert("Total Power", "2W");
            })
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Committed);
        assert_eq!(block.property("Total Power").unwrap(), Some(PropValue::from("2W")));
    }

    #[test]
    fn text_read_back_keeps_local_types() {
        let engine = InMemoryEngine::new();
        engine.report_text_only();
        let session = EngineSession::new(engine.clone());
        let block = RemoteHandle::detached(
            Block,
            "B1",
            PropertyDictionary::new()
                .with("Objects", vec!["Box1"])
                .with("Variation Value", vec!["0", "1"])
                .with("Radiation", false),
            &session,
        );
        block.create().unwrap();
        engine.set_remote_property(Target::Boundary, "B1", "Renormalize", true);

        let props = block.props().unwrap();
        assert_eq!(props.get("Objects"), Some(&PropValue::from(vec!["Box1"])));
        assert_eq!(props.get("Variation Value"), Some(&PropValue::from(vec!["0", "1"])));
        assert_eq!(props.get("Radiation"), Some(&PropValue::Bool(false)));
        assert_eq!(props.get("Renormalize"), Some(&PropValue::from("true")));
    }

    #[test]
    fn clones_share_state() {
        let engine = InMemoryEngine::new();
        let block = handle(&engine);
        let other = block.clone();
        block.create().unwrap();
        assert!(other.is_bound());
        assert!(other.same_object(&block));
        other.delete().unwrap();
        assert!(matches!(block.props(), Err(AedtError::StaleHandle { .. })));
    }
}
