//! The automation boundary.
//!
//! Everything this crate sends to the external engine goes through the
//! [`Engine`] trait, reached via an explicit [`EngineSession`] handle.
//!
//! # Threading
//!
//! The engine connection is a single, non-reentrant resource. A session is
//! an `Rc` handle, so it (and every boundary or component holding one) is
//! neither `Send` nor `Sync`. Callers that need multi-threaded access must
//! serialise it themselves, e.g. by owning the session on one thread and
//! sending it requests.
//!
//! ```compile_fail
//! use aedt_boundaries::aedt::{EngineSession, InMemoryEngine};
//!
//! let session = EngineSession::new(InMemoryEngine::new());
//! std::thread::spawn(move || drop(session));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::props::{Arg, FlatProperties};

/// Engine object that receives a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// The design's boundary module (`oModule`).
    Boundary,
    /// The 3D modeler editor (`oEditor`).
    Editor,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boundary => f.write_str("boundary"),
            Self::Editor => f.write_str("editor"),
        }
    }
}

/// What the engine returned from a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// A single object name.
    Name(String),
    /// A list of names.
    Names(Vec<String>),
    /// A status flag.
    Bool(bool),
    /// Nothing.
    Empty,
}

impl Reply {
    /// Returns true unless the reply is empty, `false`, or an empty name.
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Name(name) => !name.is_empty(),
            Self::Names(names) => names.iter().any(|n| !n.is_empty()),
            Self::Bool(ok) => *ok,
            Self::Empty => false,
        }
    }

    /// First non-empty name in the reply.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) if !name.is_empty() => Some(name),
            Self::Names(names) => names.iter().map(String::as_str).find(|n| !n.is_empty()),
            _ => None,
        }
    }
}

/// The external automation engine.
///
/// Implementations translate calls into the engine's native scripting API.
/// Every call is synchronous.
pub trait Engine {
    /// Invokes `method` on `target` with a nested argument list.
    fn call(&mut self, target: Target, method: &str, args: &[Arg]) -> Reply;

    /// Reads back the current properties of a named object.
    fn properties(&self, target: Target, name: &str) -> Option<FlatProperties>;

    /// Monotonic revision of a named object, if the engine tracks one.
    fn revision(&self, _target: Target, _name: &str) -> Option<u64> {
        None
    }

    /// Names of the geometry objects in the design.
    fn object_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Shared handle to the engine connection.
///
/// Cloning is cheap; all clones talk to the same engine.
#[derive(Clone)]
pub struct EngineSession {
    engine: Rc<RefCell<dyn Engine>>,
}

impl EngineSession {
    /// Wraps an engine in a session.
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
        }
    }

    /// Invokes `method` on `target`.
    pub fn call(&self, target: Target, method: &str, args: &[Arg]) -> Reply {
        tracing::debug!(%target, method, "engine call");
        let reply = self.engine.borrow_mut().call(target, method, args);
        tracing::trace!(%target, method, ?reply, "engine reply");
        reply
    }

    /// Reads back the properties of a named object.
    #[must_use]
    pub fn properties(&self, target: Target, name: &str) -> Option<FlatProperties> {
        self.engine.borrow().properties(target, name)
    }

    /// Revision of a named object, if tracked.
    #[must_use]
    pub fn revision(&self, target: Target, name: &str) -> Option<u64> {
        self.engine.borrow().revision(target, name)
    }

    /// Geometry object names in the design.
    #[must_use]
    pub fn object_names(&self) -> Vec<String> {
        self.engine.borrow().object_names()
    }

    /// Returns true if both handles share one engine.
    #[must_use]
    pub fn same_engine(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.engine, &other.engine)
    }
}

impl fmt::Debug for EngineSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSession")
            .field("handles", &Rc::strong_count(&self.engine))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo {
        calls: usize,
    }

    impl Engine for Echo {
        fn call(&mut self, _target: Target, method: &str, _args: &[Arg]) -> Reply {
            self.calls += 1;
            Reply::Name(method.to_string())
        }

        fn properties(&self, _target: Target, _name: &str) -> Option<FlatProperties> {
            None
        }
    }

    #[test]
    fn reply_success() {
        assert!(Reply::Name("Block_1".into()).is_success());
        assert!(!Reply::Name(String::new()).is_success());
        assert!(Reply::Names(vec!["PCB_1".into()]).is_success());
        assert!(!Reply::Names(Vec::new()).is_success());
        assert!(Reply::Bool(true).is_success());
        assert!(!Reply::Bool(false).is_success());
        assert!(!Reply::Empty.is_success());
    }

    #[test]
    fn reply_first_name() {
        let reply = Reply::Names(vec![String::new(), "Fan_1".into()]);
        assert_eq!(reply.first_name(), Some("Fan_1"));
        assert_eq!(Reply::Bool(true).first_name(), None);
    }

    #[test]
    fn clones_share_engine() {
        let session = EngineSession::new(Echo { calls: 0 });
        let other = session.clone();
        assert!(session.same_engine(&other));

        let reply = other.call(Target::Boundary, "AssignBlockBoundary", &[]);
        assert_eq!(reply, Reply::Name("AssignBlockBoundary".into()));
        assert_eq!(session.revision(Target::Boundary, "x"), None);
        assert!(session.object_names().is_empty());
    }
}
