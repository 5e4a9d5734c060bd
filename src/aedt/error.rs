//! Error types for boundary and native component operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for AEDT marshalling operations.
pub type AedtResult<T> = Result<T, AedtError>;

/// A caller-supplied value failed a local precondition.
///
/// Validation errors are always raised before any engine call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value is well-formed but cannot be used in this design.
    #[error("Unsupported configuration for '{quantity}': {message}")]
    UnsupportedConfiguration {
        /// Quantity the value was assigned to.
        quantity: String,
        /// Description of what's wrong.
        message: String,
    },

    /// An argument has the wrong shape or an unknown value.
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        /// Argument name.
        argument: String,
        /// Description of what's wrong.
        message: String,
    },

    /// An object with this name already exists in the design.
    #[error("Name already in use: {name}")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
}

impl ValidationError {
    /// Creates an unsupported configuration error.
    pub fn unsupported(quantity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            quantity: quantity.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur while marshalling objects to and from the engine.
#[derive(Debug, Error)]
pub enum AedtError {
    /// Local validation failed; nothing was sent to the engine.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The engine refused to create the object.
    #[error("Engine rejected creation of '{name}' ({method})")]
    CreationRejected {
        /// Object name.
        name: String,
        /// Engine method that was called.
        method: String,
    },

    /// The engine refused an edit; the local copy was left untouched.
    #[error("Engine rejected update of '{name}' ({method})")]
    CommitRejected {
        /// Object name.
        name: String,
        /// Engine method that was called.
        method: String,
    },

    /// The engine refused to delete the object.
    #[error("Engine rejected deletion of '{name}' ({method})")]
    DeletionRejected {
        /// Object name.
        name: String,
        /// Engine method that was called.
        method: String,
    },

    /// The handle refers to an object that has been deleted.
    #[error("Stale handle: '{name}' has been deleted")]
    StaleHandle {
        /// Name the object had when it was deleted.
        name: String,
    },

    /// The object has not been created in the engine yet.
    #[error("Object '{name}' is not bound to the engine")]
    NotBound {
        /// Object name.
        name: String,
    },

    /// `create()` was called on an object that already exists in the engine.
    #[error("Object '{name}' is already bound to the engine")]
    AlreadyBound {
        /// Object name.
        name: String,
    },

    /// The engine no longer reports properties for a bound object.
    #[error("Engine has no object named '{name}'")]
    RemoteMissing {
        /// Object name.
        name: String,
    },

    /// Failed to open or read a file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON input or unserialisable output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AedtError {
    /// Creates a creation rejected error.
    pub fn creation_rejected(name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::CreationRejected {
            name: name.into(),
            method: method.into(),
        }
    }

    /// Creates a commit rejected error.
    pub fn commit_rejected(name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::CommitRejected {
            name: name.into(),
            method: method.into(),
        }
    }

    /// Creates a deletion rejected error.
    pub fn deletion_rejected(name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::DeletionRejected {
            name: name.into(),
            method: method.into(),
        }
    }

    /// Creates a stale handle error.
    pub fn stale_handle(name: impl Into<String>) -> Self {
        Self::StaleHandle { name: name.into() }
    }

    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the error was raised before contacting the engine.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
