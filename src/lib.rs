//! aedt-boundaries: typed boundary and native-component marshalling for
//! Ansys Electronics Desktop automation
//!
//! This library holds thermal boundaries and native components as ordered
//! property dictionaries and turns them into the nested argument lists the
//! automation engine expects.
//!
//! # Architecture
//!
//! - **Property dictionaries**: ordered maps with value normalisation,
//!   schema defaults and transient / temperature-dependent variations
//! - **Engine session**: a single-threaded handle to the automation engine
//!   behind the [`aedt::Engine`] trait
//! - **Remote objects**: boundaries and native components with an
//!   `Unbound -> Bound -> Deleted` lifecycle and drift detection
//! - **File formats**: Sherlock power maps and JSON configurations
//!
//! # Modules
//!
//! - [`aedt`]: Boundaries, native components and the engine boundary
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Error types

pub mod aedt;
pub mod config;
pub mod error;
