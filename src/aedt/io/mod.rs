//! File formats exchanged with other tools.
//!
//! - [`power_map`]: Sherlock component power CSV
//! - [`configuration`]: JSON export/import of a design's objects

pub mod configuration;
pub mod power_map;

pub use configuration::{
    export_configuration, import_configuration, read_configuration, write_configuration,
    ConfigurationFile, GeneralSection, ImportFailure, ImportSummary,
};
pub use power_map::{
    assign_blocks_from_power_map, import_power_map, parse_power_map, PowerEntry, PowerMapReport,
};
