//! Decoder for resource-assignment records from the two legacy binary
//! project-file variants. Takes the container's already extracted fixed
//! and variable storage tables, reconstructs assignment entities and
//! derives their calendar-aware planned and completed work curves, then
//! links them into the surrounding task/resource graph.
//!
//! The container reader, calendar model and entity stores live with the
//! caller; this crate consumes them through the types in [`tables`],
//! [`calendar`] and [`model`]. The single entry point is
//! [`decode::AssignmentReader::process`].

pub mod calendar;
pub mod decode;
pub mod fields;
pub mod model;
pub mod rtf;
pub mod tables;
pub mod types;

pub use decode::AssignmentReader;
pub use model::{Assignment, DecodeConfig, FileVariant, ProjectFile, WorkSegment};
