//! Ingestion of annotation exports.
//!
//! Turns the review tool's exported tasks into per-annotator entities and
//! relations:
//!
//! 1. **Export**: load task lists from JSON files (glob patterns allowed)
//! 2. **Label Studio**: split tasks by annotator, coordinate per-attribute
//!    fragments into entities, link relations
//!
//! ```text
//! export.json → tasks → DocumentPair { reference, prediction }
//! ```

pub mod export;
pub mod label_studio;

// Re-export key types
pub use export::{expand_inputs, load_export, load_exports};
pub use label_studio::{coordinate_entity, parse_annotation, parse_task, task_id, IngestConfig};
