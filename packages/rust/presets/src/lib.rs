//! JOSM tagging-preset tree, the taxon emitter, and XML serialization.
//!
//! - [`nodes`]: the document tree as plain values
//! - [`emitter`]: grouped taxa → chunks, genus groups and items
//! - [`xml`]: document → `presets.xml` text

pub mod emitter;
pub mod nodes;
pub mod xml;

pub use emitter::{EmitterOptions, chunk_id, emit_table, localized_name};
pub use nodes::{Chunk, Field, Geometry, Group, Item, PresetDocument, PresetNode};
pub use xml::to_xml;
