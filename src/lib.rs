//! # VCD
//!
//! In-memory model of the Video Content Description format (schema 4.3.1):
//! scene annotations made of objects, actions, events, contexts and
//! relations, each with a frame range and typed element data, plus the
//! per-frame index, ontologies, coordinate systems and streams.
//!
//! ## Modules
//!
//! - [`util`] - Frame range algebra and errors
//! - [`core`] - Element types, uids, element data, frames, scene records
//! - [`vcd`] - The document: writes, removals, queries, JSON import/export
//! - [`schema`] - Pluggable schema validation
//! - [`settings`] - Document settings
//!
//! ## Example
//!
//! ```ignore
//! use vcd::prelude::*;
//!
//! let mut doc = Vcd::new();
//! let car = doc.add_object(ElementArgs::new("car", "#Car").frames(FrameIntervals::from_range(0, 9)?))?;
//! doc.add_object_data(&car, ElementData::num("speed", 12.5), FrameIntervals::from_range(0, 4)?)?;
//!
//! let text = doc.stringify(true)?;
//! let back = Vcd::from_json_str(&text)?;
//! assert_eq!(back.get_object_data(&car, "speed", Some(2)), doc.get_object_data(&car, "speed", Some(2)));
//! ```

pub mod util;
pub mod core;
pub mod vcd;
pub mod schema;
pub mod settings;

// Re-export commonly used types
pub use util::{Error, FrameIntervals, Result};
pub use vcd::{ElementArgs, Vcd};
pub use settings::Settings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, FrameInterval, FrameIntervals, FrameNum, Result};
    pub use crate::core::{
        CoordinateSystemType, ElementData, ElementType, RdfRole, SetMode, StreamType, Uid,
    };
    pub use crate::vcd::{ElementArgs, Vcd};
    pub use crate::schema::{SchemaValidator, StructuralValidator};
    pub use crate::settings::Settings;
}
