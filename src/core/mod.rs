//! Core layer - value types of the annotation document.
//!
//! This module provides:
//! - [`ElementType`] / [`SetMode`] - Element categories and write modes
//! - [`Uid`] / [`UidAllocator`] - Element identifiers and their allocation
//! - [`ElementData`] / [`DataTable`] - Typed payloads
//! - [`Element`] / [`DataPointer`] / [`RdfEdge`] - Summary records
//! - [`Frame`] - Per-frame index entries
//! - [`CoordinateSystem`] / [`Stream`] - Scene description

mod element_type;
mod uid;
mod element_data;
mod element;
mod frame;
mod scene;

pub use element_type::{ElementType, SetMode};
pub use uid::{is_canonical_uuid, Uid, UidAllocator, UidGenerator, UidMode, UuidV4Generator};
pub use element_data::{DataTable, ElementData, MESH_TYPE};
pub use element::{DataPointer, Element, RdfEdge, RdfRole};
pub use frame::{Frame, FrameEntry};
pub use scene::{CoordinateSystem, CoordinateSystemType, Stream, StreamType};
