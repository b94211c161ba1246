//! The annotation document.
//!
//! [`Vcd`] owns every table of the document: the element summaries (one per
//! element type), the per-frame index, the document-wide frame range and the
//! scene description. Both element views are kept consistent by the write
//! operations in this module; nothing outside hands out mutable access to
//! them.
//!
//! ```ignore
//! use vcd::prelude::*;
//!
//! let mut doc = Vcd::new();
//! let car = doc.add_object(ElementArgs::new("car", "#Car").frames(FrameIntervals::from_range(0, 9)?))?;
//! doc.add_object_data(&car, ElementData::bbox("box", [10.0, 20.0, 40.0, 30.0]), FrameIntervals::from_frame(3))?;
//! println!("{}", doc.stringify(true)?);
//! ```

mod set;
mod remove;
mod query;
mod scene;
mod json;

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::{CoordinateSystem, Element, ElementType, Frame, SetMode, Stream, Uid, UidAllocator, UidGenerator, UidMode};
use crate::settings::Settings;
use crate::util::{FrameIntervals, FrameNum};

/// Arguments of an element write.
///
/// `None` fields leave the stored value untouched when the element exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementArgs {
    pub name: Option<String>,
    pub semantic_type: Option<String>,
    pub frame_intervals: FrameIntervals,
    pub uid: Option<Uid>,
    pub ontology_uid: Option<String>,
    pub coordinate_system: Option<String>,
    pub mode: SetMode,
}

impl ElementArgs {
    /// Static element with an auto-assigned uid, written in union mode.
    pub fn new(name: impl Into<String>, semantic_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            semantic_type: Some(semantic_type.into()),
            ..Default::default()
        }
    }

    pub fn frames(mut self, frame_intervals: FrameIntervals) -> Self {
        self.frame_intervals = frame_intervals;
        self
    }

    pub fn uid(mut self, uid: impl Into<Uid>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn ontology(mut self, ontology_uid: impl Into<String>) -> Self {
        self.ontology_uid = Some(ontology_uid.into());
        self
    }

    pub fn coordinate_system(mut self, cs: impl Into<String>) -> Self {
        self.coordinate_system = Some(cs.into());
        self
    }

    pub fn mode(mut self, mode: SetMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Video content description document.
#[derive(Debug)]
pub struct Vcd {
    metadata: Map<String, Value>,
    ontologies: BTreeMap<String, String>,
    coordinate_systems: BTreeMap<String, CoordinateSystem>,
    streams: BTreeMap<String, Stream>,
    /// Union of every frame that holds elements or frame properties.
    frame_intervals: FrameIntervals,
    frames: BTreeMap<FrameNum, Frame>,
    elements: [BTreeMap<Uid, Element>; 5],
    allocator: UidAllocator,
    settings: Settings,
}

impl Vcd {
    /// Empty document with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let mut vcd = Self {
            metadata: Map::new(),
            ontologies: BTreeMap::new(),
            coordinate_systems: BTreeMap::new(),
            streams: BTreeMap::new(),
            frame_intervals: FrameIntervals::new(),
            frames: BTreeMap::new(),
            elements: Default::default(),
            allocator: UidAllocator::new(),
            settings,
        };
        vcd.reset();
        vcd
    }

    /// Empty document whose UUID-mode uids come from `generator`.
    pub fn with_generator(settings: Settings, generator: impl UidGenerator + 'static) -> Self {
        let mut vcd = Self::with_settings(settings);
        vcd.allocator = UidAllocator::with_generator(generator);
        vcd.reset();
        vcd
    }

    /// Drop all content, keeping settings and the uid generator.
    pub fn reset(&mut self) {
        self.metadata.clear();
        self.metadata
            .insert("schema_version".into(), Value::String(self.settings.schema_version.clone()));
        self.ontologies.clear();
        self.coordinate_systems.clear();
        self.streams.clear();
        self.frame_intervals = FrameIntervals::new();
        self.frames.clear();
        for table in &mut self.elements {
            table.clear();
        }
        self.allocator.reset();
        if self.settings.use_uuid {
            self.allocator.set_all_modes(UidMode::External);
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Switch uid assignment of every element type between UUIDs and
    /// integers. Existing uids are untouched.
    pub fn set_use_uuid(&mut self, use_uuid: bool) {
        self.settings.use_uuid = use_uuid;
        let mode = if use_uuid { UidMode::External } else { UidMode::Integer };
        self.allocator.set_all_modes(mode);
    }

    /// Uid bookkeeping (watermarks and modes).
    pub fn uid_allocator(&self) -> &UidAllocator {
        &self.allocator
    }

    #[inline]
    fn table(&self, element_type: ElementType) -> &BTreeMap<Uid, Element> {
        &self.elements[element_type.index()]
    }

    #[inline]
    fn table_mut(&mut self, element_type: ElementType) -> &mut BTreeMap<Uid, Element> {
        &mut self.elements[element_type.index()]
    }

    /// Rebuild every watermark from the element tables.
    fn recompute_watermarks(&mut self) {
        for element_type in ElementType::ALL {
            let idx = element_type.index();
            self.allocator.recompute(element_type, self.elements[idx].keys());
        }
    }
}

impl Default for Vcd {
    fn default() -> Self {
        Self::new()
    }
}
