//! Metadata, ontologies, coordinate systems, streams and frame properties.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use super::Vcd;
use crate::core::{CoordinateSystem, CoordinateSystemType, Frame, Stream, StreamType};
use crate::util::{Error, FrameIntervals, FrameNum, Result};

impl Vcd {
    // ========================================================================
    // Metadata
    // ========================================================================

    pub fn get_metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn add_file_version(&mut self, version: impl Into<String>) {
        self.metadata.insert("file_version".into(), Value::String(version.into()));
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        self.metadata.insert("name".into(), Value::String(name.into()));
    }

    pub fn add_annotator(&mut self, annotator: impl Into<String>) {
        self.metadata.insert("annotator".into(), Value::String(annotator.into()));
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.metadata.insert("comment".into(), Value::String(comment.into()));
    }

    /// Merge free-form properties into the metadata.
    pub fn add_metadata_properties(&mut self, properties: Map<String, Value>) {
        self.metadata.extend(properties);
    }

    // ========================================================================
    // Ontologies
    // ========================================================================

    /// Register an ontology and return its uid (`"0"`, `"1"`, ...).
    pub fn add_ontology(&mut self, name: impl Into<String>) -> Result<String> {
        let name = name.into();
        if self.ontologies.values().any(|n| *n == name) {
            return Err(Error::DuplicateOntology(name));
        }
        let uid = (self.ontologies.len()..)
            .map(|i| i.to_string())
            .find(|k| !self.ontologies.contains_key(k))
            .unwrap_or_default();
        debug!(%uid, %name, "add ontology");
        self.ontologies.insert(uid.clone(), name);
        Ok(uid)
    }

    pub fn get_ontology(&self, uid: &str) -> Option<&str> {
        self.ontologies.get(uid).map(String::as_str)
    }

    pub fn get_ontologies(&self) -> &BTreeMap<String, String> {
        &self.ontologies
    }

    // ========================================================================
    // Coordinate systems
    // ========================================================================

    /// Declare a coordinate system. A non-empty `parent` must be declared
    /// already; the new name is appended to its children.
    pub fn add_coordinate_system(
        &mut self,
        name: impl Into<String>,
        cs_type: CoordinateSystemType,
        parent: impl Into<String>,
        pose_wrt_parent: Vec<f64>,
        uid: Option<String>,
    ) -> Result<()> {
        let name = name.into();
        let parent = parent.into();
        if !parent.is_empty() {
            let parent_cs = self
                .coordinate_systems
                .get_mut(&parent)
                .ok_or_else(|| Error::UnknownCoordinateSystem(parent.clone()))?;
            if !parent_cs.children.contains(&name) {
                parent_cs.children.push(name.clone());
            }
        }
        let mut cs = CoordinateSystem::new(cs_type, parent, pose_wrt_parent);
        cs.uid = uid;
        // redeclaring keeps the known children
        if let Some(old) = self.coordinate_systems.get(&name) {
            cs.children = old.children.clone();
        }
        debug!(%name, ?cs_type, parent = %cs.parent, "add coordinate system");
        self.coordinate_systems.insert(name, cs);
        Ok(())
    }

    pub fn has_coordinate_system(&self, name: &str) -> bool {
        self.coordinate_systems.contains_key(name)
    }

    pub fn get_coordinate_system(&self, name: &str) -> Option<&CoordinateSystem> {
        self.coordinate_systems.get(name)
    }

    pub fn get_coordinate_systems(&self) -> &BTreeMap<String, CoordinateSystem> {
        &self.coordinate_systems
    }

    // ========================================================================
    // Streams
    // ========================================================================

    /// Declare (or redeclare) a stream.
    pub fn add_stream(
        &mut self,
        name: impl Into<String>,
        uri: impl Into<String>,
        description: impl Into<String>,
        stream_type: StreamType,
    ) {
        let name = name.into();
        debug!(%name, ?stream_type, "add stream");
        self.streams.insert(name, Stream::new(stream_type, uri, description));
    }

    /// Merge properties into a stream. Without a frame they go to the
    /// stream itself; with a frame they go to that frame's
    /// `frame_properties.streams.<name>.stream_properties`.
    pub fn add_stream_properties(
        &mut self,
        name: &str,
        properties: Map<String, Value>,
        frame: Option<FrameNum>,
    ) -> Result<()> {
        let stream = self.streams.get_mut(name).ok_or_else(|| Error::UnknownStream(name.to_string()))?;
        let Some(f) = frame else {
            stream.stream_properties.get_or_insert_with(Map::new).extend(properties);
            return Ok(());
        };
        let props = self.frame_for_properties(f).frame_properties_mut();
        merge_at(props, &["streams", name, "stream_properties"], properties);
        Ok(())
    }

    pub fn has_stream(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    pub fn get_stream(&self, name: &str) -> Option<&Stream> {
        self.streams.get(name)
    }

    pub fn get_streams(&self) -> &BTreeMap<String, Stream> {
        &self.streams
    }

    // ========================================================================
    // Frame properties
    // ========================================================================

    /// Merge properties into a frame, creating it if needed.
    pub fn add_frame_properties(
        &mut self,
        frame: FrameNum,
        timestamp: Option<String>,
        properties: Map<String, Value>,
    ) {
        let props = self.frame_for_properties(frame).frame_properties_mut();
        if let Some(ts) = timestamp {
            props.insert("timestamp".into(), Value::String(ts));
        }
        props.extend(properties);
    }

    /// Store a transform record under `frame_properties.transforms.<name>`.
    pub fn add_transform(&mut self, frame: FrameNum, name: impl Into<String>, transform: Value) {
        let props = self.frame_for_properties(frame).frame_properties_mut();
        let mut entry = Map::new();
        entry.insert(name.into(), transform);
        merge_at(props, &["transforms"], entry);
    }

    /// Frame that is about to carry properties; joins the document range.
    fn frame_for_properties(&mut self, frame: FrameNum) -> &mut Frame {
        self.frame_intervals = self.frame_intervals.union(&FrameIntervals::from_frame(frame));
        self.frames.entry(frame).or_default()
    }
}

/// Merge `properties` into the object found by following `path`, creating
/// (or overwriting non-object) levels on the way.
fn merge_at(map: &mut Map<String, Value>, path: &[&str], properties: Map<String, Value>) {
    match path.split_first() {
        None => map.extend(properties),
        Some((key, rest)) => {
            let mut inner = match map.remove(*key) {
                Some(Value::Object(m)) => m,
                _ => Map::new(),
            };
            merge_at(&mut inner, rest, properties);
            map.insert((*key).to_string(), Value::Object(inner));
        }
    }
}
