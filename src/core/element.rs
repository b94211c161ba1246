//! Element summary records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{DataTable, ElementType, Uid};
use crate::util::{Error, FrameIntervals, FrameNum, Result};

/// Summary-level index entry of one element data name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPointer {
    /// Payload type tag of the pointed data.
    #[serde(rename = "type")]
    pub kind: String,
    /// Frames where the data is defined; empty for static data.
    #[serde(default)]
    pub frame_intervals: FrameIntervals,
    /// Nested attribute name -> attribute payload type.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

/// Side of a relation edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RdfRole {
    Subject,
    Object,
}

/// One edge of a relation: the element it points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdfEdge {
    pub uid: Uid,
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

/// An object, action, event, context or relation.
///
/// Invariant: every pointer range is contained in `frame_intervals`, or empty
/// when the element is static.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub semantic_type: String,
    /// Empty means static.
    pub frame_intervals: FrameIntervals,
    pub ontology_uid: Option<String>,
    pub coordinate_system: Option<String>,
    /// Static data, stored once at the summary level.
    pub data: DataTable,
    pub data_pointers: BTreeMap<String, DataPointer>,
    pub rdf_subjects: Vec<RdfEdge>,
    pub rdf_objects: Vec<RdfEdge>,
}

impl Element {
    pub fn new(name: impl Into<String>, semantic_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semantic_type: semantic_type.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.frame_intervals.is_empty()
    }

    /// Check if the element exists at `frame`, given the document range.
    pub fn is_present_at(&self, frame: FrameNum, doc_range: &FrameIntervals) -> bool {
        if self.is_static() {
            doc_range.has_frame(frame)
        } else {
            self.frame_intervals.has_frame(frame)
        }
    }

    pub fn rdf(&self, role: RdfRole) -> &[RdfEdge] {
        match role {
            RdfRole::Subject => &self.rdf_subjects,
            RdfRole::Object => &self.rdf_objects,
        }
    }

    /// Drop pointers whose range is empty and whose data is not stored at
    /// the summary level.
    pub(crate) fn prune_dangling_pointers(&mut self) {
        let data = &self.data;
        self.data_pointers
            .retain(|name, p| !p.frame_intervals.is_empty() || data.contains_of_kind(&p.kind, name));
    }

    pub fn to_value(&self, element_type: ElementType) -> Result<Value> {
        let mut m = Map::new();
        m.insert("name".into(), Value::String(self.name.clone()));
        m.insert("type".into(), Value::String(self.semantic_type.clone()));
        m.insert("frame_intervals".into(), self.frame_intervals.to_value());
        if let Some(ont) = &self.ontology_uid {
            m.insert("ontology_uid".into(), Value::String(ont.clone()));
        }
        if let Some(cs) = &self.coordinate_system {
            m.insert("coordinate_system".into(), Value::String(cs.clone()));
        }
        if !self.data.is_empty() {
            m.insert(element_type.data_key().into(), self.data.to_value());
        }
        if !self.data_pointers.is_empty() {
            m.insert(element_type.pointers_key().into(), serde_json::to_value(&self.data_pointers)?);
        }
        if element_type == ElementType::Relation {
            m.insert("rdf_subjects".into(), serde_json::to_value(&self.rdf_subjects)?);
            m.insert("rdf_objects".into(), serde_json::to_value(&self.rdf_objects)?);
        }
        Ok(Value::Object(m))
    }

    pub fn from_value(element_type: ElementType, value: &Value) -> Result<Self> {
        let m = value
            .as_object()
            .ok_or_else(|| Error::invalid(format!("{element_type} must be an object")))?;
        let text = |key: &str| -> Result<Option<String>> {
            match m.get(key) {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(Error::invalid(format!("{element_type} '{key}' must be a string, got {other}"))),
            }
        };

        let mut element = Element::new(text("name")?.unwrap_or_default(), text("type")?.unwrap_or_default());
        element.ontology_uid = text("ontology_uid")?;
        element.coordinate_system = text("coordinate_system")?;
        if let Some(fis) = m.get("frame_intervals") {
            element.frame_intervals = FrameIntervals::from_value(fis)?;
        }
        if let Some(data) = m.get(element_type.data_key()) {
            element.data = DataTable::from_value(data)?;
        }
        if let Some(pointers) = m.get(element_type.pointers_key()) {
            element.data_pointers = serde_json::from_value(pointers.clone())?;
        }
        if let Some(edges) = m.get("rdf_subjects") {
            element.rdf_subjects = serde_json::from_value(edges.clone())?;
        }
        if let Some(edges) = m.get("rdf_objects") {
            element.rdf_objects = serde_json::from_value(edges.clone())?;
        }
        Ok(element)
    }
}
