//! Per-frame index entries.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::{DataTable, ElementData, ElementType, Uid};
use crate::util::{Error, Result};

/// One element inside a frame: a presence marker, optionally carrying the
/// element data valid for that frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameEntry {
    pub data: DataTable,
}

impl FrameEntry {
    fn to_value(&self, element_type: ElementType) -> Value {
        let mut m = Map::new();
        if !self.data.is_empty() {
            m.insert(element_type.data_key().into(), self.data.to_value());
        }
        Value::Object(m)
    }
}

/// Frame-local view: which elements exist at this frame, plus free-form
/// frame properties (timestamp, stream sync, transforms, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    elements: BTreeMap<ElementType, BTreeMap<Uid, FrameEntry>>,
    frame_properties: Option<Map<String, Value>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// No elements and no frame properties.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.frame_properties.is_none()
    }

    pub fn has_element(&self, element_type: ElementType, uid: &Uid) -> bool {
        self.entry(element_type, uid).is_some()
    }

    pub fn entry(&self, element_type: ElementType, uid: &Uid) -> Option<&FrameEntry> {
        self.elements.get(&element_type)?.get(uid)
    }

    /// Entry of an element, created as a bare presence marker if missing.
    pub fn entry_mut(&mut self, element_type: ElementType, uid: &Uid) -> &mut FrameEntry {
        self.elements
            .entry(element_type)
            .or_default()
            .entry(uid.clone())
            .or_default()
    }

    /// Uids of one element type present in this frame.
    pub fn uids(&self, element_type: ElementType) -> impl Iterator<Item = &Uid> {
        self.elements.get(&element_type).into_iter().flat_map(|t| t.keys())
    }

    pub fn entries(&self, element_type: ElementType) -> impl Iterator<Item = (&Uid, &FrameEntry)> {
        self.elements.get(&element_type).into_iter().flatten()
    }

    pub(crate) fn add_element(&mut self, element_type: ElementType, uid: &Uid) {
        self.entry_mut(element_type, uid);
    }

    /// Drop an element entry; an emptied type map is dropped too.
    pub(crate) fn remove_element(&mut self, element_type: ElementType, uid: &Uid) -> bool {
        let Some(table) = self.elements.get_mut(&element_type) else {
            return false;
        };
        let removed = table.remove(uid).is_some();
        if table.is_empty() {
            self.elements.remove(&element_type);
        }
        removed
    }

    pub(crate) fn set_data(&mut self, element_type: ElementType, uid: &Uid, data: ElementData) {
        self.entry_mut(element_type, uid).data.insert(data);
    }

    /// Remove the snapshot of one data name; the presence marker stays.
    pub(crate) fn remove_data(&mut self, element_type: ElementType, uid: &Uid, name: &str) -> bool {
        self.elements
            .get_mut(&element_type)
            .and_then(|t| t.get_mut(uid))
            .is_some_and(|e| e.data.remove(name))
    }

    /// Remove every data snapshot of an element; the presence marker stays.
    pub(crate) fn clear_data(&mut self, element_type: ElementType, uid: &Uid) {
        if let Some(entry) = self.elements.get_mut(&element_type).and_then(|t| t.get_mut(uid)) {
            entry.data.clear();
        }
    }

    pub fn frame_properties(&self) -> Option<&Map<String, Value>> {
        self.frame_properties.as_ref()
    }

    /// Frame properties, created empty if missing.
    pub fn frame_properties_mut(&mut self) -> &mut Map<String, Value> {
        self.frame_properties.get_or_insert_with(Map::new)
    }

    pub fn to_value(&self) -> Value {
        let mut m = Map::new();
        for (element_type, table) in &self.elements {
            let entries = table
                .iter()
                .map(|(uid, entry)| (uid.to_string(), entry.to_value(*element_type)))
                .collect();
            m.insert(element_type.table_key().into(), Value::Object(entries));
        }
        if let Some(props) = &self.frame_properties {
            m.insert("frame_properties".into(), Value::Object(props.clone()));
        }
        Value::Object(m)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let m = value
            .as_object()
            .ok_or_else(|| Error::invalid(format!("frame must be an object, got {value}")))?;
        let mut frame = Frame::new();
        for element_type in ElementType::ALL {
            let Some(table) = m.get(element_type.table_key()) else {
                continue;
            };
            let table = table
                .as_object()
                .ok_or_else(|| Error::invalid(format!("frame '{}' must be an object", element_type.table_key())))?;
            for (uid, entry) in table {
                let uid = Uid::parse(uid)?;
                let entry_mut = frame.entry_mut(element_type, &uid);
                if let Some(data) = entry.get(element_type.data_key()) {
                    entry_mut.data = DataTable::from_value(data)?;
                }
            }
        }
        match m.get("frame_properties") {
            None | Some(Value::Null) => {}
            Some(Value::Object(props)) => frame.frame_properties = Some(props.clone()),
            Some(other) => return Err(Error::invalid(format!("frame_properties must be an object, got {other}"))),
        }
        Ok(frame)
    }
}
