//! Read-only queries.

use std::collections::BTreeMap;

use super::Vcd;
use crate::core::{DataPointer, Element, ElementData, ElementType, Frame, Uid};
use crate::util::{Error, FrameIntervals, FrameNum, Result};

impl Vcd {
    // === Existence ===

    pub fn has(&self, element_type: ElementType, uid: &Uid) -> bool {
        self.table(element_type).contains_key(uid)
    }

    pub fn has_elements(&self, element_type: ElementType) -> bool {
        !self.table(element_type).is_empty()
    }

    pub fn has_frame(&self, frame: FrameNum) -> bool {
        self.frames.contains_key(&frame)
    }

    /// Check if the element has a data pointer named `name`.
    pub fn has_element_data(&self, element_type: ElementType, uid: &Uid, name: &str) -> bool {
        self.get_element_data_pointer(element_type, uid, name).is_some()
    }

    // === Elements ===

    pub fn get_element(&self, element_type: ElementType, uid: &Uid) -> Option<&Element> {
        self.table(element_type).get(uid)
    }

    pub fn get_object(&self, uid: &Uid) -> Option<&Element> {
        self.get_element(ElementType::Object, uid)
    }

    pub fn get_action(&self, uid: &Uid) -> Option<&Element> {
        self.get_element(ElementType::Action, uid)
    }

    pub fn get_event(&self, uid: &Uid) -> Option<&Element> {
        self.get_element(ElementType::Event, uid)
    }

    pub fn get_context(&self, uid: &Uid) -> Option<&Element> {
        self.get_element(ElementType::Context, uid)
    }

    pub fn get_relation(&self, uid: &Uid) -> Option<&Element> {
        self.get_element(ElementType::Relation, uid)
    }

    /// All elements of a type, keyed by uid.
    pub fn get_elements(&self, element_type: ElementType) -> &BTreeMap<Uid, Element> {
        self.table(element_type)
    }

    /// Uid of the first element named `name`.
    pub fn get_element_uid_by_name(&self, element_type: ElementType, name: &str) -> Option<&Uid> {
        self.table(element_type).iter().find(|(_, e)| e.name == name).map(|(uid, _)| uid)
    }

    pub fn get_elements_uids(&self, element_type: ElementType) -> Vec<Uid> {
        self.table(element_type).keys().cloned().collect()
    }

    /// Uids of elements with the given semantic type.
    pub fn get_elements_of_type(&self, element_type: ElementType, semantic_type: &str) -> Vec<Uid> {
        self.table(element_type)
            .iter()
            .filter(|(_, e)| e.semantic_type == semantic_type)
            .map(|(uid, _)| uid.clone())
            .collect()
    }

    /// Uids of elements holding a data pointer named `name`.
    pub fn get_elements_with_element_data_name(&self, element_type: ElementType, name: &str) -> Vec<Uid> {
        self.table(element_type)
            .iter()
            .filter(|(_, e)| e.data_pointers.contains_key(name))
            .map(|(uid, _)| uid.clone())
            .collect()
    }

    pub fn get_num_elements(&self, element_type: ElementType) -> usize {
        self.table(element_type).len()
    }

    pub fn get_element_frame_intervals(&self, element_type: ElementType, uid: &Uid) -> Option<&FrameIntervals> {
        self.get_element(element_type, uid).map(|e| &e.frame_intervals)
    }

    /// Check if a relation is scoped to frames. Fails for unknown relations.
    pub fn relation_has_frame_intervals(&self, uid: &Uid) -> Result<bool> {
        self.get_relation(uid)
            .map(|r| !r.frame_intervals.is_empty())
            .ok_or_else(|| Error::UnknownRelation(uid.to_string()))
    }

    // === Element data ===

    /// Resolve element data, optionally at a frame.
    ///
    /// With a frame: the frame-local snapshot if there is one, else the
    /// summary copy when the element exists at that frame. Without a frame:
    /// the summary copy. Frame queries on a document without frames give
    /// nothing.
    pub fn get_element_data(
        &self,
        element_type: ElementType,
        uid: &Uid,
        name: &str,
        frame: Option<FrameNum>,
    ) -> Option<&ElementData> {
        let element = self.get_element(element_type, uid)?;
        let Some(f) = frame else {
            return element.data.get(name);
        };
        if self.frame_intervals.is_empty() {
            return None;
        }
        let entry = self.frames.get(&f).and_then(|frame| frame.entry(element_type, uid));
        if let Some(data) = entry.and_then(|e| e.data.get(name)) {
            return Some(data);
        }
        let present = entry.is_some()
            || (element.is_static() && element_type != ElementType::Relation && element.is_present_at(f, &self.frame_intervals));
        if present {
            element.data.get(name)
        } else {
            None
        }
    }

    pub fn get_object_data(&self, uid: &Uid, name: &str, frame: Option<FrameNum>) -> Option<&ElementData> {
        self.get_element_data(ElementType::Object, uid, name, frame)
    }

    pub fn get_action_data(&self, uid: &Uid, name: &str, frame: Option<FrameNum>) -> Option<&ElementData> {
        self.get_element_data(ElementType::Action, uid, name, frame)
    }

    pub fn get_event_data(&self, uid: &Uid, name: &str, frame: Option<FrameNum>) -> Option<&ElementData> {
        self.get_element_data(ElementType::Event, uid, name, frame)
    }

    pub fn get_context_data(&self, uid: &Uid, name: &str, frame: Option<FrameNum>) -> Option<&ElementData> {
        self.get_element_data(ElementType::Context, uid, name, frame)
    }

    pub fn get_element_data_pointer(&self, element_type: ElementType, uid: &Uid, name: &str) -> Option<&DataPointer> {
        self.get_element(element_type, uid)?.data_pointers.get(name)
    }

    /// Range of an element data; empty when the data is static.
    pub fn get_element_data_frame_intervals(
        &self,
        element_type: ElementType,
        uid: &Uid,
        name: &str,
    ) -> Option<&FrameIntervals> {
        self.get_element_data_pointer(element_type, uid, name).map(|p| &p.frame_intervals)
    }

    /// Frames holding a snapshot of the named data, in ascending order.
    pub fn get_frames_with_element_data_name(&self, element_type: ElementType, uid: &Uid, name: &str) -> Vec<FrameNum> {
        let Some(range) = self.get_element_data_frame_intervals(element_type, uid, name) else {
            return Vec::new();
        };
        range
            .frames()
            .filter(|f| {
                self.frames
                    .get(f)
                    .and_then(|frame| frame.entry(element_type, uid))
                    .is_some_and(|e| e.data.contains(name))
            })
            .collect()
    }

    // === Frames ===

    /// Document-wide frame range.
    pub fn get_frame_intervals(&self) -> &FrameIntervals {
        &self.frame_intervals
    }

    pub fn get_frame(&self, frame: FrameNum) -> Option<&Frame> {
        self.frames.get(&frame)
    }

    pub fn frames(&self) -> impl Iterator<Item = (FrameNum, &Frame)> {
        self.frames.iter().map(|(f, frame)| (*f, frame))
    }

    /// Uids of the elements of a type that exist at `frame`: explicit frame
    /// entries, plus elements covering the frame, plus static elements
    /// (relations excluded) when the frame is in the document range.
    pub fn get_elements_at_frame(&self, element_type: ElementType, frame: FrameNum) -> Vec<Uid> {
        let explicit = self.frames.get(&frame).into_iter().flat_map(|f| f.uids(element_type));
        let implicit = self
            .table(element_type)
            .iter()
            .filter(|(_, e)| {
                !(e.is_static() && element_type == ElementType::Relation) && e.is_present_at(frame, &self.frame_intervals)
            })
            .map(|(uid, _)| uid);
        let mut uids: Vec<Uid> = explicit.chain(implicit).cloned().collect();
        uids.sort();
        uids.dedup();
        uids
    }
}
