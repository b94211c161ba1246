//! Element and element data writes.
//!
//! Every write updates the element summary first, then reconciles the frame
//! index and the document range against the element's old and new ranges.
//! Preconditions are checked before anything is touched.

use tracing::{debug, trace};

use super::{ElementArgs, Vcd};
use crate::core::{DataPointer, ElementData, ElementType, RdfEdge, RdfRole, SetMode, Uid, MESH_TYPE};
use crate::util::{Error, FrameInterval, FrameIntervals, FrameNum, Result};

pub(super) fn unknown_entity(element_type: ElementType, uid: &Uid) -> Error {
    Error::UnknownEntity { element_type: element_type.name().to_string(), uid: uid.to_string() }
}

impl Vcd {
    // ========================================================================
    // Elements
    // ========================================================================

    /// Create or update an element and return its uid.
    ///
    /// In union mode the element range becomes `old ∪ args.frame_intervals`;
    /// in replace mode it becomes exactly `args.frame_intervals`. An empty
    /// range makes the element static.
    #[tracing::instrument(level = "debug", skip_all, fields(element_type = %element_type))]
    pub fn set_element(&mut self, element_type: ElementType, args: ElementArgs) -> Result<Uid> {
        self.check_references(&args)?;
        let uid = self.allocator.allocate(element_type, args.uid.clone())?;
        self.apply_element(element_type, &uid, args);
        Ok(uid)
    }

    pub fn add_object(&mut self, args: ElementArgs) -> Result<Uid> {
        self.set_element(ElementType::Object, args)
    }

    pub fn add_action(&mut self, args: ElementArgs) -> Result<Uid> {
        self.set_element(ElementType::Action, args)
    }

    pub fn add_event(&mut self, args: ElementArgs) -> Result<Uid> {
        self.set_element(ElementType::Event, args)
    }

    pub fn add_context(&mut self, args: ElementArgs) -> Result<Uid> {
        self.set_element(ElementType::Context, args)
    }

    /// Create or update a relation. In replace mode the edges of an existing
    /// relation are dropped first.
    pub fn add_relation(&mut self, args: ElementArgs) -> Result<Uid> {
        self.check_references(&args)?;
        if args.mode == SetMode::Replace {
            if let Some(relation) = args.uid.as_ref().and_then(|uid| self.table_mut(ElementType::Relation).get_mut(uid)) {
                relation.rdf_subjects.clear();
                relation.rdf_objects.clear();
            }
        }
        self.set_element(ElementType::Relation, args)
    }

    /// Append an edge to a relation.
    pub fn add_rdf(
        &mut self,
        relation_uid: &Uid,
        role: RdfRole,
        element_type: ElementType,
        element_uid: &Uid,
    ) -> Result<()> {
        if !self.has(element_type, element_uid) {
            return Err(unknown_entity(element_type, element_uid));
        }
        let relation = self
            .table_mut(ElementType::Relation)
            .get_mut(relation_uid)
            .ok_or_else(|| Error::UnknownRelation(relation_uid.to_string()))?;
        let edge = RdfEdge { uid: element_uid.clone(), element_type };
        match role {
            RdfRole::Subject => relation.rdf_subjects.push(edge),
            RdfRole::Object => relation.rdf_objects.push(edge),
        }
        debug!(relation = %relation_uid, ?role, %element_type, uid = %element_uid, "add rdf");
        Ok(())
    }

    /// Create or update a relation and attach one subject and one object.
    pub fn add_relation_subject_object(
        &mut self,
        args: ElementArgs,
        subject: (ElementType, &Uid),
        object: (ElementType, &Uid),
    ) -> Result<Uid> {
        for (element_type, uid) in [subject, object] {
            if !self.has(element_type, uid) {
                return Err(unknown_entity(element_type, uid));
            }
        }
        let relation = self.add_relation(args)?;
        self.add_rdf(&relation, RdfRole::Subject, subject.0, subject.1)?;
        self.add_rdf(&relation, RdfRole::Object, object.0, object.1)?;
        Ok(relation)
    }

    fn check_references(&self, args: &ElementArgs) -> Result<()> {
        if let Some(ont) = &args.ontology_uid {
            if !self.ontologies.contains_key(ont) {
                return Err(Error::UnknownOntology(ont.clone()));
            }
        }
        if let Some(cs) = &args.coordinate_system {
            if !self.coordinate_systems.contains_key(cs) {
                return Err(Error::UnknownCoordinateSystem(cs.clone()));
            }
        }
        Ok(())
    }

    /// Upsert the summary record, then reconcile frames. `args.uid` is ignored.
    fn apply_element(&mut self, element_type: ElementType, uid: &Uid, args: ElementArgs) {
        let ElementArgs { name, semantic_type, frame_intervals, ontology_uid, coordinate_system, mode, .. } = args;

        let table = self.table_mut(element_type);
        let existed = table.contains_key(uid);
        let element = table.entry(uid.clone()).or_default();
        let old = element.frame_intervals.clone();
        let target = match mode {
            SetMode::Union => old.union(&frame_intervals),
            SetMode::Replace => frame_intervals,
        };

        if let Some(name) = name {
            element.name = name;
        }
        if let Some(semantic_type) = semantic_type {
            element.semantic_type = semantic_type;
        }
        if ontology_uid.is_some() {
            element.ontology_uid = ontology_uid;
        }
        if coordinate_system.is_some() {
            element.coordinate_system = coordinate_system;
        }
        element.frame_intervals = target.clone();
        for pointer in element.data_pointers.values_mut() {
            pointer.frame_intervals = if target.is_empty() {
                FrameIntervals::new()
            } else {
                target.intersection(&pointer.frame_intervals)
            };
        }
        debug!(%element_type, %uid, existed, old = %old, new = %target, "set element");

        if !target.is_empty() {
            let added: FrameIntervals = target
                .frames()
                .filter(|f| !old.has_frame(*f))
                .map(FrameInterval::single)
                .collect();
            self.add_presence(element_type, uid, &added);

            if existed && old.is_empty() {
                // static -> dynamic: leave every frame outside the new range
                let outside: Vec<FrameNum> = self.frame_intervals.frames().filter(|f| !target.has_frame(*f)).collect();
                for f in outside {
                    self.remove_presence(element_type, uid, f);
                }
            }
            for f in old.frames().filter(|f| !target.has_frame(*f)) {
                self.remove_presence(element_type, uid, f);
            }
        } else {
            if !old.is_empty() {
                // dynamic -> static: frame-local data does not survive
                for f in old.frames() {
                    if let Some(frame) = self.frames.get_mut(&f) {
                        frame.clear_data(element_type, uid);
                    }
                }
                if let Some(element) = self.table_mut(element_type).get_mut(uid) {
                    element.prune_dangling_pointers();
                }
                for f in old.frames() {
                    self.remove_presence(element_type, uid, f);
                }
            }
            // frame-less relations stay frame-less
            if element_type != ElementType::Relation {
                let doc_range = self.frame_intervals.clone();
                for f in doc_range.frames() {
                    self.frames.entry(f).or_default().add_element(element_type, uid);
                }
            }
        }
    }

    /// Mark an element as present in `frames`, creating frames and growing
    /// the document range.
    fn add_presence(&mut self, element_type: ElementType, uid: &Uid, frames: &FrameIntervals) {
        for f in frames.frames() {
            self.frames.entry(f).or_default().add_element(element_type, uid);
        }
        self.frame_intervals = self.frame_intervals.union(frames);
    }

    /// Drop an element from a frame; a frame left empty is deleted and cut
    /// out of the document range.
    pub(super) fn remove_presence(&mut self, element_type: ElementType, uid: &Uid, frame: FrameNum) {
        let Some(entry) = self.frames.get_mut(&frame) else {
            return;
        };
        entry.remove_element(element_type, uid);
        if entry.is_empty() {
            self.frames.remove(&frame);
            self.frame_intervals.remove_frame(frame);
            trace!(frame, "frame emptied");
        }
    }

    // ========================================================================
    // Element data
    // ========================================================================

    /// Attach data to an existing element.
    ///
    /// The element range is widened to cover `frame_intervals` first. A
    /// union-mode write with an empty range is treated as a replace (static
    /// data), except for meshes which may carry static and dynamic parts.
    #[tracing::instrument(level = "debug", skip_all, fields(element_type = %element_type, uid = %uid, data = data.name()))]
    pub fn set_element_data(
        &mut self,
        element_type: ElementType,
        uid: &Uid,
        data: ElementData,
        frame_intervals: FrameIntervals,
        mode: SetMode,
    ) -> Result<()> {
        let element = self.table(element_type).get(uid).ok_or_else(|| unknown_entity(element_type, uid))?;
        if let Some(cs) = data.coordinate_system() {
            if !self.coordinate_systems.contains_key(cs) {
                return Err(Error::UnknownCoordinateSystem(cs.to_string()));
            }
        }

        let is_mesh = data.kind() == MESH_TYPE;
        let mode = if frame_intervals.is_empty() && mode == SetMode::Union && !is_mesh {
            SetMode::Replace
        } else {
            mode
        };
        let element_range = element.frame_intervals.clone();
        let old_pointer = element.data_pointers.get(data.name()).map(|p| p.frame_intervals.clone());
        debug!(kind = data.kind(), frames = %frame_intervals, ?mode, "set element data");

        let pointer_range = match mode {
            SetMode::Replace if !frame_intervals.is_empty() => {
                self.reframe_element(element_type, uid, element_range.union(&frame_intervals), SetMode::Replace);
                if let Some(old) = &old_pointer {
                    let stale: Vec<FrameNum> = old.frames().filter(|f| !frame_intervals.has_frame(*f)).collect();
                    self.remove_data_at(element_type, uid, data.name(), stale);
                }
                if let Some(element) = self.table_mut(element_type).get_mut(uid) {
                    element.data.remove(data.name());
                }
                self.write_data_at(element_type, uid, &data, &frame_intervals);
                frame_intervals
            }
            SetMode::Replace => {
                if let Some(old) = &old_pointer {
                    self.remove_data_at(element_type, uid, data.name(), old.frames().collect());
                }
                if let Some(element) = self.table_mut(element_type).get_mut(uid) {
                    element.data.insert(data.clone());
                }
                FrameIntervals::new()
            }
            SetMode::Union if !frame_intervals.is_empty() => {
                self.reframe_element(element_type, uid, frame_intervals.clone(), SetMode::Union);
                self.write_data_at(element_type, uid, &data, &frame_intervals);
                old_pointer.unwrap_or_default().union(&frame_intervals)
            }
            SetMode::Union => {
                if let Some(element) = self.table_mut(element_type).get_mut(uid) {
                    element.data.insert(data.clone());
                }
                old_pointer.unwrap_or_default()
            }
        };
        self.set_pointer(element_type, uid, &data, pointer_range);
        Ok(())
    }

    pub fn add_object_data(&mut self, uid: &Uid, data: ElementData, frame_intervals: FrameIntervals) -> Result<()> {
        self.set_element_data(ElementType::Object, uid, data, frame_intervals, SetMode::Union)
    }

    pub fn add_action_data(&mut self, uid: &Uid, data: ElementData, frame_intervals: FrameIntervals) -> Result<()> {
        self.set_element_data(ElementType::Action, uid, data, frame_intervals, SetMode::Union)
    }

    pub fn add_event_data(&mut self, uid: &Uid, data: ElementData, frame_intervals: FrameIntervals) -> Result<()> {
        self.set_element_data(ElementType::Event, uid, data, frame_intervals, SetMode::Union)
    }

    pub fn add_context_data(&mut self, uid: &Uid, data: ElementData, frame_intervals: FrameIntervals) -> Result<()> {
        self.set_element_data(ElementType::Context, uid, data, frame_intervals, SetMode::Union)
    }

    /// Change only the range of an existing element.
    fn reframe_element(&mut self, element_type: ElementType, uid: &Uid, frame_intervals: FrameIntervals, mode: SetMode) {
        let args = ElementArgs { frame_intervals, mode, ..Default::default() };
        self.apply_element(element_type, uid, args);
    }

    fn write_data_at(&mut self, element_type: ElementType, uid: &Uid, data: &ElementData, frames: &FrameIntervals) {
        for f in frames.frames() {
            self.frames.entry(f).or_default().set_data(element_type, uid, data.clone());
        }
        self.frame_intervals = self.frame_intervals.union(frames);
    }

    fn remove_data_at(&mut self, element_type: ElementType, uid: &Uid, name: &str, frames: Vec<FrameNum>) {
        for f in frames {
            if let Some(frame) = self.frames.get_mut(&f) {
                frame.remove_data(element_type, uid, name);
            }
        }
    }

    fn set_pointer(&mut self, element_type: ElementType, uid: &Uid, data: &ElementData, frame_intervals: FrameIntervals) {
        if let Some(element) = self.table_mut(element_type).get_mut(uid) {
            let pointer = DataPointer {
                kind: data.kind().to_string(),
                frame_intervals,
                attributes: data.attributes().into_iter().collect(),
            };
            element.data_pointers.insert(data.name().to_string(), pointer);
        }
    }
}
