//! Element removal.

use tracing::debug;

use super::Vcd;
use crate::core::{ElementType, Uid};
use crate::util::FrameNum;

impl Vcd {
    /// Remove an element from the summary and from every frame.
    ///
    /// Returns false (and changes nothing) if the element does not exist.
    #[tracing::instrument(level = "debug", skip_all, fields(element_type = %element_type, uid = %uid))]
    pub fn rm_element(&mut self, element_type: ElementType, uid: &Uid) -> bool {
        let Some(element) = self.table_mut(element_type).remove(uid) else {
            return false;
        };
        // a static element may sit in any frame of the document
        let frames: Vec<FrameNum> = if element.is_static() {
            self.frame_intervals.frames().collect()
        } else {
            element.frame_intervals.frames().collect()
        };
        for f in frames {
            self.remove_presence(element_type, uid, f);
        }
        debug!(name = %element.name, "element removed");
        true
    }

    /// Remove every element of a type whose semantic type matches. Returns
    /// the number of removed elements.
    pub fn rm_element_by_type(&mut self, element_type: ElementType, semantic_type: &str) -> usize {
        let uids: Vec<Uid> = self
            .table(element_type)
            .iter()
            .filter(|(_, e)| e.semantic_type == semantic_type)
            .map(|(uid, _)| uid.clone())
            .collect();
        let mut removed = 0;
        for uid in &uids {
            if self.rm_element(element_type, uid) {
                removed += 1;
            }
        }
        removed
    }

    pub fn rm_object(&mut self, uid: &Uid) -> bool {
        self.rm_element(ElementType::Object, uid)
    }

    pub fn rm_action(&mut self, uid: &Uid) -> bool {
        self.rm_element(ElementType::Action, uid)
    }

    pub fn rm_event(&mut self, uid: &Uid) -> bool {
        self.rm_element(ElementType::Event, uid)
    }

    pub fn rm_context(&mut self, uid: &Uid) -> bool {
        self.rm_element(ElementType::Context, uid)
    }

    pub fn rm_relation(&mut self, uid: &Uid) -> bool {
        self.rm_element(ElementType::Relation, uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::FrameIntervals;
    use crate::vcd::ElementArgs;

    #[test]
    fn test_remove_dynamic_element_clears_frames() {
        let mut vcd = Vcd::new();
        let uid = vcd
            .add_object(ElementArgs::new("car", "car").frames(FrameIntervals::from_range(0, 2).unwrap()))
            .unwrap();
        assert_eq!(vcd.frame_intervals, FrameIntervals::from_range(0, 2).unwrap());
        assert!(vcd.rm_object(&uid));
        assert!(vcd.frame_intervals.is_empty());
        assert!(vcd.frames.is_empty());
        assert!(!vcd.rm_object(&uid));
    }

    #[test]
    fn test_remove_static_element_from_all_frames() {
        let mut vcd = Vcd::new();
        let room = vcd
            .add_object(ElementArgs::new("room", "Room").frames(FrameIntervals::from_range(0, 3).unwrap()))
            .unwrap();
        let child = vcd.add_object(ElementArgs::new("child", "Child")).unwrap();
        assert!(vcd.rm_object(&child));
        assert!(vcd.frames.values().all(|f| !f.has_element(ElementType::Object, &child)));
        assert!(vcd.rm_object(&room));
        assert!(vcd.frames.is_empty());
    }

    #[test]
    fn test_remove_by_type() {
        let mut vcd = Vcd::new();
        for name in ["a", "b"] {
            vcd.add_object(ElementArgs::new(name, "Car")).unwrap();
        }
        let ped = vcd.add_object(ElementArgs::new("p", "Pedestrian")).unwrap();
        assert_eq!(vcd.rm_element_by_type(ElementType::Object, "Car"), 2);
        assert_eq!(vcd.table(ElementType::Object).keys().collect::<Vec<_>>(), vec![&ped]);
    }
}
