//! Schema validation of serialized documents.
//!
//! Validation is an oracle: it takes a JSON document and returns a list of
//! human readable messages, empty when the document conforms. Plug a full
//! JSON-Schema validator in through [`SchemaValidator`]; the built-in
//! [`StructuralValidator`] checks the shape the library itself relies on.

use serde_json::{Map, Value};

use crate::core::{is_canonical_uuid, ElementType};
use crate::util::FrameIntervals;

/// Pass/fail oracle over a serialized document.
pub trait SchemaValidator {
    /// Validation messages; empty means valid.
    fn validate(&self, document: &Value) -> Vec<String>;
}

impl<F: Fn(&Value) -> Vec<String>> SchemaValidator for F {
    fn validate(&self, document: &Value) -> Vec<String> {
        self(document)
    }
}

/// Checks the document structure: root key, metadata, frame keys, uid keys,
/// frame intervals and the mandatory fields of elements and pointers.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructuralValidator;

impl SchemaValidator for StructuralValidator {
    fn validate(&self, document: &Value) -> Vec<String> {
        let mut errors = Vec::new();
        let Some(root) = document.get("vcd").and_then(Value::as_object) else {
            errors.push("/: missing 'vcd' root object".to_string());
            return errors;
        };

        match root.get("metadata").and_then(Value::as_object) {
            None => errors.push("/vcd/metadata: missing metadata object".to_string()),
            Some(m) if !m.get("schema_version").is_some_and(Value::is_string) => {
                errors.push("/vcd/metadata/schema_version: missing or not a string".to_string())
            }
            Some(_) => {}
        }

        if let Some(fis) = root.get("frame_intervals") {
            check_frame_intervals(fis, "/vcd/frame_intervals", &mut errors);
        }

        if let Some(frames) = root.get("frames") {
            match frames.as_object() {
                None => errors.push("/vcd/frames: not an object".to_string()),
                Some(frames) => {
                    for (key, frame) in frames {
                        let path = format!("/vcd/frames/{key}");
                        if key.parse::<i64>().is_err() {
                            errors.push(format!("{path}: frame key is not an integer"));
                        }
                        check_frame(frame, &path, &mut errors);
                    }
                }
            }
        }

        for element_type in ElementType::ALL {
            let Some(table) = root.get(element_type.table_key()) else {
                continue;
            };
            let path = format!("/vcd/{}", element_type.table_key());
            let Some(table) = table.as_object() else {
                errors.push(format!("{path}: not an object"));
                continue;
            };
            for (uid, element) in table {
                check_element(element_type, uid, element, &format!("{path}/{uid}"), &mut errors);
            }
        }

        if let Some(ontologies) = root.get("ontologies") {
            match ontologies.as_object() {
                None => errors.push("/vcd/ontologies: not an object".to_string()),
                Some(o) => {
                    for (k, v) in o {
                        if !v.is_string() {
                            errors.push(format!("/vcd/ontologies/{k}: not a string"));
                        }
                    }
                }
            }
        }

        check_named_table(root, "coordinate_systems", &["type", "parent", "pose_wrt_parent", "children"], &mut errors);
        check_named_table(root, "streams", &["type"], &mut errors);
        errors
    }
}

fn check_frame_intervals(value: &Value, path: &str, errors: &mut Vec<String>) {
    if !value.is_array() {
        errors.push(format!("{path}: not an array"));
        return;
    }
    if let Err(e) = FrameIntervals::from_value(value) {
        errors.push(format!("{path}: {e}"));
    }
}

fn is_uid_key(uid: &str) -> bool {
    (!uid.is_empty() && uid.bytes().all(|b| b.is_ascii_digit())) || is_canonical_uuid(uid)
}

fn check_frame(frame: &Value, path: &str, errors: &mut Vec<String>) {
    let Some(frame) = frame.as_object() else {
        errors.push(format!("{path}: not an object"));
        return;
    };
    for element_type in ElementType::ALL {
        let Some(table) = frame.get(element_type.table_key()) else {
            continue;
        };
        let Some(table) = table.as_object() else {
            errors.push(format!("{path}/{}: not an object", element_type.table_key()));
            continue;
        };
        for (uid, entry) in table {
            let entry_path = format!("{path}/{}/{uid}", element_type.table_key());
            if !is_uid_key(uid) {
                errors.push(format!("{entry_path}: invalid uid"));
            }
            if let Some(data) = entry.get(element_type.data_key()) {
                check_data(data, &format!("{entry_path}/{}", element_type.data_key()), errors);
            }
        }
    }
    if frame.get("frame_properties").is_some_and(|p| !p.is_object()) {
        errors.push(format!("{path}/frame_properties: not an object"));
    }
}

fn check_data(data: &Value, path: &str, errors: &mut Vec<String>) {
    let Some(groups) = data.as_object() else {
        errors.push(format!("{path}: not an object"));
        return;
    };
    for (kind, items) in groups {
        let Some(items) = items.as_array() else {
            errors.push(format!("{path}/{kind}: not an array"));
            continue;
        };
        for (i, item) in items.iter().enumerate() {
            if !item.get("name").is_some_and(Value::is_string) {
                errors.push(format!("{path}/{kind}/{i}: missing 'name'"));
            }
        }
    }
}

fn check_element(element_type: ElementType, uid: &str, element: &Value, path: &str, errors: &mut Vec<String>) {
    if !is_uid_key(uid) {
        errors.push(format!("{path}: invalid uid"));
    }
    let Some(element) = element.as_object() else {
        errors.push(format!("{path}: not an object"));
        return;
    };
    for key in ["name", "type"] {
        if !element.get(key).is_some_and(Value::is_string) {
            errors.push(format!("{path}/{key}: missing or not a string"));
        }
    }
    if let Some(fis) = element.get("frame_intervals") {
        check_frame_intervals(fis, &format!("{path}/frame_intervals"), errors);
    }
    if let Some(data) = element.get(element_type.data_key()) {
        check_data(data, &format!("{path}/{}", element_type.data_key()), errors);
    }
    if let Some(pointers) = element.get(element_type.pointers_key()) {
        let pointers_path = format!("{path}/{}", element_type.pointers_key());
        match pointers.as_object() {
            None => errors.push(format!("{pointers_path}: not an object")),
            Some(pointers) => {
                for (name, p) in pointers {
                    let p_path = format!("{pointers_path}/{name}");
                    if !p.get("type").is_some_and(Value::is_string) {
                        errors.push(format!("{p_path}/type: missing or not a string"));
                    }
                    match p.get("frame_intervals") {
                        None => errors.push(format!("{p_path}/frame_intervals: missing")),
                        Some(fis) => check_frame_intervals(fis, &format!("{p_path}/frame_intervals"), errors),
                    }
                }
            }
        }
    }
    if element_type == ElementType::Relation {
        for key in ["rdf_subjects", "rdf_objects"] {
            if !element.get(key).is_some_and(Value::is_array) {
                errors.push(format!("{path}/{key}: missing or not an array"));
            }
        }
    }
}

fn check_named_table(root: &Map<String, Value>, key: &str, required: &[&str], errors: &mut Vec<String>) {
    let Some(table) = root.get(key) else {
        return;
    };
    let Some(table) = table.as_object() else {
        errors.push(format!("/vcd/{key}: not an object"));
        return;
    };
    for (name, entry) in table {
        for field in required {
            if entry.get(*field).is_none() {
                errors.push(format!("/vcd/{key}/{name}/{field}: missing"));
            }
        }
    }
}
