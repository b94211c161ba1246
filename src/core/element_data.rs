//! Element data: named, typed payloads attached to elements.
//!
//! The payload body is kept as a JSON object. The library only relies on the
//! `name` field, the optional `coordinate_system` field and nested
//! `attributes`; every other field is carried verbatim.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::util::{Error, Result};

/// Payload type tag of mesh data, which may be static and dynamic at once.
pub const MESH_TYPE: &str = "mesh";

/// A named payload of a given type (`"bbox"`, `"text"`, `"image"`, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct ElementData {
    kind: String,
    content: Map<String, Value>,
}

impl ElementData {
    /// Create an empty payload of type `kind` named `name`.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        let mut content = Map::new();
        content.insert("name".into(), Value::String(name.into()));
        Self { kind: kind.into(), content }
    }

    /// Wrap an existing JSON body. The body must carry a string `name`.
    pub fn from_parts(kind: impl Into<String>, content: Map<String, Value>) -> Result<Self> {
        let kind = kind.into();
        if !matches!(content.get("name"), Some(Value::String(_))) {
            return Err(Error::invalid(format!("{kind} data without a string 'name'")));
        }
        Ok(Self { kind, content })
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a body field. The `name` field cannot be changed.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if key != "name" {
            self.content.insert(key, value.into());
        }
    }

    /// Payload type tag.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.content.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.content.get(key)
    }

    /// The `val` field, present on most payload types.
    pub fn val(&self) -> Option<&Value> {
        self.content.get("val")
    }

    pub fn content(&self) -> &Map<String, Value> {
        &self.content
    }

    pub fn into_content(self) -> Map<String, Value> {
        self.content
    }

    pub fn coordinate_system(&self) -> Option<&str> {
        self.content.get("coordinate_system").and_then(Value::as_str)
    }

    pub fn with_coordinate_system(self, cs: impl Into<String>) -> Self {
        self.with("coordinate_system", cs.into())
    }

    /// Nest another payload as an attribute; a same-named attribute of the
    /// same type is substituted.
    pub fn add_attribute(&mut self, attribute: ElementData) {
        let attributes = self
            .content
            .entry("attributes")
            .or_insert_with(|| Value::Object(Map::new()));
        if !attributes.is_object() {
            *attributes = Value::Object(Map::new());
        }
        let Some(groups) = attributes.as_object_mut() else {
            return;
        };
        let group = groups
            .entry(attribute.kind.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !group.is_array() {
            *group = Value::Array(Vec::new());
        }
        if let Some(items) = group.as_array_mut() {
            let name = attribute.name().to_string();
            let body = Value::Object(attribute.content);
            match items.iter().position(|it| it.get("name").and_then(Value::as_str) == Some(name.as_str())) {
                Some(pos) => items[pos] = body,
                None => items.push(body),
            }
        }
    }

    /// `(attribute name, attribute type)` for every nested attribute.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let Some(groups) = self.content.get("attributes").and_then(Value::as_object) else {
            return Vec::new();
        };
        groups
            .iter()
            .filter_map(|(kind, items)| items.as_array().map(|items| (kind, items)))
            .flat_map(|(kind, items)| {
                items.iter().filter_map(move |it| {
                    it.get("name").and_then(Value::as_str).map(|n| (n.to_string(), kind.clone()))
                })
            })
            .collect()
    }

    // === Common payload shapes ===

    pub fn text(name: impl Into<String>, val: impl Into<String>) -> Self {
        Self::new("text", name).with("val", val.into())
    }

    pub fn boolean(name: impl Into<String>, val: bool) -> Self {
        Self::new("boolean", name).with("val", val)
    }

    pub fn num(name: impl Into<String>, val: f64) -> Self {
        Self::new("num", name).with("val", val)
    }

    pub fn vec(name: impl Into<String>, val: Vec<f64>) -> Self {
        Self::new("vec", name).with("val", val)
    }

    /// Axis-aligned box as `(x, y, w, h)`.
    pub fn bbox(name: impl Into<String>, val: [f64; 4]) -> Self {
        Self::new("bbox", name).with("val", val.to_vec())
    }

    /// Encoded image payload.
    pub fn image(
        name: impl Into<String>,
        val: impl Into<String>,
        mime_type: impl Into<String>,
        encoding: impl Into<String>,
    ) -> Self {
        Self::new("image", name)
            .with("val", val.into())
            .with("mime_type", mime_type.into())
            .with("encoding", encoding.into())
    }

    pub fn mesh(name: impl Into<String>) -> Self {
        Self::new(MESH_TYPE, name)
    }
}

/// Element data grouped by payload type, as stored in `<type>_data`.
///
/// Names are unique within a payload type group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTable {
    groups: BTreeMap<String, Vec<ElementData>>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Total number of payloads.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Insert a payload, substituting one of the same type and name.
    pub fn insert(&mut self, data: ElementData) {
        let group = self.groups.entry(data.kind.clone()).or_default();
        match group.iter().position(|d| d.name() == data.name()) {
            Some(pos) => group[pos] = data,
            None => group.push(data),
        }
    }

    /// First payload named `name`, of any type.
    pub fn get(&self, name: &str) -> Option<&ElementData> {
        self.iter().find(|d| d.name() == name)
    }

    pub fn get_of_kind(&self, kind: &str, name: &str) -> Option<&ElementData> {
        self.groups.get(kind)?.iter().find(|d| d.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn contains_of_kind(&self, kind: &str, name: &str) -> bool {
        self.get_of_kind(kind, name).is_some()
    }

    /// Remove every payload named `name`. Returns true if any was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let mut removed = false;
        for group in self.groups.values_mut() {
            let before = group.len();
            group.retain(|d| d.name() != name);
            removed |= group.len() != before;
        }
        self.groups.retain(|_, g| !g.is_empty());
        removed
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementData> {
        self.groups.values().flatten()
    }

    /// `{ "<type>": [ {...}, ... ] }`
    pub fn to_value(&self) -> Value {
        let groups = self
            .groups
            .iter()
            .filter(|(_, g)| !g.is_empty())
            .map(|(kind, g)| {
                let items = g.iter().map(|d| Value::Object(d.content.clone())).collect();
                (kind.clone(), Value::Array(items))
            })
            .collect();
        Value::Object(groups)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let groups = value
            .as_object()
            .ok_or_else(|| Error::invalid(format!("element data must be an object, got {value}")))?;
        let mut table = Self::new();
        for (kind, items) in groups {
            let items = items
                .as_array()
                .ok_or_else(|| Error::invalid(format!("'{kind}' data must be an array")))?;
            for item in items {
                let content = item
                    .as_object()
                    .ok_or_else(|| Error::invalid(format!("'{kind}' entry must be an object")))?;
                table.insert(ElementData::from_parts(kind.clone(), content.clone())?);
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builders() {
        let d = ElementData::bbox("head", [0.0, 0.0, 10.0, 20.0]).with_coordinate_system("camera");
        assert_eq!(d.kind(), "bbox");
        assert_eq!(d.name(), "head");
        assert_eq!(d.val(), Some(&json!([0.0, 0.0, 10.0, 20.0])));
        assert_eq!(d.coordinate_system(), Some("camera"));
    }

    #[test]
    fn test_name_is_immutable() {
        let d = ElementData::text("label", "car").with("name", "other");
        assert_eq!(d.name(), "label");
    }

    #[test]
    fn test_nested_attributes_substitute_same_name() {
        let mut body = ElementData::bbox("body", [0.0, 0.0, 100.0, 150.0]);
        body.add_attribute(ElementData::boolean("visible", true));
        body.add_attribute(ElementData::boolean("occluded", false));
        body.add_attribute(ElementData::boolean("visible", false));

        let attrs = body.get("attributes").unwrap();
        assert_eq!(attrs["boolean"].as_array().unwrap().len(), 2);
        assert_eq!(attrs["boolean"][0]["val"], json!(false));

        let mut names = body.attributes();
        names.sort();
        assert_eq!(
            names,
            vec![("occluded".to_string(), "boolean".to_string()), ("visible".to_string(), "boolean".to_string())]
        );
    }

    #[test]
    fn test_from_parts_requires_name() {
        let mut m = Map::new();
        m.insert("val".into(), json!(1));
        assert!(ElementData::from_parts("num", m).is_err());
    }

    #[test]
    fn test_table_insert_and_remove() {
        let mut t = DataTable::new();
        t.insert(ElementData::text("label", "manual"));
        t.insert(ElementData::boolean("validated", true));
        t.insert(ElementData::text("label", "auto"));
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("label").unwrap().val(), Some(&json!("auto")));
        assert!(t.contains_of_kind("boolean", "validated"));
        assert!(!t.contains_of_kind("text", "validated"));

        assert!(t.remove("label"));
        assert!(!t.remove("label"));
        assert_eq!(t.to_value(), json!({"boolean": [{"name": "validated", "val": true}]}));
        t.clear();
        assert!(t.is_empty());
    }

    #[test]
    fn test_table_from_value() {
        let v = json!({"text": [{"name": "a", "val": "x"}], "num": [{"name": "b", "val": 2.0}]});
        let t = DataTable::from_value(&v).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.to_value(), v);
        assert!(DataTable::from_value(&json!({"text": {}})).is_err());
        assert!(DataTable::from_value(&json!([1])).is_err());
    }
}
