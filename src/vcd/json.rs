//! JSON import and export.
//!
//! The serialized form is a single object under the `"vcd"` root key. Empty
//! tables are omitted; elements always carry their `frame_intervals`.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::Vcd;
use crate::core::{Element, ElementType, Frame, Uid};
use crate::schema::{SchemaValidator, StructuralValidator};
use crate::settings::Settings;
use crate::util::{Error, FrameIntervals, FrameNum, Result};

/// Root key of the serialized document.
pub const ROOT_KEY: &str = "vcd";

impl Vcd {
    // ========================================================================
    // Export
    // ========================================================================

    /// Full document as a JSON value.
    pub fn to_value(&self) -> Result<Value> {
        let mut root = Map::new();
        root.insert("metadata".into(), Value::Object(self.metadata.clone()));
        if !self.frame_intervals.is_empty() {
            root.insert("frame_intervals".into(), self.frame_intervals.to_value());
        }
        if !self.frames.is_empty() {
            let frames = self.frames.iter().map(|(f, frame)| (f.to_string(), frame.to_value())).collect();
            root.insert("frames".into(), Value::Object(frames));
        }
        for element_type in ElementType::ALL {
            let table = self.table(element_type);
            if table.is_empty() {
                continue;
            }
            let elements = table
                .iter()
                .map(|(uid, e)| Ok((uid.to_string(), e.to_value(element_type)?)))
                .collect::<Result<Map<_, _>>>()?;
            root.insert(element_type.table_key().into(), Value::Object(elements));
        }
        if !self.ontologies.is_empty() {
            let ontologies = self
                .ontologies
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            root.insert("ontologies".into(), Value::Object(ontologies));
        }
        if !self.coordinate_systems.is_empty() {
            root.insert("coordinate_systems".into(), serde_json::to_value(&self.coordinate_systems)?);
        }
        if !self.streams.is_empty() {
            root.insert("streams".into(), serde_json::to_value(&self.streams)?);
        }

        let mut doc = Map::new();
        doc.insert(ROOT_KEY.into(), Value::Object(root));
        Ok(Value::Object(doc))
    }

    /// Serialize the document. With `validate_on_export` set, validation
    /// messages are logged; they never block the output.
    pub fn stringify(&self, pretty: bool) -> Result<String> {
        let value = self.to_value()?;
        if self.settings.validate_on_export {
            log_messages(&StructuralValidator.validate(&value));
        }
        to_string(&value, pretty)
    }

    /// Serialize with the `pretty` option from the settings.
    pub fn export(&self) -> Result<String> {
        self.stringify(self.settings.pretty)
    }

    /// Serialize and validate with `validator`; the messages are returned
    /// alongside the text.
    pub fn stringify_validated(&self, pretty: bool, validator: &dyn SchemaValidator) -> Result<(String, Vec<String>)> {
        let value = self.to_value()?;
        let messages = validator.validate(&value);
        log_messages(&messages);
        Ok((to_string(&value, pretty)?, messages))
    }

    /// Validation messages for the current content.
    pub fn validate(&self, validator: &dyn SchemaValidator) -> Result<Vec<String>> {
        Ok(validator.validate(&self.to_value()?))
    }

    /// One frame as a JSON value.
    ///
    /// With `dynamic_only` this is the frame entry as stored. Otherwise every
    /// element present in the frame is merged with its summary record
    /// (without `frame_intervals`): explicit entries, elements whose range
    /// covers the frame, and static elements other than relations.
    pub fn frame_to_value(&self, frame: FrameNum, dynamic_only: bool) -> Result<Value> {
        let stored = self.frames.get(&frame).ok_or(Error::UnknownFrame(frame))?;
        let mut out = match stored.to_value() {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        if dynamic_only {
            return Ok(Value::Object(out));
        }

        for element_type in ElementType::ALL {
            let uids = self.get_elements_at_frame(element_type, frame);
            if uids.is_empty() {
                continue;
            }
            let mut table = match out.remove(element_type.table_key()) {
                Some(Value::Object(m)) => m,
                _ => Map::new(),
            };
            for uid in uids {
                let Some(element) = self.table(element_type).get(&uid) else {
                    continue;
                };
                let mut merged = match element.to_value(element_type)? {
                    Value::Object(m) => m,
                    _ => Map::new(),
                };
                merged.remove("frame_intervals");
                // frame-local snapshots win over same-named summary data
                if let Some(entry) = stored.entry(element_type, &uid) {
                    let mut data = element.data.clone();
                    for d in entry.data.iter() {
                        data.insert(d.clone());
                    }
                    if !data.is_empty() {
                        merged.insert(element_type.data_key().into(), data.to_value());
                    }
                }
                table.insert(uid.to_string(), Value::Object(merged));
            }
            out.insert(element_type.table_key().into(), Value::Object(table));
        }
        Ok(Value::Object(out))
    }

    /// Serialize one frame; see [`Vcd::frame_to_value`].
    pub fn stringify_frame(&self, frame: FrameNum, dynamic_only: bool, pretty: bool) -> Result<String> {
        to_string(&self.frame_to_value(frame, dynamic_only)?, pretty)
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Adopt a serialized document as is, without schema validation.
    ///
    /// Uid watermarks are rebuilt from the element tables. A missing root
    /// `frame_intervals` is derived from the frame keys.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::from_value_with_settings(value, Settings::default())
    }

    pub fn from_value_with_settings(value: &Value, settings: Settings) -> Result<Self> {
        let root = value
            .get(ROOT_KEY)
            .and_then(Value::as_object)
            .ok_or_else(|| Error::invalid(format!("missing '{ROOT_KEY}' root object")))?;

        let mut vcd = Vcd::with_settings(settings);
        match root.get("metadata") {
            None => {}
            Some(Value::Object(m)) => vcd.metadata = m.clone(),
            Some(other) => return Err(Error::invalid(format!("metadata must be an object, got {other}"))),
        }

        if let Some(frames) = root.get("frames") {
            let frames = frames
                .as_object()
                .ok_or_else(|| Error::invalid("frames must be an object"))?;
            for (key, frame) in frames {
                let f: FrameNum = key
                    .parse()
                    .map_err(|_| Error::invalid(format!("frame key is not an integer: {key}")))?;
                vcd.frames.insert(f, Frame::from_value(frame)?);
            }
        }
        vcd.frame_intervals = match root.get("frame_intervals") {
            Some(fis) => FrameIntervals::from_value(fis)?,
            None => vcd
                .frames
                .keys()
                .fold(FrameIntervals::new(), |acc, f| acc.union(&FrameIntervals::from_frame(*f))),
        };

        for element_type in ElementType::ALL {
            let Some(table) = root.get(element_type.table_key()) else {
                continue;
            };
            let table = table
                .as_object()
                .ok_or_else(|| Error::invalid(format!("'{}' must be an object", element_type.table_key())))?;
            let parsed = table
                .iter()
                .map(|(uid, e)| Ok((Uid::parse(uid)?, Element::from_value(element_type, e)?)))
                .collect::<Result<BTreeMap<_, _>>>()?;
            *vcd.table_mut(element_type) = parsed;
        }

        if let Some(ontologies) = root.get("ontologies") {
            vcd.ontologies = serde_json::from_value(ontologies.clone())?;
        }
        if let Some(cs) = root.get("coordinate_systems") {
            vcd.coordinate_systems = serde_json::from_value(cs.clone())?;
        }
        if let Some(streams) = root.get("streams") {
            vcd.streams = serde_json::from_value(streams.clone())?;
        }

        vcd.recompute_watermarks();
        debug!(frames = vcd.frames.len(), range = %vcd.frame_intervals, "document imported");
        Ok(vcd)
    }

    /// Validate with `validator` (if any) and adopt the document.
    ///
    /// Fails with [`Error::SchemaValidationFailed`] carrying every message
    /// when the document does not conform.
    pub fn import(value: &Value, validator: Option<&dyn SchemaValidator>) -> Result<Self> {
        if let Some(validator) = validator {
            let messages = validator.validate(value);
            if !messages.is_empty() {
                log_messages(&messages);
                return Err(Error::SchemaValidationFailed(messages));
            }
        }
        Self::from_value(value)
    }

    /// Like [`Vcd::import`], but falls back to an empty document. The error
    /// that caused the fallback is returned alongside.
    pub fn import_or_empty(value: &Value, validator: Option<&dyn SchemaValidator>) -> (Self, Option<Error>) {
        match Self::import(value, validator) {
            Ok(vcd) => (vcd, None),
            Err(e) => {
                warn!("import failed, creating an empty document instead: {e}");
                (Self::new(), Some(e))
            }
        }
    }

    /// Parse and adopt a serialized document, without schema validation.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(&value)
    }
}

fn to_string(value: &Value, pretty: bool) -> Result<String> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(s)
}

fn log_messages(messages: &[String]) {
    if messages.is_empty() {
        return;
    }
    warn!(count = messages.len(), "document is not schema compliant");
    for m in messages {
        warn!("{m}");
    }
}
