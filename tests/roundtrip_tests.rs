//! Export/import round trips, frame reconciliation and uid allocation.

mod common;

use common::{init_tracing, range};
use serde_json::json;
use vcd::core::UidMode;
use vcd::prelude::*;

const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

#[test]
fn test_image_roundtrip_is_byte_exact() {
    init_tracing();
    let mut vcd = Vcd::new();
    let uid = vcd.add_object(ElementArgs::new("car", "")).expect("add object");
    vcd.add_object_data(&uid, ElementData::image("labels", PNG_B64, "image/png", "base64"), FrameIntervals::new())
        .expect("add image");

    let compact = vcd.stringify(false).expect("stringify");
    let back = Vcd::from_json_str(&compact).expect("import");
    let image = back.get_object_data(&Uid::Dense(0), "labels", None).expect("image survives");
    assert_eq!(image.kind(), "image");
    assert_eq!(image.get("mime_type"), Some(&json!("image/png")));
    assert_eq!(image.get("encoding"), Some(&json!("base64")));
    assert_eq!(image.val().and_then(|v| v.as_str()), Some(PNG_B64));

    // pretty and compact forms carry the same document
    let pretty = vcd.stringify(true).unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(Vcd::from_json_str(&pretty).unwrap().to_value().unwrap(), back.to_value().unwrap());
    assert_eq!(back.to_value().unwrap(), vcd.to_value().unwrap());
}

#[test]
fn test_frame_reconciliation() {
    init_tracing();
    let mut vcd = Vcd::new();
    let uid = vcd.add_object(ElementArgs::new("car", "Car").frames(range(0, 2))).unwrap();
    assert_eq!(vcd.get_frame_intervals(), &range(0, 2));
    assert_eq!(vcd.frames().map(|(f, _)| f).collect::<Vec<_>>(), vec![0, 1, 2]);

    assert!(vcd.rm_object(&uid));
    assert!(vcd.get_frame_intervals().is_empty());
    assert_eq!(vcd.frames().count(), 0);
    assert_eq!(vcd.to_value().unwrap(), json!({"vcd": {"metadata": {"schema_version": "4.3.1"}}}));
}

#[test]
fn test_uid_watermark() {
    init_tracing();
    let mut vcd = Vcd::new();
    let uids: Vec<Uid> = ["a", "b", "c"]
        .into_iter()
        .map(|name| vcd.add_object(ElementArgs::new(name, "Thing")).unwrap())
        .collect();
    assert_eq!(uids, vec![Uid::Dense(0), Uid::Dense(1), Uid::Dense(2)]);

    let five = vcd.add_object(ElementArgs::new("e", "Thing").uid(Uid::Dense(5))).unwrap();
    assert_eq!(five, Uid::Dense(5));
    let next = vcd.add_object(ElementArgs::new("f", "Thing")).unwrap();
    assert_eq!(next, Uid::Dense(6));

    // watermarks are per type
    assert_eq!(vcd.add_action(ElementArgs::new("walk", "Walk")).unwrap(), Uid::Dense(0));

    // removal never frees a uid
    assert!(vcd.rm_object(&next));
    assert_eq!(vcd.add_object(ElementArgs::new("g", "Thing")).unwrap(), Uid::Dense(7));
}

#[test]
fn test_import_recomputes_watermarks() {
    init_tracing();
    let doc = json!({"vcd": {
        "metadata": {"schema_version": "4.3.1"},
        "objects": {
            "3": {"name": "a", "type": "A", "frame_intervals": []},
            "9": {"name": "b", "type": "B", "frame_intervals": []}
        }
    }});
    let mut vcd = Vcd::import(&doc, Some(&StructuralValidator)).expect("valid document");
    assert_eq!(vcd.uid_allocator().last(ElementType::Object), Some(9));
    assert_eq!(vcd.uid_allocator().last(ElementType::Action), None);
    assert_eq!(vcd.add_object(ElementArgs::new("c", "C")).unwrap(), Uid::Dense(10));
    assert_eq!(vcd.add_action(ElementArgs::new("d", "D")).unwrap(), Uid::Dense(0));
}

#[test]
fn test_uid_space_exhausted() {
    init_tracing();
    let mut vcd = Vcd::new();
    let last = vcd.add_object(ElementArgs::new("a", "A").uid(Uid::Dense(u64::MAX))).unwrap();
    assert_eq!(last, Uid::Dense(u64::MAX));

    let err = vcd.add_object(ElementArgs::new("b", "B")).unwrap_err();
    assert!(matches!(err, Error::InvalidIdentifier(_)));
    assert_eq!(vcd.get_num_elements(ElementType::Object), 1);
    // other types keep their own counters
    assert_eq!(vcd.add_event(ElementArgs::new("c", "C")).unwrap(), Uid::Dense(0));
}

#[test]
fn test_import_extreme_frame_range() {
    init_tracing();
    let wide = json!([{"frame_start": -5, "frame_end": i64::MAX}]);
    let doc = json!({"vcd": {
        "metadata": {"schema_version": "4.3.1"},
        "frame_intervals": wide,
        "objects": {"0": {"name": "a", "type": "A", "frame_intervals": wide}}
    }});
    let vcd = Vcd::import(&doc, Some(&StructuralValidator)).expect("valid document");

    let range = vcd.get_frame_intervals();
    assert_eq!(range.len(), u64::MAX);
    assert!(range.equals(range));
    let object = vcd.get_object(&Uid::Dense(0)).unwrap();
    assert!(object.frame_intervals.is_contained_by(range));
    assert!(range.contains(&object.frame_intervals));
    assert_eq!(vcd.to_value().unwrap()["vcd"]["frame_intervals"], wide);
}

#[test]
fn test_static_dynamic_static_leaves_no_residue() {
    init_tracing();
    let mut vcd = Vcd::new();
    let uid = vcd.add_object(ElementArgs::new("sign", "Sign")).unwrap();
    vcd.add_object_data(&uid, ElementData::text("shape", "round"), FrameIntervals::new()).unwrap();

    vcd.add_object(ElementArgs::new("sign", "Sign").uid(uid.clone()).frames(range(0, 5))).unwrap();
    vcd.add_object_data(&uid, ElementData::num("score", 0.9), range(1, 3)).unwrap();
    assert_eq!(vcd.get_frames_with_element_data_name(ElementType::Object, &uid, "score"), vec![1, 2, 3]);

    vcd.add_object(ElementArgs::new("sign", "Sign").uid(uid.clone()).mode(SetMode::Replace)).unwrap();
    for (f, frame) in vcd.frames() {
        let residue = frame.entry(ElementType::Object, &uid).is_some_and(|e| !e.data.is_empty());
        assert!(!residue, "frame {f} still holds data");
    }
    let element = vcd.get_object(&uid).unwrap();
    assert!(element.is_static());
    assert!(element.data_pointers.values().all(|p| p.frame_intervals.is_empty()));
    assert!(element.data_pointers.contains_key("shape"));
    assert!(!element.data_pointers.contains_key("score"));
}

#[test]
fn test_uuid_mode() {
    init_tracing();
    let settings = Settings { use_uuid: true, ..Settings::default() };
    let mut counter = 0u32;
    let mut vcd = Vcd::with_generator(settings, move || {
        counter += 1;
        format!("00000000-0000-4000-8000-{counter:012x}")
    });

    let a = vcd.add_object(ElementArgs::new("a", "A")).unwrap();
    let b = vcd.add_object(ElementArgs::new("b", "B")).unwrap();
    assert_eq!(a, Uid::External("00000000-0000-4000-8000-000000000001".into()));
    assert_eq!(b, Uid::External("00000000-0000-4000-8000-000000000002".into()));

    let text = vcd.stringify(false).unwrap();
    let back = Vcd::from_json_str(&text).unwrap();
    assert!(back.has(ElementType::Object, &a));
    assert_eq!(back.uid_allocator().mode(ElementType::Object), UidMode::External);
    assert_eq!(back.uid_allocator().mode(ElementType::Action), UidMode::Integer);
}

#[test]
fn test_explicit_uuid_switches_type() {
    init_tracing();
    let mut vcd = Vcd::new();
    let ext = Uid::parse("6f1b3bd2-3c4a-4b8e-9d7f-0a1b2c3d4e5f").unwrap();
    vcd.add_event(ElementArgs::new("start", "Start").uid(ext.clone())).unwrap();
    assert_eq!(vcd.uid_allocator().mode(ElementType::Event), UidMode::External);
    let generated = vcd.add_event(ElementArgs::new("stop", "Stop")).unwrap();
    assert!(generated.is_external());
    assert!(Uid::parse("not-a-uid").is_err());
    assert!(Uid::parse("-1").is_err());
}

#[test]
fn test_import_falls_back_to_empty_document() {
    init_tracing();
    let broken = json!({"vcd": {
        "metadata": {"schema_version": "4.3.1"},
        "frames": {"zero": {}},
        "objects": {"0": {"type": "Car", "frame_intervals": []}}
    }});
    let (vcd, err) = Vcd::import_or_empty(&broken, Some(&StructuralValidator));
    let err = err.expect("document is rejected");
    assert!(matches!(err, Error::SchemaValidationFailed(_)));
    assert_eq!(err.messages().len(), 2, "{:?}", err.messages());
    assert!(!vcd.has_elements(ElementType::Object));
    assert_eq!(vcd.get_metadata()["schema_version"], json!("4.3.1"));

    // without a validator the structural parse still refuses bad frame keys
    assert!(Vcd::import(&broken, None).is_err());
}

#[test]
fn test_custom_validator() {
    init_tracing();
    let strict = |doc: &serde_json::Value| -> Vec<String> {
        if doc["vcd"]["metadata"].get("annotator").is_none() {
            vec!["/vcd/metadata: annotator is required".to_string()]
        } else {
            Vec::new()
        }
    };
    let mut vcd = Vcd::new();
    assert_eq!(vcd.validate(&strict).unwrap().len(), 1);
    vcd.add_annotator("qa-team");
    assert!(vcd.validate(&strict).unwrap().is_empty());
    assert!(Vcd::import(&vcd.to_value().unwrap(), Some(&strict)).is_ok());

    let (_, messages) = vcd.stringify_validated(false, &StructuralValidator).unwrap();
    assert!(messages.is_empty());
}

#[test]
fn test_validate_on_export_does_not_block() {
    init_tracing();
    let settings = Settings { validate_on_export: true, pretty: false, ..Settings::default() };
    let mut vcd = Vcd::with_settings(settings);
    vcd.add_object(ElementArgs::new("car", "Car").frames(range(0, 1))).unwrap();
    let text = vcd.export().unwrap();
    assert!(!text.contains('\n'));
    assert!(text.starts_with(r#"{"vcd":"#));
}

#[test]
fn test_scene_tables_roundtrip() {
    init_tracing();
    let mut vcd = Vcd::new();
    vcd.add_name("drive-01");
    vcd.add_ontology("http://example.org/ontology").unwrap();
    vcd.add_coordinate_system("odom", CoordinateSystemType::SceneCs, "", vec![], None).unwrap();
    vcd.add_coordinate_system("cam", CoordinateSystemType::SensorCs, "odom", vec![0.0; 16], None).unwrap();
    vcd.add_stream("cam", "./cam.mp4", "front camera", StreamType::Camera);
    let uid = vcd
        .add_object(ElementArgs::new("car", "Car").ontology("0").coordinate_system("odom").frames(range(0, 3)))
        .unwrap();
    vcd.add_object_data(&uid, ElementData::bbox("box", [1.0, 2.0, 3.0, 4.0]).with_coordinate_system("cam"), range(1, 2))
        .unwrap();
    vcd.add_frame_properties(2, Some("2020-01-01T00:00:02Z".into()), serde_json::Map::new());

    let value = vcd.to_value().unwrap();
    assert!(StructuralValidator.validate(&value).is_empty());
    let back = Vcd::import(&value, Some(&StructuralValidator)).unwrap();
    assert_eq!(back.to_value().unwrap(), value);
    assert_eq!(back.get_coordinate_system("odom").unwrap().children, vec!["cam".to_string()]);
    assert_eq!(back.get_stream("cam").unwrap().uri, "./cam.mp4");
    assert_eq!(back.get_ontology("0"), Some("http://example.org/ontology"));
    assert_eq!(
        back.get_frame(2).and_then(|f| f.frame_properties()).map(|p| p["timestamp"].clone()),
        Some(json!("2020-01-01T00:00:02Z"))
    );
}
