//! Read-side behaviour: data resolution at frames, frame projections and
//! element lookups.

mod common;

use common::{fis, init_tracing, range};
use serde_json::json;
use vcd::prelude::*;

/// Street scene: a dynamic car, a static road and a short event.
fn street() -> (Vcd, Uid, Uid, Uid) {
    let mut vcd = Vcd::new();
    let car = vcd.add_object(ElementArgs::new("car", "#Car").frames(range(0, 9))).unwrap();
    let road = vcd.add_object(ElementArgs::new("road", "#Road")).unwrap();
    let brake = vcd.add_event(ElementArgs::new("brake", "#Braking").frames(range(4, 4))).unwrap();
    vcd.add_object_data(&car, ElementData::bbox("box", [0.0, 0.0, 10.0, 10.0]), range(0, 4)).unwrap();
    vcd.add_object_data(&car, ElementData::text("color", "red"), FrameIntervals::new()).unwrap();
    vcd.add_object_data(&road, ElementData::text("surface", "asphalt"), FrameIntervals::new()).unwrap();
    (vcd, car, road, brake)
}

#[test]
fn test_data_resolution_at_frames() {
    init_tracing();
    let (vcd, car, road, _) = street();

    assert!(vcd.get_object_data(&car, "box", Some(2)).is_some());
    assert!(vcd.get_object_data(&car, "box", Some(7)).is_none(), "outside the data range");
    assert!(vcd.get_object_data(&car, "box", None).is_none(), "dynamic data has no summary copy");

    // static data of a dynamic element is visible while the element exists
    assert_eq!(vcd.get_object_data(&car, "color", Some(7)).and_then(|d| d.val()), Some(&json!("red")));
    assert!(vcd.get_object_data(&car, "color", Some(12)).is_none());

    // static element: every frame of the document
    assert_eq!(vcd.get_object_data(&road, "surface", Some(9)).and_then(|d| d.val()), Some(&json!("asphalt")));
    assert!(vcd.get_object_data(&road, "surface", Some(10)).is_none());
}

#[test]
fn test_pointer_queries() {
    init_tracing();
    let (vcd, car, road, _) = street();
    let object = ElementType::Object;

    let pointer = vcd.get_element_data_pointer(object, &car, "box").expect("pointer");
    assert_eq!(pointer.kind, "bbox");
    assert_eq!(pointer.frame_intervals, range(0, 4));
    assert_eq!(vcd.get_element_data_frame_intervals(object, &car, "color"), Some(&FrameIntervals::new()));
    assert_eq!(vcd.get_frames_with_element_data_name(object, &car, "box"), vec![0, 1, 2, 3, 4]);
    assert!(vcd.get_frames_with_element_data_name(object, &car, "color").is_empty());
    assert!(vcd.get_frames_with_element_data_name(object, &road, "missing").is_empty());

    assert_eq!(vcd.get_elements_with_element_data_name(object, "surface"), vec![road.clone()]);
    assert!(vcd.has_element_data(object, &car, "box"));
    assert!(!vcd.has_element_data(object, &road, "box"));
}

#[test]
fn test_lookups() {
    init_tracing();
    let (vcd, car, road, brake) = street();
    assert_eq!(vcd.get_element_uid_by_name(ElementType::Object, "road"), Some(&road));
    assert_eq!(vcd.get_elements_of_type(ElementType::Object, "#Car"), vec![car.clone()]);
    assert_eq!(vcd.get_num_elements(ElementType::Event), 1);
    assert_eq!(vcd.get_event(&brake).map(|e| e.name.as_str()), Some("brake"));
    assert!(vcd.get_action(&brake).is_none(), "uids are per type");
    assert!(vcd.has_elements(ElementType::Object));
    assert!(!vcd.has_elements(ElementType::Context));
    assert_eq!(vcd.get_elements(ElementType::Object).len(), 2);

    assert_eq!(vcd.get_elements_at_frame(ElementType::Object, 9), vec![car.clone(), road.clone()]);
    assert_eq!(vcd.get_elements_at_frame(ElementType::Event, 4), vec![brake]);
    assert!(vcd.get_elements_at_frame(ElementType::Event, 5).is_empty());
}

#[test]
fn test_frame_projection() {
    init_tracing();
    let (vcd, car, road, brake) = street();
    let (car, road, brake) = (car.to_string(), road.to_string(), brake.to_string());

    let dynamic = vcd.frame_to_value(4, true).unwrap();
    assert_eq!(
        dynamic["objects"][car.as_str()]["object_data"]["bbox"][0]["val"],
        json!([0.0, 0.0, 10.0, 10.0])
    );
    assert!(dynamic["objects"][car.as_str()].get("name").is_none());
    assert_eq!(dynamic["events"][brake.as_str()], json!({}));

    let full = vcd.frame_to_value(4, false).unwrap();
    let car_at_4 = &full["objects"][car.as_str()];
    assert_eq!(car_at_4["name"], json!("car"));
    assert!(car_at_4.get("frame_intervals").is_none());
    assert_eq!(car_at_4["object_data"]["bbox"][0]["name"], json!("box"));
    assert_eq!(car_at_4["object_data"]["text"][0]["val"], json!("red"), "summary data is merged in");
    assert_eq!(full["objects"][road.as_str()]["object_data"]["text"][0]["val"], json!("asphalt"));
    assert_eq!(full["events"][brake.as_str()]["type"], json!("#Braking"));

    let text = vcd.stringify_frame(4, false, false).unwrap();
    assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), full);
    assert!(matches!(vcd.stringify_frame(40, true, false), Err(Error::UnknownFrame(40))));
}

#[test]
fn test_data_after_element_shrink() {
    init_tracing();
    let (mut vcd, car, _, _) = street();
    vcd.add_object(ElementArgs::new("car", "#Car").uid(car.clone()).frames(fis(&[(2, 3), (6, 9)])).mode(SetMode::Replace))
        .unwrap();
    assert_eq!(vcd.get_element_data_frame_intervals(ElementType::Object, &car, "box"), Some(&range(2, 3)));
    assert!(vcd.get_object_data(&car, "box", Some(1)).is_none());
    assert!(vcd.get_object_data(&car, "box", Some(3)).is_some());
    // the road keeps frames 0..=9 alive
    assert_eq!(vcd.get_frame_intervals(), &range(0, 9));
}
