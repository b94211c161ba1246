//! Scene description tables: coordinate systems and streams.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of coordinate system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSystemType {
    /// Static reference of the whole scene (e.g. odometry origin).
    SceneCs,
    /// Attached to a moving body (e.g. vehicle-iso8855).
    LocalCs,
    /// Attached to a sensor.
    SensorCs,
    GeoUtm,
    Custom,
}

/// Node of the coordinate system tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    #[serde(rename = "type")]
    pub cs_type: CoordinateSystemType,
    /// Parent name; empty for a root.
    #[serde(default)]
    pub parent: String,
    /// Row-major pose with respect to the parent (usually a 4x4 matrix).
    #[serde(default)]
    pub pose_wrt_parent: Vec<f64>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl CoordinateSystem {
    pub fn new(cs_type: CoordinateSystemType, parent: impl Into<String>, pose_wrt_parent: Vec<f64>) -> Self {
        Self {
            cs_type,
            parent: parent.into(),
            pose_wrt_parent,
            children: Vec::new(),
            uid: None,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Kind of data stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    Camera,
    Lidar,
    Radar,
    GpsImu,
    Other,
}

/// Sensor or data source the annotations refer to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub uri: String,
    #[serde(rename = "type")]
    pub stream_type: StreamType,
    /// Static properties (intrinsics, sync info, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_properties: Option<Map<String, Value>>,
}

impl Stream {
    pub fn new(stream_type: StreamType, uri: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            uri: uri.into(),
            stream_type,
            stream_properties: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinate_system_json() {
        let mut cs = CoordinateSystem::new(CoordinateSystemType::LocalCs, "odom", vec![1.0, 0.0, 0.0, 0.0]);
        cs.children.push("camera".into());
        let v = serde_json::to_value(&cs).unwrap();
        assert_eq!(
            v,
            json!({"type": "local_cs", "parent": "odom", "pose_wrt_parent": [1.0, 0.0, 0.0, 0.0], "children": ["camera"]})
        );
        let back: CoordinateSystem = serde_json::from_value(v).unwrap();
        assert_eq!(back, cs);
        assert!(!back.is_root());
    }

    #[test]
    fn test_stream_json() {
        let v = json!({"description": "front camera", "uri": "./front.mp4", "type": "camera"});
        let s: Stream = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(s.stream_type, StreamType::Camera);
        assert_eq!(serde_json::to_value(&s).unwrap(), v);

        let gps: Stream = serde_json::from_value(json!({"type": "gps_imu"})).unwrap();
        assert_eq!(gps.stream_type, StreamType::GpsImu);
        assert!(serde_json::from_value::<Stream>(json!({"type": "sonar"})).is_err());
    }
}
