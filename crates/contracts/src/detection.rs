//! Detection3DArray - Generator output
//!
//! Wire layout of the published detection batch. Field names mirror
//! `vision_msgs` so that JSON consumers see the familiar structure.

use serde::{Deserialize, Serialize};

/// Wall-clock timestamp (`builtin_interfaces/Time`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Time {
    /// Seconds since the UNIX epoch
    pub sec: i32,

    /// Nanoseconds within the second, always < 1_000_000_000
    pub nanosec: u32,
}

impl Time {
    /// Create a timestamp from whole seconds and nanoseconds
    pub fn new(sec: i32, nanosec: u32) -> Self {
        Self { sec, nanosec }
    }

    /// Timestamp as fractional seconds
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }
}

/// Message header shared by a batch and each of its detections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Acquisition time
    pub stamp: Time,

    /// Reference frame the poses are expressed in
    pub frame_id: String,
}

/// 3D point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 3D vector (used for box extents)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Orientation quaternion (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    /// The identity rotation `(0, 0, 0, 1)`
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Whether this is exactly the identity rotation
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Position + orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

/// Number of entries in a row-major 6x6 covariance
pub const COVARIANCE_LEN: usize = 36;

/// Pose with a row-major 6x6 covariance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseWithCovariance {
    pub pose: Pose,
    pub covariance: Vec<f64>,
}

impl Default for PoseWithCovariance {
    fn default() -> Self {
        Self {
            pose: Pose::default(),
            covariance: vec![0.0; COVARIANCE_LEN],
        }
    }
}

/// Oriented 3D box: center pose + full extents along each axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox3D {
    pub center: Pose,
    pub size: Vector3,
}

impl BoundingBox3D {
    /// Box resting on the ground plane at (x, y): center z is half the height
    pub fn on_ground(x: f64, y: f64, size: Vector3) -> Self {
        Self {
            center: Pose {
                position: Point {
                    x,
                    y,
                    z: size.z * 0.5,
                },
                orientation: Quaternion::IDENTITY,
            },
            size,
        }
    }
}

/// One classification guess
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectHypothesis {
    /// Class label (e.g. "human")
    pub class_id: String,

    /// Confidence score, not normalised
    pub score: f64,
}

/// Hypothesis plus the pose it refers to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectHypothesisWithPose {
    pub hypothesis: ObjectHypothesis,
    pub pose: PoseWithCovariance,
}

impl ObjectHypothesisWithPose {
    /// Hypothesis with a default (identity, zero covariance) pose
    pub fn new(class_id: impl Into<String>, score: f64) -> Self {
        Self {
            hypothesis: ObjectHypothesis {
                class_id: class_id.into(),
                score,
            },
            pose: PoseWithCovariance::default(),
        }
    }
}

/// A single detected object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection3D {
    /// Copy of the enclosing batch header
    pub header: Header,

    /// Class hypotheses, most likely first
    pub results: Vec<ObjectHypothesisWithPose>,

    /// Object extent
    pub bbox: BoundingBox3D,

    /// Tracking id, empty when untracked
    #[serde(default)]
    pub id: String,
}

impl Detection3D {
    /// Label of the first hypothesis, if any
    pub fn label(&self) -> Option<&str> {
        self.results
            .first()
            .map(|r| r.hypothesis.class_id.as_str())
    }
}

/// Batch of detections published atomically per tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detection3DArray {
    pub header: Header,
    pub detections: Vec<Detection3D>,
}

impl Detection3DArray {
    /// Number of detections in the batch
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Whether the batch carries no detections
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_as_secs() {
        let t = Time::new(12, 250_000_000);
        assert!((t.as_secs_f64() - 12.25).abs() < 1e-9);
        assert!(Time::new(12, 999_999_999) < Time::new(13, 0));
    }

    #[test]
    fn test_box_on_ground() {
        let bbox = BoundingBox3D::on_ground(
            1.0,
            2.0,
            Vector3 {
                x: 0.8,
                y: 0.6,
                z: 1.9,
            },
        );
        assert_eq!(bbox.center.position.z, 0.95);
        assert!(bbox.center.orientation.is_identity());
    }

    #[test]
    fn test_serialized_field_names() {
        let detection = Detection3D {
            header: Header {
                stamp: Time::new(1, 2),
                frame_id: "map".into(),
            },
            results: vec![ObjectHypothesisWithPose::new("human", 20.0)],
            bbox: BoundingBox3D::default(),
            id: String::new(),
        };
        let batch = Detection3DArray {
            header: detection.header.clone(),
            detections: vec![detection],
        };

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["header"]["frame_id"], "map");
        assert_eq!(value["header"]["stamp"]["nanosec"], 2);
        assert_eq!(
            value["detections"][0]["results"][0]["hypothesis"]["class_id"],
            "human"
        );
        assert_eq!(
            value["detections"][0]["bbox"]["center"]["orientation"]["w"],
            1.0
        );
    }
}
