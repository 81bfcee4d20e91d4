//! Body landmarks as delivered by a 33-point pose model.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Number of landmarks in the pose schema.
pub const POSE_LANDMARK_COUNT: usize = 33;

/// One tracked body keypoint.
///
/// `x`/`y` are image-plane coordinates (normalized or pixels, as long as both
/// axes share a scale). `z` is carried along but ignored by the angle math.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    /// Model confidence that the point is visible, in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Image-plane position.
    #[inline]
    pub fn xy(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    /// A point without a visibility value counts as visible.
    #[inline]
    pub fn is_visible(&self, min_visibility: f32) -> bool {
        self.visibility.map_or(true, |v| v >= min_visibility)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Body side, used both for the filming side and the supporting leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Parse `"left"` / `"right"` (case-insensitive, surrounding whitespace ignored).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

/// Landmarks the angle extraction reads, with their schema indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftIndex,
    RightIndex,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl PoseLandmark {
    /// Every landmark angle extraction depends on.
    pub const REQUIRED: [PoseLandmark; 15] = [
        PoseLandmark::Nose,
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftElbow,
        PoseLandmark::RightElbow,
        PoseLandmark::LeftWrist,
        PoseLandmark::RightWrist,
        PoseLandmark::LeftIndex,
        PoseLandmark::RightIndex,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
        PoseLandmark::LeftKnee,
        PoseLandmark::RightKnee,
        PoseLandmark::LeftAnkle,
        PoseLandmark::RightAnkle,
    ];

    pub fn index(self) -> usize {
        match self {
            PoseLandmark::Nose => 0,
            PoseLandmark::LeftShoulder => 11,
            PoseLandmark::RightShoulder => 12,
            PoseLandmark::LeftElbow => 13,
            PoseLandmark::RightElbow => 14,
            PoseLandmark::LeftWrist => 15,
            PoseLandmark::RightWrist => 16,
            PoseLandmark::LeftIndex => 19,
            PoseLandmark::RightIndex => 20,
            PoseLandmark::LeftHip => 23,
            PoseLandmark::RightHip => 24,
            PoseLandmark::LeftKnee => 25,
            PoseLandmark::RightKnee => 26,
            PoseLandmark::LeftAnkle => 27,
            PoseLandmark::RightAnkle => 28,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PoseLandmark::Nose => "nose",
            PoseLandmark::LeftShoulder => "left_shoulder",
            PoseLandmark::RightShoulder => "right_shoulder",
            PoseLandmark::LeftElbow => "left_elbow",
            PoseLandmark::RightElbow => "right_elbow",
            PoseLandmark::LeftWrist => "left_wrist",
            PoseLandmark::RightWrist => "right_wrist",
            PoseLandmark::LeftIndex => "left_index",
            PoseLandmark::RightIndex => "right_index",
            PoseLandmark::LeftHip => "left_hip",
            PoseLandmark::RightHip => "right_hip",
            PoseLandmark::LeftKnee => "left_knee",
            PoseLandmark::RightKnee => "right_knee",
            PoseLandmark::LeftAnkle => "left_ankle",
            PoseLandmark::RightAnkle => "right_ankle",
        }
    }

    pub fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => PoseLandmark::LeftShoulder,
            Side::Right => PoseLandmark::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Self {
        match side {
            Side::Left => PoseLandmark::LeftElbow,
            Side::Right => PoseLandmark::RightElbow,
        }
    }

    pub fn wrist(side: Side) -> Self {
        match side {
            Side::Left => PoseLandmark::LeftWrist,
            Side::Right => PoseLandmark::RightWrist,
        }
    }

    pub fn index_finger(side: Side) -> Self {
        match side {
            Side::Left => PoseLandmark::LeftIndex,
            Side::Right => PoseLandmark::RightIndex,
        }
    }

    pub fn hip(side: Side) -> Self {
        match side {
            Side::Left => PoseLandmark::LeftHip,
            Side::Right => PoseLandmark::RightHip,
        }
    }

    pub fn knee(side: Side) -> Self {
        match side {
            Side::Left => PoseLandmark::LeftKnee,
            Side::Right => PoseLandmark::RightKnee,
        }
    }

    pub fn ankle(side: Side) -> Self {
        match side {
            Side::Left => PoseLandmark::LeftAnkle,
            Side::Right => PoseLandmark::RightAnkle,
        }
    }
}

/// Per-frame landmark list indexed by the pose schema.
///
/// Slots may be `null` on the wire when the pose model did not report a
/// point; such slots read as missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Option<LandmarkPoint>>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Option<LandmarkPoint>>) -> Self {
        Self { points }
    }

    /// Build a fully populated set.
    pub fn from_points(points: impl IntoIterator<Item = LandmarkPoint>) -> Self {
        Self {
            points: points.into_iter().map(Some).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmark at `index`, if present and finite.
    pub fn get(&self, index: usize) -> Option<&LandmarkPoint> {
        self.points
            .get(index)
            .and_then(Option::as_ref)
            .filter(|p| p.is_finite())
    }

    #[inline]
    pub fn landmark(&self, which: PoseLandmark) -> Option<&LandmarkPoint> {
        self.get(which.index())
    }

    /// Replace the slot at `index`, growing the set with empty slots if needed.
    pub fn set(&mut self, index: usize, point: Option<LandmarkPoint>) {
        if index >= self.points.len() {
            self.points.resize(index + 1, None);
        }
        self.points[index] = point;
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&LandmarkPoint>> {
        self.points.iter().map(Option::as_ref)
    }
}

impl FromIterator<Option<LandmarkPoint>> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Option<LandmarkPoint>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
