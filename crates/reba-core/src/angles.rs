//! Joint-angle extraction from a single frame of landmarks.
//!
//! Conventions (all degrees):
//! - `neck`, `trunk_flexion`: deviation from image-up, `0` = upright.
//! - `trunk_rotation`: signed twist of the shoulder line relative to the hip
//!   line, `0` = co-planar.
//! - `*_shoulder`: angle at the shoulder between hip and elbow, `0` = arm
//!   hanging along the trunk.
//! - `*_elbow`, `*_wrist`, `*_knee`: flexion, i.e. `180 - vertex angle`, so a
//!   straight limb reads `0`.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::geometry::{
    angle_from_vertical_deg, line_angle_deg, signed_angle_diff_deg, vertex_angle_deg,
};
use crate::landmark::{LandmarkSet, PoseLandmark, Side};

/// Extraction settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    /// Landmarks reporting a lower visibility are treated as missing.
    pub min_visibility: f32,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
        }
    }
}

/// Errors that make a frame unusable for scoring.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("landmark {joint} (index {index}) is missing")]
    MissingLandmark { index: usize, joint: &'static str },
    #[error("landmark {joint} (index {index}) visibility {visibility:.2} is below threshold")]
    LowVisibility {
        index: usize,
        joint: &'static str,
        visibility: f32,
    },
    #[error("degenerate geometry for {joint}: coincident landmarks")]
    DegenerateGeometry { joint: &'static str },
}

/// Per-frame joint angles in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JointAngles {
    pub neck: f32,
    pub trunk_flexion: f32,
    pub trunk_rotation: f32,
    pub left_shoulder: f32,
    pub right_shoulder: f32,
    pub left_elbow: f32,
    pub right_elbow: f32,
    pub left_wrist: f32,
    pub right_wrist: f32,
    pub left_knee: f32,
    pub right_knee: f32,
}

impl JointAngles {
    pub fn shoulder(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_shoulder,
            Side::Right => self.right_shoulder,
        }
    }

    pub fn elbow(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_elbow,
            Side::Right => self.right_elbow,
        }
    }

    pub fn wrist(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_wrist,
            Side::Right => self.right_wrist,
        }
    }

    pub fn knee(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_knee,
            Side::Right => self.right_knee,
        }
    }

    pub fn mean_knee(&self) -> f32 {
        0.5 * (self.left_knee + self.right_knee)
    }
}

/// Validated view of the landmarks a frame needs.
struct Skeleton<'a> {
    landmarks: &'a LandmarkSet,
}

impl<'a> Skeleton<'a> {
    fn validate(landmarks: &'a LandmarkSet, min_visibility: f32) -> Result<Self, ExtractError> {
        for lm in PoseLandmark::REQUIRED {
            let point = landmarks
                .landmark(lm)
                .ok_or(ExtractError::MissingLandmark {
                    index: lm.index(),
                    joint: lm.name(),
                })?;
            if !point.is_visible(min_visibility) {
                return Err(ExtractError::LowVisibility {
                    index: lm.index(),
                    joint: lm.name(),
                    visibility: point.visibility.unwrap_or_default(),
                });
            }
        }
        Ok(Self { landmarks })
    }

    fn at(&self, lm: PoseLandmark) -> Point2<f32> {
        // `validate` guarantees presence; origin is unreachable in practice.
        self.landmarks
            .landmark(lm)
            .map(|p| p.xy())
            .unwrap_or_else(Point2::origin)
    }

    fn flexion(
        &self,
        a: PoseLandmark,
        vertex: PoseLandmark,
        c: PoseLandmark,
        joint: &'static str,
    ) -> Result<f32, ExtractError> {
        vertex_angle(self.at(a), self.at(vertex), self.at(c), joint).map(|v| 180.0 - v)
    }
}

fn vertex_angle(
    a: Point2<f32>,
    b: Point2<f32>,
    c: Point2<f32>,
    joint: &'static str,
) -> Result<f32, ExtractError> {
    vertex_angle_deg(a, b, c).ok_or(ExtractError::DegenerateGeometry { joint })
}

/// Compute [`JointAngles`] for one frame.
///
/// Trunk flexion is measured on `filming_side` only, the side facing a single
/// camera. Any missing or low-visibility required landmark fails the frame.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(landmarks, params), fields(n = landmarks.len()))
)]
pub fn extract_joint_angles(
    landmarks: &LandmarkSet,
    filming_side: Side,
    params: &ExtractParams,
) -> Result<JointAngles, ExtractError> {
    use PoseLandmark as L;

    let sk = Skeleton::validate(landmarks, params.min_visibility)?;

    let ls = sk.at(L::LeftShoulder);
    let rs = sk.at(L::RightShoulder);
    let shoulder_mid = Point2::from((ls.coords + rs.coords) * 0.5);
    let neck = angle_from_vertical_deg(&(sk.at(L::Nose) - shoulder_mid))
        .ok_or(ExtractError::DegenerateGeometry { joint: "neck" })?;

    let trunk_vec = sk.at(L::shoulder(filming_side)) - sk.at(L::hip(filming_side));
    let trunk_flexion = angle_from_vertical_deg(&trunk_vec)
        .ok_or(ExtractError::DegenerateGeometry { joint: "trunk" })?;

    let shoulder_line = line_angle_deg(ls, rs);
    let hip_line = line_angle_deg(sk.at(L::LeftHip), sk.at(L::RightHip));
    let trunk_rotation = signed_angle_diff_deg(hip_line, shoulder_line);

    let shoulder = |side: Side, joint| {
        vertex_angle(
            sk.at(L::hip(side)),
            sk.at(L::shoulder(side)),
            sk.at(L::elbow(side)),
            joint,
        )
    };
    let elbow =
        |side: Side, joint| sk.flexion(L::shoulder(side), L::elbow(side), L::wrist(side), joint);
    let wrist = |side: Side, joint| {
        sk.flexion(L::elbow(side), L::wrist(side), L::index_finger(side), joint)
    };
    let knee = |side: Side, joint| sk.flexion(L::hip(side), L::knee(side), L::ankle(side), joint);

    Ok(JointAngles {
        neck,
        trunk_flexion,
        trunk_rotation,
        left_shoulder: shoulder(Side::Left, "left_shoulder")?,
        right_shoulder: shoulder(Side::Right, "right_shoulder")?,
        left_elbow: elbow(Side::Left, "left_elbow")?,
        right_elbow: elbow(Side::Right, "right_elbow")?,
        left_wrist: wrist(Side::Left, "left_wrist")?,
        right_wrist: wrist(Side::Right, "right_wrist")?,
        left_knee: knee(Side::Left, "left_knee")?,
        right_knee: knee(Side::Right, "right_knee")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{LandmarkPoint, POSE_LANDMARK_COUNT};
    use approx::assert_abs_diff_eq;

    fn put(set: &mut LandmarkSet, lm: PoseLandmark, x: f32, y: f32) {
        set.set(lm.index(), Some(LandmarkPoint::new(x, y, 0.0)));
    }

    /// Front-facing upright figure, arms hanging, legs straight.
    fn upright() -> LandmarkSet {
        use PoseLandmark as L;
        let mut set = LandmarkSet::new(vec![None; POSE_LANDMARK_COUNT]);
        put(&mut set, L::Nose, 0.50, 0.10);
        put(&mut set, L::LeftShoulder, 0.60, 0.25);
        put(&mut set, L::RightShoulder, 0.40, 0.25);
        put(&mut set, L::LeftElbow, 0.60, 0.40);
        put(&mut set, L::RightElbow, 0.40, 0.40);
        put(&mut set, L::LeftWrist, 0.60, 0.55);
        put(&mut set, L::RightWrist, 0.40, 0.55);
        put(&mut set, L::LeftIndex, 0.60, 0.60);
        put(&mut set, L::RightIndex, 0.40, 0.60);
        put(&mut set, L::LeftHip, 0.58, 0.55);
        put(&mut set, L::RightHip, 0.42, 0.55);
        put(&mut set, L::LeftKnee, 0.58, 0.75);
        put(&mut set, L::RightKnee, 0.42, 0.75);
        put(&mut set, L::LeftAnkle, 0.58, 0.95);
        put(&mut set, L::RightAnkle, 0.42, 0.95);
        set
    }

    #[test]
    fn upright_pose_is_near_neutral() {
        let angles = extract_joint_angles(&upright(), Side::Left, &ExtractParams::default())
            .expect("angles");
        assert_abs_diff_eq!(angles.neck, 0.0, epsilon = 1e-3);
        assert!(angles.trunk_flexion < 5.0, "trunk {}", angles.trunk_flexion);
        assert_abs_diff_eq!(angles.trunk_rotation, 0.0, epsilon = 1e-3);
        assert!(angles.left_shoulder < 10.0);
        assert_abs_diff_eq!(angles.left_elbow, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(angles.right_wrist, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(angles.left_knee, 0.0, epsilon = 0.1);
        assert_abs_diff_eq!(angles.mean_knee(), 0.0, epsilon = 0.1);
    }

    #[test]
    fn forward_bend_raises_trunk_flexion_on_filming_side() {
        let mut set = upright();
        // Left shoulder pushed forward 45 degrees over the left hip.
        put(&mut set, PoseLandmark::LeftShoulder, 0.88, 0.25);
        let left = extract_joint_angles(&set, Side::Left, &ExtractParams::default()).unwrap();
        let right = extract_joint_angles(&set, Side::Right, &ExtractParams::default()).unwrap();
        assert_abs_diff_eq!(left.trunk_flexion, 45.0, epsilon = 0.5);
        assert!(right.trunk_flexion < 5.0);
    }

    #[test]
    fn bent_elbow_reads_as_flexion() {
        let mut set = upright();
        // Forearm horizontal: 90 degrees of flexion.
        put(&mut set, PoseLandmark::RightWrist, 0.25, 0.40);
        put(&mut set, PoseLandmark::RightIndex, 0.20, 0.40);
        let angles = extract_joint_angles(&set, Side::Left, &ExtractParams::default()).unwrap();
        assert_abs_diff_eq!(angles.right_elbow, 90.0, epsilon = 0.1);
        assert_abs_diff_eq!(angles.right_wrist, 0.0, epsilon = 0.1);
    }

    #[test]
    fn twisted_shoulders_give_signed_rotation() {
        let mut set = upright();
        put(&mut set, PoseLandmark::LeftShoulder, 0.60, 0.21);
        put(&mut set, PoseLandmark::RightShoulder, 0.40, 0.29);
        let angles = extract_joint_angles(&set, Side::Left, &ExtractParams::default()).unwrap();
        assert!(angles.trunk_rotation.abs() > 20.0);
    }

    #[test]
    fn missing_left_wrist_fails_extraction() {
        let mut set = upright();
        set.set(PoseLandmark::LeftWrist.index(), None);
        let err = extract_joint_angles(&set, Side::Left, &ExtractParams::default()).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MissingLandmark {
                index: 15,
                joint: "left_wrist"
            }
        );
    }

    #[test]
    fn short_landmark_list_fails_extraction() {
        let set = LandmarkSet::from_points(vec![LandmarkPoint::new(0.0, 0.0, 0.0); 12]);
        let err = extract_joint_angles(&set, Side::Left, &ExtractParams::default()).unwrap_err();
        assert!(matches!(err, ExtractError::MissingLandmark { .. }));
    }

    #[test]
    fn low_visibility_counts_as_missing() {
        let mut set = upright();
        let knee = LandmarkPoint::new(0.42, 0.75, 0.0).with_visibility(0.1);
        set.set(PoseLandmark::RightKnee.index(), Some(knee));
        let err = extract_joint_angles(&set, Side::Left, &ExtractParams::default()).unwrap_err();
        assert!(matches!(err, ExtractError::LowVisibility { index: 26, .. }));

        let lax = ExtractParams {
            min_visibility: 0.0,
        };
        assert!(extract_joint_angles(&set, Side::Left, &lax).is_ok());
    }

    #[test]
    fn coincident_joints_are_reported_not_nan() {
        let mut set = upright();
        put(&mut set, PoseLandmark::LeftElbow, 0.60, 0.55);
        let err = extract_joint_angles(&set, Side::Left, &ExtractParams::default()).unwrap_err();
        assert!(matches!(err, ExtractError::DegenerateGeometry { .. }));
    }
}
