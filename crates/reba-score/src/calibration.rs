//! Observer-supplied calibration inputs.
//!
//! Two shapes exist:
//! - [`CalibrationRecord`]: the loosely typed wire form (`calibInputs`), where
//!   any field may be absent, `null`, or carry a value of the wrong type;
//! - [`CalibrationInput`]: the fully resolved form the engine consumes.
//!
//! [`CalibrationRecord::resolve`] bridges the two. Under
//! [`ValidationPolicy::Lenient`] every problem field gets its documented
//! default and a [`Fallback`] entry; under [`ValidationPolicy::Strict`] the
//! problems are returned as field-level errors instead.

use std::fmt;

use log::warn;
use reba_core::Side;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How [`CalibrationRecord::resolve`] treats missing or invalid fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Substitute documented defaults and keep scoring.
    #[default]
    Lenient,
    /// Reject the input, naming every offending field.
    Strict,
}

/// Posture category driving the leg sub-score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostureCategory {
    StandingBothLegs,
    /// Default: the strictest leg branch.
    #[default]
    StandingOneLeg,
    SittingOrWalking,
}

impl PostureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PostureCategory::StandingBothLegs => "standing-both-legs",
            PostureCategory::StandingOneLeg => "standing-one-leg",
            PostureCategory::SittingOrWalking => "sitting-or-walking",
        }
    }

    /// Parse a category name. `_`, spaces and case are normalized, and a few
    /// short aliases (`both-legs`, `one-leg`, `sitting`, `walking`) are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let norm: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match norm.as_str() {
            "standing-both-legs" | "both-legs" | "standing" => Some(Self::StandingBothLegs),
            "standing-one-leg" | "one-leg" => Some(Self::StandingOneLeg),
            "sitting-or-walking" | "sitting" | "walking" => Some(Self::SittingOrWalking),
            _ => None,
        }
    }
}

impl fmt::Display for PostureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved calibration inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationInput {
    pub filming_side: Side,
    pub neck_rotation: bool,
    pub neck_side_bend: bool,
    pub trunk_rotation: bool,
    pub trunk_side_bend: bool,
    /// Handled load in kilograms.
    pub load_kg: f32,
    /// Shock or rapid build-up of force (+1 on the load correction).
    pub shock_force: bool,
    pub posture: PostureCategory,
    pub supporting_leg: Side,
    /// Grip quality: 0 good, 1 fair, 2 poor, 3 unacceptable.
    pub coupling: u8,
    /// A body part held static for more than one minute.
    pub static_posture: bool,
    /// Small-range actions repeated more than four times per minute.
    pub repetitive: bool,
    /// Rapid large changes in posture or an unstable base.
    pub unstable: bool,
    /// Arm abducted or rotated, `0..=1`.
    pub upper_arm_correction: i8,
    /// Shoulder raised, `0..=1`.
    pub shoulder_elevation: i8,
    /// Arm supported or person leaning, `-1..=0`.
    pub gravity_assist: i8,
    /// Wrist deviated or twisted, `0..=1`.
    pub wrist_correction: i8,
}

impl Default for CalibrationInput {
    fn default() -> Self {
        Self {
            filming_side: Side::Left,
            neck_rotation: false,
            neck_side_bend: false,
            trunk_rotation: false,
            trunk_side_bend: false,
            load_kg: 0.0,
            shock_force: false,
            posture: PostureCategory::default(),
            supporting_leg: Side::Left,
            coupling: 0,
            static_posture: false,
            repetitive: false,
            unstable: false,
            upper_arm_correction: 0,
            shoulder_elevation: 0,
            gravity_assist: 0,
            wrist_correction: 0,
        }
    }
}

/// What was wrong with a calibration field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldIssue {
    Missing,
    Invalid { value: String, expected: String },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::Missing => f.write_str("missing"),
            FieldIssue::Invalid { value, expected } => {
                write!(f, "invalid value {value} (expected {expected})")
            }
        }
    }
}

/// A field-level validation failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire name of the field, e.g. `postureCategory`.
    pub field: String,
    pub issue: FieldIssue,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.issue)
    }
}

/// A default substituted for a missing or invalid field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fallback {
    pub field: String,
    pub issue: FieldIssue,
    /// The value used instead, rendered for reporting.
    pub applied: String,
}

/// Calibration validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("invalid calibration input: {}", join_fields(.0))]
    Fields(Vec<FieldError>),
}

impl CalibrationError {
    /// Offending fields, in declaration order.
    pub fn fields(&self) -> &[FieldError] {
        match self {
            CalibrationError::Fields(fields) => fields,
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of lenient resolution: the input plus the defaults it needed.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCalibration {
    pub input: CalibrationInput,
    pub fallbacks: Vec<Fallback>,
}

/// Wire form of the calibration inputs (`calibInputs`).
///
/// Unknown keys are ignored. Flags accept `0`/`1` or booleans.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filming_side: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neck_rotation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neck_side_bend: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trunk_rotation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trunk_side_bend: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_kg: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shock_force: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture_category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supporting_leg: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupling: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_posture: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetitive: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unstable: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_arm_correction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoulder_elevation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity_assist: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrist_correction: Option<Value>,
}

/// Collects per-field outcomes while resolving a record.
struct Resolver {
    policy: ValidationPolicy,
    fallbacks: Vec<Fallback>,
    errors: Vec<FieldError>,
}

impl Resolver {
    fn field<T: fmt::Debug>(
        &mut self,
        name: &str,
        raw: Option<&Value>,
        default: T,
        required: bool,
        parse: impl FnOnce(&Value) -> Result<T, &'static str>,
    ) -> T {
        let issue = match raw {
            None | Some(Value::Null) if !required => return default,
            None | Some(Value::Null) => FieldIssue::Missing,
            Some(v) => match parse(v) {
                Ok(parsed) => return parsed,
                Err(expected) => FieldIssue::Invalid {
                    value: v.to_string(),
                    expected: expected.to_string(),
                },
            },
        };
        match self.policy {
            ValidationPolicy::Strict => self.errors.push(FieldError {
                field: name.to_string(),
                issue,
            }),
            ValidationPolicy::Lenient => {
                warn!("calibration field `{name}` {issue}; using default {default:?}");
                self.fallbacks.push(Fallback {
                    field: name.to_string(),
                    issue,
                    applied: format!("{default:?}"),
                });
            }
        }
        default
    }
}

fn parse_side(v: &Value) -> Result<Side, &'static str> {
    v.as_str().and_then(Side::parse).ok_or("\"left\" or \"right\"")
}

fn parse_posture(v: &Value) -> Result<PostureCategory, &'static str> {
    v.as_str()
        .and_then(PostureCategory::parse)
        .ok_or("standing-both-legs, standing-one-leg or sitting-or-walking")
}

fn as_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        _ => None,
    }
}

fn parse_flag(v: &Value) -> Result<bool, &'static str> {
    match as_integer(v) {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err("0 or 1"),
    }
}

fn parse_range(
    lo: i64,
    hi: i64,
    expected: &'static str,
) -> impl Fn(&Value) -> Result<i64, &'static str> {
    move |v| as_integer(v).filter(|n| (lo..=hi).contains(n)).ok_or(expected)
}

fn parse_load(v: &Value) -> Result<f32, &'static str> {
    v.as_f64()
        .filter(|kg| kg.is_finite() && *kg >= 0.0)
        .map(|kg| kg as f32)
        .ok_or("a non-negative weight in kg")
}

impl CalibrationRecord {
    /// Resolve into a [`CalibrationInput`].
    ///
    /// Defaults: `filmingSide` left, `postureCategory` standing-one-leg,
    /// `supportingLeg` left, every flag and correction 0, `loadKg` 0.
    /// `shockForce` is optional and never reported.
    pub fn resolve(
        &self,
        policy: ValidationPolicy,
    ) -> Result<ResolvedCalibration, CalibrationError> {
        let mut r = Resolver {
            policy,
            fallbacks: Vec::new(),
            errors: Vec::new(),
        };
        let d = CalibrationInput::default();

        let input = CalibrationInput {
            filming_side: r.field(
                "filmingSide",
                self.filming_side.as_ref(),
                d.filming_side,
                true,
                parse_side,
            ),
            neck_rotation: r.field(
                "neckRotation",
                self.neck_rotation.as_ref(),
                false,
                true,
                parse_flag,
            ),
            neck_side_bend: r.field(
                "neckSideBend",
                self.neck_side_bend.as_ref(),
                false,
                true,
                parse_flag,
            ),
            trunk_rotation: r.field(
                "trunkRotation",
                self.trunk_rotation.as_ref(),
                false,
                true,
                parse_flag,
            ),
            trunk_side_bend: r.field(
                "trunkSideBend",
                self.trunk_side_bend.as_ref(),
                false,
                true,
                parse_flag,
            ),
            load_kg: r.field("loadKg", self.load_kg.as_ref(), 0.0, true, parse_load),
            shock_force: r.field(
                "shockForce",
                self.shock_force.as_ref(),
                false,
                false,
                parse_flag,
            ),
            posture: r.field(
                "postureCategory",
                self.posture_category.as_ref(),
                d.posture,
                true,
                parse_posture,
            ),
            supporting_leg: r.field(
                "supportingLeg",
                self.supporting_leg.as_ref(),
                d.supporting_leg,
                true,
                parse_side,
            ),
            coupling: r.field(
                "coupling",
                self.coupling.as_ref(),
                0,
                true,
                parse_range(0, 3, "an integer in 0..=3"),
            ) as u8,
            static_posture: r.field(
                "staticPosture",
                self.static_posture.as_ref(),
                false,
                true,
                parse_flag,
            ),
            repetitive: r.field(
                "repetitive",
                self.repetitive.as_ref(),
                false,
                true,
                parse_flag,
            ),
            unstable: r.field("unstable", self.unstable.as_ref(), false, true, parse_flag),
            upper_arm_correction: r.field(
                "upperArmCorrection",
                self.upper_arm_correction.as_ref(),
                0,
                true,
                parse_range(0, 1, "0 or 1"),
            ) as i8,
            shoulder_elevation: r.field(
                "shoulderElevation",
                self.shoulder_elevation.as_ref(),
                0,
                true,
                parse_range(0, 1, "0 or 1"),
            ) as i8,
            gravity_assist: r.field(
                "gravityAssist",
                self.gravity_assist.as_ref(),
                0,
                true,
                parse_range(-1, 0, "-1 or 0"),
            ) as i8,
            wrist_correction: r.field(
                "wristCorrection",
                self.wrist_correction.as_ref(),
                0,
                true,
                parse_range(0, 1, "0 or 1"),
            ) as i8,
        };

        if !r.errors.is_empty() {
            return Err(CalibrationError::Fields(r.errors));
        }
        Ok(ResolvedCalibration {
            input,
            fallbacks: r.fallbacks,
        })
    }
}

fn flag(b: bool) -> Option<Value> {
    Some(Value::from(u8::from(b)))
}

impl From<&CalibrationInput> for CalibrationRecord {
    fn from(c: &CalibrationInput) -> Self {
        Self {
            filming_side: Some(Value::from(c.filming_side.as_str())),
            neck_rotation: flag(c.neck_rotation),
            neck_side_bend: flag(c.neck_side_bend),
            trunk_rotation: flag(c.trunk_rotation),
            trunk_side_bend: flag(c.trunk_side_bend),
            load_kg: Some(Value::from(c.load_kg)),
            shock_force: flag(c.shock_force),
            posture_category: Some(Value::from(c.posture.as_str())),
            supporting_leg: Some(Value::from(c.supporting_leg.as_str())),
            coupling: Some(Value::from(c.coupling)),
            static_posture: flag(c.static_posture),
            repetitive: flag(c.repetitive),
            unstable: flag(c.unstable),
            upper_arm_correction: Some(Value::from(c.upper_arm_correction)),
            shoulder_elevation: Some(Value::from(c.shoulder_elevation)),
            gravity_assist: Some(Value::from(c.gravity_assist)),
            wrist_correction: Some(Value::from(c.wrist_correction)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> CalibrationRecord {
        serde_json::from_value(v).expect("record")
    }

    fn full() -> Value {
        json!({
            "filmingSide": "right",
            "neckRotation": 1,
            "neckSideBend": 0,
            "trunkRotation": 0,
            "trunkSideBend": true,
            "loadKg": 7.5,
            "postureCategory": "sitting-or-walking",
            "supportingLeg": "left",
            "coupling": 2,
            "staticPosture": 1,
            "repetitive": 0,
            "unstable": 0,
            "upperArmCorrection": 1,
            "shoulderElevation": 0,
            "gravityAssist": -1,
            "wristCorrection": 1
        })
    }

    #[test]
    fn complete_record_resolves_without_fallbacks() {
        let resolved = record(full())
            .resolve(ValidationPolicy::Strict)
            .expect("strict");
        assert!(resolved.fallbacks.is_empty());
        let c = resolved.input;
        assert_eq!(c.filming_side, Side::Right);
        assert!(c.neck_rotation && c.trunk_side_bend && c.static_posture);
        assert!(!c.shock_force);
        assert_eq!(c.posture, PostureCategory::SittingOrWalking);
        assert_eq!(c.coupling, 2);
        assert_eq!(c.gravity_assist, -1);
        assert_eq!(c.load_kg, 7.5);
    }

    #[test]
    fn empty_record_falls_back_to_documented_defaults() {
        let resolved = CalibrationRecord::default()
            .resolve(ValidationPolicy::Lenient)
            .expect("lenient never fails");
        assert_eq!(resolved.input, CalibrationInput::default());
        assert_eq!(resolved.input.posture, PostureCategory::StandingOneLeg);
        // 16 required fields; shockForce is optional.
        assert_eq!(resolved.fallbacks.len(), 16);
        assert!(resolved
            .fallbacks
            .iter()
            .all(|f| f.issue == FieldIssue::Missing));
    }

    #[test]
    fn unknown_posture_uses_strictest_leg_branch() {
        let mut v = full();
        v["postureCategory"] = json!("kneeling");
        let resolved = record(v).resolve(ValidationPolicy::Lenient).unwrap();
        assert_eq!(resolved.input.posture, PostureCategory::StandingOneLeg);
        assert_eq!(resolved.fallbacks.len(), 1);
        assert_eq!(resolved.fallbacks[0].field, "postureCategory");
        assert!(matches!(
            resolved.fallbacks[0].issue,
            FieldIssue::Invalid { .. }
        ));
    }

    #[test]
    fn strict_policy_names_offending_fields() {
        let mut v = full();
        v["coupling"] = json!(5);
        v["filmingSide"] = json!("front");
        v.as_object_mut().unwrap().remove("repetitive");
        let err = record(v).resolve(ValidationPolicy::Strict).unwrap_err();
        let names: Vec<&str> = err.fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["filmingSide", "coupling", "repetitive"]);
        assert!(err.to_string().contains("coupling"));
    }

    #[test]
    fn wrong_types_are_invalid_not_fatal() {
        let mut v = full();
        v["loadKg"] = json!("heavy");
        v["staticPosture"] = json!(2);
        v["wristCorrection"] = json!(0.5);
        let resolved = record(v).resolve(ValidationPolicy::Lenient).unwrap();
        assert_eq!(resolved.input.load_kg, 0.0);
        assert!(!resolved.input.static_posture);
        assert_eq!(resolved.input.wrist_correction, 0);
        assert_eq!(resolved.fallbacks.len(), 3);
    }

    #[test]
    fn null_counts_as_missing() {
        let mut v = full();
        v["supportingLeg"] = Value::Null;
        let resolved = record(v).resolve(ValidationPolicy::Lenient).unwrap();
        assert_eq!(resolved.fallbacks[0].issue, FieldIssue::Missing);
    }

    #[test]
    fn typed_input_survives_the_wire_form() {
        let input = CalibrationInput {
            filming_side: Side::Right,
            load_kg: 12.0,
            shock_force: true,
            posture: PostureCategory::StandingBothLegs,
            coupling: 3,
            repetitive: true,
            gravity_assist: -1,
            ..CalibrationInput::default()
        };
        let record = CalibrationRecord::from(&input);
        let text = serde_json::to_string(&record).unwrap();
        let back: CalibrationRecord = serde_json::from_str(&text).unwrap();
        let resolved = back.resolve(ValidationPolicy::Strict).unwrap();
        assert_eq!(resolved.input, input);
    }

    #[test]
    fn posture_aliases() {
        assert_eq!(
            PostureCategory::parse("Standing_Both Legs"),
            Some(PostureCategory::StandingBothLegs)
        );
        assert_eq!(
            PostureCategory::parse("walking"),
            Some(PostureCategory::SittingOrWalking)
        );
        assert_eq!(PostureCategory::parse(""), None);
    }
}
