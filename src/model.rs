use std::{collections::BTreeMap, fmt};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::{error::PanelError, topology::ServoId};

/// A servo angle in whole degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(u16);

impl Angle {
    pub const ZERO: Angle = Angle(0);

    pub const fn new(degrees: u16) -> Self {
        Self(degrees)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive `[min, max]` bounds of a servo. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredRange")]
pub struct AngleRange {
    min: u16,
    max: u16,
}

impl Default for AngleRange {
    fn default() -> Self {
        Self { min: 0, max: 180 }
    }
}

impl AngleRange {
    pub fn new(min: u16, max: u16) -> Result<Self, PanelError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        if self.min > self.max {
            return Err(PanelError::Config(format!(
                "angle range min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    pub fn clamp(&self, raw: i64) -> Angle {
        let clamped = raw.clamp(i64::from(self.min), i64::from(self.max));
        // within u16 bounds after the clamp above
        Angle(clamped as u16)
    }
}

#[derive(Deserialize)]
struct StoredRange {
    min: u16,
    max: u16,
}

impl TryFrom<StoredRange> for AngleRange {
    type Error = PanelError;

    fn try_from(raw: StoredRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

/// Name a pose is saved under. Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoseName(String);

impl PoseName {
    pub fn new(name: impl Into<String>) -> Result<Self, PanelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PanelError::InvalidPoseName);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PoseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of servo angles keyed by servo code.
///
/// Keys are kept as written in the pose file so that entries which do not
/// match the topology survive a load/save cycle and can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pose {
    entries: BTreeMap<String, i64>,
}

impl Pose {
    pub fn from_angles(angles: impl IntoIterator<Item = (ServoId, Angle)>) -> Self {
        let entries = angles
            .into_iter()
            .map(|(id, angle)| (id.code().to_string(), i64::from(angle.value())))
            .collect();
        Self { entries }
    }

    /// Raw stored value for `servo`, looked up by code first, then label.
    pub fn get(&self, servo: ServoId) -> Option<i64> {
        self.entries
            .get(servo.code())
            .or_else(|| self.entries.get(servo.label()))
            .copied()
    }

    /// Keys that name no servo of the robot.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|key| ServoId::from_key(key).is_none())
    }
}

// Older pose files stored angles as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredAngle {
    Number(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Pose {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, StoredAngle>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .map(|(key, value)| match value {
                StoredAngle::Number(n) => Ok((key, n)),
                StoredAngle::Text(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(|n| (key.clone(), n))
                    .map_err(|_| D::Error::custom(format!("angle {text:?} for {key:?} is not an integer"))),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_pins_to_bounds() {
        let range = AngleRange::default();
        assert_eq!(range.clamp(-5), Angle::ZERO);
        assert_eq!(range.clamp(90), Angle::new(90));
        assert_eq!(range.clamp(999), Angle::new(180));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(AngleRange::new(100, 10), Err(PanelError::Config(_))));
    }

    #[test]
    fn inverted_range_fails_to_deserialize() {
        let err = serde_json::from_str::<AngleRange>(r#"{"min": 170, "max": 10}"#).unwrap_err();
        assert!(err.to_string().contains("exceeds max"));

        let ok: AngleRange = serde_json::from_str(r#"{"min": 10, "max": 170}"#).unwrap();
        assert_eq!(ok.clamp(0), Angle::new(10));
    }

    #[test]
    fn blank_pose_names_are_rejected() {
        assert_eq!(PoseName::new(""), Err(PanelError::InvalidPoseName));
        assert_eq!(PoseName::new("  \t"), Err(PanelError::InvalidPoseName));
        assert_eq!(PoseName::new(" sit ").unwrap().as_str(), " sit ");
    }

    #[test]
    fn legacy_labels_and_string_angles_deserialize() {
        let pose: Pose = serde_json::from_str(r#"{"FLH (Front Left Hip)": "45", "BRA": 120}"#).unwrap();
        assert_eq!(pose.get(ServoId::FLH), Some(45));
        assert_eq!(pose.get(ServoId::BRA), Some(120));
        assert_eq!(pose.get(ServoId::FLA), None);
        assert_eq!(pose.unknown_keys().count(), 0);
    }

    #[test]
    fn non_numeric_angle_fails() {
        let err = serde_json::from_str::<Pose>(r#"{"FLH": "left"}"#).unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }

    #[test]
    fn serializes_with_codes_and_integers() {
        let pose = Pose::from_angles([(ServoId::FLH, Angle::new(10)), (ServoId::BRA, Angle::new(80))]);
        assert_eq!(serde_json::to_string(&pose).unwrap(), r#"{"BRA":80,"FLH":10}"#);
    }
}
