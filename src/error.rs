use thiserror::Error;

use crate::topology::ServoId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PanelError {
    #[error("serial connection unavailable")]
    ConnectionUnavailable,
    #[error("serial communication error: {0}")]
    Communication(String),
    #[error("could not read pose file: {0}")]
    Deserialization(String),
    #[error("could not write pose file: {0}")]
    Serialization(String),
    #[error("pose name must not be empty")]
    InvalidPoseName,
    #[error("no pose named {0:?}")]
    PoseNotFound(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A non-fatal discrepancy between a stored pose and the current topology.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoseMismatch {
    #[error("no value found for {0} in loaded pose")]
    MissingServo(ServoId),
    #[error("pose entry {0:?} does not match any servo")]
    UnknownKey(String),
    #[error("value {requested} for {servo} is outside its range, clamped to {applied}")]
    Clamped {
        servo: ServoId,
        requested: i64,
        applied: u16,
    },
}
