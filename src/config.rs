use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{error::PanelError, model::AngleRange, pose_store::DEFAULT_STATES_FILE};

pub const DEFAULT_SERIAL_PORT: &str = "COM6";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub serial_port: String,
    pub baud_rate: u32,
    /// Upper bound on reading the rest of a reply line once bytes are waiting.
    pub read_timeout_ms: u64,
    pub states_path: PathBuf,
    pub angle_range: AngleRange,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 100,
            states_path: PathBuf::from(DEFAULT_STATES_FILE),
            angle_range: AngleRange::default(),
        }
    }
}

impl PanelConfig {
    /// Read a JSON config; fields left out take their defaults.
    pub fn load(path: &Path) -> Result<Self, PanelError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| PanelError::Config(format!("{}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&contents)
            .map_err(|e| PanelError::Config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        if self.serial_port.trim().is_empty() {
            return Err(PanelError::Config("serial_port must not be empty".into()));
        }
        if self.baud_rate == 0 {
            return Err(PanelError::Config("baud_rate must be positive".into()));
        }
        self.angle_range.validate()
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel_hardware() {
        let cfg = PanelConfig::default();
        assert_eq!(cfg.serial_port, "COM6");
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.states_path, PathBuf::from("states.json"));
        assert_eq!(cfg.angle_range, AngleRange::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.json");
        std::fs::write(&path, r#"{"serial_port": "/dev/ttyACM0", "angle_range": {"min": 10, "max": 170}}"#).unwrap();

        let cfg = PanelConfig::load(&path).unwrap();
        assert_eq!(cfg.serial_port, "/dev/ttyACM0");
        assert_eq!(cfg.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(cfg.angle_range, AngleRange::new(10, 170).unwrap());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.json");
        std::fs::write(&path, r#"{"angle_range": {"min": 170, "max": 10}}"#).unwrap();
        assert!(matches!(PanelConfig::load(&path), Err(PanelError::Config(_))));

        std::fs::write(&path, r#"{"baud_rate": 0}"#).unwrap();
        assert!(matches!(PanelConfig::load(&path), Err(PanelError::Config(_))));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PanelConfig::load(&dir.path().join("absent.json")),
            Err(PanelError::Config(_))
        ));
    }
}
