//! Named poses persisted to a single JSON file.
//!
//! The file is one object mapping pose names to poses:
//!
//! ```json
//! { "stand": { "FLH": 90, "FLA": 45, "FRH": 90, "FRA": 45,
//!              "BLH": 90, "BLA": 45, "BRH": 90, "BRA": 45 } }
//! ```
//!
//! Every save rewrites the whole file.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::{
    error::PanelError,
    model::{Pose, PoseName},
};

pub const DEFAULT_STATES_FILE: &str = "states.json";

#[derive(Debug)]
pub struct PoseStore {
    path: PathBuf,
    poses: BTreeMap<String, Pose>,
}

impl PoseStore {
    /// Empty store backed by `path`. Nothing is read until [`PoseStore::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), poses: BTreeMap::new() }
    }

    /// Create a store and load it, keeping it empty if the file is unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        if let Err(e) = store.load() {
            warn!("starting with an empty pose store: {e}");
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory poses with the file contents.
    ///
    /// A missing file is recreated from the poses already in memory (empty on
    /// first load). On a parse failure the current poses are left untouched.
    pub fn load(&mut self) -> Result<usize, PanelError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    "pose file {} not found, writing {} poses to it",
                    self.path.display(),
                    self.poses.len()
                );
                self.persist()?;
                return Ok(self.poses.len());
            }
            Err(e) => {
                warn!("failed to read pose file {}: {e}", self.path.display());
                return Err(PanelError::Deserialization(e.to_string()));
            }
        };

        match serde_json::from_str::<BTreeMap<String, Pose>>(&contents) {
            Ok(poses) => {
                debug!("loaded {} poses from {}", poses.len(), self.path.display());
                self.poses = poses;
                Ok(self.poses.len())
            }
            Err(e) => {
                warn!("bad pose file {}: {e}", self.path.display());
                Err(PanelError::Deserialization(e.to_string()))
            }
        }
    }

    /// Insert or replace `name`, then write the whole store back.
    ///
    /// If writing fails the pose stays in memory and the error is returned.
    pub fn save(&mut self, name: PoseName, pose: Pose) -> Result<(), PanelError> {
        self.poses.insert(name.into_inner(), pose);
        self.persist()
    }

    pub fn get(&self, name: &str) -> Option<&Pose> {
        self.poses.get(name)
    }

    /// Pose names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.poses.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    fn persist(&self) -> Result<(), PanelError> {
        let json = serde_json::to_string_pretty(&self.poses)
            .map_err(|e| PanelError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| {
            warn!("failed to write pose file {}: {e}", self.path.display());
            PanelError::Serialization(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Angle, topology::ServoId};

    fn pose(base: u16) -> Pose {
        Pose::from_angles(
            ServoId::ALL
                .into_iter()
                .enumerate()
                .map(|(i, id)| (id, Angle::new(base + i as u16))),
        )
    }

    #[test]
    fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");

        let mut store = PoseStore::new(&path);
        assert_eq!(store.load().unwrap(), 0);
        assert!(store.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");

        let mut again = PoseStore::new(&path);
        assert_eq!(again.load(), Ok(0));
    }

    #[test]
    fn deleted_file_is_rewritten_from_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");

        let mut store = PoseStore::new(&path);
        store.save(PoseName::new("sit").unwrap(), pose(20)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(store.load(), Ok(1));
        assert_eq!(store.get("sit"), Some(&pose(20)));

        let mut reread = PoseStore::new(&path);
        assert_eq!(reread.load(), Ok(1));
        assert_eq!(reread.get("sit"), Some(&pose(20)));
    }

    #[test]
    fn save_writes_every_pose() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");

        let mut store = PoseStore::new(&path);
        store.save(PoseName::new("sit").unwrap(), pose(10)).unwrap();
        store.save(PoseName::new("stand").unwrap(), pose(90)).unwrap();

        let mut reread = PoseStore::new(&path);
        assert_eq!(reread.load(), Ok(2));
        assert_eq!(reread.get("sit"), Some(&pose(10)));
        assert_eq!(reread.get("stand"), Some(&pose(90)));
        assert_eq!(reread.names().collect::<Vec<_>>(), ["sit", "stand"]);
    }

    #[test]
    fn save_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = PoseStore::new(dir.path().join("states.json"));
        store.save(PoseName::new("a").unwrap(), pose(1)).unwrap();
        store.save(PoseName::new("a").unwrap(), pose(50)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a"), Some(&pose(50)));
    }

    #[test]
    fn corrupt_file_keeps_previous_poses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");

        let mut store = PoseStore::new(&path);
        store.save(PoseName::new("keep").unwrap(), pose(5)).unwrap();

        std::fs::write(&path, "[1, 2, 3").unwrap();
        assert!(matches!(store.load(), Err(PanelError::Deserialization(_))));
        assert_eq!(store.get("keep"), Some(&pose(5)));
    }

    #[test]
    fn wrong_shape_is_a_deserialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("states.json");
        std::fs::write(&path, r#"{"sit": [1, 2, 3]}"#).unwrap();

        let mut store = PoseStore::new(&path);
        assert!(matches!(store.load(), Err(PanelError::Deserialization(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn unwritable_path_keeps_in_memory_pose() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("states.json");

        let mut store = PoseStore::new(&path);
        let err = store.save(PoseName::new("x").unwrap(), pose(0)).unwrap_err();
        assert!(matches!(err, PanelError::Serialization(_)));
        assert_eq!(store.get("x"), Some(&pose(0)));
    }

    #[test]
    fn get_unknown_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PoseStore::open(dir.path().join("states.json"));
        assert_eq!(store.get("ghost"), None);
    }
}
