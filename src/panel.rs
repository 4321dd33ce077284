use tracing::{info, warn};

use crate::{
    command::{CommandSender, Delivery},
    config::PanelConfig,
    error::{PanelError, PoseMismatch},
    model::{Angle, Pose, PoseName},
    pose_store::PoseStore,
    topology::{ServoId, Topology, SERVO_COUNT},
    transport::SerialLink,
    transport_serial::SerialPortLink,
};

/// Outcome of applying a stored pose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: Vec<ServoId>,
    pub mismatches: Vec<PoseMismatch>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// What a UI binds to: the current angle of every servo plus the pose store
/// and the command sender.
///
/// The angle cells here are the only copy of the current angles; sliders and
/// the encoder both read them.
pub struct ServoPanel<L: SerialLink = SerialPortLink> {
    topology: Topology,
    angles: [Angle; SERVO_COUNT],
    store: PoseStore,
    sender: CommandSender<L>,
}

impl ServoPanel<SerialPortLink> {
    /// Load the pose file and open the serial port described by `cfg`.
    ///
    /// Only an invalid `cfg` is an error; an unreachable port or unreadable
    /// pose file leaves the panel running degraded.
    pub fn from_config(cfg: &PanelConfig) -> Result<Self, PanelError> {
        cfg.validate()?;
        let topology = Topology::with_range(cfg.angle_range);
        let store = PoseStore::open(&cfg.states_path);
        let sender = CommandSender::connect(&cfg.serial_port, cfg.baud_rate, cfg.read_timeout());
        Ok(Self::new(topology, store, sender))
    }
}

impl<L: SerialLink> ServoPanel<L> {
    /// All angles start at each servo's minimum.
    pub fn new(topology: Topology, store: PoseStore, sender: CommandSender<L>) -> Self {
        let mut angles = [Angle::ZERO; SERVO_COUNT];
        for servo in topology.servos() {
            angles[servo.id.wire_index()] = servo.range.clamp(0);
        }
        Self { topology, angles, store, sender }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn store(&self) -> &PoseStore {
        &self.store
    }

    pub fn sender(&self) -> &CommandSender<L> {
        &self.sender
    }

    pub fn sender_mut(&mut self) -> &mut CommandSender<L> {
        &mut self.sender
    }

    pub fn get_angle(&self, servo: ServoId) -> Angle {
        self.angles[servo.wire_index()]
    }

    /// Store `value` clamped into the servo's range and return what was stored.
    pub fn set_angle(&mut self, servo: ServoId, value: i64) -> Angle {
        let angle = self.topology.servo(servo).range.clamp(value);
        self.angles[servo.wire_index()] = angle;
        angle
    }

    /// Current angles in wire order.
    pub fn angles(&self) -> [Angle; SERVO_COUNT] {
        self.angles
    }

    /// Set every servo to `value`, clamped per servo.
    pub fn reset_all_angles(&mut self, value: Angle) {
        for id in ServoId::ALL {
            self.set_angle(id, i64::from(value.value()));
        }
    }

    pub fn reset(&mut self) {
        self.reset_all_angles(Angle::ZERO);
    }

    pub fn current_pose(&self) -> Pose {
        Pose::from_angles(ServoId::ALL.into_iter().map(|id| (id, self.get_angle(id))))
    }

    /// Save the current angles under `name`.
    ///
    /// A `Serialization` error means the pose is kept in memory but the file
    /// was not updated.
    pub fn save_current_as_pose(&mut self, name: &str) -> Result<(), PanelError> {
        let name = PoseName::new(name)?;
        let pose = self.current_pose();
        info!("saving pose '{name}'");
        self.store.save(name, pose)
    }

    /// Apply the pose saved under `name` to the current angles.
    ///
    /// Servos the pose does not mention keep their angle and are listed as
    /// mismatches, as are unknown keys and values outside a servo's range.
    pub fn load_pose(&mut self, name: &str) -> Result<LoadReport, PanelError> {
        let name = PoseName::new(name)?;
        let pose = self
            .store
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| PanelError::PoseNotFound(name.to_string()))?;

        let mut report = LoadReport::default();
        for id in ServoId::ALL {
            let Some(requested) = pose.get(id) else {
                report.mismatches.push(PoseMismatch::MissingServo(id));
                continue;
            };
            let applied = self.set_angle(id, requested);
            if i64::from(applied.value()) != requested {
                report.mismatches.push(PoseMismatch::Clamped {
                    servo: id,
                    requested,
                    applied: applied.value(),
                });
            }
            report.applied.push(id);
        }
        report
            .mismatches
            .extend(pose.unknown_keys().map(|k| PoseMismatch::UnknownKey(k.to_string())));

        for mismatch in &report.mismatches {
            warn!("pose '{name}': {mismatch}");
        }
        info!("loaded pose '{name}' ({} servos applied)", report.applied.len());
        Ok(report)
    }

    /// Re-read the pose file to pick up edits made outside the panel.
    pub fn refresh_poses(&mut self) -> Result<usize, PanelError> {
        self.store.load()
    }

    pub fn pose_names(&self) -> Vec<String> {
        self.store.names().map(str::to_string).collect()
    }

    pub fn send_current_angles_to_device(&mut self) -> Result<Delivery, PanelError> {
        self.sender.send_angles(&self.angles)
    }

    /// Non-blocking check for one reply line from the device.
    pub fn poll_reply(&mut self) -> Result<Option<String>, PanelError> {
        self.sender.receive()
    }
}
