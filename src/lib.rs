pub mod command;
pub mod config;
pub mod error;
pub mod model;
pub mod panel;
pub mod pose_store;
pub mod topology;
pub mod transport;
pub mod transport_serial;

pub use command::{encode, CommandSender, Delivery};
pub use config::PanelConfig;
pub use error::{PanelError, PoseMismatch};
pub use model::{Angle, AngleRange, Pose, PoseName};
pub use panel::{LoadReport, ServoPanel};
pub use pose_store::PoseStore;
pub use topology::{Joint, LegId, ServoId, Topology, SERVO_COUNT};
pub use transport::SerialLink;
pub use transport_serial::SerialPortLink;
