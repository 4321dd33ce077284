use std::collections::VecDeque;

use quadruped_servo_panel::{
    CommandSender, PanelError, PoseStore, SerialLink, ServoId, ServoPanel, Topology,
};

/// Echoes every command back as a reply, like firmware in debug mode.
#[derive(Default)]
struct EchoLink {
    inbox: VecDeque<u8>,
}

impl SerialLink for EchoLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        self.inbox.extend(b"ack ");
        self.inbox.extend(bytes);
        Ok(())
    }

    fn bytes_waiting(&mut self) -> Result<usize, PanelError> {
        Ok(self.inbox.len())
    }

    fn read_line(&mut self) -> Result<Vec<u8>, PanelError> {
        let end = self
            .inbox
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.inbox.len(), |i| i + 1);
        Ok(self.inbox.drain(..end).collect())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let dir = std::env::temp_dir().join("quadruped_loopback_demo");
    std::fs::create_dir_all(&dir)?;
    let store = PoseStore::open(dir.join("states.json"));
    let mut panel = ServoPanel::new(Topology::quadruped(), store, CommandSender::new(EchoLink::default()));

    for (i, id) in ServoId::ALL.into_iter().enumerate() {
        panel.set_angle(id, 45 + 10 * i as i64);
    }
    panel.save_current_as_pose("demo")?;
    panel.reset();
    let report = panel.load_pose("demo")?;
    println!("applied {} servos, {} mismatches", report.applied.len(), report.mismatches.len());

    panel.send_current_angles_to_device()?;
    while let Some(reply) = panel.poll_reply()? {
        println!("{reply}");
    }
    Ok(())
}
