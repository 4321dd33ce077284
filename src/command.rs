//! Line protocol to the microcontroller.
//!
//! One command is the eight servo angles in wire order as decimal text,
//! comma-separated, terminated by `\n`:
//!
//! ```text
//! 90,45,90,45,90,45,90,45\n
//! ```
//!
//! Replies are free-form newline-terminated text and are passed through
//! untouched apart from trimming.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    error::PanelError,
    model::Angle,
    topology::SERVO_COUNT,
    transport::SerialLink,
    transport_serial::SerialPortLink,
};

/// Encode angles, given in wire order, as one command line.
pub fn encode(angles: &[Angle; SERVO_COUNT]) -> String {
    let mut line = angles
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Written to the port, with the number of bytes.
    Sent(usize),
    /// No port is open; nothing was written.
    Offline,
}

/// Owns the serial link, or runs degraded when it could not be opened.
pub struct CommandSender<L: SerialLink = SerialPortLink> {
    link: Option<L>,
    offline_reported: bool,
}

impl CommandSender<SerialPortLink> {
    /// Open `serial_port`; on failure the sender is returned in offline mode.
    pub fn connect(serial_port: &str, baudrate: u32, timeout: Duration) -> Self {
        match SerialPortLink::open(serial_port, baudrate, timeout) {
            Ok(link) => {
                info!("connected to {serial_port} at {baudrate} baud");
                Self::new(link)
            }
            Err(e) => {
                warn!("could not open {serial_port}: {e}; commands will not be sent");
                Self { link: None, offline_reported: true }
            }
        }
    }
}

impl<L: SerialLink> CommandSender<L> {
    pub fn new(link: L) -> Self {
        Self { link: Some(link), offline_reported: false }
    }

    pub fn offline() -> Self {
        Self { link: None, offline_reported: false }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    pub fn link(&self) -> Option<&L> {
        self.link.as_ref()
    }

    pub fn link_mut(&mut self) -> Option<&mut L> {
        self.link.as_mut()
    }

    /// Write one already-encoded line. Offline senders do nothing.
    pub fn send(&mut self, line: &str) -> Result<Delivery, PanelError> {
        let Some(link) = self.link.as_mut() else {
            if !self.offline_reported {
                warn!("{}; command not sent", PanelError::ConnectionUnavailable);
                self.offline_reported = true;
            } else {
                debug!("offline, dropped command {:?}", line.trim_end());
            }
            return Ok(Delivery::Offline);
        };

        link.write_all(line.as_bytes()).inspect_err(|e| {
            warn!("command failed: {e}");
        })?;
        debug!("command sent: {:?}", line.trim_end());
        Ok(Delivery::Sent(line.len()))
    }

    pub fn send_angles(&mut self, angles: &[Angle; SERVO_COUNT]) -> Result<Delivery, PanelError> {
        self.send(&encode(angles))
    }

    /// Return one reply line if any bytes are already buffered, otherwise
    /// `None` without waiting.
    pub fn receive(&mut self) -> Result<Option<String>, PanelError> {
        let Some(link) = self.link.as_mut() else {
            return Ok(None);
        };
        if link.bytes_waiting()? == 0 {
            return Ok(None);
        }
        let raw = link.read_line()?;
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        debug!("received: {line:?}");
        Ok(Some(line))
    }
}
