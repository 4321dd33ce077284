use std::{
    io::{BufRead, BufReader, ErrorKind, Write},
    time::Duration,
};

use serialport::SerialPort;

use crate::{error::PanelError, transport::SerialLink};

/// [`SerialLink`] over an OS serial port.
pub struct SerialPortLink {
    port: BufReader<Box<dyn SerialPort>>,
}

impl SerialPortLink {
    pub fn open(serial_port: &str, baudrate: u32, timeout: Duration) -> Result<Self, PanelError> {
        let io = serialport::new(serial_port, baudrate)
            .timeout(timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PanelError::ConnectionUnavailable,
                _ => PanelError::Communication(e.to_string()),
            })?;

        Ok(Self { port: BufReader::new(io) })
    }
}

impl SerialLink for SerialPortLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), PanelError> {
        let io = self.port.get_mut();
        io.write_all(bytes)
            .and_then(|_| io.flush())
            .map_err(|e| PanelError::Communication(e.to_string()))
    }

    fn bytes_waiting(&mut self) -> Result<usize, PanelError> {
        let buffered = self.port.buffer().len();
        let pending = self
            .port
            .get_ref()
            .bytes_to_read()
            .map_err(|e| PanelError::Communication(e.to_string()))?;
        Ok(buffered + pending as usize)
    }

    fn read_line(&mut self) -> Result<Vec<u8>, PanelError> {
        let mut line = Vec::new();
        match self.port.read_until(b'\n', &mut line) {
            Ok(_) => Ok(line),
            // partial line with no terminator before the port timeout
            Err(e) if e.kind() == ErrorKind::TimedOut && !line.is_empty() => Ok(line),
            Err(e) => Err(PanelError::Communication(e.to_string())),
        }
    }
}
