use crate::error::PanelError;

/// Byte-level access to the microcontroller link.
pub trait SerialLink {
    /// Write all of `bytes` and flush.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), PanelError>;

    /// Number of received bytes waiting to be read, without blocking.
    fn bytes_waiting(&mut self) -> Result<usize, PanelError>;

    /// Read up to and including the next `\n`. Only called when
    /// [`SerialLink::bytes_waiting`] reported data.
    fn read_line(&mut self) -> Result<Vec<u8>, PanelError>;
}
