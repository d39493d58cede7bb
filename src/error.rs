use thiserror::Error;

#[derive(Error, Debug)]
pub enum EepromError {
    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File error: {0}")]
    File(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Ack mismatch at byte {position}: sent {sent:#04x}, device answered {received:#04x}")]
    AckMismatch {
        position: usize,
        sent: u8,
        received: u8,
    },

    #[error("Erase rejected by device, response {0:#04x}")]
    EraseRejected(u8),

    #[error("No response from device: {0}")]
    NoResponse(String),

    #[error("Short read: received {received} of {expected} bytes")]
    ShortRead { received: usize, expected: usize },
}

pub type EepromResult<T> = std::result::Result<T, EepromError>;
