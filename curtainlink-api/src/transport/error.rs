use core::fmt;

use alloc::string::String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Underlying read or write failed
    Io(String),
    /// Peer closed the stream mid-frame
    UnexpectedEof,
    /// Frame does not start with the hub magic
    BadMagic([u8; 2]),
    /// Unknown opcode byte
    UnknownOpcode(u8),
    /// Payload exceeds the hub limit
    PayloadTooLarge(usize),
    /// Checksum over opcode..payload did not match
    CrcMismatch { expected: u32, actual: u32 },
    /// Reply does not answer the request that was sent
    SequenceMismatch { expected: u16, actual: u16 },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::UnexpectedEof => write!(f, "Unexpected EOF"),
            Self::BadMagic(m) => write!(f, "Bad frame magic: {:02x}{:02x}", m[0], m[1]),
            Self::UnknownOpcode(op) => write!(f, "Unknown opcode: 0x{:02x}", op),
            Self::PayloadTooLarge(size) => write!(f, "Payload too large: {} bytes", size),
            Self::CrcMismatch { expected, actual } => {
                write!(f, "CRC mismatch: expected {:08x}, got {:08x}", expected, actual)
            }
            Self::SequenceMismatch { expected, actual } => {
                write!(f, "Sequence mismatch: expected {}, got {}", expected, actual)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

pub type Result<T> = core::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(FrameError::UnknownOpcode(0x7f).to_string(), "Unknown opcode: 0x7f");
        assert_eq!(
            FrameError::BadMagic([0x00, 0xff]).to_string(),
            "Bad frame magic: 00ff"
        );
        assert_eq!(
            FrameError::SequenceMismatch { expected: 3, actual: 4 }.to_string(),
            "Sequence mismatch: expected 3, got 4"
        );
    }
}
