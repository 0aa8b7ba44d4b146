use alloc::vec::Vec;

use super::MAX_PAYLOAD_SIZE;
use super::crc::Crc32;
use super::error::FrameError;

pub const MAGIC: [u8; 2] = [0x5A, 0xA5];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    /// Client greeting carrying the hub identity token
    Hello = 0x01,
    /// Session accepted
    Welcome = 0x02,
    /// Session refused, payload is the reason
    Reject = 0x03,
    /// Replay the RF code in the payload
    Transmit = 0x10,
    /// Code delivered
    Ack = 0x11,
    /// Code not delivered, payload is the reason
    Nack = 0x12,
    Ping = 0x20,
    Pong = 0x21,
}

impl Opcode {
    pub fn from_u8(value: u8) -> Result<Self, FrameError> {
        match value {
            0x01 => Ok(Self::Hello),
            0x02 => Ok(Self::Welcome),
            0x03 => Ok(Self::Reject),
            0x10 => Ok(Self::Transmit),
            0x11 => Ok(Self::Ack),
            0x12 => Ok(Self::Nack),
            0x20 => Ok(Self::Ping),
            0x21 => Ok(Self::Pong),
            other => Err(FrameError::UnknownOpcode(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Welcome => "welcome",
            Self::Reject => "reject",
            Self::Transmit => "transmit",
            Self::Ack => "ack",
            Self::Nack => "nack",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub opcode: Opcode,
    pub sequence: u16,
    pub payload_length: u32,
}

impl FrameHeader {
    /// magic(2) + opcode(1) + sequence(2) + length(4)
    pub const SIZE: usize = 9;

    pub const CRC_SIZE: usize = 4;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buffer = [0u8; Self::SIZE];
        buffer[..2].copy_from_slice(&MAGIC);
        buffer[2] = self.opcode as u8;
        buffer[3..5].copy_from_slice(&self.sequence.to_be_bytes());
        buffer[5..9].copy_from_slice(&self.payload_length.to_be_bytes());
        buffer
    }

    /// Decodes the fixed header. `data` must hold at least [`FrameHeader::SIZE`] bytes.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < Self::SIZE {
            return Err(FrameError::UnexpectedEof);
        }

        if data[..2] != MAGIC {
            return Err(FrameError::BadMagic([data[0], data[1]]));
        }

        let opcode = Opcode::from_u8(data[2])?;
        let sequence = u16::from_be_bytes([data[3], data[4]]);
        let payload_length = u32::from_be_bytes([data[5], data[6], data[7], data[8]]);

        if payload_length as usize > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge(payload_length as usize));
        }

        Ok(Self {
            opcode,
            sequence,
            payload_length,
        })
    }

    pub fn total_frame_size(&self) -> usize {
        Self::SIZE + self.payload_length as usize + Self::CRC_SIZE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: Opcode,
    pub sequence: u16,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(opcode: Opcode, sequence: u16, payload: &[u8]) -> Self {
        Self {
            opcode,
            sequence,
            payload: payload.to_vec(),
        }
    }

    pub fn empty(opcode: Opcode, sequence: u16) -> Self {
        Self::new(opcode, sequence, &[])
    }

    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            opcode: self.opcode,
            sequence: self.sequence,
            payload_length: self.payload.len() as u32,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge(self.payload.len()));
        }

        let header = self.header().encode();
        let crc = checksum(&header, &self.payload);

        let mut buffer = Vec::with_capacity(self.header().total_frame_size());
        buffer.extend_from_slice(&header);
        buffer.extend_from_slice(&self.payload);
        buffer.extend_from_slice(&crc.to_be_bytes());

        Ok(buffer)
    }

    /// Decodes one complete frame from the front of `data`, returning it with the bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), FrameError> {
        let header = FrameHeader::decode(data)?;
        let total = header.total_frame_size();
        if data.len() < total {
            return Err(FrameError::UnexpectedEof);
        }

        let payload_end = FrameHeader::SIZE + header.payload_length as usize;
        let payload = &data[FrameHeader::SIZE..payload_end];
        let expected = u32::from_be_bytes([
            data[payload_end],
            data[payload_end + 1],
            data[payload_end + 2],
            data[payload_end + 3],
        ]);
        let actual = checksum(&data[..FrameHeader::SIZE], payload);
        if expected != actual {
            return Err(FrameError::CrcMismatch { expected, actual });
        }

        Ok((Self::new(header.opcode, header.sequence, payload), total))
    }
}

/// Checksum covers everything after the magic: opcode, sequence, length and payload.
fn checksum(header: &[u8], payload: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(&header[MAGIC.len()..FrameHeader::SIZE]);
    crc.update(payload);
    crc.finish()
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_frame_layout() {
        let frame = Frame::new(Opcode::Transmit, 0x0102, &[0xde, 0xad, 0xbe, 0xef]);
        let bytes = frame.encode().unwrap();

        assert_eq!(&bytes[..2], &MAGIC);
        assert_eq!(bytes[2], 0x10);
        assert_eq!(&bytes[3..5], &[0x01, 0x02]);
        assert_eq!(&bytes[5..9], &[0, 0, 0, 4]);
        assert_eq!(&bytes[9..13], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bytes.len(), FrameHeader::SIZE + 4 + FrameHeader::CRC_SIZE);

        let (decoded, consumed) = Frame::decode(&bytes).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_decode_leaves_trailing_bytes() {
        let mut bytes = Frame::empty(Opcode::Ping, 7).encode().unwrap();
        let first_len = bytes.len();
        bytes.extend(Frame::empty(Opcode::Pong, 7).encode().unwrap());

        let (first, consumed) = Frame::decode(&bytes).unwrap();
        assert_eq!(first.opcode, Opcode::Ping);
        assert_eq!(consumed, first_len);

        let (second, _) = Frame::decode(&bytes[consumed..]).unwrap();
        assert_eq!(second.opcode, Opcode::Pong);
    }

    #[test]
    fn test_decode_rejects_corruption() {
        let mut bytes = Frame::new(Opcode::Hello, 1, b"aa:bb:cc:dd:ee:ff").encode().unwrap();
        bytes[10] ^= 0xff;
        assert!(matches!(
            Frame::decode(&bytes),
            Err(FrameError::CrcMismatch { .. })
        ));

        let bad_magic = vec![0x00, 0xa5, 0x01, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            FrameHeader::decode(&bad_magic),
            Err(FrameError::BadMagic([0x00, 0xa5]))
        );

        let bad_opcode = vec![0x5a, 0xa5, 0x7f, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            FrameHeader::decode(&bad_opcode),
            Err(FrameError::UnknownOpcode(0x7f))
        );

        let truncated = Frame::new(Opcode::Transmit, 1, &[1, 2, 3]).encode().unwrap();
        assert_eq!(
            Frame::decode(&truncated[..truncated.len() - 1]),
            Err(FrameError::UnexpectedEof)
        );
    }

    #[test]
    fn test_oversized_payload() {
        let frame = Frame::new(Opcode::Transmit, 1, &vec![0u8; MAX_PAYLOAD_SIZE + 1]);
        assert_eq!(
            frame.encode(),
            Err(FrameError::PayloadTooLarge(MAX_PAYLOAD_SIZE + 1))
        );

        let mut header = [0u8; FrameHeader::SIZE];
        header[..2].copy_from_slice(&MAGIC);
        header[2] = Opcode::Transmit as u8;
        header[5..9].copy_from_slice(&u32::MAX.to_be_bytes());
        assert_eq!(
            FrameHeader::decode(&header),
            Err(FrameError::PayloadTooLarge(u32::MAX as usize))
        );
    }
}
