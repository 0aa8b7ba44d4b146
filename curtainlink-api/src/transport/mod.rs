pub mod crc;
pub mod error;
pub mod frame;
pub mod io;

pub use crc::{Crc32, crc32};
pub use error::FrameError;
pub use frame::{Frame, FrameHeader, MAGIC, Opcode};
pub use io::HubLink;

/// Initial receive buffer size
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Largest RF code the hub accepts (64 KiB)
pub const MAX_PAYLOAD_SIZE: usize = 64 * 1024;

#[cfg(test)]
mod link_tests {
    use alloc::vec::Vec;

    use super::*;

    /// In-memory stream: reads from a script, records writes
    #[derive(Debug)]
    struct ScriptedIo {
        read_data: Vec<u8>,
        read_pos: usize,
        read_chunk_size: Option<usize>,
        written: Vec<u8>,
    }

    impl ScriptedIo {
        fn new(read_data: Vec<u8>) -> Self {
            Self {
                read_data,
                read_pos: 0,
                read_chunk_size: None,
                written: Vec::new(),
            }
        }

        fn with_chunk_size(mut self, chunk_size: usize) -> Self {
            self.read_chunk_size = Some(chunk_size);
            self
        }
    }

    impl embedded_io_async::ErrorType for ScriptedIo {
        type Error = embedded_io_async::ErrorKind;
    }

    impl embedded_io_async::Read for ScriptedIo {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let available = self.read_data.len() - self.read_pos;
            if available == 0 {
                return Ok(0);
            }

            let n = match self.read_chunk_size {
                Some(chunk) => buf.len().min(chunk).min(available),
                None => buf.len().min(available),
            };
            buf[..n].copy_from_slice(&self.read_data[self.read_pos..self.read_pos + n]);
            self.read_pos += n;
            Ok(n)
        }
    }

    impl embedded_io_async::Write for ScriptedIo {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    fn script(frames: &[Frame]) -> Vec<u8> {
        frames.iter().flat_map(|f| f.encode().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_request_matches_reply() {
        let io = ScriptedIo::new(script(&[Frame::empty(Opcode::Ack, 1)]));
        let mut link = HubLink::new(io);

        let reply = link.request(Opcode::Transmit, &[0x26, 0x00]).await.unwrap();
        assert_eq!(reply.opcode, Opcode::Ack);

        let (sent, _) = Frame::decode(&link.into_inner().written).unwrap();
        assert_eq!(sent, Frame::new(Opcode::Transmit, 1, &[0x26, 0x00]));
    }

    #[tokio::test]
    async fn test_sequence_advances() {
        let io = ScriptedIo::new(script(&[Frame::empty(Opcode::Pong, 1), Frame::empty(Opcode::Pong, 1)]));
        let mut link = HubLink::new(io);

        assert!(link.request(Opcode::Ping, &[]).await.is_ok());
        assert_eq!(
            link.request(Opcode::Ping, &[]).await,
            Err(FrameError::SequenceMismatch { expected: 2, actual: 1 })
        );
    }

    #[tokio::test]
    async fn test_receive_across_small_reads() {
        let frames = [
            Frame::new(Opcode::Hello, 9, b"aa:bb:cc:dd:ee:ff"),
            Frame::new(Opcode::Transmit, 10, &[0xb2, 0x0c, 0x1e]),
        ];
        let io = ScriptedIo::new(script(&frames)).with_chunk_size(3);
        let mut link = HubLink::new(io);

        assert_eq!(link.receive().await.unwrap(), frames[0]);
        assert_eq!(link.receive().await.unwrap(), frames[1]);
        assert_eq!(link.receive().await, Err(FrameError::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_reply_echoes_sequence() {
        let mut link = HubLink::new(ScriptedIo::new(Vec::new()));
        link.reply(Opcode::Nack, 42, b"busy").await.unwrap();

        let (sent, _) = Frame::decode(&link.into_inner().written).unwrap();
        assert_eq!(sent.sequence, 42);
        assert_eq!(sent.payload, b"busy");
    }
}
