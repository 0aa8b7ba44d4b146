use alloc::format;
use alloc::vec::Vec;

use embedded_io_async::{Read, Write};

use super::DEFAULT_BUFFER_SIZE;
use super::error::FrameError;
use super::frame::{Frame, FrameHeader, Opcode};

/// Framed request/reply link to an RF hub over any async byte stream.
#[derive(Debug)]
pub struct HubLink<IO> {
    io: IO,
    rx_buffer: Vec<u8>,
    next_sequence: u16,
}

impl<IO> HubLink<IO> {
    pub fn new(io: IO) -> Self {
        Self {
            io,
            rx_buffer: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            next_sequence: 1,
        }
    }

    pub fn into_inner(self) -> IO {
        self.io
    }

    fn take_sequence(&mut self) -> u16 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        sequence
    }
}

impl<IO> HubLink<IO>
where
    IO: Read + Write,
{
    /// Sends a new request frame and returns the sequence number it was given.
    pub async fn send(&mut self, opcode: Opcode, payload: &[u8]) -> Result<u16, FrameError> {
        let sequence = self.take_sequence();
        self.write_frame(&Frame::new(opcode, sequence, payload)).await?;
        Ok(sequence)
    }

    /// Answers a received frame, echoing its sequence number.
    pub async fn reply(
        &mut self,
        opcode: Opcode,
        sequence: u16,
        payload: &[u8],
    ) -> Result<(), FrameError> {
        self.write_frame(&Frame::new(opcode, sequence, payload)).await
    }

    /// Sends a request and waits for the frame answering it.
    pub async fn request(&mut self, opcode: Opcode, payload: &[u8]) -> Result<Frame, FrameError> {
        let sequence = self.send(opcode, payload).await?;
        let frame = self.receive().await?;

        if frame.sequence != sequence {
            return Err(FrameError::SequenceMismatch {
                expected: sequence,
                actual: frame.sequence,
            });
        }

        Ok(frame)
    }

    pub async fn receive(&mut self) -> Result<Frame, FrameError> {
        self.fill_to(FrameHeader::SIZE).await?;
        let header = FrameHeader::decode(&self.rx_buffer)?;

        self.fill_to(header.total_frame_size()).await?;
        let (frame, consumed) = Frame::decode(&self.rx_buffer)?;
        self.rx_buffer.drain(..consumed);

        Ok(frame)
    }

    async fn write_frame(&mut self, frame: &Frame) -> Result<(), FrameError> {
        let bytes = frame.encode()?;

        self.io
            .write_all(&bytes)
            .await
            .map_err(|e| FrameError::Io(format!("{:?}", e)))?;
        self.io
            .flush()
            .await
            .map_err(|e| FrameError::Io(format!("{:?}", e)))?;

        Ok(())
    }

    async fn fill_to(&mut self, required: usize) -> Result<(), FrameError> {
        while self.rx_buffer.len() < required {
            let mut chunk = [0u8; 512];
            let n = self
                .io
                .read(&mut chunk)
                .await
                .map_err(|e| FrameError::Io(format!("{:?}", e)))?;
            if n == 0 {
                return Err(FrameError::UnexpectedEof);
            }
            self.rx_buffer.extend_from_slice(&chunk[..n]);
        }
        Ok(())
    }
}
