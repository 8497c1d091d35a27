//! Frame reader - splits a byte stream into frames

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::Frame;
use bytes::BytesMut;
use futures_util::stream::{self, Stream};
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::{trace, warn};

/// Maximum frame size (64KB)
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Carriage return ends a frame
pub const FRAME_TERMINATOR: u8 = b'\r';

const LINE_FEED: u8 = b'\n';

/// Byte-at-a-time frame accumulator
pub struct FrameReader {
    buffer: BytesMut,
    max_len: usize,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::with_max_len(MAX_FRAME_LEN)
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
            max_len,
        }
    }

    /// Consume one byte, returning a frame when it completes one.
    ///
    /// Line feeds are dropped wherever they appear.
    pub fn push(&mut self, byte: u8) -> ProtocolResult<Option<Frame>> {
        match byte {
            FRAME_TERMINATOR => {
                let line = self.buffer.split();
                let line = std::str::from_utf8(&line)
                    .map_err(|e| ProtocolError::ParseError(format!("frame is not valid UTF-8: {}", e)))?;
                Ok(Some(Frame::from_line(line)))
            }
            LINE_FEED => Ok(None),
            _ => {
                if self.buffer.len() >= self.max_len {
                    return Err(ProtocolError::MessageTooLarge {
                        size: self.buffer.len() + 1,
                        max: self.max_len,
                    });
                }
                self.buffer.extend_from_slice(&[byte]);
                Ok(None)
            }
        }
    }

    /// Consume a chunk, returning every frame it completes
    pub fn feed(&mut self, data: &[u8]) -> ProtocolResult<Vec<Frame>> {
        let mut frames = Vec::new();
        for &byte in data {
            if let Some(frame) = self.push(byte)? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Bytes accumulated towards an unfinished frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames read lazily from an async byte source.
///
/// The sequence ends when the source reports end of stream; the only way to
/// restart it is to open a new connection.
pub struct FrameStream<R> {
    reader: BufReader<R>,
    frames: FrameReader,
}

impl<R: AsyncRead + Unpin> FrameStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_len(reader, MAX_FRAME_LEN)
    }

    pub fn with_max_len(reader: R, max_len: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            frames: FrameReader::with_max_len(max_len),
        }
    }

    /// Read the next complete frame, or `None` at end of stream
    pub async fn next_frame(&mut self) -> ProtocolResult<Option<Frame>> {
        loop {
            let byte = match self.reader.read_u8().await {
                Ok(byte) => byte,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    if self.frames.pending() > 0 {
                        warn!(bytes = self.frames.pending(), "Discarding incomplete frame at end of stream");
                    }
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(frame) = self.frames.push(byte)? {
                trace!(frame = %frame, "Frame received");
                return Ok(Some(frame));
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = ProtocolResult<Frame>> {
        stream::try_unfold(self, |mut frames| async move {
            let next = frames.next_frame().await?;
            Ok::<_, ProtocolError>(next.map(|frame| (frame, frames)))
        })
    }
}
