//! Channel-fed byte source.
//!
//! An async task reads the real input and forwards chunks over a bounded
//! channel. The blocking poll loop drains whatever has arrived without ever
//! waiting on the channel.

use bytes::{Buf, Bytes, BytesMut};
use evtcmd_protocol::ByteSource;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Byte source backed by an mpsc receiver of chunks.
pub struct ChannelSource {
    rx: mpsc::Receiver<Bytes>,
    buffer: BytesMut,
    closed: bool,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<Bytes>) -> Self {
        Self {
            rx,
            buffer: BytesMut::with_capacity(1024),
            closed: false,
        }
    }

    /// Creates a bounded channel and the source reading from it.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Bytes>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }

    /// Returns true once every sender is gone and all bytes have been read.
    pub fn is_exhausted(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    /// Returns the number of bytes received but not yet read.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn fill(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.buffer.extend_from_slice(&chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
    }
}

impl ByteSource for ChannelSource {
    fn available(&mut self) -> usize {
        self.fill();
        self.buffer.len()
    }

    fn read(&mut self) -> Option<u8> {
        if self.buffer.is_empty() {
            self.fill();
        }
        if self.buffer.has_remaining() {
            Some(self.buffer.get_u8())
        } else {
            None
        }
    }
}

/// Copies `reader` into the channel in chunks of at most `chunk_size` bytes.
///
/// Returns the number of bytes forwarded. Stops early without error if the
/// receiving side has gone away.
pub async fn pump<R>(
    mut reader: R,
    tx: mpsc::Sender<Bytes>,
    chunk_size: usize,
) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            tracing::debug!("Input reached end of stream after {} bytes", total);
            break;
        }
        if tx.send(Bytes::copy_from_slice(&buf[..n])).await.is_err() {
            tracing::debug!("Listener dropped, stopping input");
            break;
        }
        total += n as u64;
    }
    Ok(total)
}
