use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::UnixStream;

use super::protocol::{parse_frame, FRAME_LEN};
use crate::input::device::{InputEvent, InputSource};

/// Client for the spacenavd driver's Unix socket.
///
/// Events arrive as fixed-size frames; a partially read frame is kept across
/// polls until the remaining bytes arrive.
pub struct SpaceNavSource {
    socket_path: PathBuf,
    stream: Option<UnixStream>,
    frame: [u8; FRAME_LEN],
    filled: usize,
}

impl SpaceNavSource {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            stream: None,
            frame: [0; FRAME_LEN],
            filled: 0,
        }
    }
}

#[async_trait]
impl InputSource for SpaceNavSource {
    async fn open(&mut self) -> Result<()> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .with_context(|| format!("connecting to {}", self.socket_path.display()))?;
        self.stream = Some(stream);
        self.filled = 0;
        Ok(())
    }

    async fn poll(&mut self) -> Result<Option<InputEvent>> {
        loop {
            let stream = self
                .stream
                .as_ref()
                .context("the input device is not open")?;
            match stream.try_read(&mut self.frame[self.filled..]) {
                Ok(0) => {
                    self.stream = None;
                    anyhow::bail!("the SpaceNav driver closed the connection");
                }
                Ok(read) => {
                    self.filled += read;
                    if self.filled == FRAME_LEN {
                        self.filled = 0;
                        if let Some(event) = parse_frame(&self.frame) {
                            return Ok(Some(event));
                        }
                        // Unknown frame type; keep draining.
                    }
                }
                Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(err) => {
                    self.stream = None;
                    return Err(err).context("reading from the SpaceNav driver");
                }
            }
        }
    }
}
