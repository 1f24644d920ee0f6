use anyhow::Result;
use async_trait::async_trait;

/// Relative motion report from the 6-axis puck, in raw device counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionEvent {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub rx: i32,
    pub ry: i32,
    pub rz: i32,
}

/// Button transition report. One event per press and one per release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: u8,
    pub pressed: bool,
}

/// One event read from the input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Motion(MotionEvent),
    Button(ButtonEvent),
}

/// Connection to the motion input device.
#[async_trait]
pub trait InputSource: Send {
    /// Open the connection to the driver. Fails while the driver is not up.
    async fn open(&mut self) -> Result<()>;

    /// Fetch the next pending event, if any. Must not block beyond a short
    /// read; `Ok(None)` means nothing is queued right now.
    async fn poll(&mut self) -> Result<Option<InputEvent>>;
}
