use anyhow::Result;
use async_trait::async_trait;

/// Connection to the light fixture.
///
/// Implementations own their transport; any call may fail with a transport
/// error at any point.
#[async_trait]
pub trait FixtureClient: Send {
    /// Establish the connection. May hang on an unresponsive host; the
    /// caller bounds it with a timeout.
    async fn connect(&mut self) -> Result<()>;

    /// Whether the last exchange with the fixture succeeded.
    fn connected(&self) -> bool;

    /// Fixture-wide power and global brightness.
    async fn set_master(&mut self, on: bool, brightness: u8) -> Result<()>;

    /// Brightness and color temperature for one addressable segment.
    async fn set_segment(&mut self, segment: u8, brightness: u8, color_temp: u8) -> Result<()>;

    /// Release the connection. Safe to call when not connected.
    async fn close(&mut self);
}
