use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the daemon.
///
/// Defaults carry the tuned production timings; tests swap in
/// millisecond-scale values to drive the loops fast.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Hostname or IP of the WLED fixture, optionally with a port.
    pub fixture_address: String,
    /// Unix socket published by the spacenavd driver.
    pub device_socket: PathBuf,
    /// Yield between poll cycles in both loops.
    pub poll_interval: Duration,
    /// Fixed delay between attempts to open the input device.
    pub device_retry_delay: Duration,
    /// Upper bound on one fixture connection attempt.
    pub connect_timeout: Duration,
    /// Cooldown before retrying the fixture after a failure.
    pub reconnect_cooldown: Duration,
    /// Pause after connecting before the first command, to avoid driving an
    /// unstable link.
    pub settle_delay: Duration,
}

impl DaemonConfig {
    pub const DEFAULT_FIXTURE_ADDRESS: &'static str = "cctwled.local";
    pub const DEFAULT_DEVICE_SOCKET: &'static str = "/var/run/spnav.sock";

    pub fn new(fixture_address: impl Into<String>) -> Self {
        Self {
            fixture_address: fixture_address.into(),
            ..Self::default()
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            fixture_address: Self::DEFAULT_FIXTURE_ADDRESS.to_string(),
            device_socket: PathBuf::from(Self::DEFAULT_DEVICE_SOCKET),
            poll_interval: Duration::from_millis(10),
            device_retry_delay: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(5),
            reconnect_cooldown: Duration::from_secs(1),
            settle_delay: Duration::from_millis(500),
        }
    }
}
