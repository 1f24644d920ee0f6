use tokio::time::{sleep, timeout};

use crate::config::DaemonConfig;
use crate::output::fixture::FixtureClient;
use crate::state::{LightState, RunFlag, SharedLightState};

/// Fixture segment the daemon drives.
const SEGMENT: u8 = 0;
/// Master brightness stays pinned at full; dimming happens per segment.
const MASTER_BRIGHTNESS: u8 = 255;

/// Keeps the fixture consistent with the shared light state across
/// connection churn.
///
/// Each connection attempt walks disconnected -> connecting -> connected.
/// Connect timeouts and transport errors share one recovery path: release
/// the connection, log, cool down, retry. Nothing here is fatal; the loop
/// only ends when the run flag clears.
pub struct OutputSyncLoop<C> {
    client: C,
    state: SharedLightState,
    run_flag: RunFlag,
    config: DaemonConfig,
}

impl<C: FixtureClient> OutputSyncLoop<C> {
    pub fn new(client: C, state: SharedLightState, run_flag: RunFlag, config: DaemonConfig) -> Self {
        Self {
            client,
            state,
            run_flag,
            config,
        }
    }

    /// Run until the run flag clears. The connection is released on every
    /// exit path before a new one is opened.
    pub async fn run(mut self) {
        while self.run_flag.is_running() {
            match timeout(self.config.connect_timeout, self.client.connect()).await {
                Err(_) => {
                    log::warn!("Connection to WLED timed out, retrying");
                }
                Ok(Err(err)) => {
                    log::warn!("An error occurred while connecting to WLED: {err:#}");
                }
                Ok(Ok(())) => {
                    log::debug!("Connected to WLED");
                    sleep(self.config.settle_delay).await;
                    self.push_until_stopped().await;
                }
            }
            self.client.close().await;
            if self.run_flag.is_running() {
                sleep(self.config.reconnect_cooldown).await;
            }
        }

        log::info!("Output sync loop stopped");
    }

    /// Push cycle for one established connection. Starts from an empty
    /// baseline so the latest state goes out immediately, including right
    /// after a reconnect. Returns on error, disconnect, or shutdown.
    async fn push_until_stopped(&mut self) {
        let mut last_pushed: Option<LightState> = None;
        while self.run_flag.is_running() {
            if !self.client.connected() {
                log::warn!("WLED connection lost, reconnecting");
                return;
            }
            let current = self.state.snapshot();
            if last_pushed != Some(current) {
                if let Err(err) = self.push(current).await {
                    log::warn!("An error occurred while updating WLED: {err:#}");
                    return;
                }
                last_pushed = Some(current);
            }
            sleep(self.config.poll_interval).await;
        }
    }

    async fn push(&mut self, state: LightState) -> anyhow::Result<()> {
        self.client.set_master(state.on, MASTER_BRIGHTNESS).await?;
        self.client
            .set_segment(SEGMENT, state.brightness_level(), state.color_temp_level())
            .await?;
        Ok(())
    }
}
