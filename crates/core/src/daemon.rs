use anyhow::Result;

use crate::config::DaemonConfig;
use crate::input::device::InputSource;
use crate::input::event_loop::InputEventLoop;
use crate::output::fixture::FixtureClient;
use crate::output::sync_loop::OutputSyncLoop;
use crate::spacenav::client::SpaceNavSource;
use crate::state::{RunFlag, SharedLightState};
use crate::wled::client::WledClient;

/// Run the daemon against the real spacenavd driver and WLED fixture.
/// Blocks until the run flag is cleared and both loops have wound down.
pub async fn run(config: DaemonConfig, run_flag: RunFlag) -> Result<()> {
    let source = SpaceNavSource::new(config.device_socket.clone());
    let client = WledClient::new(&config.fixture_address, config.connect_timeout)?;
    run_with(config, run_flag, source, client).await;
    Ok(())
}

/// Start the input and output loops concurrently and wait for both to end,
/// which only happens once the run flag is cleared. The loops share nothing
/// but the light state and the run flag, so one of them stuck in a
/// connection retry never stalls the other.
pub async fn run_with<S, C>(config: DaemonConfig, run_flag: RunFlag, source: S, client: C)
where
    S: InputSource + 'static,
    C: FixtureClient + 'static,
{
    log::info!("Daemon started");
    let state = SharedLightState::new();

    let input = InputEventLoop::new(source, state.clone(), run_flag.clone(), config.clone());
    let output = OutputSyncLoop::new(client, state, run_flag, config);

    let input_task = tokio::spawn(input.run());
    let output_task = tokio::spawn(output.run());

    for (name, task) in [("input", input_task), ("output", output_task)] {
        if let Err(err) = task.await {
            log::error!("The {name} loop terminated abnormally: {err}");
        }
    }

    log::info!("Daemon stopped");
}
