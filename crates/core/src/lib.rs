pub use config::DaemonConfig;
pub use daemon::{run, run_with};
pub use input::device::{ButtonEvent, InputEvent, InputSource, MotionEvent};
pub use input::event_loop::InputEventLoop;
pub use output::fixture::FixtureClient;
pub use output::sync_loop::OutputSyncLoop;
pub use spacenav::client::SpaceNavSource;
pub use state::{LightState, RunFlag, SharedLightState};
pub use wled::client::WledClient;

mod config;
mod daemon;
mod input;
mod output;
mod spacenav;
mod state;
mod wled;
