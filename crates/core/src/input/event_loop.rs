use tokio::time::sleep;

use crate::config::DaemonConfig;
use crate::input::device::{InputEvent, InputSource};
use crate::state::{LightState, RunFlag, SharedLightState};

/// Raw device counts are scaled down by this divisor before they move a
/// level, so a full-deflection tilt sweeps the range in about a second at
/// the polling cadence.
const MOTION_DIVISOR: f32 = 300.0;

/// Polls the input device and folds each event into the shared light state.
///
/// The device is expected to be present but possibly late to initialize, so
/// the open is retried on a fixed delay forever rather than backed off.
pub struct InputEventLoop<S> {
    source: S,
    state: SharedLightState,
    run_flag: RunFlag,
    config: DaemonConfig,
}

impl<S: InputSource> InputEventLoop<S> {
    pub fn new(source: S, state: SharedLightState, run_flag: RunFlag, config: DaemonConfig) -> Self {
        Self {
            source,
            state,
            run_flag,
            config,
        }
    }

    /// Run until the run flag clears.
    pub async fn run(mut self) {
        while self.run_flag.is_running() {
            match self.source.open().await {
                Ok(()) => {
                    log::info!("Connection to the SpaceNav driver established");
                    break;
                }
                Err(err) => {
                    log::warn!("No connection to the SpaceNav driver ({err}), retrying");
                    sleep(self.config.device_retry_delay).await;
                }
            }
        }

        while self.run_flag.is_running() {
            match self.source.poll().await {
                Ok(Some(event)) => self.handle_event(event),
                Ok(None) => {}
                Err(err) => log::debug!("Ignoring input device read error: {err}"),
            }
            sleep(self.config.poll_interval).await;
        }

        log::info!("Input event loop stopped");
    }

    fn handle_event(&self, event: InputEvent) {
        let current = self.state.snapshot();
        match event {
            InputEvent::Motion(motion) if current.on => {
                let next = apply_motion(current, motion.rx, motion.rz);
                // Only commit real changes to spare the output loop churn.
                if next != current {
                    let stored = self.state.update(|_| next);
                    log::debug!(
                        "Color temperature: {}, brightness: {}",
                        stored.color_temp,
                        stored.brightness
                    );
                }
            }
            InputEvent::Motion(_) => {}
            InputEvent::Button(button) if button.pressed => match button.button {
                0 => {
                    let stored = self.state.update(|mut s| {
                        s.on = !s.on;
                        s
                    });
                    log::debug!("Switched {}", if stored.on { "on" } else { "off" });
                }
                1 => {
                    let stored = self.state.update(|mut s| {
                        s.on = true;
                        s.brightness = LightState::MAX_LEVEL;
                        s.color_temp = 127.0;
                        s
                    });
                    log::debug!(
                        "Set color temperature: {}, brightness: {}, switched on",
                        stored.color_temp,
                        stored.brightness
                    );
                }
                _ => {}
            },
            InputEvent::Button(_) => {}
        }
    }
}

/// Map a rotation report onto the current levels. Tilting around Z steers
/// the color temperature; tilting around X steers the brightness, with the
/// axis direction inverted so that pulling back raises it.
fn apply_motion(current: LightState, rx: i32, rz: i32) -> LightState {
    LightState {
        on: current.on,
        color_temp: (current.color_temp - rz as f32 / MOTION_DIVISOR)
            .clamp(0.0, LightState::MAX_LEVEL),
        brightness: (current.brightness - rx as f32 / MOTION_DIVISOR)
            .clamp(LightState::MIN_BRIGHTNESS, LightState::MAX_LEVEL),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use super::*;
    use crate::input::device::{ButtonEvent, MotionEvent};

    fn test_config() -> DaemonConfig {
        DaemonConfig {
            poll_interval: Duration::from_millis(1),
            device_retry_delay: Duration::from_millis(1),
            ..DaemonConfig::default()
        }
    }

    fn motion(rx: i32, rz: i32) -> InputEvent {
        InputEvent::Motion(MotionEvent {
            x: 0,
            y: 0,
            z: 0,
            rx,
            ry: 0,
            rz,
        })
    }

    fn press(button: u8) -> InputEvent {
        InputEvent::Button(ButtonEvent {
            button,
            pressed: true,
        })
    }

    fn release(button: u8) -> InputEvent {
        InputEvent::Button(ButtonEvent {
            button,
            pressed: false,
        })
    }

    /// Fails `failed_opens` times before opening, then serves the scripted
    /// events one per poll.
    struct ScriptedSource {
        failed_opens: usize,
        open_attempts: Arc<AtomicUsize>,
        events: VecDeque<InputEvent>,
    }

    impl ScriptedSource {
        fn new(failed_opens: usize, events: Vec<InputEvent>) -> Self {
            Self {
                failed_opens,
                open_attempts: Arc::new(AtomicUsize::new(0)),
                events: events.into(),
            }
        }
    }

    #[async_trait]
    impl InputSource for ScriptedSource {
        async fn open(&mut self) -> Result<()> {
            let attempt = self.open_attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failed_opens {
                bail!("driver not running");
            }
            Ok(())
        }

        async fn poll(&mut self) -> Result<Option<InputEvent>> {
            Ok(self.events.pop_front())
        }
    }

    fn loop_with(
        source: ScriptedSource,
        state: &SharedLightState,
        run_flag: &RunFlag,
    ) -> InputEventLoop<ScriptedSource> {
        InputEventLoop::new(source, state.clone(), run_flag.clone(), test_config())
    }

    async fn wait_for(state: &SharedLightState, check: impl Fn(LightState) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if check(state.snapshot()) {
                    return;
                }
                sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("state never reached the expected value");
    }

    #[test]
    fn motion_adjusts_both_levels() {
        let current = LightState {
            on: true,
            brightness: 128.0,
            color_temp: 100.0,
        };
        let next = apply_motion(current, -300, 600);
        assert_eq!(next.brightness, 129.0);
        assert_eq!(next.color_temp, 98.0);
    }

    #[test]
    fn motion_inverts_the_x_axis() {
        let current = LightState {
            on: true,
            brightness: 128.0,
            color_temp: 0.0,
        };
        // A positive tilt around X dims.
        assert!(apply_motion(current, 300, 0).brightness < current.brightness);
        assert!(apply_motion(current, -300, 0).brightness > current.brightness);
    }

    #[test]
    fn motion_clamps_at_the_range_edges() {
        let current = LightState {
            on: true,
            brightness: 2.0,
            color_temp: 254.0,
        };
        let next = apply_motion(current, 3_000_000, -3_000_000);
        assert_eq!(next.brightness, LightState::MIN_BRIGHTNESS);
        assert_eq!(next.color_temp, LightState::MAX_LEVEL);
    }

    #[test]
    fn zero_motion_is_not_a_change() {
        let current = LightState {
            on: true,
            brightness: 128.0,
            color_temp: 100.0,
        };
        assert_eq!(apply_motion(current, 0, 0), current);
    }

    #[tokio::test]
    async fn motion_is_ignored_while_off() {
        let state = SharedLightState::new();
        let run_flag = RunFlag::new();
        let source = ScriptedSource::new(0, vec![motion(900, 900), motion(-900, -900)]);
        let task = tokio::spawn(loop_with(source, &state, &run_flag).run());

        sleep(Duration::from_millis(20)).await;
        assert_eq!(state.snapshot(), LightState::new());

        run_flag.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn button_zero_press_toggles_power() {
        let state = SharedLightState::new();
        let run_flag = RunFlag::new();
        let source = ScriptedSource::new(0, vec![press(0), release(0), press(0), release(0)]);
        let task = tokio::spawn(loop_with(source, &state, &run_flag).run());

        // Two full press/release pairs land back in the original off state;
        // the release events must not toggle.
        sleep(Duration::from_millis(20)).await;
        assert!(!state.snapshot().on);

        run_flag.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn button_one_press_applies_the_preset() {
        let state = SharedLightState::new();
        state.update(|mut s| {
            s.on = false;
            s.brightness = 7.0;
            s.color_temp = 200.0;
            s
        });
        let run_flag = RunFlag::new();
        let source = ScriptedSource::new(0, vec![press(1)]);
        let task = tokio::spawn(loop_with(source, &state, &run_flag).run());

        wait_for(&state, |s| {
            s.on && s.brightness == 255.0 && s.color_temp == 127.0
        })
        .await;

        run_flag.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn open_is_retried_until_the_driver_appears() {
        let state = SharedLightState::new();
        let run_flag = RunFlag::new();
        let source = ScriptedSource::new(3, vec![press(1)]);
        let attempts = source.open_attempts.clone();
        let task = tokio::spawn(loop_with(source, &state, &run_flag).run());

        wait_for(&state, |s| s.on).await;
        assert_eq!(attempts.load(Ordering::SeqCst), 4);

        run_flag.shutdown();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn loop_exits_promptly_after_shutdown() {
        let state = SharedLightState::new();
        let run_flag = RunFlag::new();
        let source = ScriptedSource::new(0, vec![]);
        let task = tokio::spawn(loop_with(source, &state, &run_flag).run());

        sleep(Duration::from_millis(5)).await;
        run_flag.shutdown();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("loop did not exit after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_buttons_are_ignored() {
        let state = SharedLightState::new();
        let run_flag = RunFlag::new();
        let source = ScriptedSource::new(0, vec![press(5), release(5)]);
        let task = tokio::spawn(loop_with(source, &state, &run_flag).run());

        sleep(Duration::from_millis(20)).await;
        assert_eq!(state.snapshot(), LightState::new());

        run_flag.shutdown();
        task.await.unwrap();
    }
}
