use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Desired fixture output.
///
/// Brightness and color temperature accumulate fractional deltas from the
/// input device (raw counts divided by a scaling constant), so they are kept
/// as floats and quantized to the 0..=255 wire range only when pushed to the
/// fixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub on: bool,
    pub brightness: f32,
    pub color_temp: f32,
}

impl LightState {
    /// Lowest brightness a segment is driven at while the light is on.
    pub const MIN_BRIGHTNESS: f32 = 1.0;
    /// Upper bound shared by both levels.
    pub const MAX_LEVEL: f32 = 255.0;

    pub fn new() -> Self {
        Self {
            on: false,
            brightness: 0.0,
            color_temp: 0.0,
        }
    }

    /// Clamp both levels into their stored ranges. While the light is on the
    /// brightness floor is 1, so a powered segment is never driven at 0.
    pub fn clamped(mut self) -> Self {
        let floor = if self.on { Self::MIN_BRIGHTNESS } else { 0.0 };
        self.brightness = self.brightness.clamp(floor, Self::MAX_LEVEL);
        self.color_temp = self.color_temp.clamp(0.0, Self::MAX_LEVEL);
        self
    }

    /// Brightness quantized for the wire.
    pub fn brightness_level(&self) -> u8 {
        self.brightness as u8
    }

    /// Color temperature quantized for the wire.
    pub fn color_temp_level(&self) -> u8 {
        self.color_temp as u8
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new()
    }
}

/// Light state shared between the input and output loops.
///
/// Reads return a consistent snapshot; writes apply read-modify-clamp-store
/// as a single step under the lock, so a half-updated record is never
/// observable and no stored value can leave its range.
#[derive(Clone)]
pub struct SharedLightState {
    inner: Arc<RwLock<LightState>>,
}

impl SharedLightState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(LightState::new())),
        }
    }

    /// Consistent copy of the current state.
    pub fn snapshot(&self) -> LightState {
        *self.inner.read()
    }

    /// Apply one mutation atomically. The result is clamped before it is
    /// stored. Returns the stored state.
    pub fn update(&self, mutate: impl FnOnce(LightState) -> LightState) -> LightState {
        let mut guard = self.inner.write();
        *guard = mutate(*guard).clamped();
        *guard
    }
}

impl Default for SharedLightState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative shutdown flag. Both loops check it between polls and exit
/// within one polling interval of it clearing.
#[derive(Clone)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
}

impl RunFlag {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Clear the flag and begin coordinated shutdown.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_off_and_dark() {
        let state = SharedLightState::new();
        let snapshot = state.snapshot();
        assert!(!snapshot.on);
        assert_eq!(snapshot.brightness, 0.0);
        assert_eq!(snapshot.color_temp, 0.0);
    }

    #[test]
    fn update_clamps_levels_into_range() {
        let state = SharedLightState::new();
        let stored = state.update(|mut s| {
            s.on = true;
            s.brightness = 400.0;
            s.color_temp = -12.0;
            s
        });
        assert_eq!(stored.brightness, 255.0);
        assert_eq!(stored.color_temp, 0.0);
    }

    #[test]
    fn brightness_floor_applies_while_on() {
        let state = SharedLightState::new();
        let stored = state.update(|mut s| {
            s.on = true;
            s
        });
        assert!(stored.brightness >= LightState::MIN_BRIGHTNESS);

        let stored = state.update(|mut s| {
            s.brightness = 0.0;
            s
        });
        assert_eq!(stored.brightness, LightState::MIN_BRIGHTNESS);
    }

    #[test]
    fn brightness_may_rest_at_zero_while_off() {
        let state = SharedLightState::new();
        let stored = state.update(|s| s);
        assert_eq!(stored.brightness, 0.0);
    }

    #[test]
    fn updates_are_visible_to_other_handles() {
        let state = SharedLightState::new();
        let reader = state.clone();
        state.update(|mut s| {
            s.on = true;
            s.brightness = 42.0;
            s
        });
        assert_eq!(reader.snapshot().brightness, 42.0);
        assert!(reader.snapshot().on);
    }

    #[test]
    fn run_flag_clears_once_and_stays_cleared() {
        let flag = RunFlag::new();
        let observer = flag.clone();
        assert!(observer.is_running());
        flag.shutdown();
        assert!(!observer.is_running());
        flag.shutdown();
        assert!(!observer.is_running());
    }

    #[test]
    fn wire_levels_quantize_down() {
        let state = LightState {
            on: true,
            brightness: 254.9,
            color_temp: 127.5,
        };
        assert_eq!(state.brightness_level(), 254);
        assert_eq!(state.color_temp_level(), 127);
    }
}
