use crate::input::device::{ButtonEvent, InputEvent, MotionEvent};

/// Size of one spacenavd event frame: eight native-endian 32-bit words.
pub const FRAME_LEN: usize = 32;

const EVENT_MOTION: i32 = 0;
const EVENT_BUTTON: i32 = 1;

/// Decode one frame read from the spacenavd socket.
///
/// Word 0 carries the event type. Motion frames carry the six axis counts in
/// words 1..=6 (word 7 is the device period, unused here); button frames
/// carry the pressed flag in word 1 and the button number in word 2. Frames
/// with an unknown type word decode to `None` and are skipped by the caller.
pub fn parse_frame(frame: &[u8; FRAME_LEN]) -> Option<InputEvent> {
    let mut words = [0i32; 8];
    for (i, word) in words.iter_mut().enumerate() {
        let at = i * 4;
        *word = i32::from_ne_bytes([frame[at], frame[at + 1], frame[at + 2], frame[at + 3]]);
    }

    match words[0] {
        EVENT_MOTION => Some(InputEvent::Motion(MotionEvent {
            x: words[1],
            y: words[2],
            z: words[3],
            rx: words[4],
            ry: words[5],
            rz: words[6],
        })),
        EVENT_BUTTON => Some(InputEvent::Button(ButtonEvent {
            pressed: words[1] != 0,
            button: words[2] as u8,
        })),
        _ => None,
    }
}
