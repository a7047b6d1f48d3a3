//! QWERTY chromatic keyboard layout.

/// Velocity used for computer-keyboard key presses.
pub const KEY_VELOCITY: u8 = 100;

/// Map a computer keyboard key to a MIDI note.
///
/// The bottom two rows form one chromatic octave starting at middle C:
/// `z s x d c v g b h n j m` covers notes 60 through 71, with the home
/// row supplying the sharps. Returns `None` for unmapped keys.
pub fn key_to_note(key: char) -> Option<u8> {
    let note = match key.to_ascii_lowercase() {
        'z' => 60,
        's' => 61,
        'x' => 62,
        'd' => 63,
        'c' => 64,
        'v' => 65,
        'g' => 66,
        'b' => 67,
        'h' => 68,
        'n' => 69,
        'j' => 70,
        'm' => 71,
        _ => return None,
    };
    Some(note)
}
