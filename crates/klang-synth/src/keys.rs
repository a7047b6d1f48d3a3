//! Key state tracking for the MIDI/keyboard input surface.
//!
//! [`KeyState`] absorbs note-on/note-off events from the input context and
//! answers the queries the voice controller needs once per callback: which
//! keys are held, in what order they were pressed, and which of them are
//! *newly* pressed since the last [`KeyState::clear_changed`]. "New" is an
//! explicit flag on each key, not an encoding trick in the note number.

/// Number of MIDI notes.
const KEY_COUNT: usize = 128;

#[derive(Clone, Copy, Debug, Default)]
struct KeySlot {
    velocity: u8,
    held: bool,
    /// Pressed since the last `clear_changed`.
    is_new: bool,
}

/// Held-key tracker with press-order recency.
///
/// All storage is fixed-size; methods are allocation-free and safe to call
/// from the render context on a snapshot owned by it.
///
/// # Example
///
/// ```rust
/// use klang_synth::KeyState;
///
/// let mut keys = KeyState::new();
/// keys.note_on(60, 100);
/// keys.note_on(64, 90);
///
/// assert_eq!(keys.held_count(), 2);
/// assert_eq!(keys.held_note(0), Some(64)); // most recent first
/// assert_eq!(keys.new_note(1), Some(60));
///
/// keys.clear_changed();
/// assert_eq!(keys.new_note(0), None); // still held, no longer "new"
/// assert_eq!(keys.held_note(0), Some(64));
/// ```
#[derive(Debug, Clone)]
pub struct KeyState {
    slots: [KeySlot; KEY_COUNT],
    /// Held notes in press order, oldest first.
    order: [u8; KEY_COUNT],
    order_len: usize,
    changed: bool,
}

impl Default for KeyState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyState {
    /// Create a tracker with no keys held.
    pub fn new() -> Self {
        Self {
            slots: [KeySlot::default(); KEY_COUNT],
            order: [0; KEY_COUNT],
            order_len: 0,
            changed: false,
        }
    }

    /// Record a note-on event. A velocity of zero is treated as note-off,
    /// per MIDI convention.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        if note as usize >= KEY_COUNT {
            return;
        }
        if velocity == 0 {
            self.note_off(note);
            return;
        }
        // Re-pressing a held key moves it to the newest position.
        if self.slots[note as usize].held {
            self.remove_from_order(note);
        }
        self.slots[note as usize] = KeySlot {
            velocity,
            held: true,
            is_new: true,
        };
        self.order[self.order_len] = note;
        self.order_len += 1;
        self.changed = true;
    }

    /// Record a note-off event.
    pub fn note_off(&mut self, note: u8) {
        if note as usize >= KEY_COUNT || !self.slots[note as usize].held {
            return;
        }
        self.slots[note as usize] = KeySlot::default();
        self.remove_from_order(note);
        self.changed = true;
    }

    /// Whether any key event arrived since the last [`Self::clear_changed`].
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Acknowledge the current state: clears the changed flag and the
    /// newly-pressed marker on every key. Call once per reconciliation.
    pub fn clear_changed(&mut self) {
        self.changed = false;
        for slot in &mut self.slots {
            slot.is_new = false;
        }
    }

    /// Velocity of a key, or 0 if it is not held.
    pub fn velocity(&self, note: u8) -> u8 {
        if (note as usize) < KEY_COUNT && self.slots[note as usize].held {
            self.slots[note as usize].velocity
        } else {
            0
        }
    }

    /// Whether a key is currently held.
    pub fn is_held(&self, note: u8) -> bool {
        (note as usize) < KEY_COUNT && self.slots[note as usize].held
    }

    /// Number of currently held keys.
    pub fn held_count(&self) -> usize {
        self.order_len
    }

    /// The i-th most recently pressed held key (0 = newest).
    pub fn held_note(&self, i: usize) -> Option<u8> {
        if i < self.order_len {
            Some(self.order[self.order_len - 1 - i])
        } else {
            None
        }
    }

    /// The i-th most recently pressed key among those flagged as newly
    /// pressed (0 = newest).
    pub fn new_note(&self, i: usize) -> Option<u8> {
        self.order[..self.order_len]
            .iter()
            .rev()
            .filter(|&&note| self.slots[note as usize].is_new)
            .nth(i)
            .copied()
    }

    fn remove_from_order(&mut self, note: u8) {
        if let Some(pos) = self.order[..self.order_len].iter().position(|&n| n == note) {
            self.order.copy_within(pos + 1..self.order_len, pos);
            self.order_len -= 1;
        }
    }
}
