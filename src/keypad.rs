pub const KEY_COUNT: usize = 16;

/// Tracks the key snapshot of the previous frame so press and release edges can be detected.
/// The cpu itself only ever sees the current snapshot and the resolved edge.
#[derive(Debug, Clone, Default)]
pub struct Keypad {
    previous: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Keypad::default()
    }

    /// Records `current` as the latest snapshot and returns the lowest key index that changed
    /// state in the watched direction since the last call: released keys when `on_release` is
    /// set, newly pressed keys otherwise.
    pub fn update(&mut self, current: &[bool; KEY_COUNT], on_release: bool) -> Option<u8> {
        let edge = self
            .previous
            .iter()
            .zip(current.iter())
            .position(|(&was_down, &is_down)| {
                if on_release {
                    was_down && !is_down
                } else {
                    !was_down && is_down
                }
            })
            .map(|key| key as u8);

        self.previous = *current;
        edge
    }

    /// Forgets the previous snapshot, treating every key as released.
    pub fn clear(&mut self) {
        self.previous = [false; KEY_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(down: &[usize]) -> [bool; KEY_COUNT] {
        let mut state = [false; KEY_COUNT];
        for &key in down {
            state[key] = true;
        }
        state
    }

    #[test]
    fn press_edge_fires_once() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.update(&keys(&[0xA]), false), Some(0xA));
        assert_eq!(keypad.update(&keys(&[0xA]), false), None);
        assert_eq!(keypad.update(&keys(&[]), false), None);
    }

    #[test]
    fn release_edge_fires_when_key_goes_up() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.update(&keys(&[3]), true), None);
        assert_eq!(keypad.update(&keys(&[3]), true), None);
        assert_eq!(keypad.update(&keys(&[]), true), Some(3));
    }

    #[test]
    fn lowest_index_wins() {
        let mut keypad = Keypad::new();
        assert_eq!(keypad.update(&keys(&[0xF, 2, 7]), false), Some(2));
    }

    #[test]
    fn clear_forgets_held_keys() {
        let mut keypad = Keypad::new();
        keypad.update(&keys(&[5]), false);
        keypad.clear();
        assert_eq!(keypad.update(&keys(&[5]), false), Some(5));
    }
}
