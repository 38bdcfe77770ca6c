//! # Input
//!
//! The frame loop only sees [`InputEvent`]s from an [`InputSource`]. A
//! platform layer would translate OS events; [`ScriptedInput`] replays a
//! fixed timeline for headless runs and tests.

use glam::Vec3;

/// Keys the frame loop reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move up.
    W,
    /// Move left.
    A,
    /// Move down.
    S,
    /// Move right.
    D,
    /// Quit.
    Escape,
}

impl Key {
    /// Number of keys.
    pub const COUNT: usize = 5;

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// One input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// The platform asked to close.
    Quit,
    /// A key went down.
    KeyDown(Key),
    /// A key went up.
    KeyUp(Key),
}

/// Which keys are currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pressed: [bool; Key::COUNT],
}

impl KeyState {
    /// Applies a key event. `Quit` is ignored here.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.pressed[key.index()] = true,
            InputEvent::KeyUp(key) => self.pressed[key.index()] = false,
            InputEvent::Quit => {}
        }
    }

    /// Checks if a key is held.
    #[inline]
    #[must_use]
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed[key.index()]
    }

    /// Unit-per-axis movement direction from W/A/S/D.
    ///
    /// Opposite keys cancel out.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        let mut direction = Vec3::ZERO;
        if self.is_pressed(Key::W) {
            direction.y += 1.0;
        }
        if self.is_pressed(Key::S) {
            direction.y -= 1.0;
        }
        if self.is_pressed(Key::A) {
            direction.x -= 1.0;
        }
        if self.is_pressed(Key::D) {
            direction.x += 1.0;
        }
        direction
    }
}

/// Source of input events, polled once per frame.
pub trait InputSource {
    /// Appends every event that happened before `frame` to `events`.
    fn poll(&mut self, frame: u64, events: &mut Vec<InputEvent>);
}

/// Replays events at fixed frame numbers.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    /// `(frame, event)` pairs sorted by frame.
    timeline: Vec<(u64, InputEvent)>,
    cursor: usize,
}

impl ScriptedInput {
    /// Creates a script. Events are sorted by frame; ties keep their order.
    #[must_use]
    pub fn new(mut timeline: Vec<(u64, InputEvent)>) -> Self {
        timeline.sort_by_key(|(frame, _)| *frame);
        Self {
            timeline,
            cursor: 0,
        }
    }

    /// Holds D for the first half of `frames`, then W for the rest.
    #[must_use]
    pub fn demo(frames: u64) -> Self {
        let half = frames / 2;
        Self::new(vec![
            (0, InputEvent::KeyDown(Key::D)),
            (half, InputEvent::KeyUp(Key::D)),
            (half, InputEvent::KeyDown(Key::W)),
        ])
    }

    /// Checks if every scripted event has been delivered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.timeline.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, frame: u64, events: &mut Vec<InputEvent>) {
        while let Some(&(at, event)) = self.timeline.get(self.cursor) {
            if at > frame {
                break;
            }
            events.push(event);
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut keys = KeyState::default();
        keys.apply(InputEvent::KeyDown(Key::W));
        keys.apply(InputEvent::KeyDown(Key::D));
        assert_eq!(keys.direction(), Vec3::new(1.0, 1.0, 0.0));

        keys.apply(InputEvent::KeyDown(Key::S));
        assert_eq!(keys.direction(), Vec3::new(1.0, 0.0, 0.0));

        keys.apply(InputEvent::KeyUp(Key::D));
        keys.apply(InputEvent::Quit);
        assert_eq!(keys.direction(), Vec3::ZERO);
    }

    #[test]
    fn test_scripted_input_delivers_in_order() {
        let mut input = ScriptedInput::new(vec![
            (3, InputEvent::Quit),
            (0, InputEvent::KeyDown(Key::A)),
            (1, InputEvent::KeyUp(Key::A)),
        ]);
        let mut events = Vec::new();

        input.poll(0, &mut events);
        assert_eq!(events, vec![InputEvent::KeyDown(Key::A)]);

        events.clear();
        input.poll(2, &mut events);
        assert_eq!(events, vec![InputEvent::KeyUp(Key::A)]);

        events.clear();
        input.poll(5, &mut events);
        assert_eq!(events, vec![InputEvent::Quit]);
        assert!(input.is_exhausted());
    }
}
