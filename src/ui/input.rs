use minifb::{MouseButton, MouseMode, Window};
use std::ops::Add;

/// Rotation angles in radians. `horizontal` comes from pointer x travel and turns the
/// model about the vertical axis; `vertical` comes from y travel and tilts it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationDelta {
    pub horizontal: f32,
    pub vertical: f32,
}

impl RotationDelta {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.horizontal == 0.0 && self.vertical == 0.0
    }
}

impl Add for RotationDelta {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            horizontal: self.horizontal + other.horizontal,
            vertical: self.vertical + other.vertical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { last: (f32, f32) },
}

/// Turns pointer drags into pending rotation.
///
/// Event handlers call `press` / `move_to` / `release` / `leave`; the render loop drains
/// the accumulated rotation once per frame with [`OrientationTracker::take_delta`].
#[derive(Debug, Clone)]
pub struct OrientationTracker {
    pub sensitivity: f32,
    state: DragState,
    pending: RotationDelta,
}

impl OrientationTracker {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            state: DragState::Idle,
            pending: RotationDelta::default(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn press(&mut self, x: f32, y: f32) {
        self.state = DragState::Dragging { last: (x, y) };
    }

    /// Ignored unless a drag is in progress.
    pub fn move_to(&mut self, x: f32, y: f32) {
        if let DragState::Dragging { last } = &mut self.state {
            let (dx, dy) = (x - last.0, y - last.1);
            *last = (x, y);
            self.pending = self.pending
                + RotationDelta::new(dx * self.sensitivity, dy * self.sensitivity);
        }
    }

    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }

    /// Pointer left the window; ends the drag like a release.
    pub fn leave(&mut self) {
        self.state = DragState::Idle;
    }

    /// Adds rotation that did not come from a drag (scripted or initial orientation).
    pub fn accumulate(&mut self, delta: RotationDelta) {
        self.pending = self.pending + delta;
    }

    /// Returns the rotation accumulated since the last call and resets it to zero.
    pub fn take_delta(&mut self) -> RotationDelta {
        std::mem::take(&mut self.pending)
    }
}

/// Polls minifb's mouse state and forwards the edges as tracker events.
#[derive(Debug, Default)]
pub struct PointerInput {
    was_down: bool,
    was_inside: bool,
}

impl PointerInput {
    pub fn update(&mut self, window: &Window, tracker: &mut OrientationTracker) {
        let down = window.get_mouse_down(MouseButton::Left);

        match window.get_mouse_pos(MouseMode::Discard) {
            Some((x, y)) => {
                if down && !self.was_down {
                    tracker.press(x, y);
                } else if down {
                    tracker.move_to(x, y);
                }
                self.was_inside = true;
            }
            None => {
                if self.was_inside {
                    tracker.leave();
                }
                self.was_inside = false;
            }
        }

        if !down && self.was_down {
            tracker.release();
        }
        self.was_down = down;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn moves_without_press_are_ignored() {
        let mut t = OrientationTracker::new(0.01);
        t.move_to(100.0, 100.0);
        assert!(t.take_delta().is_zero());
    }

    #[test]
    fn drag_accumulates_scaled_travel() {
        let mut t = OrientationTracker::new(0.01);
        t.press(10.0, 10.0);
        t.move_to(20.0, 15.0);
        t.move_to(30.0, 5.0);

        let d = t.take_delta();
        assert_relative_eq!(d.horizontal, 0.2, epsilon = 1e-6);
        assert_relative_eq!(d.vertical, -0.05, epsilon = 1e-6);
    }

    #[test]
    fn drained_accumulator_stays_zero_without_moves() {
        let mut t = OrientationTracker::new(0.01);
        t.press(0.0, 0.0);
        t.move_to(5.0, 5.0);
        assert!(!t.take_delta().is_zero());

        for _ in 0..3 {
            assert_eq!(t.take_delta(), RotationDelta::default());
        }
    }

    #[test]
    fn release_and_leave_end_the_drag() {
        let mut t = OrientationTracker::new(1.0);
        t.press(0.0, 0.0);
        t.release();
        t.move_to(50.0, 0.0);
        assert!(t.take_delta().is_zero());

        t.press(0.0, 0.0);
        assert!(t.is_dragging());
        t.leave();
        assert!(!t.is_dragging());
        t.move_to(0.0, 50.0);
        assert!(t.take_delta().is_zero());
    }

    #[test]
    fn new_press_restarts_from_press_position() {
        let mut t = OrientationTracker::new(1.0);
        t.press(0.0, 0.0);
        t.move_to(10.0, 0.0);
        t.release();
        t.press(100.0, 0.0);
        t.move_to(101.0, 0.0);
        assert_eq!(t.take_delta(), RotationDelta::new(11.0, 0.0));
    }

    #[test]
    fn accumulate_adds_to_pending() {
        let mut t = OrientationTracker::new(1.0);
        t.accumulate(RotationDelta::new(0.5, 0.25));
        t.accumulate(RotationDelta::new(0.5, 0.0));
        assert_eq!(t.take_delta(), RotationDelta::new(1.0, 0.25));
    }
}
