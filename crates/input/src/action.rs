/// Direction of a held movement key, relative to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 6] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
        MoveDirection::Up,
        MoveDirection::Down,
    ];
}

/// A high-level action produced from raw window input.
///
/// The camera controller and the driver consume actions, never raw events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move the camera for one frame in the given direction.
    Move(MoveDirection),
    /// Relative mouse motion in pixels.
    Look { dx: f32, dy: f32 },
    /// The drawable changed size.
    Resize { width: u32, height: u32 },
    /// Leave the main loop.
    Quit,
}

impl Action {
    /// Mouse motion as delivered by the platform (f64 deltas).
    pub fn look(delta: (f64, f64)) -> Self {
        Action::Look {
            dx: delta.0 as f32,
            dy: delta.1 as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_converts_platform_delta() {
        assert_eq!(
            Action::look((100.0, -50.0)),
            Action::Look {
                dx: 100.0,
                dy: -50.0
            }
        );
    }

    #[test]
    fn all_directions_are_distinct() {
        let all = MoveDirection::ALL;
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn quit_and_resize() {
        assert!(matches!(Action::Quit, Action::Quit));
        let a = Action::Resize {
            width: 800,
            height: 600,
        };
        assert!(matches!(a, Action::Resize { width: 800, .. }));
    }
}
