use crate::action::{Action, MoveDirection};
use std::collections::HashSet;
use winit::keyboard::KeyCode;

/// Keys currently held down, queried once per frame.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    held: HashSet<KeyCode>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Movement directions whose key is held, in a fixed order.
    pub fn movement(&self) -> impl Iterator<Item = MoveDirection> + '_ {
        MoveDirection::ALL
            .into_iter()
            .filter(|dir| self.is_held(binding(*dir)))
    }

    /// [`Self::movement`] as actions.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.movement().map(Action::Move)
    }
}

/// Physical key bound to a movement direction.
pub fn binding(direction: MoveDirection) -> KeyCode {
    match direction {
        MoveDirection::Forward => KeyCode::KeyW,
        MoveDirection::Backward => KeyCode::KeyS,
        MoveDirection::Left => KeyCode::KeyA,
        MoveDirection::Right => KeyCode::KeyD,
        MoveDirection::Up => KeyCode::KeyE,
        MoveDirection::Down => KeyCode::KeyQ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut keys = KeyState::new();
        keys.set(KeyCode::KeyW, true);
        assert!(keys.is_held(KeyCode::KeyW));
        keys.set(KeyCode::KeyW, false);
        assert!(!keys.is_held(KeyCode::KeyW));
    }

    #[test]
    fn movement_follows_bindings() {
        let mut keys = KeyState::new();
        keys.set(KeyCode::KeyD, true);
        keys.set(KeyCode::KeyW, true);
        keys.set(KeyCode::KeyZ, true);
        let dirs: Vec<_> = keys.movement().collect();
        assert_eq!(dirs, vec![MoveDirection::Forward, MoveDirection::Right]);
    }

    #[test]
    fn opposite_keys_both_reported() {
        let mut keys = KeyState::new();
        keys.set(KeyCode::KeyE, true);
        keys.set(KeyCode::KeyQ, true);
        let actions: Vec<_> = keys.actions().collect();
        assert_eq!(
            actions,
            vec![
                Action::Move(MoveDirection::Up),
                Action::Move(MoveDirection::Down)
            ]
        );
    }

    #[test]
    fn clear_releases_everything() {
        let mut keys = KeyState::new();
        keys.set(KeyCode::KeyA, true);
        keys.set(KeyCode::KeyS, true);
        keys.clear();
        assert_eq!(keys.movement().count(), 0);
    }
}
