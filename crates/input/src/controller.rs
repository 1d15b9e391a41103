use crate::action::{Action, MoveDirection};
use cubefield_render::Camera;

/// Applies actions to a [`Camera`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraController;

impl CameraController {
    /// Route one action onto the camera. Returns `false` for actions the
    /// camera does not handle (`Resize`, `Quit`), which belong to the driver.
    pub fn apply(camera: &mut Camera, action: Action, dt: f32) -> bool {
        match action {
            Action::Move(direction) => {
                Self::step(camera, direction, dt);
                true
            }
            Action::Look { dx, dy } => {
                camera.handle_mouse(dx, dy);
                true
            }
            Action::Resize { .. } | Action::Quit => false,
        }
    }

    fn step(camera: &mut Camera, direction: MoveDirection, dt: f32) {
        match direction {
            MoveDirection::Forward => camera.move_forward(dt),
            MoveDirection::Backward => camera.move_backward(dt),
            MoveDirection::Left => camera.move_left(dt),
            MoveDirection::Right => camera.move_right(dt),
            MoveDirection::Up => camera.move_up(dt),
            MoveDirection::Down => camera.move_down(dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn forward_moves_along_front() {
        let mut cam = Camera::default();
        let start = cam.position;
        let front = cam.front();
        assert!(CameraController::apply(
            &mut cam,
            Action::Move(MoveDirection::Forward),
            0.1
        ));
        let expected = start + front * cam.speed * 0.1;
        assert!((cam.position - expected).length() < 1e-5);
    }

    #[test]
    fn up_moves_along_world_up() {
        let mut cam = Camera::default();
        let start = cam.position;
        CameraController::apply(&mut cam, Action::Move(MoveDirection::Up), 0.5);
        let delta = cam.position - start;
        assert!(delta.normalize().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn look_turns_camera() {
        let mut cam = Camera::default();
        let yaw = cam.yaw;
        CameraController::apply(&mut cam, Action::Look { dx: 100.0, dy: 0.0 }, 0.016);
        assert!((cam.yaw - (yaw + 100.0 * cam.sensitivity)).abs() < 1e-6);
    }

    #[test]
    fn driver_actions_leave_camera_alone() {
        let mut cam = Camera::default();
        let before = (cam.position, cam.yaw, cam.pitch);
        assert!(!CameraController::apply(&mut cam, Action::Quit, 0.016));
        assert!(!CameraController::apply(
            &mut cam,
            Action::Resize {
                width: 10,
                height: 10
            },
            0.016
        ));
        assert_eq!(before, (cam.position, cam.yaw, cam.pitch));
    }
}
