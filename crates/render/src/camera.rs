use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Vertical field of view of the projection, in degrees.
pub const FOV_Y_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Pitch stays this far away from straight up/down so `front` never flips.
pub const PITCH_MARGIN: f32 = 0.01;
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - PITCH_MARGIN;

/// First-person camera: position plus yaw/pitch orientation.
///
/// Yaw rotates about world up (+Y); yaw = -π/2 looks down -Z. Front, right
/// and the view matrix are derived on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub sensitivity: f32,
    pub speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -FRAC_PI_2,
            pitch: 0.0,
            sensitivity: 0.002,
            speed: 10.0,
        }
    }
}

impl Camera {
    pub fn front(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front(), Vec3::Y)
    }

    /// OpenGL-convention perspective projection (clip depth in [-w, w]).
    ///
    /// Callers recompute this whenever the window aspect ratio changes.
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect_ratio, Z_NEAR, Z_FAR)
    }

    /// Width over height, treating a zero height as one pixel.
    pub fn aspect_ratio(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }

    /// Apply relative mouse motion. Positive `dy` (mouse down) pitches down.
    pub fn handle_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn move_forward(&mut self, dt: f32) {
        let fwd = self.front();
        self.position += fwd * self.speed * dt;
    }

    pub fn move_backward(&mut self, dt: f32) {
        let fwd = self.front();
        self.position -= fwd * self.speed * dt;
    }

    pub fn move_left(&mut self, dt: f32) {
        let right = self.right();
        self.position -= right * self.speed * dt;
    }

    pub fn move_right(&mut self, dt: f32) {
        let right = self.right();
        self.position += right * self.speed * dt;
    }

    pub fn move_up(&mut self, dt: f32) {
        self.position.y += self.speed * dt;
    }

    pub fn move_down(&mut self, dt: f32) {
        self.position.y -= self.speed * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn orientations() -> impl Iterator<Item = (f32, f32)> {
        let yaws = [-20.0, -3.5, -FRAC_PI_2, 0.0, 0.7, 2.0, 9.42];
        let pitches = [-PITCH_LIMIT, -1.0, -0.25, 0.0, 0.4, 1.2, PITCH_LIMIT];
        yaws.into_iter()
            .flat_map(move |y| pitches.into_iter().map(move |p| (y, p)))
    }

    #[test]
    fn front_is_unit_length() {
        for (yaw, pitch) in orientations() {
            let cam = Camera {
                yaw,
                pitch,
                ..Camera::default()
            };
            assert!((cam.front().length() - 1.0).abs() < EPS, "yaw={yaw} pitch={pitch}");
        }
    }

    #[test]
    fn right_is_unit_and_orthogonal_to_front() {
        for (yaw, pitch) in orientations() {
            let cam = Camera {
                yaw,
                pitch,
                ..Camera::default()
            };
            let right = cam.right();
            assert!((right.length() - 1.0).abs() < EPS);
            assert!(right.dot(cam.front()).abs() < EPS);
        }
    }

    #[test]
    fn front_matches_spherical_formula() {
        let cam = Camera {
            position: Vec3::ZERO,
            yaw: -FRAC_PI_2,
            pitch: 0.0,
            ..Camera::default()
        };
        let expected = Vec3::new(
            cam.pitch.cos() * cam.yaw.cos(),
            cam.pitch.sin(),
            cam.pitch.cos() * cam.yaw.sin(),
        );
        assert!(cam.front().abs_diff_eq(expected, EPS));
        // yaw = -π/2 looks down -Z with this convention.
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn mouse_x_motion_adds_scaled_yaw() {
        let mut cam = Camera::default();
        let start = cam.yaw;
        cam.handle_mouse(100.0, 0.0);
        assert!((cam.yaw - start - 0.2).abs() < EPS);
        assert_eq!(cam.pitch, 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::default();
        cam.handle_mouse(0.0, -1.0e6);
        assert_eq!(cam.pitch, PITCH_LIMIT);
        cam.handle_mouse(0.0, 1.0e6);
        assert_eq!(cam.pitch, -PITCH_LIMIT);

        for dy in [-5000.0, -800.0, -1.0, 0.0, 3.0, 640.0, 7000.0] {
            cam.handle_mouse(0.0, dy);
            assert!(cam.pitch >= -FRAC_PI_2 + PITCH_MARGIN - EPS);
            assert!(cam.pitch <= FRAC_PI_2 - PITCH_MARGIN + EPS);
        }
    }

    #[test]
    fn movement_scales_with_speed_and_dt() {
        let mut cam = Camera::default();
        let start = cam.position;
        cam.move_forward(0.5);
        let moved = cam.position - start;
        assert!((moved.length() - cam.speed * 0.5).abs() < 1e-4);
        assert!(moved.normalize().abs_diff_eq(cam.front(), EPS));

        cam.move_backward(0.5);
        assert!(cam.position.abs_diff_eq(start, 1e-4));

        cam.move_right(1.0);
        cam.move_left(1.0);
        assert!(cam.position.abs_diff_eq(start, 1e-4));
    }

    #[test]
    fn vertical_movement_uses_world_up() {
        let mut cam = Camera::default();
        cam.move_up(0.1);
        assert!((cam.position.y - 1.0).abs() < EPS);
        cam.move_down(0.1);
        assert!(cam.position.y.abs() < EPS);
    }

    #[test]
    fn view_matrix_places_camera_at_origin() {
        let cam = Camera::default();
        let eye = cam.view_matrix().transform_point3(cam.position);
        assert!(eye.abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn projection_is_finite_for_degenerate_sizes() {
        let cam = Camera::default();
        let aspect = Camera::aspect_ratio(1280, 0);
        assert_eq!(aspect, 1280.0);
        let proj = cam.projection_matrix(aspect);
        assert!(proj.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
