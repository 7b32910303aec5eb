use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};
use village_scene::CameraView;

const MIN_POLAR: f32 = 1e-4;
const EPS: f32 = 1e-6;

/// Orbit camera around a target, with optional damping.
///
/// Input accumulates into pending deltas; [`OrbitCamera::update`] applies a
/// fraction of them each frame when damping is on, so motion eases out over
/// several frames after input stops.
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Angle around +Y, measured from +Z towards +X.
    pub azimuth: f32,
    /// Angle down from +Y.
    pub polar: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    pending_scale: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_view(&CameraView::default(), 16.0 / 9.0)
    }
}

impl OrbitCamera {
    /// Start at the view's eye, orbiting its orbit target.
    pub fn from_view(view: &CameraView, aspect: f32) -> Self {
        let offset = view.eye - view.orbit_target;
        let radius = offset.length().max(EPS);
        Self {
            target: view.orbit_target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            fov: view.fov_y_degrees.to_radians(),
            aspect,
            near: view.near,
            far: view.far,
            damping: view.damping,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_radius: 1.0,
            max_radius: 60.0,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        self.target + self.radius * Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a)
    }

    /// Drag by `dx`, `dy` pixels in a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let h = height.max(1.0);
        self.pending_azimuth -= TAU * dx / h * self.rotate_speed;
        self.pending_polar -= TAU * dy / h * self.rotate_speed;
    }

    /// Scroll by `steps` wheel notches; positive zooms in.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= 0.95_f32.powf(self.zoom_speed * steps);
    }

    /// Slide the target in the view plane by `dx`, `dy` pixels.
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32) {
        let h = height.max(1.0);
        let world_per_pixel = 2.0 * self.radius * (self.fov * 0.5).tan() / h;
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        self.pending_pan += (-dx * right + dy * up) * world_per_pixel;
    }

    /// Apply pending input. Returns true if the camera moved.
    pub fn update(&mut self) -> bool {
        let k = if self.damping {
            self.damping_factor
        } else {
            1.0
        };
        let before = (self.eye(), self.target);

        self.azimuth = (self.azimuth + self.pending_azimuth * k).rem_euclid(TAU);
        self.polar = (self.polar + self.pending_polar * k).clamp(MIN_POLAR, PI - MIN_POLAR);
        self.target += self.pending_pan * k;
        self.radius = (self.radius * self.pending_scale).clamp(self.min_radius, self.max_radius);
        self.pending_scale = 1.0;

        if self.damping {
            self.pending_azimuth *= 1.0 - k;
            self.pending_polar *= 1.0 - k;
            self.pending_pan *= 1.0 - k;
        } else {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            self.pending_pan = Vec3::ZERO;
        }

        let (eye, target) = (self.eye(), self.target);
        eye.distance_squared(before.0) > EPS || target.distance_squared(before.1) > EPS
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_view_eye() {
        let cam = OrbitCamera::default();
        assert!(cam.eye().abs_diff_eq(Vec3::new(8.0, 6.0, 10.0), 1e-4));
        assert_eq!(cam.target, Vec3::new(0.0, 1.2, 0.0));
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn damped_rotation_eases_to_full_delta() {
        let mut cam = OrbitCamera::default();
        let start = cam.azimuth;
        cam.rotate(-100.0, 0.0, 1000.0);
        assert!(cam.update());
        let after_one = cam.azimuth - start;
        assert!(after_one > 0.0 && after_one < 0.1 * TAU);
        for _ in 0..400 {
            cam.update();
        }
        let total = (cam.azimuth - start).rem_euclid(TAU);
        assert!((total - 0.1 * TAU).abs() < 1e-3);
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut cam = OrbitCamera::default();
        cam.damping = false;
        let start = cam.polar;
        cam.rotate(0.0, -50.0, 1000.0);
        cam.update();
        assert!((cam.polar - (start + 0.05 * TAU)).abs() < 1e-5);
        assert!(!cam.update());
    }

    #[test]
    fn polar_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.damping = false;
        cam.rotate(0.0, 10_000.0, 100.0);
        cam.update();
        assert!(cam.polar >= MIN_POLAR);
        assert!(cam.eye().is_finite());
    }

    #[test]
    fn zoom_changes_radius_only() {
        let mut cam = OrbitCamera::default();
        let radius = cam.radius;
        let target = cam.target;
        cam.zoom(3.0);
        cam.update();
        assert!(cam.radius < radius);
        assert_eq!(cam.target, target);
    }

    #[test]
    fn pan_moves_target() {
        let mut cam = OrbitCamera::default();
        cam.damping = false;
        let target = cam.target;
        cam.pan(40.0, 0.0, 800.0);
        cam.update();
        assert_ne!(cam.target, target);
    }
}
