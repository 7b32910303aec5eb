use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera placement and orbit settings for a scene.
///
/// This is the initial view; hosts own the live camera and may move it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub look_at: Vec3,
    /// Pivot for orbit controls. May differ from `look_at`.
    pub orbit_target: Vec3,
    pub damping: bool,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            fov_y_degrees: 50.0,
            near: 0.1,
            far: 100.0,
            eye: Vec3::new(8.0, 6.0, 10.0),
            look_at: Vec3::new(0.0, 1.0, 0.0),
            orbit_target: Vec3::new(0.0, 1.2, 0.0),
            damping: true,
        }
    }
}

impl CameraView {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            aspect.max(1e-4),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_point_projects_to_center() {
        let view = CameraView::default();
        let clip = view.view_projection(16.0 / 9.0) * view.look_at.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
