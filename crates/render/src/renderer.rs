use glam::{Mat4, Vec3};
use village_scene::{CameraView, LightKind, Scene};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from(&CameraView::default())
    }
}

impl From<&CameraView> for RenderView {
    fn from(view: &CameraView) -> Self {
        Self {
            eye: view.eye,
            target: view.look_at,
            fov_degrees: view.fov_y_degrees,
            near: view.near,
            far: view.far,
        }
    }
}

impl RenderView {
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            aspect.max(1e-4),
            self.near,
            self.far,
        );
        proj * Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and a view configuration, then produces
/// output. It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable listing of what a frame would draw.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug)]
pub struct DebugTextRenderer {
    /// Drawables listed individually before the rest are summarized.
    pub max_drawables: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self { max_drawables: 48 }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (nodes={}, background={}) ===\n",
            scene.reachable_count(),
            scene.background.to_hex()
        ));
        match scene.fog {
            Some(fog) => {
                out.push_str(&format!(
                    "Fog: {} near={:.1} far={:.1}\n",
                    fog.color.to_hex(),
                    fog.near,
                    fog.far
                ));
            }
            None => out.push_str("Fog: off\n"),
        }
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        ));

        for (id, light, world) in scene.lights() {
            let p = world.position;
            let extra = match light.kind {
                LightKind::Point { distance } => format!(" distance={distance:.1}"),
                _ => String::new(),
            };
            out.push_str(&format!(
                "  light {id} {} {} intensity={:.2} pos=({:.2}, {:.2}, {:.2}){extra}\n",
                light.kind_name(),
                light.color.to_hex(),
                light.intensity,
                p.x,
                p.y,
                p.z
            ));
        }

        let mut total = 0;
        scene.visit_drawables(|d| {
            total += 1;
            if total > self.max_drawables {
                return;
            }
            let p = d.world.position;
            let glow = if d.paint.is_emissive() {
                format!(" glow={:.2}", d.paint.emissive_intensity)
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  [{}] {} {} {} pos=({:.2}, {:.2}, {:.2}){glow}\n",
                d.id,
                d.node.name,
                d.shape.kind(),
                d.paint.color.to_hex(),
                p.x,
                p.y,
                p.z
            ));
        });
        if total > self.max_drawables {
            out.push_str(&format!("  ... {} more\n", total - self.max_drawables));
        }
        out.push_str(&format!("Drawables: {total}\n"));
        tracing::debug!(drawables = total, bytes = out.len(), "debug frame rendered");

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use village_props::{VillageConfig, build_village};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        assert!(output.contains("nodes=1"));
        assert!(output.contains("Fog: off"));
        assert!(output.contains("Drawables: 0"));
    }

    #[test]
    fn debug_renderer_lists_village() {
        let village = build_village(&VillageConfig {
            cobble_density: 0.0,
            ..VillageConfig::default()
        })
        .unwrap();
        let view = RenderView::from(&village.view);
        let output = DebugTextRenderer { max_drawables: 100 }.render(&village.scene, &view);
        assert!(output.contains("Fog: #cbd3d1 near=8.0 far=25.0"));
        assert!(output.contains("light #1 ambient"));
        assert!(output.contains("point #ffd98a intensity=1.20"));
        assert!(output.contains("window plane"));
        assert!(output.contains("glow=0.90"));
        assert!(!output.contains("more"));
    }

    #[test]
    fn long_listings_are_summarized() {
        let village = build_village(&VillageConfig::default()).unwrap();
        let output = DebugTextRenderer { max_drawables: 5 }
            .render(&village.scene, &RenderView::default());
        assert!(output.contains("more"));
    }

    #[test]
    fn sections_are_one_per_line() {
        let scene = Scene::new();
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("=== Scene"));
        assert_eq!(lines[1], "Fog: off");
        assert!(lines[2].starts_with("Camera:"));
        assert_eq!(lines[3], "Drawables: 0");
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 50.0);
        assert_eq!(view.eye, Vec3::new(8.0, 6.0, 10.0));
        assert_eq!(view.target, Vec3::new(0.0, 1.0, 0.0));
    }
}
