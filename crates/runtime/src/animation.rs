//! Per-frame animation: window pulse, lantern flicker and the well pulley.

use std::f64::consts::TAU;
use village_common::{SceneError, Transform};
use village_props::VillageHandles;
use village_props::factories::PULLEY_ROLL;
use village_scene::Scene;

use crate::params::Params;

pub const WINDOW_PULSE_BASE: f32 = 0.9;
pub const WINDOW_PULSE_AMPLITUDE: f32 = 0.12;
pub const WINDOW_PULSE_RATE: f64 = 2.2;
pub const LANTERN_FLICKER_AMPLITUDE: f32 = 0.12;
pub const LANTERN_FLICKER_RATE: f64 = 8.0;
/// Pulley advance per tick in radians. Not scaled by frame time.
pub const PULLEY_STEP: f64 = 0.02;

/// Emissive intensity of every cottage window at time `t` seconds.
pub fn window_pulse(t: f64) -> f32 {
    WINDOW_PULSE_BASE + WINDOW_PULSE_AMPLITUDE * (t * WINDOW_PULSE_RATE).sin() as f32
}

/// Lantern light and paint intensity at time `t` for the given baseline.
pub fn lantern_intensity(baseline: f32, t: f64) -> f32 {
    baseline + LANTERN_FLICKER_AMPLITUDE * (t * LANTERN_FLICKER_RATE).sin() as f32
}

/// What one tick wrote into the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub elapsed: f64,
    pub window_pulse: f32,
    pub windows_updated: usize,
    pub lantern: f32,
    pub pulley_angle: f64,
    /// Lookups that found nothing. The tick carried on without them.
    pub missing: Vec<SceneError>,
}

/// Mutable animation state carried between ticks.
#[derive(Debug, Clone, Default)]
pub struct AnimationState {
    pulley_angle: f64,
    ticks: u64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pulley angle in `[0, 2π)`.
    pub fn pulley_angle(&self) -> f64 {
        self.pulley_angle
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run the animation steps for one frame at elapsed time `t`.
    ///
    /// Missing nodes or paints are skipped with a warning and listed in the
    /// report; the remaining steps still run.
    pub fn tick(
        &mut self,
        scene: &mut Scene,
        handles: &VillageHandles,
        params: &Params,
        t: f64,
    ) -> TickReport {
        let mut missing = Vec::new();

        let pulse = window_pulse(t);
        let mut windows_updated = 0;
        for cottage in &handles.cottage_props {
            let present = scene.get(cottage.window).is_some();
            let updated = present
                && scene
                    .catalog_mut()
                    .set_emissive_intensity(cottage.window_paint, pulse)
                    .is_ok();
            if updated {
                windows_updated += 1;
            } else {
                missing.push(SceneError::MissingChild("window"));
            }
        }

        // light and paint share one value; a low baseline must not go negative
        let lantern = lantern_intensity(params.lantern, t).max(0.0);
        match scene.light_mut(handles.lamp.light) {
            Some(light) => light.intensity = lantern,
            None => missing.push(SceneError::MissingChild("lantern light")),
        }
        if scene.get(handles.lamp.lantern).is_none()
            || scene
                .catalog_mut()
                .set_emissive_intensity(handles.lamp.lantern_paint, lantern)
                .is_err()
        {
            missing.push(SceneError::MissingChild("lantern"));
        }

        self.pulley_angle = (self.pulley_angle + PULLEY_STEP).rem_euclid(TAU);
        match scene.get_mut(handles.well.pulley) {
            Some(pulley) => {
                pulley.transform = Transform {
                    position: pulley.transform.position,
                    scale: pulley.transform.scale,
                    ..Transform::default()
                }
                .with_euler(self.pulley_angle as f32, 0.0, PULLEY_ROLL);
            }
            None => missing.push(SceneError::MissingChild("pulley")),
        }

        for err in &missing {
            tracing::warn!(tick = self.ticks, %err, "animation lookup skipped");
        }
        self.ticks += 1;

        TickReport {
            tick: self.ticks,
            elapsed: t,
            window_pulse: pulse,
            windows_updated,
            lantern,
            pulley_angle: self.pulley_angle,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::EulerRot;
    use village_props::{VillageConfig, build_village};

    fn village() -> village_props::Village {
        build_village(&VillageConfig {
            cobble_density: 0.0,
            ..VillageConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn window_pulse_stays_in_range() {
        for i in 0..2000 {
            let p = window_pulse(i as f64 * 0.013);
            assert!((0.78 - 1e-6..=1.02 + 1e-6).contains(&p), "{p}");
        }
    }

    #[test]
    fn window_pulse_is_periodic() {
        let period = TAU / WINDOW_PULSE_RATE;
        for t in [0.0, 0.4, 1.7, 12.3] {
            assert!((window_pulse(t) - window_pulse(t + period)).abs() < 1e-5);
        }
    }

    #[test]
    fn lantern_stays_near_baseline() {
        for i in 0..2000 {
            let v = lantern_intensity(1.2, i as f64 * 0.007);
            assert!((1.08 - 1e-6..=1.32 + 1e-6).contains(&v), "{v}");
        }
        assert_eq!(lantern_intensity(0.5, 0.0), 0.5);
    }

    #[test]
    fn pulley_angle_after_n_ticks() {
        let mut v = village();
        let params = Params::default();
        let mut state = AnimationState::new();
        let n = 500;
        for i in 0..n {
            state.tick(&mut v.scene, &v.handles, &params, i as f64 / 60.0);
        }
        let expected = (PULLEY_STEP * n as f64).rem_euclid(TAU);
        assert!((state.pulley_angle() - expected).abs() < 1e-9);
        assert_eq!(state.ticks(), n);
    }

    #[test]
    fn pulley_rotation_keeps_roll() {
        let mut v = village();
        let mut state = AnimationState::new();
        for _ in 0..10 {
            state.tick(&mut v.scene, &v.handles, &Params::default(), 0.0);
        }
        let pulley = v.scene.get(v.handles.well.pulley).unwrap();
        let (x, _, z) = pulley.transform.rotation.to_euler(EulerRot::XYZ);
        assert!((x - 0.2).abs() < 1e-5);
        assert!((z - PULLEY_ROLL).abs() < 1e-5);
        assert!((pulley.transform.position.y - 0.9).abs() < 1e-6);
    }

    #[test]
    fn tick_writes_windows_and_lantern() {
        let mut v = village();
        let params = Params::default();
        let t = 0.37;
        let report = AnimationState::new().tick(&mut v.scene, &v.handles, &params, t);
        assert_eq!(report.windows_updated, 3);
        assert!(report.missing.is_empty());
        for cottage in &v.handles.cottage_props {
            let paint = v.scene.catalog().paint(cottage.window_paint).unwrap();
            assert_eq!(paint.emissive_intensity, window_pulse(t));
        }
        let light = v.scene.get(v.handles.lamp.light).unwrap().light.unwrap();
        assert_eq!(light.intensity, lantern_intensity(1.2, t));
        let lantern = v.scene.catalog().paint(v.handles.lamp.lantern_paint).unwrap();
        assert_eq!(lantern.emissive_intensity, lantern_intensity(1.2, t));
    }

    #[test]
    fn baseline_is_never_overwritten() {
        let mut v = village();
        let params = Params::default();
        let mut state = AnimationState::new();
        for i in 0..30 {
            state.tick(&mut v.scene, &v.handles, &params, i as f64 * 0.1);
        }
        assert_eq!(params.lantern, 1.2);
    }

    #[test]
    fn low_baseline_keeps_light_and_paint_equal() {
        let mut v = village();
        let mut params = Params::default();
        params
            .apply(crate::params::ParamChange::Lantern(0.0), &mut v.scene, &v.handles)
            .unwrap();
        // sin(8t) = -1
        let t = 3.0 * std::f64::consts::PI / 16.0;
        let report = AnimationState::new().tick(&mut v.scene, &v.handles, &params, t);
        let light = v.scene.get(v.handles.lamp.light).unwrap().light.unwrap();
        let paint = v.scene.catalog().paint(v.handles.lamp.lantern_paint).unwrap();
        assert_eq!(report.lantern, 0.0);
        assert_eq!(light.intensity, report.lantern);
        assert_eq!(paint.emissive_intensity, report.lantern);
        assert!(light.radiance().iter().all(|c| *c >= 0.0));
    }

    #[test]
    fn missing_nodes_are_reported_and_skipped() {
        let mut v = village();
        v.scene.remove(v.handles.well.pulley).unwrap();
        v.scene.remove(v.handles.cottage_props[1].window).unwrap();
        let report =
            AnimationState::new().tick(&mut v.scene, &v.handles, &Params::default(), 1.0);
        assert!(report.missing.contains(&SceneError::MissingChild("pulley")));
        assert!(report.missing.contains(&SceneError::MissingChild("window")));
        assert_eq!(report.windows_updated, 2);
        // the lantern step still ran
        let light = v.scene.get(v.handles.lamp.light).unwrap().light.unwrap();
        assert_eq!(light.intensity, lantern_intensity(1.2, 1.0));
        assert!((report.pulley_angle - PULLEY_STEP).abs() < 1e-12);
    }
}
