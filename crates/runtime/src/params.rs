use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use village_common::SceneError;
use village_props::{VillageHandles, village_fog};
use village_scene::Scene;

pub const AMBIENT_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const SUN_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const LANTERN_RANGE: RangeInclusive<f32> = 0.0..=2.0;
/// Slider granularity for every numeric parameter.
pub const PARAM_STEP: f32 = 0.01;

/// Errors from loading or validating parameter files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} = {value} is out of range")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Live-editable scene parameters.
///
/// `lantern` is the baseline; the animation loop adds flicker on top of it
/// when writing the light and never stores the result back here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub ambient: f32,
    pub sun: f32,
    pub fog: bool,
    pub lantern: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            ambient: 0.45,
            sun: 0.7,
            fog: true,
            lantern: 1.2,
        }
    }
}

/// A single edit coming from the parameter panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamChange {
    Ambient(f32),
    Sun(f32),
    Fog(bool),
    Lantern(f32),
}

fn check(field: &'static str, value: f32, range: &RangeInclusive<f32>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

impl Params {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let params: Params = serde_json::from_str(&data)?;
        params.validate()?;
        tracing::info!(path = %path.display(), "loaded params");
        Ok(params)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check("ambient", self.ambient, &AMBIENT_RANGE)?;
        check("sun", self.sun, &SUN_RANGE)?;
        check("lantern", self.lantern, &LANTERN_RANGE)?;
        Ok(())
    }

    /// Record a change and push it into the scene.
    ///
    /// Numeric values are clamped to the panel ranges.
    pub fn apply(
        &mut self,
        change: ParamChange,
        scene: &mut Scene,
        handles: &VillageHandles,
    ) -> Result<(), SceneError> {
        match change {
            ParamChange::Ambient(v) => {
                self.ambient = clamp(v, &AMBIENT_RANGE);
                set_light(scene, handles.ambient, self.ambient, "ambient light")?;
            }
            ParamChange::Sun(v) => {
                self.sun = clamp(v, &SUN_RANGE);
                set_light(scene, handles.sun, self.sun, "sun")?;
            }
            ParamChange::Fog(enabled) => {
                self.fog = enabled;
                scene.fog = enabled.then(village_fog);
            }
            ParamChange::Lantern(v) => {
                self.lantern = clamp(v, &LANTERN_RANGE);
                set_light(scene, handles.lamp.light, self.lantern, "lantern light")?;
                scene
                    .catalog_mut()
                    .set_emissive_intensity(handles.lamp.lantern_paint, self.lantern)?;
            }
        }
        tracing::debug!(?change, "param applied");
        Ok(())
    }

    /// Push every stored value into the scene, e.g. after loading from file.
    pub fn sync(&mut self, scene: &mut Scene, handles: &VillageHandles) -> Result<(), SceneError> {
        let Params {
            ambient,
            sun,
            fog,
            lantern,
        } = *self;
        self.apply(ParamChange::Ambient(ambient), scene, handles)?;
        self.apply(ParamChange::Sun(sun), scene, handles)?;
        self.apply(ParamChange::Fog(fog), scene, handles)?;
        self.apply(ParamChange::Lantern(lantern), scene, handles)
    }
}

fn clamp(value: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_nan() {
        *range.start()
    } else {
        value.clamp(*range.start(), *range.end())
    }
}

fn set_light(
    scene: &mut Scene,
    id: village_common::NodeId,
    intensity: f32,
    what: &'static str,
) -> Result<(), SceneError> {
    let light = scene.light_mut(id).ok_or(SceneError::MissingChild(what))?;
    light.intensity = intensity;
    Ok(())
}
