use std::time::Instant;
use village_common::SceneError;
use village_props::{Village, VillageConfig, VillageHandles, build_village};
use village_scene::{CameraView, Scene};

use crate::animation::{AnimationState, TickReport};
use crate::params::{ParamChange, Params};

/// Elapsed-time source for the animation loop.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Real time since the clock was started.
    Wall(Instant),
    /// Fixed time step per reading, for headless runs and tests.
    Simulated { step: f64, readings: u64 },
}

impl Clock {
    pub fn start() -> Self {
        Self::Wall(Instant::now())
    }

    /// A clock that advances `1 / fps` seconds each time it is read.
    pub fn simulated(fps: f64) -> Self {
        Self::Simulated {
            step: if fps > 0.0 { 1.0 / fps } else { 0.0 },
            readings: 0,
        }
    }

    /// Seconds elapsed. The first reading of a simulated clock is 0.
    pub fn elapsed(&mut self) -> f64 {
        match self {
            Self::Wall(start) => start.elapsed().as_secs_f64(),
            Self::Simulated { step, readings } => {
                let t = *step * *readings as f64;
                *readings += 1;
                t
            }
        }
    }
}

/// The host side of a frame: camera controls, drawing and scheduling.
pub trait FrameHost {
    /// Advance the camera controls' damping state.
    fn update_controls(&mut self);
    /// Draw the scene once from the current camera.
    fn render(&mut self, scene: &Scene);
    /// Ask for the next frame callback.
    fn request_next_frame(&mut self);
}

/// Everything a running village needs, created by [`AppContext::init`] and
/// released by [`AppContext::teardown`].
#[derive(Debug)]
pub struct AppContext {
    scene: Scene,
    handles: VillageHandles,
    view: CameraView,
    params: Params,
    animation: AnimationState,
    clock: Clock,
    cobble_count: usize,
    running: bool,
}

impl AppContext {
    /// Build the village and push `params` into it.
    pub fn init(config: &VillageConfig, params: Params, clock: Clock) -> Result<Self, SceneError> {
        let Village {
            mut scene,
            handles,
            view,
            cobble_count,
        } = build_village(config)?;
        let mut params = params;
        params.sync(&mut scene, &handles)?;
        tracing::info!(?params, "app context ready");
        Ok(Self {
            scene,
            handles,
            view,
            params,
            animation: AnimationState::new(),
            clock,
            cobble_count,
            running: true,
        })
    }

    /// One frame: read the clock, animate, then hand off to the host for
    /// controls, rendering and scheduling, in that order.
    ///
    /// Returns `None` after teardown.
    pub fn frame(&mut self, host: &mut impl FrameHost) -> Option<TickReport> {
        if !self.running {
            return None;
        }
        let t = self.clock.elapsed();
        let report = self
            .animation
            .tick(&mut self.scene, &self.handles, &self.params, t);
        host.update_controls();
        host.render(&self.scene);
        host.request_next_frame();
        Some(report)
    }

    /// Apply a parameter panel edit. Seen by the next frame.
    pub fn set_param(&mut self, change: ParamChange) -> Result<(), SceneError> {
        self.params.apply(change, &mut self.scene, &self.handles)
    }

    /// Stop the loop and release the scene.
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.scene.clear();
        tracing::info!(frames = self.animation.ticks(), "app context torn down");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn handles(&self) -> &VillageHandles {
        &self.handles
    }

    pub fn view(&self) -> &CameraView {
        &self.view
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn cobble_count(&self) -> usize {
        self.cobble_count
    }
}
