use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use village_props::{VillageConfig, build_village};
use village_render::{DebugTextRenderer, RenderView, Renderer};
use village_runtime::{AppContext, Clock, FrameHost, Params};
use village_scene::Scene;
use village_tools::SceneInspector;

#[derive(Parser)]
#[command(name = "village-cli", about = "Headless tools for the village scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build the village and print a summary and one debug frame
    Build {
        /// Seed for the cobble scatter
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
    /// Run the frame loop headless on a simulated clock
    Run {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Simulated frames per second
        #[arg(short, long, default_value = "60")]
        fps: f64,
        /// Seed for the cobble scatter
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Parameter file (JSON)
        #[arg(short, long)]
        params: Option<PathBuf>,
    },
}

/// Frame host without a window: no controls, counts renders.
#[derive(Default)]
struct HeadlessHost {
    rendered: u64,
    drawables: usize,
}

impl FrameHost for HeadlessHost {
    fn update_controls(&mut self) {}

    fn render(&mut self, scene: &Scene) {
        let mut count = 0;
        scene.visit_drawables(|_| count += 1);
        self.drawables = count;
        self.rendered += 1;
    }

    fn request_next_frame(&mut self) {}
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("village-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", village_common::crate_info());
            println!("scene: {}", village_scene::crate_info());
            println!("props: {}", village_props::crate_info());
            println!("runtime: {}", village_runtime::crate_info());
            println!("render: {}", village_render::crate_info());
            println!("tools: {}", village_tools::crate_info());
        }
        Commands::Build { seed } => {
            let config = VillageConfig {
                cobble_seed: seed,
                ..VillageConfig::default()
            };
            let village = build_village(&config)?;
            tracing::info!(seed, cobbles = village.cobble_count, "village built");
            println!("{}", SceneInspector::summary(&village.scene));
            for group in SceneInspector::group_counts(&village.scene, &village.handles) {
                println!("  {group}");
            }
            let view = RenderView::from(&village.view);
            print!("{}", DebugTextRenderer::new().render(&village.scene, &view));
        }
        Commands::Run {
            ticks,
            fps,
            seed,
            params,
        } => {
            let config = VillageConfig {
                cobble_seed: seed,
                ..VillageConfig::default()
            };
            let params = match params {
                Some(path) => Params::load(&path)?,
                None => Params::default(),
            };
            println!("Headless run: seed={seed}, ticks={ticks}, fps={fps}");

            let mut app = AppContext::init(&config, params, Clock::simulated(fps))?;
            let mut host = HeadlessHost::default();
            for _ in 0..ticks {
                let Some(report) = app.frame(&mut host) else {
                    break;
                };
                println!(
                    "tick={} t={:.3} window={:.3} lantern={:.3} pulley={:.3} missing={}",
                    report.tick,
                    report.elapsed,
                    report.window_pulse,
                    report.lantern,
                    report.pulley_angle,
                    report.missing.len()
                );
            }
            tracing::info!(
                frames = host.rendered,
                drawables = host.drawables,
                "headless run finished"
            );
            println!(
                "Rendered {} frames, {} drawables per frame",
                host.rendered, host.drawables
            );
            app.teardown();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_host_counts_frames() {
        let config = VillageConfig {
            cobble_density: 0.0,
            ..VillageConfig::default()
        };
        let mut app = AppContext::init(&config, Params::default(), Clock::simulated(60.0)).unwrap();
        let mut host = HeadlessHost::default();
        for _ in 0..3 {
            app.frame(&mut host).unwrap();
        }
        assert_eq!(host.rendered, 3);
        assert!(host.drawables > 0);

        app.teardown();
        assert!(app.frame(&mut host).is_none());
        assert_eq!(host.rendered, 3);
    }
}
