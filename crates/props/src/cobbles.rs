//! Seeded cobblestone scatter over the village square.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::FRAC_PI_2;
use village_common::{NodeId, SceneError, Transform};
use village_scene::{Node, Scene};

use crate::layout::cobble_grid::{BASE_HEIGHT, CELLS, HEIGHT_RANGE, JITTER, ORIGIN, STEP};
use crate::templates::PropTemplates;

/// Disc positions for one cobble field. Same seed and density give the same field.
///
/// Cells are visited row by row over x then z; each cell draws one sample to
/// decide whether it is populated, then three more for jitter and height.
pub fn scatter_cobbles(seed: u64, density: f32) -> Result<Vec<Vec3>, SceneError> {
    if !(0.0..=1.0).contains(&density) {
        return Err(SceneError::InvalidParameter {
            what: "cobble density",
            value: density,
        });
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::new();
    for i in 0..CELLS {
        let x = ORIGIN + STEP * i as f32;
        for j in 0..CELLS {
            let z = ORIGIN + STEP * j as f32;
            if rng.random::<f32>() >= density {
                continue;
            }
            let jx = rng.random_range(-JITTER..JITTER);
            let y = BASE_HEIGHT + rng.random::<f32>() * HEIGHT_RANGE;
            let jz = rng.random_range(-JITTER..JITTER);
            positions.push(Vec3::new(x + jx, y, z + jz));
        }
    }
    Ok(positions)
}

/// Attach one flat, shadow-receiving disc per position under `group`.
pub fn add_cobbles(
    scene: &mut Scene,
    templates: &PropTemplates,
    group: NodeId,
    positions: &[Vec3],
) -> Result<usize, SceneError> {
    let part = templates.cobble;
    for position in positions {
        let transform = Transform {
            position: *position,
            ..Transform::default()
        }
        .with_euler(-FRAC_PI_2, 0.0, 0.0);
        scene.add(
            group,
            Node::mesh("cobble", part.shape, part.paint, transform).receiving(),
        )?;
    }
    tracing::debug!(count = positions.len(), "placed cobbles");
    Ok(positions.len())
}
