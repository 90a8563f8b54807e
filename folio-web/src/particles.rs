use folio_gpu_shared::gpu_types::{ParticleVertex, VERTICES_PER_PARTICLE};
use glam::{Mat4, Vec3};

use crate::rng::SceneRng;
use crate::transform::Transform;

/// Edge length of the cube particles are scattered in, centred on the origin.
pub const PARTICLE_EXTENT: f32 = 30.0;

/// Static point cloud drifting behind the scene.
///
/// Positions are generated once into a single contiguous buffer of
/// `3 * count` floats and never resized or rewritten; only the field's
/// transform moves.
pub struct ParticleField {
    positions: Box<[f32]>,
    pub transform: Transform,
    pub size: f32,
    pub color: [f32; 3],
    pub opacity: f32,
}

impl ParticleField {
    pub fn scatter(count: usize, size: f32, rng: &mut SceneRng) -> Self {
        let positions: Box<[f32]> = (0..count * 3)
            .map(|_| rng.centered(PARTICLE_EXTENT))
            .collect();
        Self {
            positions,
            transform: Transform::default(),
            size,
            color: [1.0, 1.0, 1.0],
            opacity: 0.6,
        }
    }

    pub fn count(&self) -> usize {
        self.positions.len() / 3
    }

    /// The raw xyz buffer.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Rebuild camera-facing quads for every particle into `out`.
    ///
    /// `out` is cleared first; its allocation is reused across frames.
    pub fn write_billboards(&self, cam_right: Vec3, cam_up: Vec3, out: &mut Vec<ParticleVertex>) {
        out.clear();
        out.reserve(self.count() * VERTICES_PER_PARTICLE);

        let model: Mat4 = self.transform.matrix();
        let half = self.size * 0.5;
        let right = cam_right * half;
        let up = cam_up * half;
        let color = [self.color[0], self.color[1], self.color[2], self.opacity];

        for p in self.positions.chunks_exact(3) {
            let center = model.transform_point3(Vec3::new(p[0], p[1], p[2]));

            let bl = center - right - up;
            let br = center + right - up;
            let tr = center + right + up;
            let tl = center - right + up;

            // Two triangles: BL, BR, TR and BL, TR, TL
            let corners = [
                (bl, [0.0, 0.0]),
                (br, [1.0, 0.0]),
                (tr, [1.0, 1.0]),
                (bl, [0.0, 0.0]),
                (tr, [1.0, 1.0]),
                (tl, [0.0, 1.0]),
            ];
            for (pos, uv) in corners {
                out.push(ParticleVertex {
                    position: pos.to_array(),
                    uv,
                    color,
                });
            }
        }
    }
}
