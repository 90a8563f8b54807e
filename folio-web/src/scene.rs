use std::fmt;

use folio_gpu_shared::geometry::MeshKind;
use folio_gpu_shared::gpu_types::{
    FrameData, InstanceRaw, MaterialParams, MeshBatch, ParticleVertex, PointLightRaw,
    SceneUniforms,
};
use folio_gpu_shared::math::{hex_to_linear, look_at, perspective};
use glam::{Mat4, Vec2, Vec3};

use crate::error::SceneError;
use crate::particles::ParticleField;
use crate::profile::RenderProfile;
use crate::rng::SceneRng;
use crate::transform::{compute_world_transforms, Transform};
use crate::viewport::Viewport;

pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 5.0);

/// Side of the square the decoration bars are scattered over.
pub const DECORATION_EXTENT: f32 = 15.0;
/// Bars stand below the visual horizon.
pub const DECORATION_Y: f32 = -2.0;
pub const BAR_HEIGHT_SCALE_MIN: f32 = 0.5;
pub const BAR_HEIGHT_SCALE_MAX: f32 = 3.5;

/// Perspective camera with an extra pointer-parallax offset.
///
/// `position` is the navigation pose; the rendered eye is `position + parallax`.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub parallax: Vec2,
    projection: Mat4,
    view: Mat4,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            fov_degrees: CAMERA_FOV_DEGREES,
            aspect,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            position: CAMERA_START,
            parallax: Vec2::ZERO,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera.look_at(Vec3::ZERO);
        camera
    }

    /// Rendered eye position.
    pub fn eye(&self) -> Vec3 {
        self.position + self.parallax.extend(0.0)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection();
    }

    pub fn update_projection(&mut self) {
        self.projection = perspective(self.fov_degrees, self.aspect, self.near, self.far);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.view = look_at(self.eye(), target);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// World-space right and up axes of the current view.
    pub fn basis(&self) -> (Vec3, Vec3) {
        let world = self.view.inverse();
        (world.x_axis.truncate(), world.y_axis.truncate())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
}

impl PointLight {
    fn to_raw(self) -> PointLightRaw {
        PointLightRaw {
            position_range: self.position.extend(self.range).to_array(),
            color_intensity: [self.color[0], self.color[1], self.color[2], self.intensity],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    /// Warm gold key light and cool blue fill light.
    pub points: [PointLight; 2],
}

/// Exponential-squared distance fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: [f32; 3],
    pub density: f32,
}

/// Randomly scattered vertical bars. Placement is rolled once at construction.
pub struct DecorationGroup {
    pub transform: Transform,
    /// Accumulated idle spin; the navigation offset is added on top.
    pub spin_yaw: f32,
    bars: Vec<Transform>,
    pub material: MaterialParams,
}

impl DecorationGroup {
    pub fn bars(&self) -> &[Transform] {
        &self.bars
    }
}

/// One floating emblem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Icon {
    pub kind: MeshKind,
    pub base_position: Vec3,
    /// Phase offset of the vertical bob, radians.
    pub float_phase: f32,
    /// Angular velocity per axis, radians per second.
    pub spin: Vec3,
    pub transform: Transform,
}

pub struct IconGroup {
    pub transform: Transform,
    pub icons: [Icon; 3],
    pub material: MaterialParams,
}

/// Every renderable object in the background. Topology is fixed at
/// construction; only transforms change afterwards.
pub struct SceneGraph {
    pub camera: PerspectiveCamera,
    pub lighting: Lighting,
    pub fog: Fog,
    pub decoration: DecorationGroup,
    pub icons: IconGroup,
    pub particles: ParticleField,
}

/// Reusable per-frame buffers so building a frame does not allocate.
#[derive(Default)]
pub struct FrameScratch {
    batches: Vec<MeshBatch>,
    particles: Vec<ParticleVertex>,
}

impl SceneGraph {
    /// Describe the current state of the scene for the backend.
    pub fn frame_data<'a>(&self, scratch: &'a mut FrameScratch) -> FrameData<'a> {
        let mut uniforms = SceneUniforms::new(self.camera.view_projection(), self.camera.eye());
        let ambient = self.lighting.ambient;
        uniforms.ambient = [
            ambient.color[0] * ambient.intensity,
            ambient.color[1] * ambient.intensity,
            ambient.color[2] * ambient.intensity,
            1.0,
        ];
        uniforms.point_lights = self.lighting.points.map(PointLight::to_raw);
        uniforms.fog = [
            self.fog.color[0],
            self.fog.color[1],
            self.fog.color[2],
            self.fog.density,
        ];

        scratch.batches.clear();
        let bar_material = self.decoration.material;
        scratch.batches.push(MeshBatch {
            kind: MeshKind::Bar,
            instances: compute_world_transforms(&self.decoration.transform, &self.decoration.bars)
                .map(|m| InstanceRaw::new(m, &bar_material))
                .collect(),
        });
        let icon_material = self.icons.material;
        let icon_worlds = compute_world_transforms(
            &self.icons.transform,
            self.icons.icons.iter().map(|i| &i.transform),
        );
        for (icon, world) in self.icons.icons.iter().zip(icon_worlds) {
            scratch.batches.push(MeshBatch {
                kind: icon.kind,
                instances: vec![InstanceRaw::new(world, &icon_material)],
            });
        }

        let (right, up) = self.camera.basis();
        self.particles.write_billboards(right, up, &mut scratch.particles);

        FrameData {
            uniforms,
            batches: &scratch.batches,
            particles: &scratch.particles,
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.decoration.bars.len() + self.icons.icons.len()
    }
}

/// Where the renderer's canvas gets mounted.
pub trait SurfaceHost {
    type Surface;

    /// Create the display surface and insert it into the page.
    fn attach_surface(&mut self, viewport: Viewport) -> Result<Self::Surface, SceneError>;
}

/// A surface that is in the page and can be taken out again.
pub trait MountedSurface {
    fn unmount(&self);
}

impl MountedSurface for () {
    fn unmount(&self) {}
}

/// Keep the renderer created for `surface`, or unmount the surface when
/// creation failed so the page is left without a scene.
pub fn renderer_or_unmount<S, R, E>(surface: &S, created: Result<R, E>) -> Option<R>
where
    S: MountedSurface,
    E: fmt::Display,
{
    match created {
        Ok(renderer) => Some(renderer),
        Err(e) => {
            log::warn!("Renderer unavailable ({e}); background scene disabled");
            surface.unmount();
            None
        }
    }
}

/// A built scene plus the surface it will be drawn into.
pub struct BuiltScene<S> {
    pub graph: SceneGraph,
    pub surface: S,
}

/// Build the scene graph for `profile` and mount its surface in `container`.
///
/// A missing container is the only construction failure; it leaves nothing
/// behind and the caller is expected to carry on without a scene.
pub fn build_scene<H: SurfaceHost>(
    profile: &RenderProfile,
    viewport: Viewport,
    container: Option<H>,
    container_id: &str,
    rng: &mut SceneRng,
) -> Result<BuiltScene<H::Surface>, SceneError> {
    let mut container =
        container.ok_or_else(|| SceneError::MissingContainer(container_id.to_string()))?;

    let graph = SceneGraph {
        camera: PerspectiveCamera::new(viewport.aspect()),
        lighting: build_lighting(),
        fog: Fog {
            color: hex_to_linear(0x050505),
            density: 0.05,
        },
        decoration: build_decoration(profile.decoration_bar_count, rng),
        icons: build_icons(),
        particles: ParticleField::scatter(profile.particle_count, profile.particle_size, rng),
    };

    let surface = container.attach_surface(viewport)?;

    log::info!(
        "Scene built: {} tier, {} bars, {} particles",
        profile.quality_tier.label(),
        graph.decoration.bars.len(),
        graph.particles.count(),
    );

    Ok(BuiltScene { graph, surface })
}

fn build_lighting() -> Lighting {
    Lighting {
        ambient: AmbientLight {
            color: hex_to_linear(0xffffff),
            intensity: 0.3,
        },
        points: [
            PointLight {
                position: Vec3::new(5.0, 5.0, 5.0),
                color: hex_to_linear(0xd4af37),
                intensity: 1.5,
                range: 50.0,
            },
            PointLight {
                position: Vec3::new(-5.0, -5.0, 2.0),
                color: hex_to_linear(0x1387c1),
                intensity: 0.8,
                range: 50.0,
            },
        ],
    }
}

fn build_decoration(count: usize, rng: &mut SceneRng) -> DecorationGroup {
    let bars = (0..count)
        .map(|_| Transform {
            position: Vec3::new(
                rng.centered(DECORATION_EXTENT),
                DECORATION_Y,
                rng.centered(DECORATION_EXTENT),
            ),
            rotation: Vec3::ZERO,
            scale: Vec3::new(1.0, rng.range(BAR_HEIGHT_SCALE_MIN, BAR_HEIGHT_SCALE_MAX), 1.0),
        })
        .collect();

    DecorationGroup {
        transform: Transform::default(),
        spin_yaw: 0.0,
        bars,
        material: MaterialParams {
            color: hex_to_linear(0x333333),
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            metalness: 0.8,
            roughness: 0.2,
        },
    }
}

fn build_icons() -> IconGroup {
    let icon = |kind, base_position: Vec3, float_phase, spin| Icon {
        kind,
        base_position,
        float_phase,
        spin,
        transform: Transform::from_position(base_position),
    };

    IconGroup {
        transform: Transform::default(),
        icons: [
            icon(MeshKind::Octahedron, Vec3::new(-3.0, 1.0, 0.0), 0.0, Vec3::new(0.6, 0.6, 0.0)),
            icon(MeshKind::Icosahedron, Vec3::new(0.0, 2.0, -2.0), 2.0, Vec3::new(0.0, -0.6, 0.0)),
            icon(MeshKind::Torus, Vec3::new(3.0, 0.5, -1.0), 4.0, Vec3::new(-0.3, -0.3, 0.0)),
        ],
        material: MaterialParams {
            color: hex_to_linear(0xd4af37),
            emissive: hex_to_linear(0xaa8800),
            emissive_intensity: 0.2,
            metalness: 1.0,
            roughness: 0.3,
        },
    }
}

/// Surface host for headless runs: nothing is mounted.
pub struct Headless;

impl SurfaceHost for Headless {
    type Surface = ();

    fn attach_surface(&mut self, _viewport: Viewport) -> Result<(), SceneError> {
        Ok(())
    }
}
