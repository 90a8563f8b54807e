use folio_web::clock::{Clock, ManualClock};
use folio_web::frame_loop::LoopControl;
use folio_web::navigation::{NavigationBridge, NavigationHost};
use folio_web::render::{NullBackend, RenderBackend};
use folio_web::rng::SceneRng;
use folio_web::runtime::SceneRuntime;
use folio_web::scene::{build_scene, Headless};
use folio_web::stage::{SceneHandle, Stage};
use folio_web::viewport::Viewport;
use folio_web::{derive_profile, SceneOptions};
use glam::Vec3;

/// Inputs for one headless run.
#[derive(Debug, Clone)]
pub struct PreviewParams {
    pub section: Option<String>,
    pub seconds: f64,
    pub fps: u32,
    pub viewport: Viewport,
    pub user_agent: String,
    pub options: SceneOptions,
}

/// Where the scene ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewReport {
    pub active_section: String,
    pub camera_position: Vec3,
    pub grid_yaw: f32,
    pub frames: u64,
    pub history: Vec<String>,
}

/// Section UI stand-in that only remembers what it was told.
#[derive(Default)]
struct HeadlessHost {
    history: Vec<String>,
}

impl NavigationHost for HeadlessHost {
    fn mark_active(&mut self, section: &str) {
        log::debug!("active section: {section}");
    }

    fn push_fragment(&mut self, section: &str) {
        self.history.push(format!("#{section}"));
    }
}

pub fn run(params: PreviewParams) -> anyhow::Result<()> {
    let report = simulate(&params)?;
    println!("frames:         {}", report.frames);
    println!("active section: {}", report.active_section);
    let c = report.camera_position;
    println!("camera:         ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);
    println!("grid yaw:       {:.4} rad", report.grid_yaw);
    if !report.history.is_empty() {
        println!("history:        {}", report.history.join(" "));
    }
    Ok(())
}

pub fn simulate(params: &PreviewParams) -> anyhow::Result<PreviewReport> {
    if params.fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }
    if !(params.seconds.is_finite() && params.seconds >= 0.0) {
        anyhow::bail!("--seconds must be a non-negative number");
    }

    let options = &params.options;
    let profile = derive_profile(&params.user_agent, params.viewport.width);
    let mut rng = match options.seed {
        Some(seed) => SceneRng::new(seed),
        None => SceneRng::from_entropy(),
    };
    let built = build_scene(
        &profile,
        params.viewport,
        Some(Headless),
        &options.container_id,
        &mut rng,
    )?;

    let stage = SceneHandle::new(Stage::new(built.graph, profile, params.viewport));
    let mut backend = NullBackend::default();
    backend.resize(params.viewport.width, params.viewport.height);
    let mut runtime = SceneRuntime::new(stage.clone(), backend, options.resize_debounce_seconds());
    let clock = ManualClock::new(0.0);
    let mut bridge = NavigationBridge::new(
        stage.clone(),
        HeadlessHost::default(),
        clock.clone(),
        options.tween_seconds,
    );

    let frame_time = 1.0 / params.fps as f64;
    let total = (params.seconds * params.fps as f64).round() as u64;
    for frame in 0..total {
        if runtime.frame(clock.now()) == LoopControl::Stop {
            break;
        }
        if frame == 0 {
            if let Some(section) = &params.section {
                bridge.navigate_to(section);
            }
        }
        clock.advance(frame_time);
    }

    let frames = runtime.frame_loop().frames();
    let (camera_position, grid_yaw) = stage.with(|s| {
        (s.graph.camera.position, s.motion.grid_yaw.value())
    });
    runtime.teardown();

    Ok(PreviewReport {
        active_section: bridge.active_section().to_string(),
        camera_position,
        grid_yaw,
        frames,
        history: bridge.host().history.clone(),
    })
}
