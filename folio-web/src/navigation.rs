use std::f32::consts::PI;
use std::fmt;

use glam::Vec3;

use crate::clock::Clock;
use crate::stage::SceneHandle;

/// The portfolio's navigable sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Home,
    About,
    Resume,
    Services,
    Portfolio,
    Contact,
}

impl SectionId {
    pub const ALL: [SectionId; 6] = [
        Self::Home,
        Self::About,
        Self::Resume,
        Self::Services,
        Self::Portfolio,
        Self::Contact,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Resume => "resume",
            Self::Services => "services",
            Self::Portfolio => "portfolio",
            Self::Contact => "contact",
        }
    }

    /// Where the camera comes to rest for this section.
    pub fn camera_pose(&self) -> Vec3 {
        match self {
            Self::Home => Vec3::new(0.0, 0.0, 5.0),
            Self::About => Vec3::new(4.0, 0.0, 4.0),
            Self::Resume => Vec3::new(-4.0, 1.0, 3.0),
            Self::Services => Vec3::new(0.0, 3.0, 2.0),
            Self::Portfolio => Vec3::new(0.0, 2.0, 8.0),
            Self::Contact => Vec3::new(0.0, -2.0, 5.0),
        }
    }

    /// Navigation yaw offset of the decoration group.
    pub fn grid_yaw(&self) -> f32 {
        match self {
            Self::Services | Self::Portfolio => PI,
            _ => 0.0,
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section named by a URL fragment (`"#about"` or `"about"`), if recognized.
pub fn parse_fragment(fragment: &str) -> Option<SectionId> {
    SectionId::parse(fragment.strip_prefix('#').unwrap_or(fragment))
}

/// Page-side effects of a navigation.
pub trait NavigationHost {
    /// Flag the nav item and panel for `section` active and clear the others.
    fn mark_active(&mut self, section: &str);

    /// Record `#section` as a new history entry without scrolling or reloading.
    fn push_fragment(&mut self, section: &str);

    /// Report a page view to analytics, when the page has any.
    fn track_page_view(&mut self, _section: &str) {}
}

/// Turns section selection into camera motion plus UI and URL state.
pub struct NavigationBridge<H, C> {
    scene: SceneHandle,
    host: H,
    clock: C,
    tween_seconds: f64,
    active: String,
}

impl<H: NavigationHost, C: Clock> NavigationBridge<H, C> {
    pub fn new(scene: SceneHandle, host: H, clock: C, tween_seconds: f64) -> Self {
        Self {
            scene,
            host,
            clock,
            tween_seconds,
            active: SectionId::Home.as_str().to_string(),
        }
    }

    /// May be a name no section answers to.
    pub fn active_section(&self) -> &str {
        &self.active
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Navigate to `target`. Unknown names still update the UI and history
    /// but leave the camera and grid where they are.
    pub fn navigate_to(&mut self, target: &str) -> Option<SectionId> {
        self.apply(target, true)
    }

    /// Back/forward: follow the fragment, falling back to home.
    pub fn on_history_pop(&mut self, fragment: Option<&str>) -> SectionId {
        let section = fragment
            .and_then(parse_fragment)
            .unwrap_or(SectionId::Home);
        self.apply(section.as_str(), false);
        section
    }

    /// First-load deep link. Only a recognized section moves the view.
    pub fn restore_initial(&mut self, fragment: Option<&str>) -> Option<SectionId> {
        let section = fragment.and_then(parse_fragment)?;
        self.apply(section.as_str(), false);
        Some(section)
    }

    fn apply(&mut self, target: &str, push_history: bool) -> Option<SectionId> {
        self.active = target.to_string();
        self.host.mark_active(target);

        let section = SectionId::parse(target);
        match section {
            Some(section) => {
                let now = self.clock.now();
                let duration = self.tween_seconds;
                self.scene.with_mut(|stage| {
                    stage
                        .motion
                        .camera
                        .retarget(section.camera_pose(), now, duration);
                    stage.motion.grid_yaw.retarget(section.grid_yaw(), now, duration);
                });
                log::info!("Navigating to {section}");
            }
            None => log::warn!("Unknown section '{target}', camera left in place"),
        }

        if push_history {
            self.host.push_fragment(target);
        }
        self.host.track_page_view(target);
        section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::update_frame;
    use crate::clock::ManualClock;
    use crate::profile::RenderProfile;
    use crate::rng::SceneRng;
    use crate::scene::{build_scene, Headless};
    use crate::stage::Stage;
    use crate::viewport::Viewport;

    #[derive(Default)]
    struct RecordingHost {
        active: Vec<String>,
        history: Vec<String>,
        page_views: Vec<String>,
    }

    impl NavigationHost for RecordingHost {
        fn mark_active(&mut self, section: &str) {
            self.active.push(section.to_string());
        }

        fn push_fragment(&mut self, section: &str) {
            self.history.push(format!("#{section}"));
        }

        fn track_page_view(&mut self, section: &str) {
            self.page_views.push(section.to_string());
        }
    }

    fn setup() -> (NavigationBridge<RecordingHost, ManualClock>, SceneHandle, ManualClock) {
        let viewport = Viewport::new(1280, 720);
        let profile = RenderProfile::low();
        let mut rng = SceneRng::new(1);
        let built = build_scene(&profile, viewport, Some(Headless), "c", &mut rng).unwrap();
        let scene = SceneHandle::new(Stage::new(built.graph, profile, viewport));
        let clock = ManualClock::new(0.0);
        let bridge = NavigationBridge::new(
            scene.clone(),
            RecordingHost::default(),
            clock.clone(),
            1.5,
        );
        (bridge, scene, clock)
    }

    fn settle(scene: &SceneHandle, clock: &ManualClock) {
        for _ in 0..120 {
            clock.advance(1.0 / 60.0);
            let now = clock.now();
            scene.with_mut(|stage| update_frame(stage, now, 1.0 / 60.0, now));
        }
    }

    // ── section table ──

    #[test]
    fn test_section_names_round_trip() {
        for section in SectionId::ALL {
            assert_eq!(SectionId::parse(section.as_str()), Some(section));
        }
        assert_eq!(SectionId::parse("Home"), None);
        assert_eq!(parse_fragment("#contact"), Some(SectionId::Contact));
        assert_eq!(parse_fragment("contact"), Some(SectionId::Contact));
        assert_eq!(parse_fragment("#"), None);
    }

    #[test]
    fn test_grid_yaw_table() {
        assert_eq!(SectionId::Services.grid_yaw(), PI);
        assert_eq!(SectionId::Portfolio.grid_yaw(), PI);
        for section in [SectionId::Home, SectionId::About, SectionId::Resume, SectionId::Contact] {
            assert_eq!(section.grid_yaw(), 0.0);
        }
    }

    // ── navigate_to ──

    #[test]
    fn test_starts_home() {
        let (bridge, scene, _) = setup();
        assert_eq!(bridge.active_section(), "home");
        assert!(scene.with(|s| !s.motion.camera.is_animating()));
    }

    #[test]
    fn test_last_navigation_wins() {
        let (mut bridge, scene, clock) = setup();
        bridge.navigate_to("portfolio");
        clock.advance(0.5);
        bridge.navigate_to("about");

        assert_eq!(bridge.active_section(), "about");
        scene.with(|s| {
            let tween = s.motion.camera.active().unwrap();
            assert_eq!(tween.to, Vec3::new(4.0, 0.0, 4.0));
            assert_eq!(tween.start, 0.5);
            // Started from wherever the portfolio tween had got to.
            assert_ne!(tween.from, Vec3::new(0.0, 0.0, 5.0));
            assert_eq!(s.motion.camera.target(), SectionId::About.camera_pose());
        });
        assert_eq!(bridge.host().history, vec!["#portfolio", "#about"]);
        assert_eq!(bridge.host().active.last().map(String::as_str), Some("about"));
    }

    #[test]
    fn test_grid_target_follows_section() {
        let (mut bridge, scene, _) = setup();
        bridge.navigate_to("services");
        assert_eq!(scene.with(|s| s.motion.grid_yaw.target()), PI);
        bridge.navigate_to("home");
        assert_eq!(scene.with(|s| s.motion.grid_yaw.target()), 0.0);
    }

    #[test]
    fn test_unknown_section_updates_bookkeeping_only() {
        let (mut bridge, scene, _) = setup();
        assert_eq!(bridge.navigate_to("unknown-section"), None);

        assert_eq!(bridge.active_section(), "unknown-section");
        assert_eq!(bridge.host().active, vec!["unknown-section"]);
        assert_eq!(bridge.host().history, vec!["#unknown-section"]);
        scene.with(|s| {
            assert!(!s.motion.camera.is_animating());
            assert!(!s.motion.grid_yaw.is_animating());
        });
    }

    #[test]
    fn test_every_navigation_reports_page_view() {
        let (mut bridge, _, _) = setup();
        bridge.navigate_to("about");
        bridge.navigate_to("nowhere");
        bridge.on_history_pop(None);
        assert_eq!(bridge.host().page_views, vec!["about", "nowhere", "home"]);
    }

    #[test]
    fn test_camera_settles_on_pose() {
        let (mut bridge, scene, clock) = setup();
        bridge.navigate_to("contact");
        settle(&scene, &clock);
        assert_eq!(scene.with(|s| s.graph.camera.position), Vec3::new(0.0, -2.0, 5.0));
    }

    // ── history ──

    #[test]
    fn test_pop_follows_fragment_without_pushing() {
        let (mut bridge, scene, _) = setup();
        assert_eq!(bridge.on_history_pop(Some("#services")), SectionId::Services);
        assert_eq!(bridge.active_section(), "services");
        assert!(bridge.host().history.is_empty());
        assert_eq!(scene.with(|s| s.motion.grid_yaw.target()), PI);
    }

    #[test]
    fn test_pop_defaults_to_home() {
        let (mut bridge, _, _) = setup();
        bridge.navigate_to("about");
        assert_eq!(bridge.on_history_pop(Some("#bogus")), SectionId::Home);
        assert_eq!(bridge.active_section(), "home");
        assert_eq!(bridge.on_history_pop(None), SectionId::Home);
    }

    // ── initial load ──

    #[test]
    fn test_initial_fragment_settles_camera() {
        let (mut bridge, scene, clock) = setup();
        assert_eq!(bridge.restore_initial(Some("#resume")), Some(SectionId::Resume));
        settle(&scene, &clock);
        assert_eq!(bridge.active_section(), "resume");
        assert_eq!(scene.with(|s| s.graph.camera.position), Vec3::new(-4.0, 1.0, 3.0));
    }

    #[test]
    fn test_initial_unknown_fragment_stays_home() {
        let (mut bridge, scene, _) = setup();
        assert_eq!(bridge.restore_initial(Some("#elsewhere")), None);
        assert_eq!(bridge.restore_initial(None), None);
        assert_eq!(bridge.active_section(), "home");
        assert!(bridge.host().active.is_empty());
        assert!(scene.with(|s| !s.motion.camera.is_animating()));
    }
}
