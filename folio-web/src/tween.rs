use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Quadratic ease-in-out.
    Power2InOut,
}

impl Easing {
    /// Map linear progress in `[0, 1]` onto the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power2InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

pub trait Interpolate: Copy {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start: f64,
    pub duration: f64,
    pub easing: Easing,
}

impl<T: Interpolate> Tween<T> {
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now: f64) -> T {
        let eased = self.easing.apply(self.progress(now));
        self.from.lerp_to(self.to, eased as f32)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

/// One animated property with at most one tween in flight.
///
/// Retargeting replaces the in-flight tween; the new one starts from the
/// value the old one had reached at that moment.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSlot<T> {
    value: T,
    active: Option<Tween<T>>,
    easing: Easing,
}

impl<T: Interpolate> TweenSlot<T> {
    pub fn new(value: T, easing: Easing) -> Self {
        Self {
            value,
            active: None,
            easing,
        }
    }

    /// Last value produced by `advance` (or the resting value).
    pub fn value(&self) -> T {
        self.value
    }

    /// Where the slot will come to rest.
    pub fn target(&self) -> T {
        self.active.map_or(self.value, |tween| tween.to)
    }

    pub fn active(&self) -> Option<&Tween<T>> {
        self.active.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn sample(&self, now: f64) -> T {
        self.active.map_or(self.value, |tween| tween.sample(now))
    }

    pub fn retarget(&mut self, to: T, now: f64, duration: f64) {
        let from = self.sample(now);
        self.value = from;
        self.active = Some(Tween {
            from,
            to,
            start: now,
            duration,
            easing: self.easing,
        });
    }

    /// Move the stored value to `now`, retiring the tween once it completes.
    pub fn advance(&mut self, now: f64) -> T {
        if let Some(tween) = self.active {
            self.value = tween.sample(now);
            if tween.is_finished(now) {
                self.value = tween.to;
                self.active = None;
            }
        }
        self.value
    }
}

/// The two independently tweened property groups driven by navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTargets {
    pub camera: TweenSlot<Vec3>,
    /// Navigation yaw offset of the decoration group.
    pub grid_yaw: TweenSlot<f32>,
}

impl MotionTargets {
    pub fn new(camera_start: Vec3) -> Self {
        Self {
            camera: TweenSlot::new(camera_start, Easing::Power2InOut),
            grid_yaw: TweenSlot::new(0.0, Easing::Power2InOut),
        }
    }

    pub fn advance(&mut self, now: f64) -> (Vec3, f32) {
        (self.camera.advance(now), self.grid_yaw.advance(now))
    }
}
