use folio_gpu_shared::math::clamp_pixel_ratio;

/// User-agent fragments that mark a device as low-power (matched case-insensitively).
pub const MOBILE_SIGNATURES: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Viewports narrower than this are treated as low-power regardless of user agent.
pub const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    Low,
    High,
}

impl QualityTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::High => "high",
        }
    }
}

/// Rendering budget chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderProfile {
    pub particle_count: usize,
    pub decoration_bar_count: usize,
    pub quality_tier: QualityTier,
    pub antialias_enabled: bool,
    /// Device pixel ratio, clamped to at most 2.
    pub pixel_ratio: f64,
    /// World-space edge length of a particle billboard.
    pub particle_size: f32,
    /// Whether pointer movement drives camera and particle parallax.
    pub pointer_parallax: bool,
}

impl RenderProfile {
    pub fn low() -> Self {
        Self {
            particle_count: 300,
            decoration_bar_count: 20,
            quality_tier: QualityTier::Low,
            antialias_enabled: false,
            pixel_ratio: 1.0,
            particle_size: 0.03,
            pointer_parallax: false,
        }
    }

    pub fn high() -> Self {
        Self {
            particle_count: 700,
            decoration_bar_count: 40,
            quality_tier: QualityTier::High,
            antialias_enabled: true,
            pixel_ratio: 1.0,
            particle_size: 0.05,
            pointer_parallax: true,
        }
    }

    /// Same profile rendering at the given device pixel ratio (clamped).
    pub fn with_pixel_ratio(mut self, device_pixel_ratio: f64) -> Self {
        self.pixel_ratio = clamp_pixel_ratio(device_pixel_ratio);
        self
    }
}

/// True when the user agent looks mobile or the viewport is narrow.
pub fn is_low_power(user_agent: &str, viewport_width: u32) -> bool {
    if viewport_width < MOBILE_BREAKPOINT {
        return true;
    }
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_SIGNATURES.iter().any(|sig| ua.contains(sig))
}

/// Classify the environment and pick the matching profile at 1x pixel ratio.
pub fn derive_profile(user_agent: &str, viewport_width: u32) -> RenderProfile {
    if is_low_power(user_agent, viewport_width) {
        RenderProfile::low()
    } else {
        RenderProfile::high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP_UA: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const IPHONE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

    #[test]
    fn test_desktop_wide_is_high() {
        for width in [768, 1024, 1920, 3840] {
            let profile = derive_profile(DESKTOP_UA, width);
            assert_eq!(profile.quality_tier, QualityTier::High, "width {width}");
            assert_eq!(profile.particle_count, 700);
            assert_eq!(profile.decoration_bar_count, 40);
            assert!(profile.antialias_enabled);
            assert!(profile.pointer_parallax);
        }
    }

    #[test]
    fn test_narrow_viewport_is_low_regardless_of_ua() {
        for width in [0, 320, 767] {
            let profile = derive_profile(DESKTOP_UA, width);
            assert_eq!(profile.quality_tier, QualityTier::Low, "width {width}");
            assert_eq!(profile.particle_count, 300);
            assert_eq!(profile.decoration_bar_count, 20);
            assert!(!profile.antialias_enabled);
        }
    }

    #[test]
    fn test_mobile_ua_is_low_regardless_of_width() {
        assert_eq!(derive_profile(IPHONE_UA, 2048).quality_tier, QualityTier::Low);
        assert_eq!(
            derive_profile("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)", 1280).quality_tier,
            QualityTier::Low
        );
        assert_eq!(
            derive_profile("Mozilla/5.0 (Linux; ANDROID 14)", 1280).quality_tier,
            QualityTier::Low
        );
    }

    #[test]
    fn test_low_tier_counts_strictly_smaller() {
        let low = RenderProfile::low();
        let high = RenderProfile::high();
        assert!(low.particle_count < high.particle_count);
        assert!(low.decoration_bar_count < high.decoration_bar_count);
        assert!(low.particle_size < high.particle_size);
    }

    #[test]
    fn test_pixel_ratio_clamped_for_both_tiers() {
        assert_eq!(RenderProfile::high().with_pixel_ratio(3.0).pixel_ratio, 2.0);
        assert_eq!(RenderProfile::low().with_pixel_ratio(2.625).pixel_ratio, 2.0);
        assert_eq!(RenderProfile::high().with_pixel_ratio(1.25).pixel_ratio, 1.25);
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(QualityTier::Low.label(), "low");
        assert_eq!(QualityTier::High.label(), "high");
    }
}
