use folio_web::{derive_profile, RenderProfile};

pub fn run(user_agent: &str, width: u32, pixel_ratio: f64) -> anyhow::Result<()> {
    let profile = derive_profile(user_agent, width).with_pixel_ratio(pixel_ratio);
    print!("{}", describe(&profile));
    Ok(())
}

pub fn describe(profile: &RenderProfile) -> String {
    format!(
        "tier:          {}\n\
         particles:     {}\n\
         bars:          {}\n\
         antialias:     {}\n\
         pixel ratio:   {}\n\
         particle size: {}\n\
         parallax:      {}\n",
        profile.quality_tier.label(),
        profile.particle_count,
        profile.decoration_bar_count,
        on_off(profile.antialias_enabled),
        profile.pixel_ratio,
        profile.particle_size,
        on_off(profile.pointer_parallax),
    )
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_high_profile() {
        let text = describe(&RenderProfile::high().with_pixel_ratio(3.0));
        assert!(text.contains("tier:          high"));
        assert!(text.contains("particles:     700"));
        assert!(text.contains("antialias:     on"));
        assert!(text.contains("pixel ratio:   2"));
    }

    #[test]
    fn test_describe_low_profile() {
        let text = describe(&derive_profile("Mozilla/5.0 (iPad; CPU OS 17_0)", 1024));
        assert!(text.contains("tier:          low"));
        assert!(text.contains("bars:          20"));
        assert!(text.contains("parallax:      off"));
    }
}
