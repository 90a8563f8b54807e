//! What the page's section UI should look like for the active section.
//!
//! The browser host reads each nav item's `data-target` and each panel's id,
//! asks these functions for the element's state and applies it.

/// Class toggled on the active nav item and panel.
pub const ACTIVE_CLASS: &str = "active";

/// State of one nav item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItemState {
    pub active: bool,
}

impl NavItemState {
    /// `aria-current` value; `None` means the attribute is removed.
    pub fn aria_current(&self) -> Option<&'static str> {
        self.active.then_some("page")
    }
}

/// State of one section panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelState {
    pub active: bool,
}

impl PanelState {
    pub fn aria_hidden(&self) -> &'static str {
        if self.active {
            "false"
        } else {
            "true"
        }
    }
}

/// A nav item is active when its `data-target` names the section.
pub fn nav_item_state(section: &str, data_target: Option<&str>) -> NavItemState {
    NavItemState {
        active: !section.is_empty() && data_target == Some(section),
    }
}

/// A panel is active when its id is the section.
pub fn panel_state(section: &str, panel_id: &str) -> PanelState {
    PanelState {
        active: !section.is_empty() && panel_id == section,
    }
}

/// Keys that activate a focused nav item.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Parameters of the analytics `page_view` event.
pub fn page_view_fields(section: &str, location: &str) -> [(&'static str, String); 3] {
    [
        ("page_title", section.to_string()),
        ("page_location", location.to_string()),
        ("page_path", format!("/#{section}")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_nav_item_is_current_page() {
        let state = nav_item_state("about", Some("about"));
        assert!(state.active);
        assert_eq!(state.aria_current(), Some("page"));
    }

    #[test]
    fn test_other_nav_items_lose_active_and_aria_current() {
        let targets = [Some("home"), Some("about"), Some("contact")];
        let states: Vec<_> = targets
            .iter()
            .map(|target| nav_item_state("contact", *target))
            .collect();
        assert_eq!(
            states.iter().map(|s| s.active).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert_eq!(states[0].aria_current(), None);
        assert_eq!(states[1].aria_current(), None);
    }

    #[test]
    fn test_nav_item_without_data_target_is_never_active() {
        assert!(!nav_item_state("home", None).active);
        assert!(!nav_item_state("", None).active);
    }

    #[test]
    fn test_unknown_section_clears_everything() {
        for target in ["home", "about", "resume"] {
            assert!(!nav_item_state("blog", Some(target)).active);
            assert_eq!(panel_state("blog", target).aria_hidden(), "true");
        }
    }

    #[test]
    fn test_unknown_section_with_matching_markup_is_still_marked() {
        assert!(nav_item_state("blog", Some("blog")).active);
        assert!(panel_state("blog", "blog").active);
    }

    #[test]
    fn test_panels_hidden_unless_matching() {
        assert_eq!(panel_state("resume", "resume").aria_hidden(), "false");
        assert_eq!(panel_state("resume", "about").aria_hidden(), "true");
        assert!(!panel_state("", "").active);
    }

    #[test]
    fn test_activation_keys() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(!is_activation_key("Tab"));
        assert!(!is_activation_key("Escape"));
        assert!(!is_activation_key("enter"));
    }

    #[test]
    fn test_page_view_fields() {
        let fields = page_view_fields("services", "https://example.com/#services");
        assert_eq!(
            fields,
            [
                ("page_title", "services".to_string()),
                ("page_location", "https://example.com/#services".to_string()),
                ("page_path", "/#services".to_string()),
            ]
        );
    }
}
