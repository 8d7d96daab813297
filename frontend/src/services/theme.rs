use gloo::storage::{LocalStorage, Storage};
use gloo::utils::{document, window};

/// Local storage key holding the chosen theme
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Theme> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Toggle button face: shows where a click takes you
    pub fn toggle_icon(&self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }

    pub fn toggle_title(&self) -> &'static str {
        match self {
            Theme::Dark => "Switch to light mode",
            Theme::Light => "Switch to dark mode",
        }
    }
}

/// Saved choice first, then the system color-scheme preference
pub fn current_theme() -> Theme {
    stored_theme().unwrap_or_else(|| {
        if prefers_dark() {
            Theme::Dark
        } else {
            Theme::Light
        }
    })
}

pub fn stored_theme() -> Option<Theme> {
    let value = LocalStorage::raw().get_item(THEME_KEY).ok().flatten()?;
    Theme::parse(&value)
}

fn prefers_dark() -> bool {
    window()
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

/// Set `data-theme` on the document element and persist the choice
pub fn apply_theme(theme: Theme) {
    if let Some(root) = document().document_element() {
        if root.set_attribute("data-theme", theme.as_str()).is_err() {
            log::warn!(target: "theme", "could not set data-theme");
        }
    }
    if LocalStorage::raw().set_item(THEME_KEY, theme.as_str()).is_err() {
        log::warn!(target: "theme", "could not persist theme");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_toggle() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggle_icon(), "🌙");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_applied_theme_is_persisted_and_reapplied() {
        apply_theme(Theme::Dark);
        assert_eq!(stored_theme(), Some(Theme::Dark));
        assert_eq!(current_theme(), Theme::Dark);

        let root = document().document_element().unwrap();
        assert_eq!(root.get_attribute("data-theme").as_deref(), Some("dark"));
    }
}
