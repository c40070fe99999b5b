//! Light/dark theme resolution and persistence.

use crate::config::ThemeConfig;
use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Only the two exact stored spellings are accepted.
    pub fn parse(raw: &str) -> Option<Theme> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// Durable key-value slot for the theme preference (localStorage in the
/// browser).
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stored preference first, then whatever the document already carries
/// (the pre-init script may have set it), then the OS preference.
pub fn resolve_initial(stored: Option<&str>, ambient_dark: bool, system_dark: bool) -> Theme {
    if let Some(theme) = stored.and_then(Theme::parse) {
        return theme;
    }
    if ambient_dark || system_dark {
        Theme::Dark
    } else {
        Theme::Light
    }
}

/// What the DOM layer has to do after a theme change.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeApply {
    pub theme: Theme,
    pub add_class: &'static str,
    pub remove_class: &'static str,
    pub meta_color: String,
    pub color_scheme: &'static str,
    pub play_sunset: bool,
    pub toggle_label: &'static str,
    pub toggle_pressed: bool,
}

pub struct ThemeController<S: PreferenceStore> {
    store: S,
    config: ThemeConfig,
    theme: Theme,
    persistent: bool,
    explicit: bool,
}

impl<S: PreferenceStore> ThemeController<S> {
    pub fn init(store: S, config: ThemeConfig, ambient_dark: bool, system_dark: bool) -> Self {
        let (stored, persistent) = match store.load(&config.storage_key) {
            Ok(value) => (value, true),
            Err(e) => {
                log::warn!("Theme preference unavailable, keeping it in memory: {}", e);
                (None, false)
            }
        };
        let explicit = stored.as_deref().and_then(Theme::parse).is_some();
        let theme = resolve_initial(stored.as_deref(), ambient_dark, system_dark);
        log::debug!("Initial theme resolved to {}", theme.as_str());

        Self {
            store,
            config,
            theme,
            persistent,
            explicit,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn has_explicit_preference(&self) -> bool {
        self.explicit
    }

    /// Effect for the current theme without changing anything (initial paint).
    pub fn current(&self) -> ThemeApply {
        self.describe(self.theme, false)
    }

    pub fn set_theme(&mut self, theme: Theme) -> ThemeApply {
        let play_sunset = self.theme == Theme::Light && theme == Theme::Dark;
        self.theme = theme;
        self.explicit = true;
        self.persist(theme);
        self.describe(theme, play_sunset)
    }

    pub fn toggle(&mut self) -> ThemeApply {
        self.set_theme(self.theme.toggled())
    }

    /// OS preference flipped. Ignored once the user picked a theme.
    pub fn on_system_change(&mut self, system_dark: bool) -> Option<ThemeApply> {
        if self.explicit {
            return None;
        }
        let theme = if system_dark { Theme::Dark } else { Theme::Light };
        if theme == self.theme {
            return None;
        }
        self.theme = theme;
        Some(self.describe(theme, false))
    }

    pub fn reset_to_system(&mut self, system_dark: bool) -> ThemeApply {
        if self.persistent {
            if let Err(e) = self.store.remove(&self.config.storage_key) {
                log::warn!("Failed to clear theme preference: {}", e);
                self.persistent = false;
            }
        }
        self.explicit = false;
        self.theme = if system_dark { Theme::Dark } else { Theme::Light };
        self.describe(self.theme, false)
    }

    fn persist(&mut self, theme: Theme) {
        if !self.persistent {
            return;
        }
        if let Err(e) = self.store.save(&self.config.storage_key, theme.as_str()) {
            log::warn!("Theme preference not saved, falling back to memory: {}", e);
            self.persistent = false;
        }
    }

    fn describe(&self, theme: Theme, play_sunset: bool) -> ThemeApply {
        let (add_class, remove_class, meta_color) = match theme {
            Theme::Dark => ("dark", "light", self.config.dark_meta_color.clone()),
            Theme::Light => ("light", "dark", self.config.light_meta_color.clone()),
        };
        ThemeApply {
            theme,
            add_class,
            remove_class,
            meta_color,
            color_scheme: theme.as_str(),
            play_sunset,
            toggle_label: match theme {
                Theme::Dark => "Switch to light theme",
                Theme::Light => "Switch to dark theme",
            },
            toggle_pressed: theme.is_dark(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn config() -> ThemeConfig {
        ThemeConfig::default()
    }

    #[test]
    fn stored_preference_wins_over_everything() {
        assert_eq!(resolve_initial(Some("dark"), false, false), Theme::Dark);
        assert_eq!(resolve_initial(Some("light"), true, true), Theme::Light);
    }

    #[test]
    fn garbage_in_storage_is_ignored() {
        assert_eq!(resolve_initial(Some("purple"), false, true), Theme::Dark);
        assert_eq!(resolve_initial(Some("DARK"), false, false), Theme::Light);
    }

    #[test]
    fn ambient_marker_beats_system_light() {
        assert_eq!(resolve_initial(None, true, false), Theme::Dark);
        assert_eq!(resolve_initial(None, false, false), Theme::Light);
    }

    #[test]
    fn persisted_dark_survives_reload_without_system_override() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_load()
            .with(eq("kingspeech-theme"))
            .returning(|_| Ok(Some("dark".to_string())));

        let controller = ThemeController::init(store, config(), false, false);
        assert_eq!(controller.theme(), Theme::Dark);
        assert!(controller.has_explicit_preference());
    }

    #[test]
    fn toggle_persists_and_plays_sunset_only_towards_dark() {
        let mut store = MockPreferenceStore::new();
        store.expect_load().returning(|_| Ok(None));
        store
            .expect_save()
            .with(eq("kingspeech-theme"), eq("dark"))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_save()
            .with(eq("kingspeech-theme"), eq("light"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut controller = ThemeController::init(store, config(), false, false);
        let to_dark = controller.toggle();
        assert_eq!(to_dark.theme, Theme::Dark);
        assert!(to_dark.play_sunset);
        assert_eq!(to_dark.meta_color, "#0F172A");
        assert_eq!(to_dark.add_class, "dark");

        let to_light = controller.toggle();
        assert_eq!(to_light.theme, Theme::Light);
        assert!(!to_light.play_sunset);
        assert_eq!(to_light.meta_color, "#FFFFFF");
        assert!(!to_light.toggle_pressed);
    }

    #[test]
    fn unavailable_storage_falls_back_to_memory() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_load()
            .returning(|_| Err(StorageError::Unavailable));
        store.expect_save().never();

        let mut controller = ThemeController::init(store, config(), false, true);
        assert!(!controller.is_persistent());
        assert_eq!(controller.theme(), Theme::Dark);
        assert_eq!(controller.toggle().theme, Theme::Light);
    }

    #[test]
    fn failed_write_switches_to_memory_once() {
        let mut store = MockPreferenceStore::new();
        store.expect_load().returning(|_| Ok(None));
        store
            .expect_save()
            .times(1)
            .returning(|_, _| Err(StorageError::WriteRejected("quota".into())));

        let mut controller = ThemeController::init(store, config(), false, false);
        controller.toggle();
        controller.toggle();
        assert!(!controller.is_persistent());
        assert_eq!(controller.theme(), Theme::Light);
    }

    #[test]
    fn system_change_only_applies_without_explicit_choice() {
        let mut store = MockPreferenceStore::new();
        store.expect_load().returning(|_| Ok(None));
        store.expect_save().returning(|_, _| Ok(()));

        let mut controller = ThemeController::init(store, config(), false, false);
        let applied = controller.on_system_change(true).unwrap();
        assert_eq!(applied.theme, Theme::Dark);
        assert!(controller.on_system_change(true).is_none());

        controller.set_theme(Theme::Light);
        assert!(controller.on_system_change(true).is_none());
        assert_eq!(controller.theme(), Theme::Light);
    }

    #[test]
    fn reset_to_system_forgets_the_choice() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_load()
            .returning(|_| Ok(Some("light".to_string())));
        store
            .expect_remove()
            .with(eq("kingspeech-theme"))
            .times(1)
            .returning(|_| Ok(()));

        let mut controller = ThemeController::init(store, config(), false, true);
        assert_eq!(controller.theme(), Theme::Light);
        let applied = controller.reset_to_system(true);
        assert_eq!(applied.theme, Theme::Dark);
        assert!(!controller.has_explicit_preference());
        assert!(controller.on_system_change(false).is_some());
    }
}
