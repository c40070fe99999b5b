//! Mobile menu and active-section tracking.

use crate::config::NavigationConfig;
use crate::context::{PageContext, ScrollLockGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    FirstLink,
    Toggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuChange {
    pub open: bool,
    pub toggle_label: &'static str,
    pub focus: FocusTarget,
    pub announcement: &'static str,
}

pub struct Navigation {
    config: NavigationConfig,
    menu_lock: Option<ScrollLockGuard>,
    current_section: Option<String>,
}

impl Navigation {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            menu_lock: None,
            current_section: None,
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_lock.is_some()
    }

    pub fn open_menu(&mut self, ctx: &PageContext) -> Option<MenuChange> {
        if self.menu_lock.is_some() {
            return None;
        }
        self.menu_lock = Some(ctx.acquire_scroll_lock());
        Some(MenuChange {
            open: true,
            toggle_label: "Close menu",
            focus: FocusTarget::FirstLink,
            announcement: "Menu opened",
        })
    }

    pub fn close_menu(&mut self) -> Option<MenuChange> {
        drop(self.menu_lock.take()?);
        Some(MenuChange {
            open: false,
            toggle_label: "Open menu",
            focus: FocusTarget::Toggle,
            announcement: "Menu closed",
        })
    }

    pub fn toggle_menu(&mut self, ctx: &PageContext) -> Option<MenuChange> {
        if self.is_menu_open() {
            self.close_menu()
        } else {
            self.open_menu(ctx)
        }
    }

    /// Click anywhere on the page. `inside` is true when it landed in the
    /// menu or on its toggle button.
    pub fn on_outside_click(&mut self, inside: bool) -> Option<MenuChange> {
        if inside {
            return None;
        }
        self.close_menu()
    }

    pub fn on_escape(&mut self) -> Option<MenuChange> {
        self.close_menu()
    }

    pub fn on_resize(&mut self, width: f64) -> Option<MenuChange> {
        if width > self.config.mobile_breakpoint_px {
            self.close_menu()
        } else {
            None
        }
    }

    pub fn on_section_intersect(&mut self, id: &str) -> bool {
        if self.current_section.as_deref() == Some(id) {
            return false;
        }
        self.current_section = Some(id.to_string());
        true
    }

    pub fn current_section(&self) -> Option<&str> {
        self.current_section.as_deref()
    }

    pub fn is_link_active(&self, href: &str) -> bool {
        match (&self.current_section, href.strip_prefix('#')) {
            (Some(current), Some(id)) => current == id,
            _ => false,
        }
    }

    /// Y coordinate to scroll to so the section clears the fixed header.
    pub fn scroll_target(&self, section_top: f64, header_height: f64) -> f64 {
        (section_top - header_height - self.config.scroll_offset_px).max(0.0)
    }
}

/// Section id from an in-page link, `None` for external or bare `#` links.
pub fn fragment_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}
