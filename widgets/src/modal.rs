//! The shared testimonial dialog.

use crate::context::{PageContext, ScrollLockGuard};

pub struct Modal {
    len: usize,
    current: Option<usize>,
    lock: Option<ScrollLockGuard>,
}

impl Modal {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            current: None,
            lock: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock.is_some()
    }

    /// Index of the testimonial last shown, kept after closing.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn normalize(&self, index: isize) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        Some(index.rem_euclid(self.len as isize) as usize)
    }

    /// Shows testimonial `index` modulo the card count. Reopening while open
    /// only swaps the content.
    pub fn open_at(&mut self, index: isize, ctx: &PageContext) -> Option<usize> {
        let index = self.normalize(index)?;
        self.current = Some(index);
        if self.lock.is_none() {
            self.lock = Some(ctx.acquire_scroll_lock());
        }
        log::debug!("Testimonial modal showing card {}", index + 1);
        Some(index)
    }

    pub fn navigate(&mut self, delta: isize, ctx: &PageContext) -> Option<usize> {
        let step = self.normalize(delta)?;
        let from = self.current.unwrap_or(0);
        self.open_at(((from + step) % self.len) as isize, ctx)
    }

    pub fn close(&mut self) -> bool {
        self.lock.take().is_some()
    }

    /// Escape closes; other keys are ignored.
    pub fn key(&mut self, key: &str) -> bool {
        key == "Escape" && self.close()
    }

    pub fn backdrop_click(&mut self) -> bool {
        self.close()
    }
}

/// Where Tab should land to keep focus inside the dialog. `current` is the
/// position of the focused element among the `focusable` ones, `None` when
/// focus sits elsewhere (the dialog itself). `None` means the browser's own
/// move is already fine.
pub fn focus_trap_target(focusable: usize, current: Option<usize>, backwards: bool) -> Option<usize> {
    let last = focusable.checked_sub(1)?;
    match (current, backwards) {
        (None, false) => Some(0),
        (None, true) | (Some(0), true) => Some(last),
        (Some(i), false) if i >= last => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    #[test]
    fn open_at_normalizes_any_index() {
        let ctx = PageContext::new(Theme::Light);
        let mut modal = Modal::new(5);
        for i in -23isize..23 {
            let expected = (((i % 5) + 5) % 5) as usize;
            assert_eq!(modal.open_at(i, &ctx), Some(expected));
        }
        assert_eq!(modal.open_at(isize::MIN, &ctx), Some(isize::MIN.rem_euclid(5) as usize));
    }

    #[test]
    fn empty_modal_stays_closed() {
        let ctx = PageContext::new(Theme::Light);
        let mut modal = Modal::new(0);
        assert_eq!(modal.open_at(3, &ctx), None);
        assert!(!modal.is_open());
        assert!(!ctx.is_scroll_locked());
    }

    #[test]
    fn navigate_keeps_dialog_open_and_lock_single() {
        let ctx = PageContext::new(Theme::Light);
        let mut modal = Modal::new(3);
        modal.open_at(0, &ctx);
        assert_eq!(modal.navigate(-1, &ctx), Some(2));
        assert_eq!(modal.navigate(1, &ctx), Some(0));
        assert!(modal.is_open());
        assert_eq!(ctx.scroll_lock_holders(), 1);
    }

    #[test]
    fn navigate_wraps_extreme_deltas() {
        let ctx = PageContext::new(Theme::Light);
        let mut modal = Modal::new(4);
        modal.open_at(2, &ctx);
        let forward = (2 + isize::MAX.rem_euclid(4) as usize) % 4;
        assert_eq!(modal.navigate(isize::MAX, &ctx), Some(forward));
        let back = (forward + isize::MIN.rem_euclid(4) as usize) % 4;
        assert_eq!(modal.navigate(isize::MIN, &ctx), Some(back));
        assert_eq!(Modal::new(0).navigate(isize::MAX, &ctx), None);
    }

    #[test]
    fn tab_cycles_inside_the_dialog() {
        // close, previous, next
        assert_eq!(focus_trap_target(3, Some(2), false), Some(0));
        assert_eq!(focus_trap_target(3, Some(0), true), Some(2));
        assert_eq!(focus_trap_target(3, Some(1), false), None);
        assert_eq!(focus_trap_target(3, Some(1), true), None);
        assert_eq!(focus_trap_target(3, None, false), Some(0));
        assert_eq!(focus_trap_target(3, None, true), Some(2));
        assert_eq!(focus_trap_target(1, Some(0), false), Some(0));
        assert_eq!(focus_trap_target(0, None, false), None);
    }

    #[test]
    fn escape_and_backdrop_close() {
        let ctx = PageContext::new(Theme::Light);
        let mut modal = Modal::new(3);

        modal.open_at(1, &ctx);
        assert!(!modal.key("Enter"));
        assert!(modal.key("Escape"));
        assert!(!ctx.is_scroll_locked());
        assert!(!modal.key("Escape"), "already closed");

        modal.open_at(1, &ctx);
        assert!(modal.backdrop_click());
        assert!(!modal.is_open());
        assert_eq!(modal.current(), Some(1));
    }

    #[test]
    fn closing_modal_keeps_menu_lock() {
        let ctx = PageContext::new(Theme::Light);
        let menu_lock = ctx.acquire_scroll_lock();
        let mut modal = Modal::new(2);
        modal.open_at(0, &ctx);
        modal.close();
        assert!(ctx.is_scroll_locked());
        drop(menu_lock);
        assert!(!ctx.is_scroll_locked());
    }
}
