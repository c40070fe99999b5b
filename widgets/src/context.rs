//! Page-wide state shared by the controllers.
//!
//! Overlays (the testimonial modal, the mobile menu) both need the page to
//! stop scrolling. Instead of each one writing `overflow` on `<body>` they
//! hold a [`ScrollLockGuard`]; the page stays locked while any guard is
//! alive.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::theme::Theme;

type LockListener = Box<dyn Fn(bool)>;

struct ScrollLockState {
    holders: Cell<usize>,
    listener: RefCell<Option<LockListener>>,
}

impl ScrollLockState {
    fn notify(&self, locked: bool) {
        if let Some(listener) = self.listener.borrow().as_ref() {
            listener(locked);
        }
    }
}

pub struct PageContext {
    scroll_lock: Rc<ScrollLockState>,
    theme: Cell<Theme>,
}

impl PageContext {
    pub fn new(theme: Theme) -> Self {
        Self {
            scroll_lock: Rc::new(ScrollLockState {
                holders: Cell::new(0),
                listener: RefCell::new(None),
            }),
            theme: Cell::new(theme),
        }
    }

    /// Called with `true` when the first guard is taken and `false` when the
    /// last one is dropped.
    pub fn on_scroll_lock_change(&self, listener: impl Fn(bool) + 'static) {
        *self.scroll_lock.listener.borrow_mut() = Some(Box::new(listener));
    }

    pub fn acquire_scroll_lock(&self) -> ScrollLockGuard {
        let holders = self.scroll_lock.holders.get() + 1;
        self.scroll_lock.holders.set(holders);
        if holders == 1 {
            log::debug!("Scroll lock engaged");
            self.scroll_lock.notify(true);
        }
        ScrollLockGuard {
            state: Rc::clone(&self.scroll_lock),
        }
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.holders.get() > 0
    }

    pub fn scroll_lock_holders(&self) -> usize {
        self.scroll_lock.holders.get()
    }

    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    pub fn publish_theme(&self, theme: Theme) {
        self.theme.set(theme);
    }
}

impl PartialEq for PageContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.scroll_lock, &other.scroll_lock)
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("scroll_lock_holders", &self.scroll_lock.holders.get())
            .field("theme", &self.theme.get())
            .finish()
    }
}

/// Keeps the page scroll-locked until dropped.
#[must_use = "the scroll lock is released as soon as the guard is dropped"]
pub struct ScrollLockGuard {
    state: Rc<ScrollLockState>,
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let holders = self.state.holders.get().saturating_sub(1);
        self.state.holders.set(holders);
        if holders == 0 {
            log::debug!("Scroll lock released");
            self.state.notify(false);
        }
    }
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLockGuard")
            .field("holders", &self.state.holders.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_context() -> (PageContext, Rc<RefCell<Vec<bool>>>) {
        let ctx = PageContext::new(Theme::Light);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ctx.on_scroll_lock_change(move |locked| sink.borrow_mut().push(locked));
        (ctx, seen)
    }

    #[test]
    fn lock_stays_until_last_holder_releases() {
        let (ctx, seen) = recording_context();

        let modal = ctx.acquire_scroll_lock();
        let menu = ctx.acquire_scroll_lock();
        assert_eq!(ctx.scroll_lock_holders(), 2);

        drop(modal);
        assert!(ctx.is_scroll_locked(), "menu still needs the lock");

        drop(menu);
        assert!(!ctx.is_scroll_locked());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn listener_only_fires_on_edges() {
        let (ctx, seen) = recording_context();
        for _ in 0..3 {
            let a = ctx.acquire_scroll_lock();
            let b = ctx.acquire_scroll_lock();
            drop(b);
            drop(a);
        }
        assert_eq!(*seen.borrow(), vec![true, false, true, false, true, false]);
    }

    #[test]
    fn theme_is_published() {
        let ctx = PageContext::new(Theme::Light);
        ctx.publish_theme(Theme::Dark);
        assert_eq!(ctx.theme(), Theme::Dark);
    }
}
