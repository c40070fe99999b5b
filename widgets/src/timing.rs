use std::future::Future;

use futures::future::{self, Either, LocalBoxFuture};

/// Source of timer futures. The browser build uses `gloo-timers`; tests use
/// futures that resolve immediately.
pub trait Sleeper {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()>;
}

/// Races `fut` against a timer. `None` means the timer won and `fut` was
/// dropped.
pub async fn timeout<S, F>(sleeper: &S, ms: u32, fut: F) -> Option<F::Output>
where
    S: Sleeper + ?Sized,
    F: Future,
{
    let fut = std::pin::pin!(fut);
    match future::select(fut, sleeper.sleep(ms)).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

/// Generation counter behind trailing-edge debouncing: each event bumps the
/// generation and only the timer armed by the latest event fires.
#[derive(Debug, Default)]
pub struct Debouncer {
    generation: u64,
}

impl Debouncer {
    pub fn arm(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures::future::{self, FutureExt, LocalBoxFuture};

    use super::Sleeper;

    /// Resolves every sleep at once, recording the requested durations and
    /// running an optional hook first (to mutate the world "during" a wait).
    #[derive(Clone, Default)]
    pub struct InstantSleeper {
        pub slept: Rc<RefCell<Vec<u32>>>,
        hook: Rc<RefCell<Option<Box<dyn FnMut(u32)>>>>,
    }

    impl InstantSleeper {
        pub fn on_sleep(&self, hook: impl FnMut(u32) + 'static) {
            *self.hook.borrow_mut() = Some(Box::new(hook));
        }
    }

    impl Sleeper for InstantSleeper {
        fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
            self.slept.borrow_mut().push(ms);
            if let Some(hook) = self.hook.borrow_mut().as_mut() {
                hook(ms);
            }
            future::ready(()).boxed_local()
        }
    }

    /// Never resolves.
    pub struct StuckSleeper;

    impl Sleeper for StuckSleeper {
        fn sleep(&self, _ms: u32) -> LocalBoxFuture<'static, ()> {
            future::pending().boxed_local()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{InstantSleeper, StuckSleeper};
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn ready_future_beats_stuck_timer() {
        assert_eq!(block_on(timeout(&StuckSleeper, 10, async { 7 })), Some(7));
    }

    #[test]
    fn pending_future_loses_to_timer() {
        let sleeper = InstantSleeper::default();
        let out = block_on(timeout(&sleeper, 10_000, future::pending::<u8>()));
        assert_eq!(out, None);
        assert_eq!(*sleeper.slept.borrow(), vec![10_000]);
    }

    #[test]
    fn only_latest_debounce_generation_fires() {
        let mut debouncer = Debouncer::default();
        let first = debouncer.arm();
        let second = debouncer.arm();
        assert!(!debouncer.is_current(first));
        assert!(debouncer.is_current(second));
    }
}
