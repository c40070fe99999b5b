//! Scroll-triggered enter animations.
//!
//! Elements opt in with `data-animate` (plus optional `data-delay` and
//! `data-duration`). Each one goes through
//! `Unobserved -> Pending -> Playing -> Done`: it becomes pending when it
//! first intersects the viewport, plays once its delay has elapsed, and is
//! done once the animation class has run for its duration. A target that
//! left the document while waiting is dropped without being touched.
//!
//! [`AnimationEngine`] is the bookkeeping; [`Animator`] drives it with
//! timers, either one timer per task ([`DispatchMode::Concurrent`]) or a
//! single FIFO drain loop ([`DispatchMode::Serial`]).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::{AnimationConfig, DispatchMode};
use crate::timing::Sleeper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    FadeIn,
    FadeInUp,
    SlideUp,
    SlideLeft,
    SlideRight,
    ScaleIn,
    RotateIn,
}

impl AnimationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "fadeIn" => Some(AnimationKind::FadeIn),
            "fadeInUp" => Some(AnimationKind::FadeInUp),
            "slideUp" => Some(AnimationKind::SlideUp),
            "slideLeft" => Some(AnimationKind::SlideLeft),
            "slideRight" => Some(AnimationKind::SlideRight),
            "scaleIn" => Some(AnimationKind::ScaleIn),
            "rotateIn" => Some(AnimationKind::RotateIn),
            _ => None,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            AnimationKind::FadeIn => "animate-fade-in",
            AnimationKind::FadeInUp => "animate-fade-in-up",
            AnimationKind::SlideUp => "animate-slide-up",
            AnimationKind::SlideLeft => "animate-slide-left",
            AnimationKind::SlideRight => "animate-slide-right",
            AnimationKind::ScaleIn => "animate-scale-in",
            AnimationKind::RotateIn => "animate-rotate-in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSpec {
    pub kind: AnimationKind,
    pub delay_ms: u32,
    pub duration_ms: u32,
}

impl AnimationSpec {
    /// Reads the raw attribute values. Anything unparseable falls back to the
    /// configured default.
    pub fn from_attributes(
        kind: Option<&str>,
        delay: Option<&str>,
        duration: Option<&str>,
        config: &AnimationConfig,
    ) -> Self {
        let fallback = AnimationKind::parse(&config.default_kind).unwrap_or(AnimationKind::FadeInUp);
        let kind = match kind.map(str::trim).filter(|k| !k.is_empty()) {
            None => fallback,
            Some(raw) => AnimationKind::parse(raw).unwrap_or_else(|| {
                log::warn!("Unknown animation kind {:?}, using default", raw);
                fallback
            }),
        };
        let delay_ms = delay.and_then(|d| d.trim().parse().ok()).unwrap_or(0);
        let duration_ms = duration
            .and_then(|d| d.trim().parse().ok())
            .filter(|d| *d > 0)
            .unwrap_or(config.default_duration_ms);
        Self {
            kind,
            delay_ms,
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unobserved,
    Pending,
    Playing,
    Done,
}

#[derive(Debug, Clone)]
pub struct AnimationTask<T> {
    pub id: TrackId,
    pub target: T,
    pub spec: AnimationSpec,
    /// Reset count of the element when the task was queued.
    pub epoch: u32,
}

struct Tracked<T> {
    id: TrackId,
    target: T,
    spec: AnimationSpec,
    phase: Phase,
    epoch: u32,
}

pub struct AnimationEngine<T> {
    tracked: Vec<Tracked<T>>,
    queue: VecDeque<TrackId>,
    draining: bool,
    paused: bool,
    next_id: u32,
}

impl<T> Default for AnimationEngine<T> {
    fn default() -> Self {
        Self {
            tracked: Vec::new(),
            queue: VecDeque::new(),
            draining: false,
            paused: false,
            next_id: 0,
        }
    }
}

impl<T: Clone> AnimationEngine<T> {
    pub fn track(&mut self, target: T, spec: AnimationSpec) -> TrackId {
        let id = TrackId(self.next_id);
        self.next_id += 1;
        self.tracked.push(Tracked {
            id,
            target,
            spec,
            phase: Phase::Unobserved,
            epoch: 0,
        });
        id
    }

    fn entry(&mut self, id: TrackId) -> Option<&mut Tracked<T>> {
        self.tracked.iter_mut().find(|t| t.id == id)
    }

    pub fn phase(&self, id: TrackId) -> Option<Phase> {
        self.tracked.iter().find(|t| t.id == id).map(|t| t.phase)
    }

    pub fn target(&self, id: TrackId) -> Option<&T> {
        self.tracked.iter().find(|t| t.id == id).map(|t| &t.target)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// First intersection queues the element; later ones are ignored.
    pub fn on_intersect(&mut self, id: TrackId) -> bool {
        match self.entry(id) {
            Some(entry) if entry.phase == Phase::Unobserved => {
                entry.phase = Phase::Pending;
                self.queue.push_back(id);
                true
            }
            _ => false,
        }
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// Claims the drain loop. `false` if one is already running.
    pub fn begin_drain(&mut self) -> bool {
        if self.draining {
            return false;
        }
        self.draining = true;
        true
    }

    pub fn end_drain(&mut self) {
        self.draining = false;
    }

    pub fn pop_task(&mut self) -> Option<AnimationTask<T>> {
        let id = self.queue.pop_front()?;
        self.task(id)
    }

    /// Removes a specific task from the queue (concurrent dispatch).
    pub fn take_task(&mut self, id: TrackId) -> Option<AnimationTask<T>> {
        let pos = self.queue.iter().position(|queued| *queued == id)?;
        self.queue.remove(pos);
        self.task(id)
    }

    fn task(&self, id: TrackId) -> Option<AnimationTask<T>> {
        self.tracked
            .iter()
            .find(|t| t.id == id && t.phase == Phase::Pending)
            .map(|t| AnimationTask {
                id,
                target: t.target.clone(),
                spec: t.spec,
                epoch: t.epoch,
            })
    }

    /// False once the element was reset or forgotten after `epoch`.
    pub fn is_current(&self, id: TrackId, epoch: u32) -> bool {
        self.tracked.iter().any(|t| t.id == id && t.epoch == epoch)
    }

    pub fn mark_playing(&mut self, id: TrackId, epoch: u32) -> bool {
        match self.entry(id) {
            Some(entry) if entry.phase == Phase::Pending && entry.epoch == epoch => {
                entry.phase = Phase::Playing;
                true
            }
            _ => false,
        }
    }

    pub fn mark_done(&mut self, id: TrackId, epoch: u32) -> bool {
        match self.entry(id) {
            Some(entry) if entry.phase == Phase::Playing && entry.epoch == epoch => {
                entry.phase = Phase::Done;
                true
            }
            _ => false,
        }
    }

    /// Forgets an element whose node left the document.
    pub fn drop_target(&mut self, id: TrackId) {
        self.tracked.retain(|t| t.id != id);
        self.queue.retain(|queued| *queued != id);
    }

    /// Layout changed: the element may play again next time it shows up.
    pub fn reset(&mut self, id: TrackId) -> bool {
        self.queue.retain(|queued| *queued != id);
        match self.entry(id) {
            Some(entry) => {
                entry.phase = Phase::Unobserved;
                entry.epoch = entry.epoch.wrapping_add(1);
                true
            }
            None => false,
        }
    }

    /// Drops everything; returns the targets so the caller can unobserve.
    /// A running drain loop keeps its claim until it notices the empty queue.
    pub fn clear(&mut self) -> Vec<T> {
        self.queue.clear();
        self.tracked.drain(..).map(|t| t.target).collect()
    }

    pub fn set_paused(&mut self, paused: bool) -> bool {
        let changed = self.paused != paused;
        self.paused = paused;
        changed
    }
}

/// DOM side of the animations.
pub trait AnimationSink<T> {
    /// Whether the target is still attached to the document.
    fn is_live(&self, target: &T) -> bool;
    /// Adds the animation class, the duration variable and `data-animated`.
    fn apply(&self, target: &T, class: &'static str, duration_ms: u32);
    /// Swaps the animation class for `animation-complete`.
    fn complete(&self, target: &T, class: &'static str);
    fn unobserve(&self, target: &T);
    /// Strips animation state and observes the target again.
    fn reset(&self, target: &T);
    fn set_play_state(&self, running: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Played,
    Skipped,
}

pub type Spawner = Box<dyn Fn(LocalBoxFuture<'static, ()>)>;

pub struct Animator<T, K, S> {
    engine: RefCell<AnimationEngine<T>>,
    sink: K,
    sleeper: S,
    mode: DispatchMode,
    spawn: Spawner,
}

impl<T, K, S> Animator<T, K, S>
where
    T: Clone + 'static,
    K: AnimationSink<T> + 'static,
    S: Sleeper + 'static,
{
    pub fn new(sink: K, sleeper: S, mode: DispatchMode, spawn: Spawner) -> Rc<Self> {
        Rc::new(Self {
            engine: RefCell::new(AnimationEngine::default()),
            sink,
            sleeper,
            mode,
            spawn,
        })
    }

    pub fn track(&self, target: T, spec: AnimationSpec) -> TrackId {
        self.engine.borrow_mut().track(target, spec)
    }

    pub fn phase(&self, id: TrackId) -> Option<Phase> {
        self.engine.borrow().phase(id)
    }

    pub fn pending_len(&self) -> usize {
        self.engine.borrow().pending_len()
    }

    pub fn is_draining(&self) -> bool {
        self.engine.borrow().is_draining()
    }

    pub fn intersected(self: &Rc<Self>, id: TrackId) {
        if !self.engine.borrow_mut().on_intersect(id) {
            return;
        }
        match self.mode {
            DispatchMode::Concurrent => {
                let this = Rc::clone(self);
                (self.spawn)(Box::pin(async move {
                    let task = this.engine.borrow_mut().take_task(id);
                    if let Some(task) = task {
                        this.run_task(task).await;
                    }
                }));
            }
            DispatchMode::Serial => {
                if !self.engine.borrow_mut().begin_drain() {
                    return;
                }
                let this = Rc::clone(self);
                (self.spawn)(Box::pin(async move {
                    this.drain_claimed().await;
                }));
            }
        }
    }

    /// Runs queued tasks one after another until the queue is empty.
    /// Returns how many tasks were taken; 0 when another drain is running.
    pub async fn drain(self: Rc<Self>) -> usize {
        if !self.engine.borrow_mut().begin_drain() {
            return 0;
        }
        self.drain_claimed().await
    }

    async fn drain_claimed(self: Rc<Self>) -> usize {
        let mut taken = 0;
        loop {
            let task = self.engine.borrow_mut().pop_task();
            let Some(task) = task else { break };
            taken += 1;
            Rc::clone(&self).run_task(task).await;
        }
        self.engine.borrow_mut().end_drain();
        taken
    }

    async fn run_task(self: Rc<Self>, task: AnimationTask<T>) -> TaskOutcome {
        if task.spec.delay_ms > 0 {
            self.sleeper.sleep(task.spec.delay_ms).await;
        }
        if !self.engine.borrow().is_current(task.id, task.epoch) {
            log::debug!("Animation reset while waiting, leaving it to the new run");
            return TaskOutcome::Skipped;
        }
        // the page kept running while we waited
        if !self.sink.is_live(&task.target) {
            log::debug!("Animation target left the document, skipping");
            self.engine.borrow_mut().drop_target(task.id);
            return TaskOutcome::Skipped;
        }
        if !self.engine.borrow_mut().mark_playing(task.id, task.epoch) {
            return TaskOutcome::Skipped;
        }

        let class = task.spec.kind.class();
        self.sink.apply(&task.target, class, task.spec.duration_ms);
        self.sink.unobserve(&task.target);

        let this = Rc::clone(&self);
        (self.spawn)(Box::pin(async move {
            this.sleeper.sleep(task.spec.duration_ms).await;
            let done = this.engine.borrow_mut().mark_done(task.id, task.epoch);
            if done && this.sink.is_live(&task.target) {
                this.sink.complete(&task.target, class);
            }
        }));
        TaskOutcome::Played
    }

    pub fn reset(&self, id: TrackId) {
        let target = {
            let mut engine = self.engine.borrow_mut();
            if !engine.reset(id) {
                return;
            }
            engine.target(id).cloned()
        };
        if let Some(target) = target {
            self.sink.reset(&target);
        }
    }

    /// Forgets every tracked element (before a rescan or on teardown).
    pub fn clear(&self) {
        let targets = self.engine.borrow_mut().clear();
        for target in &targets {
            self.sink.unobserve(target);
        }
    }

    pub fn pause(&self) {
        if self.engine.borrow_mut().set_paused(true) {
            self.sink.set_play_state(false);
        }
    }

    pub fn resume(&self) {
        if self.engine.borrow_mut().set_paused(false) {
            self.sink.set_play_state(true);
        }
    }
}
