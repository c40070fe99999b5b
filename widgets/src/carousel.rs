//! Testimonial carousel: a cyclic slide index with a transition cool-down
//! and an autoplay timer that can be paused for several reasons at once.

use crate::config::CarouselConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    Empty,
    OutOfRange,
    Transitioning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideChange {
    pub previous: usize,
    pub current: usize,
    /// Screen reader text, completed by the DOM layer with the slide quote.
    pub announcement: String,
    pub cooldown_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayCommand {
    Start { interval_ms: u32 },
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    Hover,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
}

impl Key {
    pub fn from_key_name(name: &str) -> Option<Key> {
        match name {
            "ArrowLeft" => Some(Key::ArrowLeft),
            "ArrowRight" => Some(Key::ArrowRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

pub struct Carousel {
    len: usize,
    current: usize,
    transitioning: bool,
    autoplay_running: bool,
    paused_hover: bool,
    paused_hidden: bool,
    config: CarouselConfig,
}

impl Carousel {
    pub fn new(len: usize, config: CarouselConfig) -> Self {
        Self {
            len,
            current: 0,
            transitioning: false,
            autoplay_running: false,
            paused_hover: false,
            paused_hidden: false,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn autoplay_active(&self) -> bool {
        self.autoplay_running
    }

    pub fn indicator_active(&self, index: usize) -> bool {
        !self.is_empty() && index == self.current
    }

    pub fn go_to(&mut self, index: usize) -> Result<SlideChange, Rejected> {
        if self.is_empty() {
            return Err(Rejected::Empty);
        }
        if index >= self.len {
            return Err(Rejected::OutOfRange);
        }
        if self.transitioning {
            log::debug!("Carousel busy, dropping move to slide {}", index);
            return Err(Rejected::Transitioning);
        }

        let previous = self.current;
        self.current = index;
        self.transitioning = true;
        Ok(SlideChange {
            previous,
            current: index,
            announcement: format!("Slide {} of {}.", index + 1, self.len),
            cooldown_ms: self.config.cooldown_ms,
        })
    }

    /// Called by the cool-down timer scheduled after a successful `go_to`.
    pub fn finish_transition(&mut self) {
        self.transitioning = false;
    }

    pub fn next(&mut self) -> Result<SlideChange, Rejected> {
        if self.is_empty() {
            return Err(Rejected::Empty);
        }
        self.go_to((self.current + 1) % self.len)
    }

    pub fn previous(&mut self) -> Result<SlideChange, Rejected> {
        if self.is_empty() {
            return Err(Rejected::Empty);
        }
        self.go_to((self.current + self.len - 1) % self.len)
    }

    pub fn key(&mut self, key: Key) -> Result<SlideChange, Rejected> {
        match key {
            Key::ArrowLeft => self.previous(),
            Key::ArrowRight => self.next(),
        }
    }

    /// A swipe counts when it travels far enough sideways and mostly
    /// sideways; vertical scroll gestures are left alone.
    pub fn swipe(&mut self, start: TouchPoint, end: TouchPoint) -> Option<Result<SlideChange, Rejected>> {
        let dx = start.x - end.x;
        let dy = start.y - end.y;
        if dx.abs() <= self.config.swipe_threshold_px || dx.abs() <= dy.abs() {
            return None;
        }
        Some(if dx > 0.0 { self.next() } else { self.previous() })
    }

    pub fn start_autoplay(&mut self) -> Option<AutoplayCommand> {
        if self.len <= 1 || self.autoplay_running || self.paused_hover || self.paused_hidden {
            return None;
        }
        self.autoplay_running = true;
        Some(AutoplayCommand::Start {
            interval_ms: self.config.autoplay_ms,
        })
    }

    pub fn pause_autoplay(&mut self, reason: PauseReason) -> Option<AutoplayCommand> {
        match reason {
            PauseReason::Hover => self.paused_hover = true,
            PauseReason::Hidden => self.paused_hidden = true,
        }
        if !self.autoplay_running {
            return None;
        }
        self.autoplay_running = false;
        Some(AutoplayCommand::Stop)
    }

    pub fn resume_autoplay(&mut self, reason: PauseReason) -> Option<AutoplayCommand> {
        match reason {
            PauseReason::Hover => self.paused_hover = false,
            PauseReason::Hidden => self.paused_hidden = false,
        }
        self.start_autoplay()
    }

    /// Restarts a running timer with the new interval.
    pub fn set_autoplay_delay(&mut self, interval_ms: u32) -> Vec<AutoplayCommand> {
        self.config.autoplay_ms = interval_ms;
        if !self.autoplay_running {
            return Vec::new();
        }
        self.autoplay_running = false;
        let mut commands = vec![AutoplayCommand::Stop];
        commands.extend(self.start_autoplay());
        commands
    }

    /// Teardown: returns the stop command if a timer is live.
    pub fn stop(&mut self) -> Option<AutoplayCommand> {
        if self.autoplay_running {
            self.autoplay_running = false;
            Some(AutoplayCommand::Stop)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carousel(len: usize) -> Carousel {
        Carousel::new(len, CarouselConfig::default())
    }

    fn step(c: &mut Carousel) {
        c.next().unwrap();
        c.finish_transition();
    }

    #[test]
    fn next_n_times_returns_to_start() {
        for len in 1..8 {
            for start in 0..len {
                let mut c = carousel(len);
                c.go_to(start).unwrap();
                c.finish_transition();
                for _ in 0..len {
                    step(&mut c);
                }
                assert_eq!(c.current(), start, "len {} start {}", len, start);
            }
        }
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut c = carousel(4);
        let change = c.previous().unwrap();
        assert_eq!(change.previous, 0);
        assert_eq!(change.current, 3);
        assert_eq!(change.announcement, "Slide 4 of 4.");
    }

    #[test]
    fn transitions_do_not_overlap() {
        let mut c = carousel(3);
        c.go_to(1).unwrap();
        assert_eq!(c.next(), Err(Rejected::Transitioning));
        assert_eq!(c.current(), 1);
        c.finish_transition();
        assert_eq!(c.next().unwrap().current, 2);
    }

    #[test]
    fn out_of_range_and_empty_are_rejected() {
        let mut c = carousel(3);
        assert_eq!(c.go_to(3), Err(Rejected::OutOfRange));
        assert!(!c.is_transitioning());

        let mut empty = carousel(0);
        assert_eq!(empty.next(), Err(Rejected::Empty));
        assert_eq!(empty.previous(), Err(Rejected::Empty));
        assert!(!empty.indicator_active(0));
    }

    #[test]
    fn pause_is_idempotent_and_resume_starts_one_timer() {
        let mut c = carousel(3);
        assert_eq!(
            c.start_autoplay(),
            Some(AutoplayCommand::Start { interval_ms: 5000 })
        );
        assert_eq!(c.pause_autoplay(PauseReason::Hidden), Some(AutoplayCommand::Stop));
        assert_eq!(c.pause_autoplay(PauseReason::Hidden), None);
        assert_eq!(
            c.resume_autoplay(PauseReason::Hidden),
            Some(AutoplayCommand::Start { interval_ms: 5000 })
        );
        assert_eq!(c.resume_autoplay(PauseReason::Hidden), None);
        assert!(c.autoplay_active());
    }

    #[test]
    fn leaving_hover_while_hidden_keeps_autoplay_off() {
        let mut c = carousel(3);
        c.start_autoplay();
        c.pause_autoplay(PauseReason::Hover);
        c.pause_autoplay(PauseReason::Hidden);
        assert_eq!(c.resume_autoplay(PauseReason::Hover), None);
        assert!(c.resume_autoplay(PauseReason::Hidden).is_some());
    }

    #[test]
    fn single_slide_never_autoplays() {
        let mut c = carousel(1);
        assert_eq!(c.start_autoplay(), None);
        assert_eq!(c.resume_autoplay(PauseReason::Hover), None);
    }

    #[test]
    fn changing_delay_restarts_running_timer() {
        let mut c = carousel(2);
        assert!(c.set_autoplay_delay(3000).is_empty());
        c.start_autoplay();
        assert_eq!(
            c.set_autoplay_delay(4000),
            vec![
                AutoplayCommand::Stop,
                AutoplayCommand::Start { interval_ms: 4000 }
            ]
        );
    }

    #[test]
    fn horizontal_swipe_beyond_threshold_moves() {
        let mut c = carousel(3);
        let left = c.swipe(TouchPoint { x: 200.0, y: 10.0 }, TouchPoint { x: 100.0, y: 20.0 });
        assert_eq!(left.unwrap().unwrap().current, 1);
        c.finish_transition();

        let right = c.swipe(TouchPoint { x: 100.0, y: 0.0 }, TouchPoint { x: 180.0, y: 0.0 });
        assert_eq!(right.unwrap().unwrap().current, 0);
    }

    #[test]
    fn short_or_vertical_swipes_are_ignored() {
        let mut c = carousel(3);
        assert!(c
            .swipe(TouchPoint { x: 100.0, y: 0.0 }, TouchPoint { x: 70.0, y: 0.0 })
            .is_none());
        assert!(c
            .swipe(TouchPoint { x: 100.0, y: 0.0 }, TouchPoint { x: 40.0, y: 300.0 })
            .is_none());
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn arrow_keys_map_to_direction() {
        let mut c = carousel(3);
        assert_eq!(Key::from_key_name("ArrowLeft"), Some(Key::ArrowLeft));
        assert_eq!(Key::from_key_name("Enter"), None);
        assert_eq!(c.key(Key::ArrowLeft).unwrap().current, 2);
        c.finish_transition();
        assert_eq!(c.key(Key::ArrowRight).unwrap().current, 0);
    }
}
