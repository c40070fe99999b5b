//! Scroll-linked styling for `[data-parallax]` and `[data-scroll-progress]`.

const DEFAULT_PARALLAX_SPEED: f64 = 0.5;

/// Parses `data-parallax`. Empty, zero or garbage falls back to 0.5.
pub fn parallax_speed(raw: Option<&str>) -> f64 {
    raw.and_then(|r| r.trim().parse::<f64>().ok())
        .filter(|speed| speed.is_finite() && *speed != 0.0)
        .unwrap_or(DEFAULT_PARALLAX_SPEED)
}

/// Vertical translation in px for a parallax layer.
pub fn parallax_offset(scroll_y: f64, speed: f64) -> f64 {
    -(scroll_y * speed)
}

pub fn parallax_transform(scroll_y: f64, speed: f64) -> String {
    format!("translateY({}px)", parallax_offset(scroll_y, speed))
}

/// How far down the page the visitor is, in percent (0..=100).
/// A page that does not scroll reports 0.
pub fn scroll_progress(scroll_top: f64, doc_height: f64, viewport_height: f64) -> f64 {
    let scrollable = doc_height - viewport_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    Width,
    Height,
    Transform,
    Opacity,
}

impl ProgressStyle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "width" => Some(ProgressStyle::Width),
            "height" => Some(ProgressStyle::Height),
            "transform" => Some(ProgressStyle::Transform),
            "opacity" => Some(ProgressStyle::Opacity),
            _ => None,
        }
    }

    /// The inline style property and value for a given progress percentage.
    pub fn declaration(self, percent: f64) -> (&'static str, String) {
        match self {
            ProgressStyle::Width => ("width", format!("{}%", percent)),
            ProgressStyle::Height => ("height", format!("{}%", percent)),
            ProgressStyle::Transform => ("transform", format!("scaleX({})", percent / 100.0)),
            ProgressStyle::Opacity => ("opacity", format!("{}", percent / 100.0)),
        }
    }
}

/// Coalesces scroll events into at most one update per animation frame.
#[derive(Debug, Default)]
pub struct FrameGate {
    scheduled: bool,
}

impl FrameGate {
    /// `true` when the caller should request a frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.scheduled, true)
    }

    pub fn frame_ran(&mut self) {
        self.scheduled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallax_moves_against_scroll() {
        assert_eq!(parallax_offset(200.0, 0.5), -100.0);
        assert_eq!(parallax_transform(100.0, 0.25), "translateY(-25px)");
        assert_eq!(parallax_speed(Some("0.3")), 0.3);
        assert_eq!(parallax_speed(Some("fast")), 0.5);
        assert_eq!(parallax_speed(None), 0.5);
    }

    #[test]
    fn progress_is_clamped_and_safe_on_short_pages() {
        assert_eq!(scroll_progress(500.0, 2000.0, 1000.0), 50.0);
        assert_eq!(scroll_progress(1500.0, 2000.0, 1000.0), 100.0);
        assert_eq!(scroll_progress(0.0, 800.0, 1000.0), 0.0);
    }

    #[test]
    fn progress_styles() {
        assert_eq!(ProgressStyle::parse("opacity"), Some(ProgressStyle::Opacity));
        assert_eq!(ProgressStyle::parse("color"), None);
        assert_eq!(
            ProgressStyle::Transform.declaration(50.0),
            ("transform", "scaleX(0.5)".to_string())
        );
        assert_eq!(ProgressStyle::Width.declaration(25.0), ("width", "25%".to_string()));
    }

    #[test]
    fn one_frame_per_burst() {
        let mut gate = FrameGate::default();
        assert!(gate.request());
        assert!(!gate.request());
        gate.frame_ran();
        assert!(gate.request());
    }
}
