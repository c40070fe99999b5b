pub mod announcer;
pub mod lead_form;
pub mod navigation;
pub mod scroll_animations;
pub mod testimonials;
pub mod theme_toggle;
